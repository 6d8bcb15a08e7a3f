/// Path exclusion for directory runs.
///
/// Ignore globs use `glob` syntax and are tested against the path both as it was
/// discovered and relative to the walk root, so `vendor/**` and `**/*.lock`
/// behave the same whether the root was given as `.` or as an absolute path.
use glob::Pattern;
use std::path::Path;
use tracing::warn;

/// Compiles the ignore globs, dropping (and logging) the malformed ones
pub fn compile_globs(globs: &[String]) -> Vec<Pattern> {
    globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                warn!("Ignoring malformed glob {:?}: {}", glob, e);
                None
            }
        })
        .collect()
}

/// Checks if a path should be skipped based on compiled ignore patterns
pub fn should_ignore(path: &Path, root: &Path, patterns: &[Pattern]) -> bool {
    if patterns.is_empty() {
        return false;
    }

    let full = normalize(path);
    let relative = path.strip_prefix(root).ok().map(normalize);

    patterns.iter().any(|p| {
        p.matches(&full) || relative.as_deref().is_some_and(|rel| p.matches(rel))
    })
}

fn normalize(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    match path.strip_prefix("./") {
        Some(rest) => rest.to_string(),
        None => path,
    }
}
