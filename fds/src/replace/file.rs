/// Replacing inside a single file.
///
/// A file goes through four steps:
///
/// 1. **Read**: the path is resolved (symlinks to their canonical target), its
///    modification time captured, and its lines streamed through either a full
///    replacement or the confirmation protocol.
/// 2. **Stage**: if any line changed, the new content is written to a temporary
///    file next to the original, carrying the original's permissions.
/// 3. **Race check**: if the original was modified after it was read, the prompt
///    decides whether to overwrite it anyway.
/// 4. **Commit**: the temporary file is renamed over the original.
///
/// Unchanged content never creates a temporary file, so the original's
/// modification time is left alone. A staged file that is not committed is
/// removed when it is dropped.
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tempfile::NamedTempFile;
use tracing::debug;

use super::confirm::{ConfirmAnswer, LineConfirm};
use super::Replacement;
use crate::config::FdsConfig;
use crate::errors::{FdsError, FdsResult};
use crate::input::Prompt;

/// Choices for the overwrite question asked when a file changed under us
const OVERWRITE_CHOICES: [char; 2] = ['y', 'n'];

/// Outcome of reading and staging one file
#[derive(Debug)]
pub struct ReplacementResult {
    /// The resolved path of the file
    pub path: PathBuf,
    /// The amended content
    pub content: Vec<u8>,
    /// Whether the content differs from what is on disk
    pub changed: bool,
    /// Modification time captured before reading
    pub modified: SystemTime,
    /// The staged temporary file, present iff `changed`
    pub staged: Option<NamedTempFile>,
}

/// Resolves `path`, following a symlink to its absolute canonical target
pub fn resolve_path(path: &Path) -> FdsResult<PathBuf> {
    let metadata = fs::symlink_metadata(path).map_err(|e| FdsError::file_read(path, e))?;
    if metadata.file_type().is_symlink() {
        return fs::canonicalize(path).map_err(|e| FdsError::file_read(path, e));
    }
    Ok(path.to_path_buf())
}

/// Reads `path` and stages the replaced content.
///
/// With `confirm` set, every match goes through the confirmation protocol and the
/// decisions are recorded in `answer`.
pub fn stage<P: Prompt + ?Sized>(
    path: &Path,
    replacement: &Replacement,
    options: &FdsConfig,
    prompt: &mut P,
    answer: &mut ConfirmAnswer,
) -> FdsResult<ReplacementResult> {
    let resolved = resolve_path(path)?;
    let file = File::open(&resolved).map_err(|e| FdsError::file_read(&resolved, e))?;
    let metadata = file
        .metadata()
        .map_err(|e| FdsError::file_read(&resolved, e))?;
    let modified = metadata
        .modified()
        .map_err(|e| FdsError::file_read(&resolved, e))?;

    debug!(
        "Replacing {:?} for {:?} in file {}",
        replacement.pattern().source(),
        replacement.template(),
        resolved.display()
    );

    let file_name = path.display().to_string();
    let confirm = LineConfirm::new(replacement, &file_name, options.context_bytes);

    let mut reader = BufReader::new(file);
    let mut content = Vec::with_capacity(usize::try_from(metadata.len()).unwrap_or_default());
    let mut line = Vec::new();
    let mut line_number = 0;
    let mut changed = false;

    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| FdsError::file_read(&resolved, e))?;
        if read == 0 {
            break;
        }
        line_number += 1;

        let (replaced, line_changed) = if options.flags.confirm {
            confirm.confirm_line(&line, line_number, prompt, answer)?
        } else {
            replacement.replace_all(&line)
        };

        changed |= line_changed;
        content.extend_from_slice(&replaced);
    }

    let staged = if changed {
        Some(write_staged(&resolved, &content, &metadata)?)
    } else {
        debug!("Nothing replaced in file {}", resolved.display());
        None
    };

    Ok(ReplacementResult {
        path: resolved,
        content,
        changed,
        modified,
        staged,
    })
}

fn write_staged(path: &Path, content: &[u8], metadata: &fs::Metadata) -> FdsResult<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let prefix = format!(
        ".{}.",
        path.file_name().unwrap_or_default().to_string_lossy()
    );

    let mut temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".fds")
        .tempfile_in(dir)
        .map_err(|e| FdsError::temp_file_write(dir, e))?;

    temp.write_all(content)
        .and_then(|_| temp.flush())
        .map_err(|e| FdsError::file_write(temp.path(), e))?;
    fs::set_permissions(temp.path(), metadata.permissions())
        .map_err(|e| FdsError::file_write(temp.path(), e))?;

    debug!("Staged replacement in temp file {}", temp.path().display());
    Ok(temp)
}

impl ReplacementResult {
    /// Renames the staged file over the original, returning whether the file changed.
    ///
    /// If the original was modified since it was read, `prompt` is asked whether to
    /// overwrite it; declining yields [`FdsError::AbortedOperation`].
    pub fn commit<P: Prompt + ?Sized>(self, prompt: &mut P) -> FdsResult<bool> {
        let Some(temp) = self.staged else {
            return Ok(false);
        };
        let path = self.path;

        debug!(
            "Original timestamp of file {}: {}",
            path.display(),
            humantime::format_rfc3339(self.modified)
        );

        let current = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|e| FdsError::file_read(&path, e))?;

        if current > self.modified {
            debug!(
                "File {} has been modified since {}",
                path.display(),
                humantime::format_rfc3339(self.modified)
            );

            let question = format!(
                "File {} was modified after initial read. Overwrite anyway? [y]es [n]o",
                path.display()
            );
            let answer = prompt.ask(&question, &OVERWRITE_CHOICES)?;
            prompt.show("\n")?;

            if answer == 'n' {
                debug!("File {} will not be overwritten", path.display());
                return Err(FdsError::aborted(path));
            }
            debug!("Overwriting file {} with contents from temp file", path.display());
        }

        let temp_path = temp.path().to_path_buf();
        temp.persist(&path)
            .map_err(|e| FdsError::rename(&path, &temp_path, e.error))?;

        debug!("Renamed temp file {} to {}", temp_path.display(), path.display());
        Ok(true)
    }
}

/// Replaces the matches of `replacement` in the file at `path`.
///
/// Returns whether the file's content changed on disk.
pub fn replace_in_file<P: Prompt + ?Sized>(
    path: &Path,
    replacement: &Replacement,
    options: &FdsConfig,
    prompt: &mut P,
    answer: &mut ConfirmAnswer,
) -> FdsResult<bool> {
    stage(path, replacement, options, prompt, answer)?.commit(prompt)
}
