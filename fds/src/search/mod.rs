/// Locating matches and fanning replacements out over many files.
///
/// [`matcher`] compiles the search text into a [`Pattern`] and finds its occurrences
/// in a line, each with a bounded window of surrounding bytes. [`engine`] walks a
/// directory and runs the single-file replacement over every file it finds,
/// either one after the other (when every substitution is confirmed) or on a
/// fixed pool of worker threads fed from a job queue:
///
/// ```rust,ignore
/// let files = collect_files(root, &config.ignore_globs)?;
/// let report = replace_in_files(&files, &replacement, &config, &prompt, &mut answer)?;
/// for error in &report.errors {
///     eprintln!("{}", error);
/// }
/// ```
///
/// Workers only share immutable state: the compiled pattern, the configuration
/// and the list of files. The one mutable resource they can reach, the prompt
/// used when a file changes between read and commit, sits behind a `Mutex`.
pub mod engine;
pub mod matcher;

pub use engine::{collect_files, replace_in_files};
pub use matcher::Pattern;
