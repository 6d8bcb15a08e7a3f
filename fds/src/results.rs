/// This module holds the value types produced while locating and replacing matches.
///
/// # Byte-oriented text
///
/// fds treats file content as bytes, not as `String`. Lines read from disk are
/// handed to a `regex::bytes::Regex`, offsets are byte offsets, and the context
/// window around a match is measured in bytes. This keeps replacement
/// byte-exact for files that are not valid UTF-8 and makes every slice
/// operation total: there is no character boundary to fall off.
///
/// Only rendering converts to text, lossily, through [`Match::display_parts`].
use std::borrow::Cow;
use std::path::PathBuf;

/// One located occurrence of a pattern within a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The matched bytes
    pub matched: Vec<u8>,
    /// The replacement template, possibly containing back-references such as `$1`
    pub template: String,
    /// The template expanded against this occurrence's capture groups
    pub replacement: Vec<u8>,
    /// Up to `context_bytes` bytes immediately before the match
    pub context_before: Vec<u8>,
    /// Up to `context_bytes` bytes immediately after the match
    pub context_after: Vec<u8>,
    /// Start offset of the match within the line
    pub start: usize,
    /// End offset (exclusive) of the match within the line
    pub end: usize,
    /// 1-based line number, when the match came from a file
    pub line_number: Option<usize>,
}

impl Match {
    /// Attaches the 1-based number of the line the match was found on
    pub fn with_line_number(mut self, line_number: usize) -> Self {
        self.line_number = Some(line_number);
        self
    }

    /// Text pieces used to render the match: before, matched, replacement, after.
    /// The line terminator is dropped from the trailing context.
    pub fn display_parts(&self) -> [Cow<'_, str>; 4] {
        let after = self
            .context_after
            .strip_suffix(b"\n")
            .map(|rest| rest.strip_suffix(b"\r").unwrap_or(rest))
            .unwrap_or(&self.context_after);

        [
            String::from_utf8_lossy(&self.context_before),
            String::from_utf8_lossy(&self.matched),
            String::from_utf8_lossy(&self.replacement),
            String::from_utf8_lossy(after),
        ]
    }
}

/// Outcome of processing a single file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileOutcome {
    /// The file that was processed
    pub path: PathBuf,
    /// Whether the file's content was replaced on disk
    pub changed: bool,
}

/// Summary of a directory run
#[derive(Debug, Default)]
pub struct FanOutReport {
    /// Files that were processed to completion, changed or not
    pub files_processed: usize,
    /// Files whose content was replaced on disk
    pub files_changed: usize,
    /// Per-file errors collected by the worker pool
    pub errors: Vec<crate::FdsError>,
}

impl FanOutReport {
    /// Creates a new empty report
    pub fn new() -> Self {
        Default::default()
    }

    /// Records a file that was processed without error
    pub fn add_outcome(&mut self, outcome: &FileOutcome) {
        self.files_processed += 1;
        if outcome.changed {
            self.files_changed += 1;
        }
    }

    /// Whether every file was processed without error
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
