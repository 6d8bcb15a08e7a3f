use regex::bytes::Regex;
use tracing::trace;

use crate::config::ReplaceFlags;
use crate::errors::{FdsError, FdsResult};
use crate::results::Match;

/// Inline modifier that turns on case folding
const CASE_INSENSITIVE_PREFIX: &str = "(?i)";

/// A compiled, immutable search pattern
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles `search` into a pattern.
    ///
    /// In literal mode every regex metacharacter is escaped so the pattern matches
    /// `search` verbatim. Otherwise, `insensitive` prefixes a case folding modifier.
    pub fn compile(search: &str, literal: bool, insensitive: bool) -> FdsResult<Self> {
        let expression = if literal {
            regex::escape(search)
        } else if insensitive {
            format!("{}{}", CASE_INSENSITIVE_PREFIX, search)
        } else {
            search.to_string()
        };

        let regex = Regex::new(&expression).map_err(|e| FdsError::invalid_pattern(e.to_string()))?;
        trace!("Compiled search {:?} as {:?}", search, expression);

        Ok(Self {
            source: search.to_string(),
            regex,
        })
    }

    /// Compiles `search` using the modifiers selected in `flags`
    pub fn from_flags(search: &str, flags: &ReplaceFlags) -> FdsResult<Self> {
        Self::compile(search, flags.literal, flags.insensitive)
    }

    /// The search text this pattern was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The underlying regex
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn is_match(&self, subject: &[u8]) -> bool {
        self.regex.is_match(subject)
    }

    /// Finds all non-overlapping occurrences in `line`, left to right.
    ///
    /// Each match carries at most `context_bytes` bytes of context on either side,
    /// clamped to the line and pulled inward off any split UTF-8 sequence.
    pub fn find_matches(&self, template: &str, line: &[u8], context_bytes: usize) -> Vec<Match> {
        self.regex
            .captures_iter(line)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let (start, end) = (whole.start(), whole.end());

                let mut replacement = Vec::new();
                caps.expand(template.as_bytes(), &mut replacement);

                let before = context_start(line, start, context_bytes);
                let after = context_end(line, end, context_bytes);

                Some(Match {
                    matched: line[start..end].to_vec(),
                    template: template.to_string(),
                    replacement,
                    context_before: line[before..start].to_vec(),
                    context_after: line[end..after].to_vec(),
                    start,
                    end,
                    line_number: None,
                })
            })
            .collect()
    }
}

fn is_continuation_byte(byte: u8) -> bool {
    byte & 0b1100_0000 == 0b1000_0000
}

/// First byte of the context window that ends at `start`
fn context_start(line: &[u8], start: usize, context_bytes: usize) -> usize {
    let mut index = start.saturating_sub(context_bytes);
    while index < start && is_continuation_byte(line[index]) {
        index += 1;
    }
    index
}

/// End (exclusive) of the context window that begins at `end`
fn context_end(line: &[u8], end: usize, context_bytes: usize) -> usize {
    let mut index = end.saturating_add(context_bytes).min(line.len());
    while index > end && index < line.len() && is_continuation_byte(line[index]) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_regex() {
        let pattern = Pattern::compile(r"\btest\w+", false, false).unwrap();
        assert!(pattern.is_match(b"testing"));
        assert!(!pattern.is_match(b"a test"));
        assert_eq!(pattern.source(), r"\btest\w+");
    }

    #[test]
    fn test_compile_literal_escapes_metacharacters() {
        let pattern = Pattern::compile("(fooo)", true, false).unwrap();
        assert!(pattern.is_match(b"call (fooo) now"));
        assert!(!pattern.is_match(b"fooo"));
    }

    #[test]
    fn test_compile_insensitive() {
        let pattern = Pattern::compile("lorem", false, true).unwrap();
        assert!(pattern.is_match(b"Lorem ipsum"));

        let sensitive = Pattern::compile("lorem", false, false).unwrap();
        assert!(!sensitive.is_match(b"Lorem ipsum"));
    }

    #[test]
    fn test_compile_invalid_pattern() {
        let result = Pattern::compile("(lorem", false, false);
        assert!(matches!(result, Err(FdsError::InvalidPattern(_))));

        // The same text is fine once it is literal
        assert!(Pattern::compile("(lorem", true, false).is_ok());
    }

    #[test]
    fn test_from_flags() {
        let flags = ReplaceFlags {
            insensitive: true,
            ..ReplaceFlags::default()
        };
        let pattern = Pattern::from_flags("TEXT", &flags).unwrap();
        assert!(pattern.is_match(b"some text"));
    }

    #[test]
    fn test_find_matches_with_context() {
        let pattern = Pattern::compile("text", false, false).unwrap();
        let line = b"this is some text, this is some other text";
        let matches = pattern.find_matches("replacement", line, 50);

        assert_eq!(matches.len(), 2);

        assert_eq!(matches[0].matched, b"text");
        assert_eq!(matches[0].context_before, b"this is some ");
        assert_eq!(matches[0].context_after, b", this is some other text");
        assert_eq!((matches[0].start, matches[0].end), (13, 17));

        assert_eq!(matches[1].context_before, b"this is some text, this is some other ");
        assert!(matches[1].context_after.is_empty());
        assert_eq!((matches[1].start, matches[1].end), (38, 42));
        assert_eq!(matches[1].replacement, b"replacement");
    }

    #[test]
    fn test_find_matches_bounded_context() {
        let pattern = Pattern::compile("text", false, false).unwrap();
        let line = b"this is some text, this is some other text";
        let matches = pattern.find_matches("x", line, 5);

        assert_eq!(matches[0].context_before, b"some ");
        assert_eq!(matches[0].context_after, b", thi");
        assert_eq!(matches[1].context_before, b"ther ");
    }

    #[test]
    fn test_find_matches_none() {
        let pattern = Pattern::compile("<fooo>", false, false).unwrap();
        assert!(pattern.find_matches("x", b"nothing to see", 50).is_empty());
        assert!(pattern.find_matches("x", b"", 50).is_empty());
    }

    #[test]
    fn test_find_matches_expands_back_references() {
        let pattern = Pattern::compile("(text)", false, false).unwrap();
        let matches = pattern.find_matches("other $1", b"this is some text", 50);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].template, "other $1");
        assert_eq!(matches[0].replacement, b"other text");
    }

    #[test]
    fn test_context_clamped_at_every_position() {
        let pattern = Pattern::compile("x", false, false).unwrap();
        let line = b"x-abc-x-def-x";
        for context_bytes in 0..16 {
            for m in pattern.find_matches("y", line, context_bytes) {
                assert!(m.context_before.len() <= context_bytes);
                assert!(m.context_after.len() <= context_bytes);
                if m.start == 0 {
                    assert!(m.context_before.is_empty());
                }
                if m.end == line.len() {
                    assert!(m.context_after.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_context_does_not_split_characters() {
        let pattern = Pattern::compile("x", false, false).unwrap();
        let line = "ããxãã".as_bytes();

        // Three bytes reach into the middle of the first 'ã'
        let matches = pattern.find_matches("y", line, 3);
        assert_eq!(matches[0].context_before, "ã".as_bytes());
        assert_eq!(matches[0].context_after, "ã".as_bytes());
        assert!(std::str::from_utf8(&matches[0].context_before).is_ok());
        assert!(std::str::from_utf8(&matches[0].context_after).is_ok());
    }
}
