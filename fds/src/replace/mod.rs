/// Substitution primitives and the protocols built on them.
///
/// A [`Replacement`] pairs a compiled [`Pattern`] with a replacement template.
/// It is the single value handed to the line, file and directory layers:
///
/// - [`replace_in_range`] substitutes inside one byte range of a line, leaving the
///   rest of the line byte-identical. The interactive path uses it to apply a single
///   accepted match.
/// - [`confirm`] drives per-match yes/no/all/quit decisions over a line.
/// - [`file`] reads, stages and atomically commits the changes for one file.
pub mod confirm;
pub mod file;

use std::ops::Range;

use crate::config::ReplaceFlags;
use crate::errors::FdsResult;
use crate::search::matcher::Pattern;

/// A pattern and the template its matches are replaced with
#[derive(Debug, Clone)]
pub struct Replacement {
    pattern: Pattern,
    template: String,
}

impl Replacement {
    pub fn new(pattern: Pattern, template: impl Into<String>) -> Self {
        Self {
            pattern,
            template: template.into(),
        }
    }

    /// Compiles `search` with `flags` and pairs it with `template`
    pub fn compile(search: &str, template: &str, flags: &ReplaceFlags) -> FdsResult<Self> {
        Ok(Self::new(Pattern::from_flags(search, flags)?, template))
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Replaces every occurrence in `subject`, returning the result and whether it differs
    pub fn replace_all(&self, subject: &[u8]) -> (Vec<u8>, bool) {
        let replaced = self
            .pattern
            .regex()
            .replace_all(subject, self.template.as_bytes());
        let changed = replaced.as_ref() != subject;
        (replaced.into_owned(), changed)
    }

    /// Replaces every occurrence that lies inside `range` of `line`
    pub fn replace_in_range(&self, line: &[u8], range: Range<usize>) -> Vec<u8> {
        replace_in_range(&self.pattern, line, &self.template, range)
    }
}

/// Replaces all occurrences of `pattern` inside `line[range]` with `template`.
///
/// Back-references in the template resolve against the sub-slice. Bytes outside the
/// range are copied through untouched. The range is clamped to the line: `end` to the
/// line length, then `start` to `end`.
pub fn replace_in_range(pattern: &Pattern, line: &[u8], template: &str, range: Range<usize>) -> Vec<u8> {
    let end = range.end.min(line.len());
    let start = range.start.min(end);

    let replaced = pattern
        .regex()
        .replace_all(&line[start..end], template.as_bytes());

    let mut result = Vec::with_capacity(line.len() - (end - start) + replaced.len());
    result.extend_from_slice(&line[..start]);
    result.extend_from_slice(&replaced);
    result.extend_from_slice(&line[end..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(search: &str) -> Pattern {
        Pattern::compile(search, false, false).unwrap()
    }

    #[test]
    fn test_replace_in_range_first_occurrence_only() {
        let line = b"this is some text, this is some other text";
        let result = replace_in_range(&pattern("text"), line, "replacement", 0..17);
        assert_eq!(
            result,
            b"this is some replacement, this is some other text".to_vec()
        );
    }

    #[test]
    fn test_replace_in_range_second_occurrence_only() {
        let line = b"this is some text, this is some other text";
        let result = replace_in_range(&pattern("text"), line, "replacement", 17..42);
        assert_eq!(
            result,
            b"this is some text, this is some other replacement".to_vec()
        );
    }

    #[test]
    fn test_replace_in_range_back_reference() {
        let line = b"this is some text";
        let result = replace_in_range(&pattern("(text)"), line, "other $1", 0..line.len());
        assert_eq!(result, b"this is some other text".to_vec());
    }

    #[test]
    fn test_replace_in_range_clamps_out_of_bounds() {
        let line = b"text text";
        let p = pattern("text");
        assert_eq!(replace_in_range(&p, line, "x", 5..100), b"text x".to_vec());
        assert_eq!(replace_in_range(&p, line, "x", 50..100), line.to_vec());
        assert_eq!(replace_in_range(&p, line, "x", 7..3), line.to_vec());
    }

    #[test]
    fn test_range_locality() {
        let line = b"ab-ab-ab";
        let p = pattern("ab");
        for start in 0..=line.len() {
            for end in start..=line.len() {
                let result = replace_in_range(&p, line, "XYZ", start..end);
                assert_eq!(&result[..start], &line[..start]);
                assert_eq!(&result[result.len() - (line.len() - end)..], &line[end..]);
            }
        }
    }

    #[test]
    fn test_replacement_replace_all() {
        let replacement = Replacement::compile("lorem", "bar", &ReplaceFlags::default()).unwrap();
        let (result, changed) = replacement.replace_all(b"lorem ipsum lorem");
        assert_eq!(result, b"bar ipsum bar".to_vec());
        assert!(changed);

        let (result, changed) = replacement.replace_all(b"nothing here");
        assert_eq!(result, b"nothing here".to_vec());
        assert!(!changed);
    }

    #[test]
    fn test_replacement_same_text_is_unchanged() {
        let replacement = Replacement::compile("a", "a", &ReplaceFlags::default()).unwrap();
        let (_, changed) = replacement.replace_all(b"banana");
        assert!(!changed);
    }

    #[test]
    fn test_literal_replacement_leaves_parentheses_alone() {
        let flags = ReplaceFlags {
            literal: true,
            ..ReplaceFlags::default()
        };
        let replacement = Replacement::compile("(fooo)", "bar", &flags).unwrap();
        let (result, changed) = replacement.replace_all(b"fooo and foo");
        assert_eq!(result, b"fooo and foo".to_vec());
        assert!(!changed);
    }
}
