/// Argument resolution, validation and the console prompt.
///
/// Arguments are resolved into an [`Args`] value before anything else runs. The
/// subject is either text read from standard input or a path that must exist,
/// classified as a file or a directory. [`validate`] then rejects bad combinations
/// in a fixed order so that the first problem reported is always the same one.
use std::io::{self, BufRead, BufReader, Read, Stdin, Stdout, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::ReplaceFlags;
use crate::errors::{FdsError, FdsResult};
use crate::search::matcher::Pattern;

/// What the replacement is applied to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// Text read from standard input
    Text(Vec<u8>),
    /// A single regular file (or a symlink to one)
    File(PathBuf),
    /// A directory whose files are processed
    Directory(PathBuf),
}

impl Subject {
    /// The path given on the command line, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Subject::Text(_) => None,
            Subject::File(path) | Subject::Directory(path) => Some(path),
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            Subject::Text(text) => is_blank(text),
            Subject::File(path) | Subject::Directory(path) => path.as_os_str().is_empty(),
        }
    }
}

/// Resolved positional arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub search: String,
    pub replace: String,
    pub subject: Subject,
}

/// Resolves the positional arguments.
///
/// Without a path the subject is read to the end from `stdin`. With a path, the path
/// must exist; it is classified as a file or directory by following symlinks.
pub fn resolve_args<R: Read>(
    search: &str,
    replace: &str,
    path: Option<&Path>,
    mut stdin: R,
) -> FdsResult<Args> {
    let subject = match path {
        None => {
            let mut text = Vec::new();
            stdin.read_to_end(&mut text).map_err(FdsError::StdinRead)?;
            Subject::Text(text)
        }
        Some(path) => {
            let metadata = std::fs::metadata(path).map_err(|_| FdsError::file_not_found(path))?;
            if metadata.is_dir() {
                Subject::Directory(path.to_path_buf())
            } else {
                Subject::File(path.to_path_buf())
            }
        }
    };

    Ok(Args {
        search: search.to_string(),
        replace: replace.to_string(),
        subject,
    })
}

/// Validates resolved arguments against the selected flags
pub fn validate(args: &Args, flags: &ReplaceFlags) -> FdsResult<()> {
    if !flags.literal {
        Pattern::compile(&args.search, false, false)?;
    }

    if flags.literal && flags.insensitive {
        return Err(FdsError::LiteralInsensitiveConflict);
    }

    if flags.confirm && args.subject.path().is_none() {
        return Err(FdsError::ConfirmWithoutFile);
    }

    if is_blank(args.search.as_bytes()) || is_blank(args.replace.as_bytes()) || args.subject.is_blank()
    {
        return Err(FdsError::invalid_arguments(
            "search, replacement and subject must not be blank",
        ));
    }

    Ok(())
}

fn is_blank(text: &[u8]) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}

/// Interaction with whoever confirms substitutions
pub trait Prompt {
    /// Writes `text` to the output sink as is
    fn show(&mut self, text: &str) -> FdsResult<()>;

    /// Asks `question` until one of the `valid` characters is answered
    fn ask(&mut self, question: &str, valid: &[char]) -> FdsResult<char>;
}

impl<P: Prompt + ?Sized> Prompt for &mut P {
    fn show(&mut self, text: &str) -> FdsResult<()> {
        (**self).show(text)
    }

    fn ask(&mut self, question: &str, valid: &[char]) -> FdsResult<char> {
        (**self).ask(question, valid)
    }
}

/// A [`Prompt`] shared between worker threads; each call holds the lock for its duration
pub struct SharedPrompt<'a, P>(pub &'a Mutex<P>);

impl<P: Prompt> SharedPrompt<'_, P> {
    fn lock(&self) -> MutexGuard<'_, P> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P: Prompt> Prompt for SharedPrompt<'_, P> {
    fn show(&mut self, text: &str) -> FdsResult<()> {
        self.lock().show(text)
    }

    fn ask(&mut self, question: &str, valid: &[char]) -> FdsResult<char> {
        let mut prompt = self.lock();
        prompt.ask(question, valid)
    }
}

/// A [`Prompt`] reading answers one character at a time from a persistent reader
pub struct ConsolePrompt<R, W> {
    reader: R,
    writer: W,
}

impl ConsolePrompt<BufReader<Stdin>, Stdout> {
    /// A prompt over the process's standard input and output
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Consumes the prompt, returning the output sink
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Reads one UTF-8 character. Malformed sequences decode to U+FFFD.
    fn read_char(&mut self) -> io::Result<Option<char>> {
        let mut buf = [0u8; 4];
        match self.reader.read_exact(&mut buf[..1]) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e),
        }

        let width = match buf[0] {
            0x00..=0x7F => 1,
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return Ok(Some(char::REPLACEMENT_CHARACTER)),
        };
        self.reader.read_exact(&mut buf[1..width])?;

        Ok(Some(
            std::str::from_utf8(&buf[..width])
                .ok()
                .and_then(|s| s.chars().next())
                .unwrap_or(char::REPLACEMENT_CHARACTER),
        ))
    }
}

impl<R: BufRead, W: Write> Prompt for ConsolePrompt<R, W> {
    fn show(&mut self, text: &str) -> FdsResult<()> {
        self.writer
            .write_all(text.as_bytes())
            .and_then(|_| self.writer.flush())
            .map_err(FdsError::StdinRead)
    }

    fn ask(&mut self, question: &str, valid: &[char]) -> FdsResult<char> {
        let mut last = None;
        loop {
            // The line terminator after a rejected answer does not re-print the question
            if !matches!(last, Some('\n') | Some('\r')) {
                self.show(&format!("{}: ", question))?;
            }

            let input = self
                .read_char()
                .map_err(FdsError::StdinRead)?
                .ok_or_else(|| {
                    FdsError::StdinRead(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "input ended before an answer was given",
                    ))
                })?;

            if valid.contains(&input) {
                return Ok(input);
            }
            last = Some(input);
        }
    }
}
