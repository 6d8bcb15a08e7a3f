/// Per-match confirmation of substitutions.
///
/// Each line is handled by a small state machine. While `Scanning`, every match is
/// rendered and the prompt decides: `y` replaces it, `n` leaves it, `a` replaces it
/// and every later match without asking, `q` leaves it and everything after it
/// alone. The answer is written back to the caller's [`ConfirmAnswer`] so that `a`
/// and `q` carry over to the following lines and files.
use colored::Colorize;
use tracing::trace;

use super::Replacement;
use crate::errors::{FdsError, FdsResult};
use crate::input::Prompt;
use crate::results::Match;

/// Question asked for every match
pub const CONFIRM_QUESTION: &str = "[y]es [n]o [a]ll q[uit]";

/// Characters accepted as answers to [`CONFIRM_QUESTION`]
pub const CONFIRM_CHOICES: [char; 4] = ['y', 'n', 'a', 'q'];

/// The most recent answer given during a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfirmAnswer {
    Yes,
    #[default]
    No,
    All,
    Quit,
}

impl ConfirmAnswer {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'y' => Some(Self::Yes),
            'n' => Some(Self::No),
            'a' => Some(Self::All),
            'q' => Some(Self::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scanning,
    ConfirmedAll,
    ConfirmedQuit,
}

impl State {
    fn from_answer(answer: ConfirmAnswer) -> Self {
        match answer {
            ConfirmAnswer::All => State::ConfirmedAll,
            ConfirmAnswer::Quit => State::ConfirmedQuit,
            ConfirmAnswer::Yes | ConfirmAnswer::No => State::Scanning,
        }
    }
}

/// Confirms the matches of one file, line by line
#[derive(Debug, Clone, Copy)]
pub struct LineConfirm<'a> {
    pub replacement: &'a Replacement,
    /// Name shown in the `File` header of every match
    pub file_name: &'a str,
    pub context_bytes: usize,
}

impl<'a> LineConfirm<'a> {
    pub fn new(replacement: &'a Replacement, file_name: &'a str, context_bytes: usize) -> Self {
        Self {
            replacement,
            file_name,
            context_bytes,
        }
    }

    /// Runs the confirmation protocol over `line`.
    ///
    /// Returns the amended line and whether it differs from the input.
    pub fn confirm_line<P: Prompt + ?Sized>(
        &self,
        line: &[u8],
        line_number: usize,
        prompt: &mut P,
        answer: &mut ConfirmAnswer,
    ) -> FdsResult<(Vec<u8>, bool)> {
        match State::from_answer(*answer) {
            State::ConfirmedQuit => return Ok((line.to_vec(), false)),
            State::ConfirmedAll => return Ok(self.replacement.replace_all(line)),
            State::Scanning => {}
        }

        let matches = self.replacement.pattern().find_matches(
            self.replacement.template(),
            line,
            self.context_bytes,
        );

        let mut state = State::Scanning;
        let mut replaced = line.to_vec();
        // Length change introduced by accepted replacements earlier on this line
        let mut delta: isize = 0;
        let mut previous_end = 0;

        for m in matches {
            if state == State::ConfirmedQuit {
                break;
            }

            let range = shift(previous_end, delta)..shift(m.end, delta);
            previous_end = m.end;

            let decision = match state {
                State::ConfirmedAll => ConfirmAnswer::Yes,
                _ => {
                    let decision = self.ask(&m.with_line_number(line_number), prompt)?;
                    *answer = decision;
                    decision
                }
            };

            match decision {
                ConfirmAnswer::Yes | ConfirmAnswer::All => {
                    let before = replaced.len() as isize;
                    replaced = self.replacement.replace_in_range(&replaced, range);
                    delta += replaced.len() as isize - before;
                    if decision == ConfirmAnswer::All {
                        state = State::ConfirmedAll;
                    }
                }
                ConfirmAnswer::No => {}
                ConfirmAnswer::Quit => state = State::ConfirmedQuit,
            }
        }

        let changed = replaced != line;
        Ok((replaced, changed))
    }

    fn ask<P: Prompt + ?Sized>(&self, m: &Match, prompt: &mut P) -> FdsResult<ConfirmAnswer> {
        prompt.show(&render_match(self.file_name, m))?;
        let c = prompt.ask(CONFIRM_QUESTION, &CONFIRM_CHOICES)?;
        prompt.show("\n")?;
        trace!("Answered {:?} for {}:{:?}", c, self.file_name, m.line_number);
        ConfirmAnswer::from_char(c).ok_or(FdsError::InvalidConfirmInput(c))
    }
}

fn shift(offset: usize, delta: isize) -> usize {
    offset.checked_add_signed(delta).unwrap_or(0)
}

/// Renders the block shown before asking about a match
pub fn render_match(file_name: &str, m: &Match) -> String {
    let [before, matched, replacement, after] = m.display_parts();
    format!(
        "File\t{}\n{}\t{}{}{}{}\n",
        file_name,
        m.line_number.unwrap_or_default(),
        before,
        matched.bright_red().bold().italic(),
        replacement.bright_green().bold(),
        after
    )
}
