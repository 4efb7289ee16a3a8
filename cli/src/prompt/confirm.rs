//! Yes/no confirmation with a bounded number of attempts

use std::io::{BufRead, Write};

use tracing::debug;

use crate::errors::CliError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// A single line read from the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Unrecognized,
    EndOfInput,
}

impl Answer {
    pub fn parse(line: &str) -> Self {
        match line.trim().to_lowercase().as_str() {
            "y" | "yes" => Answer::Yes,
            "n" | "no" => Answer::No,
            _ => Answer::Unrecognized,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmState {
    /// Waiting for an answer; `attempt` counts from 1
    Asking { attempt: u32 },
    Accepted,
    Declined,
}

impl ConfirmState {
    /// Transition on an answer. Unrecognized answers retry until the budget
    /// runs out; running out or reaching end of input declines.
    pub fn next(self, answer: Answer, max_attempts: u32) -> Self {
        match (self, answer) {
            (ConfirmState::Asking { .. }, Answer::Yes) => ConfirmState::Accepted,
            (ConfirmState::Asking { .. }, Answer::No | Answer::EndOfInput) => ConfirmState::Declined,
            (ConfirmState::Asking { attempt }, Answer::Unrecognized) if attempt < max_attempts => {
                ConfirmState::Asking { attempt: attempt + 1 }
            }
            (ConfirmState::Asking { .. }, Answer::Unrecognized) => ConfirmState::Declined,
            (done, _) => done,
        }
    }
}

/// Interactive gate in front of an irreversible action
#[derive(Debug, Clone)]
pub struct Confirmation {
    question: String,
    max_attempts: u32,
}

impl Confirmation {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Ask until a yes/no answer, the attempt budget, or end of input
    pub fn ask(&self, input: &mut dyn BufRead, out: &mut dyn Write) -> Result<bool, CliError> {
        let mut state = ConfirmState::Asking { attempt: 1 };
        loop {
            match state {
                ConfirmState::Accepted => return Ok(true),
                ConfirmState::Declined => return Ok(false),
                ConfirmState::Asking { attempt } => {
                    if attempt > 1 {
                        writeln!(out, "Please answer yes or no.")?;
                    }
                    write!(out, "{} [y/n] ", self.question)?;
                    out.flush()?;

                    let mut line = String::new();
                    let answer = if input.read_line(&mut line)? == 0 {
                        Answer::EndOfInput
                    } else {
                        Answer::parse(&line)
                    };
                    debug!("Confirmation attempt {}: {:?}", attempt, answer);
                    state = state.next(answer, self.max_attempts);
                }
            }
        }
    }

    /// Like [`ask`](Self::ask) but a refusal becomes [`CliError::ConfirmationDeclined`]
    pub fn require(&self, input: &mut dyn BufRead, out: &mut dyn Write) -> Result<(), CliError> {
        if self.ask(input, out)? {
            Ok(())
        } else {
            Err(CliError::ConfirmationDeclined)
        }
    }
}
