//! Prompt/response loop around [`translate`].
//!
//! The session is a small state machine:
//! `AwaitingInput -> Translating -> Reporting -> AwaitingContinueDecision`,
//! looping back to `AwaitingInput` until the user answers `n`, which moves it
//! to `Terminated`. Closed input at any prompt also terminates.

use std::io::{self, BufRead, Write};

use log::debug;

use crate::{translate, CodeTable};

const GREETING: &str = "Welcome to the Morse code converter.";
const INPUT_PROMPT: &str = "Please enter the text to convert:";
const EMPTY_INPUT: &str = "Please enter some text.";
const RESULT_PREFIX: &str = "Your input in morse code: ";
const NOTHING_CONVERTED: &str = "The input did not contain any convertible character.";
const CONTINUE_PROMPT: &str = "Do you want to convert something else? (y/n)";
const FAREWELL: &str = "Goodbye.";
const CURSOR: &str = "> ";

#[derive(Debug)]
enum State {
    AwaitingInput,
    Translating(String),
    Reporting(String),
    AwaitingContinueDecision,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Number of texts that went through translation.
    pub conversions: usize,
}

pub struct Session<'a, R, W> {
    table: &'a CodeTable,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(table: &'a CodeTable, input: R, output: W) -> Self {
        Session {
            table,
            input,
            output,
        }
    }

    pub fn run(mut self) -> io::Result<SessionSummary> {
        writeln!(self.output, "{GREETING}\n")?;

        let mut conversions = 0;
        let mut state = State::AwaitingInput;

        loop {
            debug!("session state: {:?}", state);
            state = match state {
                State::AwaitingInput => match self.read_text()? {
                    Some(text) => State::Translating(text),
                    None => State::Terminated,
                },
                State::Translating(text) => {
                    State::Reporting(translate(&text.to_lowercase(), self.table))
                }
                State::Reporting(encoded) => {
                    if encoded.is_empty() {
                        writeln!(self.output, "{NOTHING_CONVERTED}")?;
                    } else {
                        writeln!(self.output, "{RESULT_PREFIX}{encoded}")?;
                    }
                    conversions += 1;
                    State::AwaitingContinueDecision
                }
                State::AwaitingContinueDecision => {
                    writeln!(self.output, "{CONTINUE_PROMPT}")?;
                    match self.prompt()? {
                        Some(answer) if answer.to_lowercase() != "n" => State::AwaitingInput,
                        _ => State::Terminated,
                    }
                }
                State::Terminated => {
                    writeln!(self.output, "{FAREWELL}")?;
                    self.output.flush()?;
                    break;
                }
            };
        }

        Ok(SessionSummary { conversions })
    }

    /// Asks until a non-empty line arrives. `None` means input was closed.
    fn read_text(&mut self) -> io::Result<Option<String>> {
        loop {
            writeln!(self.output, "{INPUT_PROMPT}")?;
            match self.prompt()? {
                Some(text) if text.is_empty() => writeln!(self.output, "{EMPTY_INPUT}")?,
                other => return Ok(other),
            }
        }
    }

    fn prompt(&mut self) -> io::Result<Option<String>> {
        write!(self.output, "{CURSOR}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}
