//! ui::prompts
//!
//! The operator port: how workflows ask a human something.
//!
//! # Design
//!
//! Workflows never read stdin themselves. They receive an [`Operator`] and
//! call [`Operator::ask`]. The CLI passes a [`TerminalOperator`]; tests pass
//! a [`ScriptedOperator`] with the answers a human would type.
//!
//! Running out of input (end of file, or an exhausted script) is
//! [`PromptError::Cancelled`], never a silent default.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled: no more input")]
    Cancelled,

    #[error("IO error: {0}")]
    IoError(String),
}

/// Something that can answer questions.
pub trait Operator {
    /// Show `question` and return the answer line without its newline.
    fn ask(&mut self, question: &str) -> Result<String, PromptError>;
}

/// Ask a yes/no question. Only `y`/`yes` (any case) count as yes.
pub fn confirm(operator: &mut dyn Operator, question: &str) -> Result<bool, PromptError> {
    let answer = operator.ask(&format!("{} (y/n) ", question))?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Wait until the operator presses Enter.
pub fn wait_for_enter(operator: &mut dyn Operator, message: &str) -> Result<(), PromptError> {
    operator.ask(message).map(|_| ())
}

/// Ask for a 1-based choice among `count` options.
///
/// Returns the zero-based index, or `None` if the answer is not a number
/// in range.
pub fn select_index(
    operator: &mut dyn Operator,
    question: &str,
    count: usize,
) -> Result<Option<usize>, PromptError> {
    let answer = operator.ask(question)?;
    Ok(answer
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=count).contains(n))
        .map(|n| n - 1))
}

/// Reads answers from a line-based input and writes questions to an output.
#[derive(Debug)]
pub struct TerminalOperator<R, W> {
    input: R,
    output: W,
}

impl TerminalOperator<io::StdinLock<'static>, io::Stdout> {
    /// An operator on the process's stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Operator for TerminalOperator<R, W> {
    fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        write!(self.output, "{}", question).map_err(|e| PromptError::IoError(e.to_string()))?;
        self.output
            .flush()
            .map_err(|e| PromptError::IoError(e.to_string()))?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| PromptError::IoError(e.to_string()))?;
        if read == 0 {
            return Err(PromptError::Cancelled);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Answers from a fixed script, recording every question asked.
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedOperator {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Every question asked so far, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Operator for ScriptedOperator {
    fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        self.asked.push(question.to_string());
        self.answers.pop_front().ok_or(PromptError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_accepts_only_yes() {
        let mut op = ScriptedOperator::new(["y", "YES", " n ", "", "maybe"]);
        assert!(confirm(&mut op, "go?").unwrap());
        assert!(confirm(&mut op, "go?").unwrap());
        assert!(!confirm(&mut op, "go?").unwrap());
        assert!(!confirm(&mut op, "go?").unwrap());
        assert!(!confirm(&mut op, "go?").unwrap());
        assert_eq!(op.asked()[0], "go? (y/n) ");
    }

    #[test]
    fn select_index_is_one_based() {
        let mut op = ScriptedOperator::new(["2", "0", "4", "x"]);
        assert_eq!(select_index(&mut op, "pick: ", 3).unwrap(), Some(1));
        assert_eq!(select_index(&mut op, "pick: ", 3).unwrap(), None);
        assert_eq!(select_index(&mut op, "pick: ", 3).unwrap(), None);
        assert_eq!(select_index(&mut op, "pick: ", 3).unwrap(), None);
    }

    #[test]
    fn exhausted_script_cancels() {
        let mut op = ScriptedOperator::new(Vec::<String>::new());
        assert!(matches!(op.ask("?"), Err(PromptError::Cancelled)));
    }

    #[test]
    fn terminal_reads_lines_and_writes_questions() {
        let input = io::Cursor::new(b"first\r\nsecond\n".to_vec());
        let mut output = Vec::new();
        {
            let mut op = TerminalOperator::new(input, &mut output);
            assert_eq!(op.ask("a? ").unwrap(), "first");
            assert_eq!(op.ask("b? ").unwrap(), "second");
            assert!(matches!(op.ask("c? "), Err(PromptError::Cancelled)));
        }
        assert_eq!(String::from_utf8(output).unwrap(), "a? b? c? ");
    }
}
