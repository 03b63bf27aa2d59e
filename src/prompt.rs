//! Overwrite confirmation

use std::io::{BufRead, IsTerminal};

use inquire::Confirm;

use crate::error::{Result, VersoError};

/// Asks the user whether to continue
pub trait Confirmation {
    fn confirm(&self, message: &str) -> Result<bool>;
}

/// Confirmation read from the controlling terminal, or from stdin when it
/// is not a terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirmation;

impl Confirmation for TerminalConfirmation {
    fn confirm(&self, message: &str) -> Result<bool> {
        if std::io::stdin().is_terminal() {
            return Confirm::new(message)
                .with_default(false)
                .with_parser(&|answer| Ok(is_yes(answer)))
                .with_help_message("Answer 'y' to reinstall over it")
                .prompt()
                .map_err(VersoError::from);
        }

        eprint!("{message} (y/N) ");
        let mut answer = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut answer)
            .map_err(|e| VersoError::PromptFailed {
                reason: e.to_string(),
            })?;
        Ok(is_yes(&answer))
    }
}

/// Whether an answer counts as consent
pub fn is_yes(answer: &str) -> bool {
    answer
        .trim_start()
        .chars()
        .next()
        .is_some_and(|c| c.eq_ignore_ascii_case(&'y'))
}
