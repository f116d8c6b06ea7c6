use inquire::{InquireError, Text};
use miette::Diagnostic;
use std::io::{BufRead, IsTerminal};
use thiserror::Error;

pub const CONFIRM_MESSAGE: &str = "Confirm continue? (y/n)";

#[derive(Debug, Error, Diagnostic)]
pub enum PromptError {
    #[error("unable to render confirmation prompt")]
    #[diagnostic(code(sprout::prompt::inquire))]
    Inquire(#[source] InquireError),

    #[error("unable to read confirmation from stdin")]
    #[diagnostic(
        code(sprout::prompt::stdin),
        help("Pipe 'y' on stdin or run from an interactive terminal")
    )]
    Stdin(#[source] std::io::Error),
}

/// Gate in front of every filesystem change: a yes/no question for the operator.
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> Result<bool, PromptError>;
}
impl<F> Confirm for F
where
    F: FnMut(&str) -> Result<bool, PromptError>,
{
    fn confirm(&mut self, message: &str) -> Result<bool, PromptError> {
        self(message)
    }
}

/// Only a lone `y` (any case) counts as consent. The line ending is dropped, any other
/// whitespace makes the answer a "no".
pub fn is_affirmative(answer: &str) -> bool {
    answer
        .trim_end_matches(['\r', '\n'])
        .eq_ignore_ascii_case("y")
}

/// Asks on the terminal through `inquire`, or reads one line from stdin when stdin is
/// piped. Interrupting the prompt or closing stdin counts as a "no".
#[derive(Debug, Default)]
pub struct TerminalConfirm;
impl Confirm for TerminalConfirm {
    fn confirm(&mut self, message: &str) -> Result<bool, PromptError> {
        let stdin = std::io::stdin();

        if stdin.is_terminal() {
            match Text::new(message).prompt() {
                Ok(answer) => Ok(is_affirmative(&answer)),
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                    log::debug!("confirmation prompt interrupted");
                    Ok(false)
                }
                Err(error) => Err(PromptError::Inquire(error)),
            }
        } else {
            println!("{}", message);

            let mut answer = String::new();
            let read = stdin
                .lock()
                .read_line(&mut answer)
                .map_err(PromptError::Stdin)?;

            if read == 0 {
                log::debug!("stdin closed before an answer was given");
            }

            Ok(is_affirmative(&answer))
        }
    }
}
