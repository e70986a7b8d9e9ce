//! Terminal implementation of the interactive prompt

use std::io::{self, BufRead, Write};

use crate::app::Prompt;
use crate::errors::{PromptError, PromptResult};

/// Reads answers from stdin, printing each question to stdout
#[derive(Debug, Default)]
pub struct ConsolePrompt;

impl ConsolePrompt {
    pub fn new() -> Self {
        Self
    }
}

impl Prompt for ConsolePrompt {
    fn ask(&mut self, question: &str) -> PromptResult<String> {
        print!("{}", question);
        io::stdout().flush()?;

        let mut input = String::new();
        let read = io::stdin().lock().read_line(&mut input)?;
        if read == 0 {
            return Err(PromptError::InputClosed {
                question: question.trim().to_string(),
            });
        }

        Ok(input.trim().to_string())
    }
}
