//! Parsing of interactive input lines.

use std::path::PathBuf;

use pqa_core::{CycleOutcome, Interaction};
use pqa_model::QueryParams;
use thiserror::Error;

/// Longest question accepted from the search bar, in characters.
pub const MAX_QUESTION_CHARS: usize = 100;

pub const HELP: &str = "\
Type a question and press Enter to search.
  :run            run the current question again
  :random         pick a random example question
  :clear          empty the search bar
  :reader N       max. number of answers (1-10)
  :retriever N    max. number of documents from the retriever
  :upload PATH..  upload documents to the store
  :raw            show or hide the raw backend response
  :help           show this help
  :quit           leave";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    /// New search bar text.
    Question(String),
    /// Empty line; re-render without changing anything.
    Refresh,
    /// Empty the search bar.
    Clear,
    Run,
    Random,
    Reader(u32),
    Retriever(u32),
    Upload(Vec<PathBuf>),
    ToggleRaw,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command ':{0}' (try :help)")]
    UnknownCommand(String),

    #[error(":{command} expects a number, got '{value}'")]
    InvalidNumber { command: &'static str, value: String },

    #[error(":{0} needs an argument")]
    MissingArgument(&'static str),
}

pub fn parse_line(line: &str) -> Result<InputCommand, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(InputCommand::Refresh);
    }
    let Some(command) = line.strip_prefix(':') else {
        return Ok(InputCommand::Question(truncate_question(line)));
    };
    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default();
    match name {
        "run" | "r" => Ok(InputCommand::Run),
        "random" => Ok(InputCommand::Random),
        "clear" => Ok(InputCommand::Clear),
        "reader" => parse_number("reader", words.next()).map(InputCommand::Reader),
        "retriever" => parse_number("retriever", words.next()).map(InputCommand::Retriever),
        "upload" => {
            let paths: Vec<PathBuf> = words.map(PathBuf::from).collect();
            if paths.is_empty() {
                Err(InputError::MissingArgument("upload"))
            } else {
                Ok(InputCommand::Upload(paths))
            }
        }
        "raw" => Ok(InputCommand::ToggleRaw),
        "help" | "h" | "?" => Ok(InputCommand::Help),
        "quit" | "q" | "exit" => Ok(InputCommand::Quit),
        other => Err(InputError::UnknownCommand(other.to_string())),
    }
}

fn parse_number(command: &'static str, value: Option<&str>) -> Result<u32, InputError> {
    let value = value.ok_or(InputError::MissingArgument(command))?;
    value.parse().map_err(|_| InputError::InvalidNumber {
        command,
        value: value.to_string(),
    })
}

fn truncate_question(text: &str) -> String {
    text.chars().take(MAX_QUESTION_CHARS).collect()
}

/// Text in the search bar.
///
/// A session only stores a question once it has been run, so text typed
/// while the backend is unavailable is held here until it runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchBar {
    text: String,
}

impl SearchBar {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Interaction carrying the current text and slider values.
    pub fn interaction(&self, params: QueryParams) -> Interaction {
        Interaction::new(self.text.clone(), params)
    }

    /// Takes over the session question after a random stage or a query.
    pub fn sync(&mut self, interaction: &Interaction, outcome: &CycleOutcome) {
        if interaction.random || outcome.query_attempted {
            self.text.clone_from(&outcome.state.question);
        }
    }
}
