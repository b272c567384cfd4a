use thiserror::Error;

use crate::{
  args::Arg,
  options::Options,
};

/// A single argument rejected its part of the command line.
///
/// `start..end` is the byte span of the offending input. `end` includes the
/// delimiting space when there was one.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ParseError {
  pub message: String,
  pub arg:     Arg,
  pub start:   usize,
  pub end:     usize,
}

impl ParseError {
  pub fn new(message: impl Into<String>, arg: Arg, start: usize, end: usize) -> Self {
    Self {
      message: message.into(),
      arg,
      start,
      end,
    }
  }
}

/// Parsing a whole command line failed.
///
/// `options` holds what could be parsed (defaults elsewhere), `errors` the
/// per-argument failures left standing, and `index` the byte offset where
/// parsing stopped.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ArgumentError {
  pub message: String,
  pub options: Options,
  pub errors:  Vec<ParseError>,
  pub index:   usize,
}

impl ArgumentError {
  pub(crate) fn invalid(text: &str, options: Options, errors: Vec<ParseError>, index: usize) -> Self {
    let mut message = format!("invalid arguments: {text}");
    for err in &errors {
      message.push('\n');
      message.push_str(&err.message);
    }
    Self {
      message,
      options,
      errors,
      index,
    }
  }

  pub(crate) fn unexpected(text: &str, options: Options, index: usize) -> Self {
    Self {
      message: format!("unexpected argument(s): {}", &text[index..]),
      options,
      errors: Vec::new(),
      index,
    }
  }
}

/// Result of a single argument consuming input: either its own rejection or
/// the failure of a nested sub-grammar.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConsumeError {
  #[error(transparent)]
  Parse(#[from] ParseError),
  #[error(transparent)]
  Arguments(#[from] ArgumentError),
}

/// Options could not be rendered back into command text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgStringError {
  #[error("missing option: {name}")]
  MissingOption { name: String },
  #[error("invalid value: {name}={value}")]
  InvalidValue { name: String, value: String },
}

/// A grammar was declared inconsistently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
  #[error("invalid argument name '{name}'")]
  InvalidName { name: String },
  #[error("duplicate argument name '{name}'")]
  DuplicateName { name: String },
  #[error("'{name}' declares no alternatives")]
  NoAlternatives { name: String },
  #[error("'{name}' declares '{sub}' more than once")]
  DuplicateSubArgs { name: String, sub: String },
  #[error("'{name}' declares a sub-command with an invalid name '{sub}'")]
  InvalidSubArgs { name: String, sub: String },
}
