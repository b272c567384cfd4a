//! Argument types.
//!
//! Each type knows how to consume its part of a command line starting at a
//! byte offset, how to describe itself while the user is still typing
//! (placeholder text and completions), and how to render a value back into
//! text that parses to the same value.
//!
//! Arguments are separated by single spaces. An argument that finds a space
//! at its starting offset is skipped: it takes its default value and moves
//! past the space. That is how `cmd  x` leaves the first argument at its
//! default and hands `x` to the second.

mod boolean;
mod choice;
mod int;
mod pattern;
mod string;
mod sub_parser;
mod var_args;

use std::fmt;

pub use boolean::Bool;
pub use choice::{
  Alternative,
  Choice,
};
pub use int::Int;
pub use self::pattern::Regex;
pub use string::Str;
pub use sub_parser::{
  SubArgs,
  SubParser,
};
pub use var_args::VarArgs;

use crate::{
  error::{
    ArgStringError,
    ArgumentError,
    ConsumeError,
    DeclarationError,
    ParseError,
  },
  value::Value,
};

/// What an argument can tell about a command line that is still being typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hint<T> {
  /// The argument's input ends before the end of the line. The next argument
  /// starts at the given byte offset.
  Consumed(usize),
  /// The argument is the one being typed.
  Active(T),
  /// The text at this offset cannot belong to the argument.
  Invalid,
}

impl<T> Hint<T> {
  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Hint<U> {
    match self {
      Self::Consumed(index) => Hint::Consumed(index),
      Self::Active(value) => Hint::Active(f(value)),
      Self::Invalid => Hint::Invalid,
    }
  }
}

/// A single argument in a grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
  Bool(Bool),
  Int(Int),
  String(Str),
  Regex(Regex),
  Choice(Choice),
  VarArgs(VarArgs),
  SubParser(SubParser),
}

macro_rules! dispatch {
  ($self:ident, $arg:ident => $body:expr) => {
    match $self {
      Arg::Bool($arg) => $body,
      Arg::Int($arg) => $body,
      Arg::String($arg) => $body,
      Arg::Regex($arg) => $body,
      Arg::Choice($arg) => $body,
      Arg::VarArgs($arg) => $body,
      Arg::SubParser($arg) => $body,
    }
  };
}

impl Arg {
  /// Key under which the parsed value is stored in [`crate::Options`].
  pub fn name(&self) -> &str {
    dispatch!(self, arg => arg.name.as_str())
  }

  pub fn default(&self) -> &Value {
    dispatch!(self, arg => &arg.default)
  }

  /// Consumes input at `index`, returning the value and the offset where
  /// the next argument starts.
  pub fn consume(&self, text: &str, index: usize) -> Result<(Value, usize), ConsumeError> {
    dispatch!(self, arg => arg.consume(text, index)).map_err(|rejection| {
      match rejection {
        Rejection::Token {
          message,
          start,
          end,
        } => ParseError::new(message, self.clone(), start, end).into(),
        Rejection::Nested(err) => err.into(),
      }
    })
  }

  /// Placeholder text to show after the cursor when the line ends inside
  /// this argument.
  pub fn placeholder(&self, text: &str, index: usize) -> Hint<String> {
    dispatch!(self, arg => arg.placeholder(text, index))
  }

  pub fn completions(&self, text: &str, index: usize) -> Hint<Vec<String>> {
    dispatch!(self, arg => arg.completions(text, index))
  }

  /// Placeholder shown for this argument when nothing has been typed for it.
  pub fn default_placeholder(&self) -> String {
    dispatch!(self, arg => arg.default_placeholder())
  }

  /// Renders `value` as text that parses back to `value`. The default value
  /// renders as an empty string.
  pub fn arg_string(&self, value: &Value) -> Result<String, ArgStringError> {
    dispatch!(self, arg => arg.arg_string(value))
  }

  /// Renders `value` as one fragment of a line. `last` is false when
  /// non-empty text follows it.
  pub(crate) fn fragment(&self, value: &Value, last: bool) -> Result<String, ArgStringError> {
    match self {
      Arg::Regex(arg) => arg.fragment(value, last),
      Arg::SubParser(arg) => arg.fragment(value, last),
      _ => self.arg_string(value),
    }
  }

  pub(crate) fn validate(&self) -> Result<(), DeclarationError> {
    identifier(self.name())?;
    match self {
      Arg::Choice(choice) => choice.validate(),
      Arg::Bool(arg) => arg.validate(),
      Arg::SubParser(arg) => arg.validate(),
      _ => Ok(()),
    }
  }
}

impl fmt::Display for Arg {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    dispatch!(self, arg => f.write_str(&arg.label))
  }
}

macro_rules! impl_from {
  ($($variant:ident($ty:ty)),* $(,)?) => {
    $(
      impl From<$ty> for Arg {
        fn from(arg: $ty) -> Self {
          Arg::$variant(arg)
        }
      }
    )*
  };
}

impl_from!(
  Bool(Bool),
  Int(Int),
  String(Str),
  Regex(Regex),
  Choice(Choice),
  VarArgs(VarArgs),
  SubParser(SubParser),
);

/// Validates an option name: ASCII letters and underscores, with `-`
/// accepted as a spelling of `_`.
pub fn identifier(name: &str) -> Result<String, DeclarationError> {
  let ident = name.replace('-', "_");
  if ident.is_empty() || !ident.chars().all(|ch| ch.is_ascii_alphabetic() || ch == '_') {
    return Err(DeclarationError::InvalidName {
      name: name.to_string(),
    });
  }
  Ok(ident)
}

/// Splits a space-separated list of names.
pub(crate) fn words(names: &str) -> Vec<String> {
  names.split_whitespace().map(str::to_string).collect()
}

pub(crate) fn invalid_value(name: &str, value: &Value) -> ArgStringError {
  ArgStringError::InvalidValue {
    name:  name.to_string(),
    value: value.to_string(),
  }
}

/// Why an argument rejected its input, before it is tagged with the
/// argument itself.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Rejection {
  Token {
    message: String,
    start:   usize,
    end:     usize,
  },
  Nested(ArgumentError),
}

impl Rejection {
  pub(crate) fn token(message: impl Into<String>, start: usize, end: usize) -> Self {
    Self::Token {
      message: message.into(),
      start,
      end,
    }
  }
}

/// What sits at a cursor position in a space-delimited command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
  /// The cursor is at or past the end of the line.
  End,
  /// The cursor is on a space.
  Skip,
  /// A run of non-space characters.
  ///
  /// `end` is the offset after the word and its trailing space. `complete`
  /// tells whether that trailing space was present.
  Word {
    text:     &'a str,
    start:    usize,
    end:      usize,
    complete: bool,
  },
}

pub(crate) fn token(text: &str, index: usize) -> Token<'_> {
  let Some(rest) = text.get(index..).filter(|rest| !rest.is_empty()) else {
    return Token::End;
  };
  if rest.starts_with(' ') {
    return Token::Skip;
  }
  match rest.find(' ') {
    Some(len) => {
      Token::Word {
        text:     &rest[..len],
        start:    index,
        end:      index + len + 1,
        complete: true,
      }
    },
    None => {
      Token::Word {
        text:     rest,
        start:    index,
        end:      text.len(),
        complete: false,
      }
    },
  }
}

/// Consumes one space-delimited token and converts it with `convert`.
pub(crate) fn consume_token(
  text: &str,
  index: usize,
  default: &Value,
  convert: impl FnOnce(&str) -> Result<Value, String>,
) -> Result<(Value, usize), Rejection> {
  match token(text, index) {
    Token::End => Ok((default.clone(), index)),
    Token::Skip => Ok((default.clone(), index + 1)),
    Token::Word {
      text: word,
      start,
      end,
      ..
    } => {
      convert(word)
        .map(|value| (value, end))
        .map_err(|message| Rejection::token(message, start, end))
    },
  }
}

/// Outcome of matching a typed word against named alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Lookup<'a> {
  /// Some alias equals the word.
  Exact(usize),
  /// Exactly one alternative has an alias starting with the word. The alias
  /// is the first such alias of that alternative.
  Unique(usize, &'a str),
  /// Several alternatives have an alias starting with the word, in
  /// declaration order.
  Ambiguous(Vec<usize>),
  NoMatch,
}

/// Matches `word` against `(alternative, alias)` pairs.
///
/// Exact matches win, earliest pair first. Otherwise the alternatives with a
/// prefix-matching alias decide.
pub(crate) fn lookup<'a>(word: &str, aliases: &[(usize, &'a str)]) -> Lookup<'a> {
  if let Some((alternative, _)) = aliases.iter().find(|(_, alias)| *alias == word) {
    return Lookup::Exact(*alternative);
  }
  let mut matches: Vec<(usize, &'a str)> = Vec::new();
  for (alternative, alias) in aliases {
    if alias.starts_with(word) && !matches.iter().any(|(seen, _)| seen == alternative) {
      matches.push((*alternative, alias));
    }
  }
  match matches.as_slice() {
    [] => Lookup::NoMatch,
    [(alternative, alias)] => Lookup::Unique(*alternative, alias),
    _ => Lookup::Ambiguous(matches.iter().map(|(alternative, _)| *alternative).collect()),
  }
}

/// `head` followed by the placeholders of the arguments after it.
pub(crate) fn join_placeholder(head: &str, rest: &str) -> String {
  if rest.is_empty() {
    head.to_string()
  } else {
    format!("{head} {rest}")
  }
}
