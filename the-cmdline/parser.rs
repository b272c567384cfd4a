//! Grammar-driven command line parsing.
//!
//! A [`CommandParser`] is an ordered list of [`Arg`]s. Parsing walks the
//! arguments left to right over a single cursor. When an argument rejects
//! the text at the cursor the error is recorded and the next argument gets a
//! try at the same position, so optional arguments can be left out without
//! any extra syntax:
//!
//! ```text
//! parser: Choice(selection all) Choice(forward reverse)
//!
//! "rev"        -> selection=selection, forward=reverse
//! "all rev"    -> selection=all, forward=reverse
//! "rev all"    -> error: unexpected argument(s): all
//! ```
//!
//! Errors recorded while the cursor is stuck are dropped as soon as a later
//! argument moves it forward. A sub-grammar that was selected by name but
//! failed inside keeps its errors, and parsing resumes after them.
//!
//! The same walk drives placeholders and completions for a line that is
//! still being typed.

use std::collections::HashSet;

use crate::{
  args::{
    Arg,
    Hint,
    VarArgs,
    join_placeholder,
  },
  error::{
    ArgStringError,
    ArgumentError,
    ConsumeError,
    DeclarationError,
  },
  options::Options,
};

#[derive(Debug, Clone, PartialEq)]
pub struct CommandParser {
  args: Vec<Arg>,
}

/// Where a hint walk over the arguments ended.
enum Walk<T> {
  /// The argument at `position` is being typed.
  Active { hint: T, position: usize },
  /// Every argument was consumed or skipped. The cursor ended here.
  Consumed(usize),
  /// The cursor got stuck on text no remaining argument accepts.
  Invalid,
}

impl Default for CommandParser {
  /// A grammar that takes the rest of the line as `args`.
  fn default() -> Self {
    Self {
      args: vec![VarArgs::new("args").into()],
    }
  }
}

impl CommandParser {
  /// Builds a parser, checking that argument names are valid identifiers
  /// and unique.
  pub fn new(args: impl IntoIterator<Item = Arg>) -> Result<Self, DeclarationError> {
    let args: Vec<Arg> = args.into_iter().collect();
    let mut seen = HashSet::new();
    for arg in &args {
      arg.validate()?;
      if !seen.insert(arg.name()) {
        return Err(DeclarationError::DuplicateName {
          name: arg.name().to_string(),
        });
      }
    }
    Ok(Self { args })
  }

  pub fn args(&self) -> &[Arg] {
    &self.args
  }

  /// Every argument name mapped to its default value.
  pub fn default_options(&self) -> Options {
    self
      .args
      .iter()
      .map(|arg| (arg.name(), arg.default().clone()))
      .collect()
  }

  /// Parses a complete command line. Text left over after the last argument
  /// is an error.
  pub fn parse(&self, text: &str) -> Result<Options, ArgumentError> {
    let (options, index) = self.parse_from(text, 0)?;
    if index < text.len() {
      return Err(ArgumentError::unexpected(text, options, index));
    }
    Ok(options)
  }

  /// Parses from `index`, returning the options and the offset where
  /// parsing stopped. Trailing text is left for the caller.
  pub fn parse_from(&self, text: &str, index: usize) -> Result<(Options, usize), ArgumentError> {
    let mut options = self.default_options();
    let mut errors = Vec::new();
    // Errors before this point came from a selected sub-grammar and stay.
    let mut committed = 0;
    let mut index = index;
    for arg in &self.args {
      match arg.consume(text, index) {
        Ok((value, next)) => {
          if next > index {
            errors.truncate(committed);
          }
          options.set(arg.name(), value);
          index = next;
        },
        Err(ConsumeError::Parse(err)) => errors.push(err),
        Err(ConsumeError::Arguments(err)) => {
          index = err
            .errors
            .iter()
            .map(|inner| inner.end)
            .fold(err.index.max(index), usize::max);
          errors.extend(err.errors);
          committed = errors.len();
        },
      }
    }
    if errors.is_empty() {
      Ok((options, index))
    } else {
      Err(ArgumentError::invalid(text, options, errors, index))
    }
  }

  fn walk<T>(&self, text: &str, index: usize, probe: impl Fn(&Arg, &str, usize) -> Hint<T>) -> Walk<T> {
    let mut index = index;
    let mut stuck = false;
    for (position, arg) in self.args.iter().enumerate() {
      match probe(arg, text, index) {
        Hint::Consumed(next) => {
          index = next;
          stuck = false;
        },
        Hint::Active(hint) => return Walk::Active { hint, position },
        Hint::Invalid => stuck = true,
      }
    }
    if stuck {
      Walk::Invalid
    } else {
      Walk::Consumed(index)
    }
  }

  /// Default placeholders of the arguments from `position` on, space
  /// separated.
  pub(crate) fn default_placeholders(&self, position: usize) -> String {
    self
      .args
      .iter()
      .skip(position)
      .map(Arg::default_placeholder)
      .collect::<Vec<_>>()
      .join(" ")
  }

  pub(crate) fn placeholder_from(&self, text: &str, index: usize) -> Hint<String> {
    match self.walk(text, index, Arg::placeholder) {
      Walk::Active { hint, position } => {
        Hint::Active(join_placeholder(&hint, &self.default_placeholders(position + 1)))
      },
      Walk::Consumed(index) => Hint::Consumed(index),
      Walk::Invalid => Hint::Invalid,
    }
  }

  pub(crate) fn completions_from(&self, text: &str, index: usize) -> Hint<Vec<String>> {
    match self.walk(text, index, Arg::completions) {
      Walk::Active { hint, .. } => Hint::Active(hint),
      Walk::Consumed(index) => Hint::Consumed(index),
      Walk::Invalid => Hint::Invalid,
    }
  }

  /// Text to show after the cursor: the rest of the word being typed and the
  /// placeholders of the arguments after it.
  ///
  /// `None` when the line cannot be parsed at the cursor or has text after
  /// the last argument.
  pub fn get_placeholder(&self, text: &str) -> Option<String> {
    match self.placeholder_from(text, 0) {
      Hint::Active(placeholder) => Some(placeholder),
      Hint::Consumed(index) if index >= text.len() => Some(String::new()),
      _ => None,
    }
  }

  /// Candidates for the word being typed. `None` when no argument is being
  /// typed at the end of the line.
  pub fn get_completions(&self, text: &str) -> Option<Vec<String>> {
    match self.completions_from(text, 0) {
      Hint::Active(words) => Some(words),
      _ => None,
    }
  }

  /// Renders each argument's value, last argument first, so that every
  /// fragment knows whether non-empty text follows it. `last` tells whether
  /// anything follows the whole grammar.
  pub(crate) fn arg_fragments(&self, options: &Options, last: bool) -> Result<Vec<String>, ArgStringError> {
    let values = self
      .args
      .iter()
      .map(|arg| {
        options
          .get(arg.name())
          .map(|value| (arg, value))
          .ok_or_else(|| ArgStringError::MissingOption {
            name: arg.name().to_string(),
          })
      })
      .collect::<Result<Vec<_>, _>>()?;
    let mut last = last;
    let mut fragments = Vec::with_capacity(values.len());
    for (arg, value) in values.into_iter().rev() {
      let fragment = arg.fragment(value, last)?;
      last &= fragment.is_empty();
      fragments.push(fragment);
    }
    fragments.reverse();
    Ok(fragments)
  }

  /// Renders options as the shortest command text that parses back to
  /// them. Arguments at their default render as nothing.
  pub fn arg_string(&self, options: &Options) -> Result<String, ArgStringError> {
    let mut fragments = self.arg_fragments(options, true)?;
    while fragments.last().is_some_and(String::is_empty) {
      fragments.pop();
    }
    Ok(fragments.join(" "))
  }
}
