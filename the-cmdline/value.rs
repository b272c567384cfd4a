//! Typed values produced by argument types.
//!
//! Every argument type converts its slice of the command line into a
//! [`Value`]. Values are plain data: they compare by content, clone cheaply
//! enough for option bags, and render back to canonical text through the
//! argument type that produced them (see [`crate::Arg::arg_string`]).

use std::{
  fmt,
  sync::Arc,
};

use bitflags::bitflags;

use crate::{
  args::SubArgs,
  options::Options,
};

bitflags! {
  /// Flags attached to a [`RegexPattern`].
  ///
  /// On the command line they are spelled as single letters after the
  /// closing delimiter (`/abc/is`). Letters are case-insensitive.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
  pub struct RegexFlags: u8 {
    const IGNORE_CASE = 1 << 0;
    const MULTILINE   = 1 << 1;
    const DOT_ALL     = 1 << 2;
    const UNICODE     = 1 << 3;
  }
}

impl RegexFlags {
  /// Flag letters in canonical output order.
  pub const LETTERS: [(char, Self); 4] = [
    ('i', Self::IGNORE_CASE),
    ('m', Self::MULTILINE),
    ('s', Self::DOT_ALL),
    ('u', Self::UNICODE),
  ];

  pub fn from_char(ch: char) -> Option<Self> {
    let ch = ch.to_ascii_lowercase();
    Self::LETTERS
      .iter()
      .find(|(letter, _)| *letter == ch)
      .map(|(_, flag)| *flag)
  }

  /// Letters for every flag in `self` that is not already part of `base`.
  pub fn letters_beyond(self, base: Self) -> String {
    Self::LETTERS
      .iter()
      .filter(|(_, flag)| self.contains(*flag) && !base.contains(*flag))
      .map(|(letter, _)| *letter)
      .collect()
  }
}

impl Default for RegexFlags {
  fn default() -> Self {
    Self::MULTILINE | Self::UNICODE
  }
}

/// The raw text of a search pattern together with its flags.
///
/// Patterns are kept uncompiled so that half-typed input such as `/(` is
/// still a value the command bar can hold on to. Use
/// [`RegexPattern::compile`] once the command actually runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegexPattern {
  pub pattern: String,
  pub flags:   RegexFlags,
}

impl RegexPattern {
  pub fn new(pattern: impl Into<String>) -> Self {
    Self {
      pattern: pattern.into(),
      flags:   RegexFlags::default(),
    }
  }

  /// Adds `flags` on top of the default multiline + unicode set.
  pub fn with_flags(mut self, flags: RegexFlags) -> Self {
    self.flags |= flags;
    self
  }

  pub fn ignore_case(&self) -> bool {
    self.flags.contains(RegexFlags::IGNORE_CASE)
  }

  pub fn compile(&self) -> Result<regex::Regex, regex::Error> {
    regex::RegexBuilder::new(&self.pattern)
      .case_insensitive(self.flags.contains(RegexFlags::IGNORE_CASE))
      .multi_line(self.flags.contains(RegexFlags::MULTILINE))
      .dot_matches_new_line(self.flags.contains(RegexFlags::DOT_ALL))
      .unicode(self.flags.contains(RegexFlags::UNICODE))
      .build()
  }
}

impl fmt::Display for RegexPattern {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "/{}/{}",
      self.pattern,
      self.flags.letters_beyond(RegexFlags::default())
    )
  }
}

/// A parsed argument value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
  /// No value; the usual default of an omitted argument.
  #[default]
  None,
  Bool(bool),
  Int(i64),
  Str(String),
  Regex(RegexPattern),
  /// A search pattern paired with its replacement text.
  ///
  /// `replacement` is `None` when the line ended before the pattern was
  /// closed, so there was no place to type a replacement yet.
  Replace {
    pattern:     Option<RegexPattern>,
    replacement: Option<String>,
  },
  /// The sub-grammar selected by a sub-parser and the options it parsed.
  Sub {
    args:    Arc<SubArgs>,
    options: Options,
  },
}

impl Value {
  pub fn replace(pattern: RegexPattern, replacement: impl Into<String>) -> Self {
    Self::Replace {
      pattern:     Some(pattern),
      replacement: Some(replacement.into()),
    }
  }

  pub fn sub(args: Arc<SubArgs>, options: Options) -> Self {
    Self::Sub { args, options }
  }

  pub fn is_none(&self) -> bool {
    matches!(self, Self::None)
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Self::Bool(value) => Some(*value),
      _ => None,
    }
  }

  pub fn as_int(&self) -> Option<i64> {
    match self {
      Self::Int(value) => Some(*value),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::Str(value) => Some(value),
      _ => None,
    }
  }

  pub fn as_regex(&self) -> Option<&RegexPattern> {
    match self {
      Self::Regex(pattern) => Some(pattern),
      _ => None,
    }
  }

  pub fn as_replace(&self) -> Option<(Option<&RegexPattern>, Option<&str>)> {
    match self {
      Self::Replace {
        pattern,
        replacement,
      } => Some((pattern.as_ref(), replacement.as_deref())),
      _ => None,
    }
  }

  pub fn as_sub(&self) -> Option<(&SubArgs, &Options)> {
    match self {
      Self::Sub { args, options } => Some((args, options)),
      _ => None,
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::None => f.write_str("none"),
      Self::Bool(value) => write!(f, "{value}"),
      Self::Int(value) => write!(f, "{value}"),
      Self::Str(value) => write!(f, "{value:?}"),
      Self::Regex(pattern) => write!(f, "{pattern}"),
      Self::Replace {
        pattern,
        replacement,
      } => {
        match pattern {
          Some(pattern) => write!(f, "({pattern}, ")?,
          None => f.write_str("(none, ")?,
        }
        match replacement {
          Some(replacement) => write!(f, "{replacement:?})"),
          None => f.write_str("none)"),
        }
      },
      Self::Sub { args, options } => write!(f, "{} {options}", args.name()),
    }
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Self::Bool(value)
  }
}

impl From<i64> for Value {
  fn from(value: i64) -> Self {
    Self::Int(value)
  }
}

impl From<i32> for Value {
  fn from(value: i32) -> Self {
    Self::Int(value.into())
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Self::Str(value.to_string())
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Self::Str(value)
  }
}

impl From<RegexPattern> for Value {
  fn from(value: RegexPattern) -> Self {
    Self::Regex(value)
  }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(value: Option<T>) -> Self {
    value.map_or(Self::None, Into::into)
  }
}
