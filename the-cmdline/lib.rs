//! Declarative grammars for editor command lines.
//!
//! A command declares its arguments once as a [`CommandParser`]. The same
//! declaration then parses the typed text into [`Options`], produces
//! placeholder text and completions while the user is still typing, and
//! renders options back into canonical command text.

pub mod args;
pub mod error;
pub mod options;
pub mod parser;
pub mod value;

pub use args::{
  Alternative,
  Arg,
  Bool,
  Choice,
  Hint,
  Int,
  Regex,
  Str,
  SubArgs,
  SubParser,
  VarArgs,
  identifier,
};
pub use error::{
  ArgStringError,
  ArgumentError,
  ConsumeError,
  DeclarationError,
  ParseError,
};
pub use options::Options;
pub use parser::CommandParser;
pub use value::{
  RegexFlags,
  RegexPattern,
  Value,
};
