use std::fmt;

use the_cmdline::{
  ArgStringError,
  ArgumentError,
  CommandParser,
  Options,
};
use thiserror::Error;

pub type CommandFn<Ctx> = fn(&mut Ctx, &Options) -> CommandResult;

/// A successful command may leave a message for the command bar.
pub type CommandResult = Result<Option<String>, CommandError>;

/// Failures shown in the command bar without further detail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
  #[error(transparent)]
  Arguments(#[from] ArgumentError),
  #[error(transparent)]
  Render(#[from] ArgStringError),
  #[error("unknown command: {0}")]
  Unknown(String),
  #[error("{0}")]
  Failed(String),
}

impl CommandError {
  pub fn new(message: impl Into<String>) -> Self {
    Self::Failed(message.into())
  }
}

/// A command that can be typed in the command bar.
#[derive(Clone)]
pub struct TextCommand<Ctx> {
  /// Every name the command answers to. The first one is canonical.
  pub names:                  Vec<String>,
  /// Menu title; commands without one stay out of menus.
  pub title:                  Option<String>,
  pub parser:                 CommandParser,
  /// Also try this command when the typed text starts with no known
  /// command name.
  pub lookup_with_arg_parser: bool,
  pub fun:                    CommandFn<Ctx>,
}

impl<Ctx> TextCommand<Ctx> {
  /// `names` is space separated; the first one is canonical.
  pub fn new(names: &str, fun: CommandFn<Ctx>) -> Self {
    Self {
      names: names.split_whitespace().map(str::to_string).collect(),
      title: None,
      parser: CommandParser::default(),
      lookup_with_arg_parser: false,
      fun,
    }
  }

  pub fn with_parser(mut self, parser: CommandParser) -> Self {
    self.parser = parser;
    self
  }

  pub fn with_title(mut self, title: &str) -> Self {
    self.title = Some(title.to_string());
    self
  }

  pub fn lookup_with_arg_parser(mut self) -> Self {
    self.lookup_with_arg_parser = true;
    self
  }

  pub fn name(&self) -> &str {
    self.names.first().map_or("", String::as_str)
  }

  /// Parses arguments, ignoring a leading command name.
  pub fn parse(&self, text: &str) -> Result<Options, ArgumentError> {
    let args = self
      .names
      .iter()
      .find_map(|name| {
        text
          .strip_prefix(name.as_str())
          .and_then(|rest| rest.strip_prefix(' '))
      })
      .unwrap_or(text);
    self.parser.parse(args)
  }

  /// Canonical command text for `options`.
  ///
  /// The command name is left out for commands looked up by their parser,
  /// unless nothing else would be left.
  pub fn arg_string(&self, options: &Options) -> Result<String, ArgStringError> {
    let args = self.parser.arg_string(options)?;
    Ok(match (args.is_empty(), self.lookup_with_arg_parser) {
      (true, _) => self.name().to_string(),
      (false, true) => args,
      (false, false) => format!("{} {args}", self.name()),
    })
  }

  pub fn execute(&self, ctx: &mut Ctx, options: &Options) -> CommandResult {
    (self.fun)(ctx, options)
  }
}

impl<Ctx> fmt::Debug for TextCommand<Ctx> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TextCommand")
      .field("names", &self.names)
      .field("title", &self.title)
      .field("lookup_with_arg_parser", &self.lookup_with_arg_parser)
      .finish()
  }
}
