use std::{
  collections::{
    HashMap,
    HashSet,
  },
  sync::Arc,
};

use the_cmdline::{
  DeclarationError,
  Options,
};

use crate::{
  command::TextCommand,
  find::{
    FindContext,
    find_command,
  },
};

/// Text commands by alias, plus the commands that may be recognized by
/// their arguments alone.
pub struct CommandRegistry<Ctx: 'static> {
  commands:    HashMap<String, Arc<TextCommand<Ctx>>>,
  lookup_full: Vec<Arc<TextCommand<Ctx>>>,
}

impl<Ctx: 'static> Default for CommandRegistry<Ctx> {
  fn default() -> Self {
    Self {
      commands:    HashMap::new(),
      lookup_full: Vec::new(),
    }
  }
}

impl<Ctx: FindContext + 'static> CommandRegistry<Ctx> {
  /// A registry holding the built-in commands.
  pub fn new() -> Result<Self, DeclarationError> {
    let mut registry = Self::default();
    registry.register(find_command()?);
    Ok(registry)
  }
}

impl<Ctx: 'static> CommandRegistry<Ctx> {
  pub fn register(&mut self, command: TextCommand<Ctx>) {
    let command = Arc::new(command);
    for alias in &command.names {
      if alias.is_empty() || alias.contains(char::is_whitespace) {
        tracing::warn!(alias = %alias, "invalid command alias");
        continue;
      }
      self.commands.insert(alias.clone(), command.clone());
    }
    if command.lookup_with_arg_parser {
      self.lookup_full.push(command);
    }
  }

  pub fn lookup(&self, alias: &str) -> Option<Arc<TextCommand<Ctx>>> {
    self.commands.get(alias).cloned()
  }

  /// Finds the first command looked up by its parser that accepts `text`.
  ///
  /// With `full_parse` unset a parse that fails part way still matches as
  /// long as it produced options.
  pub fn lookup_full_command(
    &self,
    text: &str,
    full_parse: bool,
  ) -> Option<(Arc<TextCommand<Ctx>>, Options)> {
    self.lookup_full.iter().find_map(|command| {
      match command.parser.parse(text) {
        Ok(options) => Some((command.clone(), options)),
        Err(err) if !full_parse && !err.options.is_empty() => {
          tracing::debug!(command = command.name(), error = %err, "partial command match");
          Some((command.clone(), err.options))
        },
        Err(_) => None,
      }
    })
  }

  /// Sorted aliases starting with `prefix`.
  pub fn command_names(&self, prefix: &str) -> Vec<&str> {
    let mut names: Vec<&str> = self
      .commands
      .keys()
      .map(String::as_str)
      .filter(|name| name.starts_with(prefix))
      .collect();
    names.sort_unstable();
    names
  }

  /// Every registered command once, ordered by name.
  pub fn commands(&self) -> Vec<Arc<TextCommand<Ctx>>> {
    let mut seen = HashSet::new();
    let mut commands: Vec<_> = self
      .commands
      .values()
      .filter(|command| seen.insert(command.name().to_string()))
      .cloned()
      .collect();
    commands.sort_by(|a, b| a.name().cmp(b.name()));
    commands
  }
}
