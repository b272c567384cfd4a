use std::sync::Arc;

use the_cmdline::{
  DeclarationError,
  Options,
};

use crate::{
  command::{
    CommandError,
    CommandResult,
    TextCommand,
  },
  config::CommandBarConfig,
  find::FindContext,
  history::History,
  registry::CommandRegistry,
};

/// Splits a command line at its first space.
fn split_command(text: &str) -> (&str, Option<&str>) {
  match text.split_once(' ') {
    Some((name, rest)) => (name, Some(rest)),
    None => (text, None),
  }
}

/// Runs typed command lines and answers the bar's placeholder and
/// completion queries.
pub struct CommandBar<Ctx: 'static> {
  registry: CommandRegistry<Ctx>,
  history:  History,
  config:   CommandBarConfig,
}

impl<Ctx: FindContext + 'static> CommandBar<Ctx> {
  /// A command bar with the built-in commands registered.
  pub fn new(config: CommandBarConfig) -> Result<Self, DeclarationError> {
    Ok(Self::with_registry(CommandRegistry::new()?, config))
  }
}

impl<Ctx: 'static> CommandBar<Ctx> {
  pub fn with_registry(registry: CommandRegistry<Ctx>, config: CommandBarConfig) -> Self {
    Self {
      registry,
      history: History::with_limit(config.history_limit),
      config,
    }
  }

  pub fn registry(&self) -> &CommandRegistry<Ctx> {
    &self.registry
  }

  pub fn registry_mut(&mut self) -> &mut CommandRegistry<Ctx> {
    &mut self.registry
  }

  pub fn history(&self) -> &History {
    &self.history
  }

  pub fn history_mut(&mut self) -> &mut History {
    &mut self.history
  }

  pub fn config(&self) -> &CommandBarConfig {
    &self.config
  }

  /// Finds the command for `text` and the argument text it should parse.
  ///
  /// Commands recognized by their arguments alone receive the whole line.
  pub fn find_command<'a>(&self, text: &'a str) -> Option<(Arc<TextCommand<Ctx>>, &'a str)> {
    let (name, rest) = split_command(text);
    if let Some(command) = self.registry.lookup(name) {
      return Some((command, rest.unwrap_or_default()));
    }
    self
      .registry
      .lookup_full_command(text, false)
      .map(|(command, _)| (command, text))
  }

  /// Parses and runs `text`. A successful line is recorded in history.
  pub fn execute(&mut self, ctx: &mut Ctx, text: &str) -> CommandResult {
    let (command, options) = self.parse_command(text)?;
    let result = command.execute(ctx, &options);
    match &result {
      Ok(message) => {
        tracing::debug!(command = command.name(), ?message, "command executed");
        self.history.append(command.name(), text);
      },
      Err(err) => tracing::debug!(command = command.name(), error = %err, "command failed"),
    }
    result
  }

  fn parse_command(&self, text: &str) -> Result<(Arc<TextCommand<Ctx>>, Options), CommandError> {
    let (name, rest) = split_command(text);
    if let Some(command) = self.registry.lookup(name) {
      let options = command.parser.parse(rest.unwrap_or_default())?;
      return Ok((command, options));
    }
    self
      .registry
      .lookup_full_command(text, true)
      .ok_or_else(|| CommandError::Unknown(name.to_string()))
  }

  /// Text to show after the cursor.
  pub fn get_placeholder(&self, text: &str) -> String {
    let Some((command, args)) = self.find_command(text) else {
      return String::new();
    };
    let placeholder = command.parser.get_placeholder(args).unwrap_or_default();
    let bare_name = !text.contains(' ') && self.registry.lookup(text).is_some();
    if bare_name && !placeholder.is_empty() {
      format!(" {placeholder}")
    } else {
      placeholder
    }
  }

  /// Completions for the word at the end of `text`.
  pub fn get_completions(&self, text: &str) -> Vec<String> {
    let mut words: Vec<String> = if text.contains(' ') {
      self
        .find_command(text)
        .and_then(|(command, args)| command.parser.get_completions(args))
        .unwrap_or_default()
    } else {
      self
        .registry
        .command_names(text)
        .into_iter()
        .map(str::to_string)
        .collect()
    };
    if self.config.max_completions > 0 {
      words.truncate(self.config.max_completions);
    }
    words
  }
}
