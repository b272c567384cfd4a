use std::collections::{
  VecDeque,
  vec_deque,
};

use the_cmdline::{
  ArgStringError,
  Options,
};

use crate::command::TextCommand;

pub const DEFAULT_HISTORY_LIMIT: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
  /// Canonical name of the command that ran.
  pub command: String,
  pub text:    String,
}

/// Recently executed command lines, newest first.
#[derive(Debug, Clone)]
pub struct History {
  entries: VecDeque<HistoryEntry>,
  limit:   usize,
}

impl Default for History {
  fn default() -> Self {
    Self::with_limit(DEFAULT_HISTORY_LIMIT)
  }
}

impl History {
  pub fn with_limit(limit: usize) -> Self {
    Self {
      entries: VecDeque::new(),
      limit:   limit.max(1),
    }
  }

  pub fn limit(&self) -> usize {
    self.limit
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Records `text` as the newest line of `command`. A line already present
  /// moves to the front instead of being repeated.
  pub fn append(&mut self, command: &str, text: &str) {
    let entry = HistoryEntry {
      command: command.to_string(),
      text:    text.to_string(),
    };
    self.entries.retain(|existing| *existing != entry);
    self.entries.push_front(entry);
    self.entries.truncate(self.limit);
  }

  pub fn iter(&self) -> vec_deque::Iter<'_, HistoryEntry> {
    self.entries.iter()
  }

  /// Lines of `command`, newest first.
  pub fn iter_by_name<'a>(&'a self, command: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    self
      .entries
      .iter()
      .filter(move |entry| entry.command == command)
      .map(|entry| entry.text.as_str())
  }

  /// Lines satisfying `predicate`, newest first.
  pub fn iter_matching<'a, P>(&'a self, mut predicate: P) -> impl Iterator<Item = &'a str> + 'a
  where
    P: FnMut(&str) -> bool + 'a,
  {
    self
      .entries
      .iter()
      .map(|entry| entry.text.as_str())
      .filter(move |text| predicate(text))
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }
}

impl<'a> IntoIterator for &'a History {
  type Item = &'a HistoryEntry;
  type IntoIter = vec_deque::Iter<'a, HistoryEntry>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

/// Options of the newest line `command` left in `history`, or its defaults.
pub fn load_options<Ctx>(command: &TextCommand<Ctx>, history: &History) -> Options {
  let Some(text) = history.iter_by_name(command.name()).next() else {
    return command.parser.default_options();
  };
  match command.parse(text) {
    Ok(options) => options,
    Err(err) => {
      tracing::warn!(command = command.name(), text, error = %err, "cannot parse history entry");
      command.parser.default_options()
    },
  }
}

/// Records `options` in `history` as the canonical text of `command`.
pub fn save_options<Ctx>(
  options: &Options,
  command: &TextCommand<Ctx>,
  history: &mut History,
) -> Result<(), ArgStringError> {
  let text = command.arg_string(options)?;
  history.append(command.name(), &text);
  Ok(())
}

#[cfg(test)]
mod tests {
  use the_cmdline::{
    Bool,
    CommandParser,
    Int,
  };

  use super::*;
  use crate::command::CommandResult;

  fn noop(_: &mut (), _: &Options) -> CommandResult {
    Ok(None)
  }

  fn goto() -> TextCommand<()> {
    let parser = CommandParser::new([
      Int::new("line").default(1).into(),
      Bool::new("select").false_names("move").into(),
    ])
    .unwrap();
    TextCommand::new("goto", noop).with_parser(parser)
  }

  #[test]
  fn append_moves_duplicates_to_front() {
    let mut history = History::default();
    history.append("goto", "goto 1");
    history.append("echo", "echo x");
    history.append("goto", "goto 2");
    history.append("goto", "goto 1");

    let texts: Vec<_> = history.iter().map(|entry| entry.text.as_str()).collect();
    assert_eq!(texts, vec!["goto 1", "goto 2", "echo x"]);
    let texts: Vec<_> = history.iter_by_name("goto").collect();
    assert_eq!(texts, vec!["goto 1", "goto 2"]);
    let texts: Vec<_> = history.iter_matching(|text| text.ends_with('x')).collect();
    assert_eq!(texts, vec!["echo x"]);
  }

  #[test]
  fn append_respects_limit() {
    let mut history = History::with_limit(0);
    assert_eq!(history.limit(), 1);
    history.append("a", "a");
    history.append("b", "b");
    assert_eq!(history.len(), 1);
    assert_eq!(history.iter().next().map(|entry| entry.text.as_str()), Some("b"));
  }

  #[test]
  fn options_round_trip_through_history() {
    let command = goto();
    let mut history = History::default();
    assert_eq!(load_options(&command, &history), command.parser.default_options());

    let options = Options::new().with("line", 12).with("select", true);
    save_options(&options, &command, &mut history).unwrap();
    assert_eq!(history.iter_by_name("goto").next(), Some("goto 12 select"));
    assert_eq!(load_options(&command, &history), options);
  }

  #[test]
  fn unparsable_history_falls_back_to_defaults() {
    let command = goto();
    let mut history = History::default();
    history.append("goto", "goto twelve");
    assert_eq!(load_options(&command, &history), command.parser.default_options());
  }
}
