//! The built-in `find` command.
//!
//! ```text
//! find /pattern/replacement/flags [action] [search-type] [wrap|no-wrap]
//! ```
//!
//! The command is also looked up by its arguments, so a line such as
//! `/foo/bar/i all` runs it without the command name.

use std::ops::Range;

use regex::Regex as CompiledRegex;
use the_cmdline::{
  Choice,
  CommandParser,
  DeclarationError,
  Options,
  Regex,
  RegexPattern,
  Value,
};

use crate::command::{
  CommandError,
  CommandResult,
  TextCommand,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindAction {
  FindNext,
  FindPrevious,
  ReplaceOne,
  ReplaceAll,
  ReplaceAllInSelection,
}

impl FindAction {
  fn from_value(value: &str) -> Option<Self> {
    Some(match value {
      "find_next" => Self::FindNext,
      "find_previous" => Self::FindPrevious,
      "replace_one" => Self::ReplaceOne,
      "replace_all" => Self::ReplaceAll,
      "replace_all_in_selection" => Self::ReplaceAllInSelection,
      _ => return None,
    })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
  Regex,
  LiteralText,
  Word,
}

impl SearchType {
  fn from_value(value: &str) -> Option<Self> {
    Some(match value {
      "regex" => Self::Regex,
      "literal-text" => Self::LiteralText,
      "word" => Self::Word,
      _ => return None,
    })
  }
}

pub fn find_parser() -> Result<CommandParser, DeclarationError> {
  CommandParser::new([
    Regex::replace("pattern")
      .default(Value::replace(RegexPattern::new(""), ""))
      .into(),
    Choice::new([
      ("find-next next", "find_next"),
      ("find-previous previous", "find_previous"),
      ("replace-one one", "replace_one"),
      ("replace-all all", "replace_all"),
      (
        "replace-in-selection in-selection selection",
        "replace_all_in_selection",
      ),
    ])
    .name("action")
    .into(),
    Choice::words("regex literal-text word")
      .name("search_type")
      .into(),
    Choice::new([("wrap", true), ("no-wrap", false)])
      .name("wrap_around")
      .into(),
  ])
}

pub fn find_command<Ctx: FindContext>() -> Result<TextCommand<Ctx>, DeclarationError> {
  Ok(
    TextCommand::new("find", find::<Ctx>)
      .with_title("Find...")
      .with_parser(find_parser()?)
      .lookup_with_arg_parser(),
  )
}

/// Parsed arguments of the `find` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindOptions {
  pub find:        RegexPattern,
  pub replace:     String,
  pub action:      FindAction,
  pub search_type: SearchType,
  pub wrap_around: bool,
}

impl Default for FindOptions {
  fn default() -> Self {
    Self {
      find:        RegexPattern::new(""),
      replace:     String::new(),
      action:      FindAction::FindNext,
      search_type: SearchType::Regex,
      wrap_around: true,
    }
  }
}

impl FindOptions {
  pub fn from_options(options: &Options) -> Result<Self, CommandError> {
    let mut find = Self::default();
    if let Some(value) = options.get("pattern") {
      let (pattern, replacement) = value
        .as_replace()
        .ok_or_else(|| invalid_option("pattern", value))?;
      if let Some(pattern) = pattern {
        find.find = pattern.clone();
      }
      find.replace = replacement.unwrap_or_default().to_string();
    }
    if let Some(value) = options.get("action") {
      find.action = value
        .as_str()
        .and_then(FindAction::from_value)
        .ok_or_else(|| invalid_option("action", value))?;
    }
    if let Some(value) = options.get("search_type") {
      find.search_type = value
        .as_str()
        .and_then(SearchType::from_value)
        .ok_or_else(|| invalid_option("search_type", value))?;
    }
    if let Some(value) = options.get("wrap_around") {
      find.wrap_around = value
        .as_bool()
        .ok_or_else(|| invalid_option("wrap_around", value))?;
    }
    Ok(find)
  }
}

fn invalid_option(name: &str, value: &Value) -> CommandError {
  CommandError::new(format!("invalid {name}: {value}"))
}

/// Text searched by `find`, with the selection the actions start from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FindTarget {
  pub text:      String,
  pub selection: Range<usize>,
}

impl FindTarget {
  pub fn new(text: impl Into<String>) -> Self {
    Self {
      text:      text.into(),
      selection: 0..0,
    }
  }

  pub fn selected_text(&self) -> &str {
    self.text.get(self.selection.clone()).unwrap_or_default()
  }
}

/// Hosts that can run the `find` command.
pub trait FindContext {
  fn find_target(&mut self) -> Option<&mut FindTarget>;
}

impl FindContext for FindTarget {
  fn find_target(&mut self) -> Option<&mut FindTarget> {
    Some(self)
  }
}

/// Runs the `find` command against the context's target.
pub fn find<Ctx: FindContext>(ctx: &mut Ctx, options: &Options) -> CommandResult {
  let finder = Finder::new(FindOptions::from_options(options)?)?;
  let target = ctx
    .find_target()
    .ok_or_else(|| CommandError::new("nothing to search"))?;
  finder.apply(target)
}

#[derive(Debug, Clone)]
pub struct Finder {
  options: FindOptions,
  regex:   CompiledRegex,
}

impl Finder {
  pub fn new(options: FindOptions) -> Result<Self, CommandError> {
    if options.find.pattern.is_empty() {
      return Err(CommandError::new("nothing to find"));
    }
    let source = match options.search_type {
      SearchType::Regex => options.find.pattern.clone(),
      SearchType::LiteralText => regex::escape(&options.find.pattern),
      SearchType::Word => format!(r"\b{}\b", regex::escape(&options.find.pattern)),
    };
    let regex = RegexPattern {
      pattern: source,
      flags:   options.find.flags,
    }
    .compile()
    .map_err(|err| CommandError::new(format!("invalid pattern: {err}")))?;
    Ok(Self { options, regex })
  }

  pub fn options(&self) -> &FindOptions {
    &self.options
  }

  pub fn apply(&self, target: &mut FindTarget) -> CommandResult {
    match self.options.action {
      FindAction::FindNext => self.find_next(target).map(|_| None),
      FindAction::FindPrevious => self.find_previous(target).map(|_| None),
      FindAction::ReplaceOne => self.replace_one(target).map(|_| None),
      FindAction::ReplaceAll | FindAction::ReplaceAllInSelection => {
        let count = self.replace_all(target)?;
        let noun = if count == 1 { "occurrence" } else { "occurrences" };
        Ok(Some(format!("replaced {count} {noun}")))
      },
    }
  }

  fn not_found(&self) -> CommandError {
    CommandError::new(format!("not found: {}", self.options.find.pattern))
  }

  /// Selects the first match after the selection.
  pub fn find_next(&self, target: &mut FindTarget) -> Result<Range<usize>, CommandError> {
    let selection = target.selection.clone();
    let found = self
      .regex
      .find_iter(&target.text)
      .map(|m| m.range())
      .find(|range| range.start >= selection.start && *range != selection)
      .or_else(|| {
        self
          .options
          .wrap_around
          .then(|| self.regex.find(&target.text).map(|m| m.range()))
          .flatten()
      })
      .ok_or_else(|| self.not_found())?;
    target.selection = found.clone();
    Ok(found)
  }

  /// Selects the last match before the selection.
  pub fn find_previous(&self, target: &mut FindTarget) -> Result<Range<usize>, CommandError> {
    let selection = target.selection.clone();
    let matches: Vec<Range<usize>> = self.regex.find_iter(&target.text).map(|m| m.range()).collect();
    let found = matches
      .iter()
      .rev()
      .find(|range| range.end <= selection.end && **range != selection)
      .or_else(|| {
        if self.options.wrap_around {
          matches.last()
        } else {
          None
        }
      })
      .cloned()
      .ok_or_else(|| self.not_found())?;
    target.selection = found.clone();
    Ok(found)
  }

  /// Replaces the selection when the pattern matches all of it.
  pub fn replace_one(&self, target: &mut FindTarget) -> Result<Range<usize>, CommandError> {
    let selection = target.selection.clone();
    let selected = target.selected_text();
    let replacement = match self.regex.captures(selected) {
      Some(caps) if caps.get(0).is_some_and(|m| m.range() == (0..selected.len())) => {
        self.expand(&caps)
      },
      _ => return Err(self.not_found()),
    };
    target.text.replace_range(selection.clone(), &replacement);
    let replaced = selection.start..selection.start + replacement.len();
    target.selection = replaced.clone();
    Ok(replaced)
  }

  /// Replaces every match in the searched range and returns how many were
  /// replaced. The replaced range becomes the selection.
  pub fn replace_all(&self, target: &mut FindTarget) -> Result<usize, CommandError> {
    let range = match (self.options.action, self.options.wrap_around) {
      (FindAction::ReplaceAllInSelection, _) => target.selection.clone(),
      (_, true) => 0..target.text.len(),
      (_, false) => target.selection.start..target.text.len(),
    };
    let mut result = String::with_capacity(target.text.len());
    let mut last = 0;
    let mut count = 0;
    for caps in self.regex.captures_iter(&target.text) {
      let Some(m) = caps.get(0) else {
        continue;
      };
      if m.start() < range.start || m.end() > range.end {
        continue;
      }
      result.push_str(&target.text[last..m.start()]);
      result.push_str(&self.expand(&caps));
      last = m.end();
      count += 1;
    }
    if count == 0 {
      return Err(self.not_found());
    }
    result.push_str(&target.text[last..]);
    let end = range.end + result.len() - target.text.len();
    target.text = result;
    target.selection = range.start..end;
    Ok(count)
  }

  fn expand(&self, caps: &regex::Captures<'_>) -> String {
    match self.options.search_type {
      SearchType::Regex => {
        let mut expanded = String::new();
        caps.expand(&self.options.replace, &mut expanded);
        expanded
      },
      SearchType::LiteralText | SearchType::Word => self.options.replace.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[track_caller]
  fn parse(text: &str) -> FindOptions {
    let options = find_parser().unwrap().parse(text).unwrap();
    FindOptions::from_options(&options).unwrap()
  }

  #[track_caller]
  fn run(text: &str, selection: Range<usize>, command: &str) -> (FindTarget, CommandResult) {
    let mut target = FindTarget {
      text: text.to_string(),
      selection,
    };
    let options = find_parser().unwrap().parse(command).unwrap();
    let result = find(&mut target, &options);
    (target, result)
  }

  #[test]
  fn default_options() {
    let options = find_parser().unwrap().default_options();
    assert_eq!(FindOptions::from_options(&options).unwrap(), FindOptions::default());
  }

  #[test]
  fn parse_options() {
    let find = parse("/abc/def/i all word no-wrap");
    assert_eq!(find.find.pattern, "abc");
    assert!(find.find.ignore_case());
    assert_eq!(find.replace, "def");
    assert_eq!(find.action, FindAction::ReplaceAll);
    assert_eq!(find.search_type, SearchType::Word);
    assert!(!find.wrap_around);

    let find = parse("/abc// previous");
    assert_eq!(find.replace, "");
    assert_eq!(find.action, FindAction::FindPrevious);

    assert_eq!(parse(":a/b:c: selection").action, FindAction::ReplaceAllInSelection);
  }

  #[test]
  fn find_next_wraps() {
    let (target, result) = run("ab ab ab", 0..2, "/ab/");
    assert_eq!(result, Ok(None));
    assert_eq!(target.selection, 3..5);

    let (target, _) = run("ab ab ab", 6..8, "/ab/");
    assert_eq!(target.selection, 0..2);

    let (target, result) = run("ab ab ab", 6..8, "/ab// next regex no-wrap");
    assert_eq!(result, Err(CommandError::new("not found: ab")));
    assert_eq!(target.selection, 6..8);
  }

  #[test]
  fn find_previous_wraps() {
    let (target, _) = run("ab ab ab", 3..5, "/ab// previous");
    assert_eq!(target.selection, 0..2);

    let (target, _) = run("ab ab ab", 0..2, "/ab// previous");
    assert_eq!(target.selection, 6..8);
  }

  #[test]
  fn search_types() {
    let (target, _) = run("a.c abc", 0..0, "/a.c// next literal-text");
    assert_eq!(target.selection, 0..3);

    let (target, _) = run("cat concat cat", 0..3, "/cat// next word");
    assert_eq!(target.selection, 11..14);

    let (target, _) = run("x ABC", 0..0, "/abc//i");
    assert_eq!(target.selection, 2..5);
  }

  #[test]
  fn replace_one_expands_groups() {
    let (target, result) = run("say hello", 4..9, r"/h(el)lo/$1/ one");
    assert_eq!(result, Ok(None));
    assert_eq!(target.text, "say el");
    assert_eq!(target.selection, 4..6);

    let (target, result) = run("say hello", 0..3, "/hello/x/ one");
    assert!(result.is_err());
    assert_eq!(target.text, "say hello");
  }

  #[test]
  fn replace_all() {
    let (target, result) = run("a1 b2 c3", 0..0, r"/(\d)/<$1>/ all");
    assert_eq!(result, Ok(Some("replaced 3 occurrences".to_string())));
    assert_eq!(target.text, "a<1> b<2> c<3>");
    assert_eq!(target.selection, 0..14);

    let (target, result) = run("a1 b2 c3", 3..8, r"/\d/#/ all regex no-wrap");
    assert_eq!(result, Ok(Some("replaced 2 occurrences".to_string())));
    assert_eq!(target.text, "a1 b# c#");

    let (target, result) = run("a1 b2 c3", 3..5, r"/\d/#/ selection");
    assert_eq!(result, Ok(Some("replaced 1 occurrence".to_string())));
    assert_eq!(target.text, "a1 b# c3");
    assert_eq!(target.selection, 3..5);
  }

  #[test]
  fn empty_pattern_is_an_error() {
    let (_, result) = run("abc", 0..0, "");
    assert_eq!(result, Err(CommandError::new("nothing to find")));
  }
}
