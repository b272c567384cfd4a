use std::sync::Arc;

use crate::{
  args::{
    Hint,
    Lookup,
    Rejection,
    Token,
    invalid_value,
    join_placeholder,
    lookup,
    token,
  },
  error::{
    ArgStringError,
    DeclarationError,
  },
  options::Options,
  parser::CommandParser,
  value::Value,
};

/// A named sub-grammar selectable by a [`SubParser`].
///
/// Tags are free-form values attached to the sub-grammar. They are not
/// parsed; a command reads them to decide how to act on the selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SubArgs {
  name:   String,
  parser: CommandParser,
  tags:   Options,
}

impl SubArgs {
  pub fn new(name: &str, parser: CommandParser) -> Self {
    Self {
      name: name.to_string(),
      parser,
      tags: Options::new(),
    }
  }

  pub fn tag(mut self, key: &str, value: impl Into<Value>) -> Self {
    self.tags.set(key, value);
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn parser(&self) -> &CommandParser {
    &self.parser
  }

  pub fn tags(&self) -> &Options {
    &self.tags
  }
}

/// Selects a sub-grammar by name, then parses the rest of its input with it.
///
/// Names match by unambiguous prefix like [`crate::Choice`] aliases.
#[derive(Debug, Clone, PartialEq)]
pub struct SubParser {
  pub(crate) label:   String,
  pub(crate) name:    String,
  /// Sorted by name.
  pub(crate) subs:    Vec<Arc<SubArgs>>,
  pub(crate) default: Value,
}

impl SubParser {
  pub fn new<I>(name: &str, subs: I) -> Self
  where
    I: IntoIterator<Item = SubArgs>,
  {
    let mut subs: Vec<Arc<SubArgs>> = subs.into_iter().map(Arc::new).collect();
    subs.sort_by(|a, b| a.name.cmp(&b.name));
    Self {
      label: name.to_string(),
      name: name.replace('-', "_"),
      subs,
      default: Value::None,
    }
  }

  pub fn subs(&self) -> &[Arc<SubArgs>] {
    &self.subs
  }

  fn aliases(&self) -> Vec<(usize, &str)> {
    self
      .subs
      .iter()
      .enumerate()
      .map(|(i, sub)| (i, sub.name.as_str()))
      .collect()
  }

  fn names(&self, subs: impl IntoIterator<Item = usize>) -> String {
    subs
      .into_iter()
      .map(|i| self.subs[i].name.as_str())
      .collect::<Vec<_>>()
      .join(", ")
  }

  fn resolve(&self, word: &str) -> Result<&Arc<SubArgs>, String> {
    match lookup(word, &self.aliases()) {
      Lookup::Exact(i) | Lookup::Unique(i, _) => Ok(&self.subs[i]),
      Lookup::Ambiguous(matches) => Err(format!("'{word}' is ambiguous: {}", self.names(matches))),
      Lookup::NoMatch => {
        Err(format!(
          "'{word}' does not match any of: {}",
          self.names(0..self.subs.len())
        ))
      },
    }
  }

  pub(crate) fn validate(&self) -> Result<(), DeclarationError> {
    if self.subs.is_empty() {
      return Err(DeclarationError::NoAlternatives {
        name: self.name.clone(),
      });
    }
    for sub in &self.subs {
      if sub.name.is_empty() || sub.name.contains(char::is_whitespace) {
        return Err(DeclarationError::InvalidSubArgs {
          name: self.name.clone(),
          sub:  sub.name.clone(),
        });
      }
    }
    if let Some(pair) = self.subs.windows(2).find(|pair| pair[0].name == pair[1].name) {
      return Err(DeclarationError::DuplicateSubArgs {
        name: self.name.clone(),
        sub:  pair[0].name.clone(),
      });
    }
    Ok(())
  }

  pub(crate) fn consume(&self, text: &str, index: usize) -> Result<(Value, usize), Rejection> {
    match token(text, index) {
      Token::End => Ok((self.default.clone(), index)),
      Token::Skip => Ok((self.default.clone(), index + 1)),
      Token::Word {
        text: word,
        start,
        end,
        ..
      } => {
        let sub = self
          .resolve(word)
          .map_err(|message| Rejection::token(message, start, end))?;
        let (options, next) = sub.parser.parse_from(text, end).map_err(Rejection::Nested)?;
        Ok((Value::sub(Arc::clone(sub), options), next))
      },
    }
  }

  pub(crate) fn placeholder(&self, text: &str, index: usize) -> Hint<String> {
    match token(text, index) {
      Token::End => Hint::Active(self.default_placeholder()),
      Token::Skip => Hint::Consumed(index + 1),
      Token::Word {
        text: word,
        end,
        complete: true,
        ..
      } => {
        match self.resolve(word) {
          Ok(sub) => sub.parser.placeholder_from(text, end),
          Err(_) => Hint::Invalid,
        }
      },
      Token::Word { text: word, .. } => {
        let (sub, rest) = match lookup(word, &self.aliases()) {
          Lookup::Exact(i) => (i, ""),
          Lookup::Unique(i, name) => (i, &name[word.len()..]),
          Lookup::Ambiguous(_) => return Hint::Active("...".to_string()),
          Lookup::NoMatch => return Hint::Invalid,
        };
        let defaults = self.subs[sub].parser.default_placeholders(0);
        Hint::Active(join_placeholder(rest, &defaults))
      },
    }
  }

  pub(crate) fn completions(&self, text: &str, index: usize) -> Hint<Vec<String>> {
    match token(text, index) {
      Token::End => Hint::Active(self.subs.iter().map(|sub| sub.name.clone()).collect()),
      Token::Skip => Hint::Consumed(index + 1),
      Token::Word {
        text: word,
        end,
        complete: true,
        ..
      } => {
        match self.resolve(word) {
          Ok(sub) => sub.parser.completions_from(text, end),
          Err(_) => Hint::Invalid,
        }
      },
      Token::Word { text: word, .. } => {
        let names: Vec<String> = self
          .subs
          .iter()
          .filter(|sub| sub.name.starts_with(word))
          .map(|sub| sub.name.clone())
          .collect();
        if names.is_empty() {
          Hint::Invalid
        } else {
          Hint::Active(names)
        }
      },
    }
  }

  pub(crate) fn default_placeholder(&self) -> String {
    format!("{} ...", self.label)
  }

  pub(crate) fn arg_string(&self, value: &Value) -> Result<String, ArgStringError> {
    self.fragment(value, true)
  }

  pub(crate) fn fragment(&self, value: &Value, last: bool) -> Result<String, ArgStringError> {
    if *value == self.default {
      return Ok(String::new());
    }
    let Value::Sub { args, options } = value else {
      return Err(invalid_value(&self.name, value));
    };
    let Some(sub) = self
      .subs
      .iter()
      .find(|sub| Arc::ptr_eq(sub, args) || ***sub == **args) else {
      return Err(invalid_value(&self.name, value));
    };
    let fragments = sub.parser.arg_fragments(options, last)?;
    Ok(format!("{} {}", sub.name, fragments.join(" ")))
  }
}
