use crate::{
  args::{
    Hint,
    Lookup,
    Rejection,
    Token,
    consume_token,
    invalid_value,
    lookup,
    token,
    words,
  },
  error::{
    ArgStringError,
    DeclarationError,
  },
  value::Value,
};

/// A switch spelled by one set of words for `true` and, optionally, another
/// set for `false`.
///
/// Only exact words are accepted when parsing. Prefixes are used for
/// placeholders and completions.
#[derive(Debug, Clone, PartialEq)]
pub struct Bool {
  pub(crate) label:       String,
  pub(crate) name:        String,
  pub(crate) true_names:  Vec<String>,
  pub(crate) false_names: Vec<String>,
  pub(crate) default:     Value,
}

impl Bool {
  /// `names` lists the words meaning `true`, space separated. The first one
  /// names the option.
  pub fn new(names: &str) -> Self {
    let true_names = words(names);
    let label = true_names.first().cloned().unwrap_or_default();
    Self {
      name: label.replace('-', "_"),
      label,
      true_names,
      false_names: Vec::new(),
      default: Value::Bool(false),
    }
  }

  pub fn false_names(mut self, names: &str) -> Self {
    self.false_names = words(names);
    self
  }

  pub fn name(mut self, name: &str) -> Self {
    self.name = name.replace('-', "_");
    self
  }

  pub fn default(mut self, value: bool) -> Self {
    self.default = Value::Bool(value);
    self
  }

  fn all_names(&self) -> impl Iterator<Item = &str> {
    self
      .true_names
      .iter()
      .chain(&self.false_names)
      .map(String::as_str)
  }

  fn aliases(&self) -> Vec<(usize, &str)> {
    let truthy = self.true_names.iter().map(|name| (0, name.as_str()));
    let falsy = self.false_names.iter().map(|name| (1, name.as_str()));
    truthy.chain(falsy).collect()
  }

  fn parse_word(&self, word: &str) -> Option<bool> {
    if self.true_names.iter().any(|name| name == word) {
      Some(true)
    } else if self.false_names.iter().any(|name| name == word) {
      Some(false)
    } else {
      None
    }
  }

  pub(crate) fn validate(&self) -> Result<(), DeclarationError> {
    if self.true_names.is_empty() {
      return Err(DeclarationError::NoAlternatives {
        name: self.name.clone(),
      });
    }
    Ok(())
  }

  pub(crate) fn consume(&self, text: &str, index: usize) -> Result<(Value, usize), Rejection> {
    consume_token(text, index, &self.default, |word| {
      self.parse_word(word).map(Value::Bool).ok_or_else(|| {
        format!(
          "'{word}' not in: {}",
          self.all_names().collect::<Vec<_>>().join(", ")
        )
      })
    })
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
        match self.parse_word(word) {
          Some(_) => Hint::Consumed(end),
          None => Hint::Invalid,
        }
      },
      Token::Word { text: word, .. } => {
        match lookup(word, &self.aliases()) {
          Lookup::Exact(_) => Hint::Active(String::new()),
          Lookup::Unique(_, alias) => Hint::Active(alias[word.len()..].to_string()),
          Lookup::Ambiguous(_) => Hint::Active("...".to_string()),
          Lookup::NoMatch => Hint::Invalid,
        }
      },
    }
  }

  pub(crate) fn completions(&self, text: &str, index: usize) -> Hint<Vec<String>> {
    match token(text, index) {
      Token::End => Hint::Active(self.sorted_names(|_| true)),
      Token::Skip => Hint::Consumed(index + 1),
      Token::Word {
        text: word,
        end,
        complete: true,
        ..
      } => {
        match self.parse_word(word) {
          Some(_) => Hint::Consumed(end),
          None => Hint::Invalid,
        }
      },
      Token::Word { text: word, .. } => {
        let names = self.sorted_names(|name| name.starts_with(word));
        if names.is_empty() {
          Hint::Invalid
        } else {
          Hint::Active(names)
        }
      },
    }
  }

  fn sorted_names(&self, keep: impl Fn(&str) -> bool) -> Vec<String> {
    let mut names: Vec<String> = self
      .all_names()
      .filter(|name| keep(name))
      .map(str::to_string)
      .collect();
    names.sort_unstable();
    names
  }

  pub(crate) fn default_placeholder(&self) -> String {
    match (&self.default, self.false_names.first()) {
      (Value::Bool(false), Some(name)) => name.clone(),
      _ => self.label.clone(),
    }
  }

  pub(crate) fn arg_string(&self, value: &Value) -> Result<String, ArgStringError> {
    if *value == self.default {
      return Ok(String::new());
    }
    let name = match value {
      Value::Bool(true) => self.true_names.first(),
      Value::Bool(false) => self.false_names.first(),
      _ => None,
    };
    name
      .cloned()
      .ok_or_else(|| invalid_value(&self.name, value))
  }
}
