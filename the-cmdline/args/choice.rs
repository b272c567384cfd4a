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

/// One selectable value and the words that select it. The first word is the
/// canonical spelling.
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
  pub names: Vec<String>,
  pub value: Value,
}

impl Alternative {
  fn canonical(&self) -> &str {
    self.names.first().map_or("", String::as_str)
  }
}

/// Selects one value from a fixed list of alternatives.
///
/// Any unambiguous prefix of an alias selects its alternative. An exact alias
/// always wins, even when it is also a prefix of other aliases.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
  pub(crate) label:        String,
  pub(crate) name:         String,
  pub(crate) alternatives: Vec<Alternative>,
  pub(crate) default:      Value,
}

impl Choice {
  /// Alternatives given as `("name alias ...", value)` pairs.
  pub fn new<I, N, V>(alternatives: I) -> Self
  where
    I: IntoIterator<Item = (N, V)>,
    N: AsRef<str>,
    V: Into<Value>,
  {
    let alternatives = alternatives
      .into_iter()
      .map(|(names, value)| {
        Alternative {
          names: words(names.as_ref()),
          value: value.into(),
        }
      })
      .collect();
    Self::from_alternatives(alternatives)
  }

  /// Each item is `"name alias ..."` and selects its own canonical name.
  pub fn strings<I, N>(alternatives: I) -> Self
  where
    I: IntoIterator<Item = N>,
    N: AsRef<str>,
  {
    let alternatives = alternatives
      .into_iter()
      .map(|names| {
        let names = words(names.as_ref());
        let value = Value::from(names.first().cloned());
        Alternative { names, value }
      })
      .collect();
    Self::from_alternatives(alternatives)
  }

  /// One alternative per space-separated word, each selecting itself.
  pub fn words(names: &str) -> Self {
    Self::strings(names.split_whitespace())
  }

  pub fn from_alternatives(alternatives: Vec<Alternative>) -> Self {
    let label = alternatives
      .first()
      .map(|alternative| alternative.canonical().to_string())
      .unwrap_or_default();
    let default = alternatives
      .first()
      .map(|alternative| alternative.value.clone())
      .unwrap_or_default();
    Self {
      name: label.replace('-', "_"),
      label,
      alternatives,
      default,
    }
  }

  pub fn name(mut self, name: &str) -> Self {
    self.name = name.replace('-', "_");
    self
  }

  pub fn default(mut self, value: impl Into<Value>) -> Self {
    self.default = value.into();
    self
  }

  pub fn alternatives(&self) -> &[Alternative] {
    &self.alternatives
  }

  fn aliases(&self) -> Vec<(usize, &str)> {
    self
      .alternatives
      .iter()
      .enumerate()
      .flat_map(|(i, alternative)| alternative.names.iter().map(move |name| (i, name.as_str())))
      .collect()
  }

  fn canonical_names(&self, alternatives: impl IntoIterator<Item = usize>) -> String {
    alternatives
      .into_iter()
      .map(|i| self.alternatives[i].canonical())
      .collect::<Vec<_>>()
      .join(", ")
  }

  fn select(&self, word: &str) -> Result<&Alternative, String> {
    match lookup(word, &self.aliases()) {
      Lookup::Exact(i) | Lookup::Unique(i, _) => Ok(&self.alternatives[i]),
      Lookup::Ambiguous(matches) => {
        Err(format!(
          "'{word}' is ambiguous: {}",
          self.canonical_names(matches)
        ))
      },
      Lookup::NoMatch => {
        Err(format!(
          "'{word}' does not match any of: {}",
          self.canonical_names(0..self.alternatives.len())
        ))
      },
    }
  }

  pub(crate) fn validate(&self) -> Result<(), DeclarationError> {
    let empty = self.alternatives.is_empty()
      || self
        .alternatives
        .iter()
        .any(|alternative| alternative.names.is_empty());
    if empty {
      return Err(DeclarationError::NoAlternatives {
        name: self.name.clone(),
      });
    }
    Ok(())
  }

  pub(crate) fn consume(&self, text: &str, index: usize) -> Result<(Value, usize), Rejection> {
    consume_token(text, index, &self.default, |word| {
      self
        .select(word)
        .map(|alternative| alternative.value.clone())
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
        match self.select(word) {
          Ok(_) => Hint::Consumed(end),
          Err(_) => Hint::Invalid,
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
      Token::End => {
        Hint::Active(
          self
            .alternatives
            .iter()
            .map(|alternative| alternative.canonical().to_string())
            .collect(),
        )
      },
      Token::Skip => Hint::Consumed(index + 1),
      Token::Word {
        text: word,
        end,
        complete: true,
        ..
      } => {
        match self.select(word) {
          Ok(_) => Hint::Consumed(end),
          Err(_) => Hint::Invalid,
        }
      },
      Token::Word { text: word, .. } => {
        let names: Vec<String> = self
          .alternatives
          .iter()
          .filter_map(|alternative| alternative.names.iter().find(|name| name.starts_with(word)))
          .cloned()
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
    self
      .alternatives
      .iter()
      .find(|alternative| alternative.value == self.default)
      .or_else(|| self.alternatives.first())
      .map(|alternative| alternative.canonical().to_string())
      .unwrap_or_default()
  }

  pub(crate) fn arg_string(&self, value: &Value) -> Result<String, ArgStringError> {
    if *value == self.default {
      return Ok(String::new());
    }
    self
      .alternatives
      .iter()
      .find(|alternative| alternative.value == *value)
      .map(|alternative| alternative.canonical().to_string())
      .ok_or_else(|| invalid_value(&self.name, value))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::args::{
    Arg,
    testing::*,
  };

  fn argument() -> Choice {
    Choice::strings(["arg-ument", "nope", "nah"])
  }

  fn on_off() -> Choice {
    Choice::new([("true on", true), ("false off", false)])
  }

  #[test]
  fn names_and_defaults() {
    let arg = Arg::from(argument());
    assert_eq!(arg.name(), "arg_ument");
    assert_eq!(arg.to_string(), "arg-ument");
    assert_eq!(arg.default(), &Value::from("arg-ument"));

    let arg = Arg::from(Choice::words("flat rock cinema").name("value"));
    assert_eq!(arg.name(), "value");
    assert_eq!(arg.to_string(), "flat");

    let arg = Arg::from(on_off().default(false));
    assert_eq!(arg.default(), &Value::Bool(false));
    assert_eq!(arg.name(), "true");
  }

  #[test]
  fn consume() {
    assert_consume(argument(), "", 0, "arg-ument", 0);
    assert_consume(argument(), " ", 0, "arg-ument", 1);
    assert_consume(argument(), "arg", 0, "arg-ument", 3);
    assert_consume(argument(), "nope", 0, "nope", 4);
    assert_consume(argument(), "nah x", 0, "nah", 4);
    assert_consume(argument(), "x no", 2, "nope", 4);
    assert_consume(on_off(), "on", 0, true, 2);
    assert_consume(on_off(), "of", 0, false, 2);
    assert_consume(on_off(), "f", 0, false, 1);
  }

  #[test]
  fn exact_alias_beats_prefix() {
    let arg = Choice::new([("selection", 1), ("sel", 2), ("select", 3)]);
    assert_consume(arg.clone(), "sel", 0, 2, 3);
    assert_consume(arg.clone(), "selecti", 0, 1, 7);
    assert_rejects(arg, "selec", 0, "'selec' is ambiguous: selection, select", 0, 5);
  }

  #[test]
  fn rejects_ambiguous_and_unknown_words() {
    assert_rejects(argument(), "n", 0, "'n' is ambiguous: nope, nah", 0, 1);
    assert_rejects(
      argument(),
      "arg",
      1,
      "'rg' does not match any of: arg-ument, nope, nah",
      1,
      3,
    );
    assert_rejects(
      argument(),
      "args arg",
      0,
      "'args' does not match any of: arg-ument, nope, nah",
      0,
      5,
    );
    assert_rejects(on_off(), "o", 0, "'o' is ambiguous: true, false", 0, 1);
  }

  #[test]
  fn placeholder() {
    let arg = Choice::words("off on high hi");
    assert_placeholder(arg.clone(), "", 0, Hint::Active("off"));
    assert_placeholder(arg.clone(), "o", 0, Hint::Active("..."));
    assert_placeholder(arg.clone(), "of", 0, Hint::Active("f"));
    assert_placeholder(arg.clone(), "on", 0, Hint::Active(""));
    assert_placeholder(arg.clone(), "hi", 0, Hint::Active(""));
    assert_placeholder(arg.clone(), "hig", 0, Hint::Active("h"));
    assert_placeholder(arg.clone(), "x", 0, Hint::Invalid);
    assert_placeholder(arg.clone(), "of ", 0, Hint::Consumed(3));
    assert_placeholder(arg.clone(), "o ", 0, Hint::Invalid);
    assert_placeholder(arg.default("hi"), "", 0, Hint::Active("hi"));
  }

  #[test]
  fn completions() {
    let arg = Choice::new([("off", 0), ("high hi", 1), ("medium", 2)]);
    assert_completions(arg.clone(), "", 0, Hint::Active(vec!["off", "high", "medium"]));
    assert_completions(arg.clone(), "h", 0, Hint::Active(vec!["high"]));
    assert_completions(arg.clone(), "hi", 0, Hint::Active(vec!["high"]));
    assert_completions(arg.clone(), "x", 0, Hint::Invalid);
    assert_completions(arg.clone(), "hi ", 0, Hint::Consumed(3));
  }

  #[test]
  fn arg_string() {
    assert_arg_string(argument(), "arg-ument", "");
    assert_arg_string(argument(), "nope", "nope");
    assert_arg_string(on_off(), false, "false");
    assert_invalid_value(argument(), "arg");
    assert_invalid_value(argument(), Value::None);
  }
}
