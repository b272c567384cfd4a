use crate::{
  args::{
    Hint,
    Rejection,
    Token,
    consume_token,
    invalid_value,
    token,
  },
  error::ArgStringError,
  value::Value,
};

/// A signed integer.
#[derive(Debug, Clone, PartialEq)]
pub struct Int {
  pub(crate) label:   String,
  pub(crate) name:    String,
  pub(crate) default: Value,
}

impl Int {
  pub fn new(name: &str) -> Self {
    Self {
      label:   name.to_string(),
      name:    name.replace('-', "_"),
      default: Value::None,
    }
  }

  pub fn default(mut self, value: i64) -> Self {
    self.default = Value::Int(value);
    self
  }

  pub(crate) fn consume(&self, text: &str, index: usize) -> Result<(Value, usize), Rejection> {
    consume_token(text, index, &self.default, |word| {
      word
        .parse::<i64>()
        .map(Value::Int)
        .map_err(|err| format!("'{word}' is not an integer: {err}"))
    })
  }

  fn hint<T>(&self, text: &str, index: usize, active: impl FnOnce() -> T) -> Hint<T> {
    match token(text, index) {
      Token::End => Hint::Active(active()),
      Token::Skip => Hint::Consumed(index + 1),
      Token::Word {
        text: word,
        end,
        complete: true,
        ..
      } => {
        match word.parse::<i64>() {
          Ok(_) => Hint::Consumed(end),
          Err(_) => Hint::Invalid,
        }
      },
      Token::Word { text: word, .. } => {
        if word == "-" || word == "+" || word.parse::<i64>().is_ok() {
          Hint::Active(active())
        } else {
          Hint::Invalid
        }
      },
    }
  }

  pub(crate) fn placeholder(&self, text: &str, index: usize) -> Hint<String> {
    if index >= text.len() {
      return Hint::Active(self.default_placeholder());
    }
    self.hint(text, index, String::new)
  }

  pub(crate) fn completions(&self, text: &str, index: usize) -> Hint<Vec<String>> {
    self.hint(text, index, Vec::new)
  }

  pub(crate) fn default_placeholder(&self) -> String {
    match self.default {
      Value::Int(value) => value.to_string(),
      _ => self.label.clone(),
    }
  }

  pub(crate) fn arg_string(&self, value: &Value) -> Result<String, ArgStringError> {
    if *value == self.default {
      return Ok(String::new());
    }
    match value {
      Value::Int(value) => Ok(value.to_string()),
      Value::None => Ok(String::new()),
      _ => Err(invalid_value(&self.name, value)),
    }
  }
}
