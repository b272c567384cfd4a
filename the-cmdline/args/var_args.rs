use crate::{
  args::{
    Hint,
    Rejection,
    invalid_value,
  },
  error::ArgStringError,
  value::Value,
};

/// The rest of the line, verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct VarArgs {
  pub(crate) label:       String,
  pub(crate) name:        String,
  pub(crate) placeholder: String,
  pub(crate) default:     Value,
}

impl VarArgs {
  pub fn new(name: &str) -> Self {
    Self {
      label:       name.to_string(),
      name:        name.replace('-', "_"),
      placeholder: "...".to_string(),
      default:     Value::None,
    }
  }

  pub fn placeholder_text(mut self, placeholder: &str) -> Self {
    self.placeholder = placeholder.to_string();
    self
  }

  pub(crate) fn consume(&self, text: &str, index: usize) -> Result<(Value, usize), Rejection> {
    match text.get(index..).filter(|rest| !rest.is_empty()) {
      Some(rest) => Ok((Value::from(rest), text.len())),
      None => Ok((self.default.clone(), index)),
    }
  }

  pub(crate) fn placeholder(&self, text: &str, index: usize) -> Hint<String> {
    if index >= text.len() {
      Hint::Active(self.default_placeholder())
    } else {
      Hint::Active(String::new())
    }
  }

  pub(crate) fn completions(&self, _text: &str, _index: usize) -> Hint<Vec<String>> {
    Hint::Active(Vec::new())
  }

  pub(crate) fn default_placeholder(&self) -> String {
    self.placeholder.clone()
  }

  pub(crate) fn arg_string(&self, value: &Value) -> Result<String, ArgStringError> {
    if *value == self.default {
      return Ok(String::new());
    }
    match value {
      Value::Str(rest) => Ok(rest.clone()),
      Value::None => Ok(String::new()),
      _ => Err(invalid_value(&self.name, value)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::args::testing::*;

  #[test]
  fn consume_rest_of_line() {
    let arg = VarArgs::new("args");
    assert_consume(arg.clone(), "", 0, Value::None, 0);
    assert_consume(arg.clone(), "abc", 3, Value::None, 3);
    assert_consume(arg.clone(), "a b  c ", 0, "a b  c ", 7);
    assert_consume(arg.clone(), "x  y", 2, " y", 4);
  }

  #[test]
  fn placeholder() {
    assert_placeholder(VarArgs::new("args"), "", 0, Hint::Active("..."));
    assert_placeholder(
      VarArgs::new("args").placeholder_text("command"),
      "x ",
      2,
      Hint::Active("command"),
    );
    assert_placeholder(VarArgs::new("args"), "x y", 0, Hint::Active(""));
    assert_completions(VarArgs::new("args"), "x y", 0, Hint::Active(vec![]));
  }

  #[test]
  fn arg_string() {
    assert_arg_string(VarArgs::new("args"), Value::None, "");
    assert_arg_string(VarArgs::new("args"), "a  b", "a  b");
    assert_invalid_value(VarArgs::new("args"), 3);
  }
}
