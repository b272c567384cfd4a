//! Named option bags produced by parsing.

use std::fmt;

use indexmap::IndexMap;

use crate::value::Value;

/// Mapping from argument name to parsed value.
///
/// Insertion order follows declaration order so that rendering is stable,
/// but equality ignores order: two bags are equal when they hold the same
/// names with equal values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
  values: IndexMap<String, Value>,
}

impl Options {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builder-style insert.
  pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
    self.set(name, value);
    self
  }

  pub fn get(&self, name: &str) -> Option<&Value> {
    self.values.get(name)
  }

  pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
    self.values.insert(name.into(), value.into());
  }

  pub fn remove(&mut self, name: &str) -> Option<Value> {
    self.values.shift_remove(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.values.contains_key(name)
  }

  /// Copies every entry of `other` into `self`, replacing existing names.
  pub fn update(&mut self, other: &Options) {
    for (name, value) in other {
      self.values.insert(name.clone(), value.clone());
    }
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.values.keys().map(String::as_str)
  }

  pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
    self.values.iter()
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

impl<'a> IntoIterator for &'a Options {
  type Item = (&'a String, &'a Value);
  type IntoIter = indexmap::map::Iter<'a, String, Value>;

  fn into_iter(self) -> Self::IntoIter {
    self.values.iter()
  }
}

impl<K, V> FromIterator<(K, V)> for Options
where
  K: Into<String>,
  V: Into<Value>,
{
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut options = Self::new();
    options.extend(iter);
    options
  }
}

impl<K, V> Extend<(K, V)> for Options
where
  K: Into<String>,
  V: Into<Value>,
{
  fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
    for (name, value) in iter {
      self.set(name, value);
    }
  }
}

impl fmt::Display for Options {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Options(")?;
    for (i, (name, value)) in self.values.iter().enumerate() {
      if i > 0 {
        f.write_str(", ")?;
      }
      write!(f, "{name}={value}")?;
    }
    f.write_str(")")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn equality_ignores_order() {
    let a = Options::new().with("x", 1).with("y", "abc");
    let b = Options::new().with("y", "abc").with("x", 1);
    assert_eq!(a, b);
    assert_ne!(a, Options::new().with("x", 1));
    assert_ne!(a, Options::new().with("x", 2).with("y", "abc"));
  }

  #[test]
  fn update_replaces_and_extends() {
    let mut options = Options::new().with("x", 1).with("y", true);
    options.update(&Options::new().with("y", false).with("z", "new"));
    assert_eq!(
      options,
      Options::new().with("x", 1).with("y", false).with("z", "new")
    );
  }

  #[test]
  fn display_keeps_insertion_order() {
    let options: Options = [("yes", Value::Bool(true)), ("arg", Value::from("all"))]
      .into_iter()
      .collect();
    assert_eq!(options.to_string(), "Options(yes=true, arg=\"all\")");
    assert_eq!(Options::new().to_string(), "Options()");
  }

  #[test]
  fn remove_keeps_remaining_order() {
    let mut options = Options::new().with("a", 1).with("b", 2).with("c", 3);
    assert_eq!(options.remove("a"), Some(Value::Int(1)));
    assert_eq!(options.names().collect::<Vec<_>>(), ["b", "c"]);
    assert!(!options.contains("a"));
  }
}
