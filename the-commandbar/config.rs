use std::{
  fs,
  io::Error as IOError,
  path::Path,
};

use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;
use toml::de::Error as TomlError;

use crate::history::DEFAULT_HISTORY_LIMIT;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("bad command bar config: {0}")]
  BadConfig(#[from] TomlError),
  #[error(transparent)]
  Error(#[from] IOError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct CommandBarConfig {
  /// Command lines kept in history, at least one.
  pub history_limit:   usize,
  /// Completions offered at once; `0` offers all of them.
  pub max_completions: usize,
}

impl Default for CommandBarConfig {
  fn default() -> Self {
    Self {
      history_limit:   DEFAULT_HISTORY_LIMIT,
      max_completions: 0,
    }
  }
}

impl CommandBarConfig {
  pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
    let mut config: Self = toml::from_str(text)?;
    config.history_limit = config.history_limit.max(1);
    Ok(config)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let text = fs::read_to_string(path)?;
    Self::from_toml(&text)
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  #[test]
  fn empty_config_uses_defaults() {
    assert_eq!(CommandBarConfig::from_toml("").unwrap(), CommandBarConfig::default());
  }

  #[test]
  fn parses_kebab_case_keys() {
    let config = CommandBarConfig::from_toml("history-limit = 10\nmax-completions = 5\n").unwrap();
    assert_eq!(config, CommandBarConfig {
      history_limit:   10,
      max_completions: 5,
    });
  }

  #[test]
  fn history_limit_is_at_least_one() {
    let config = CommandBarConfig::from_toml("history-limit = 0").unwrap();
    assert_eq!(config.history_limit, 1);
  }

  #[test]
  fn rejects_unknown_keys() {
    assert!(matches!(
      CommandBarConfig::from_toml("history_limit = 3"),
      Err(ConfigError::BadConfig(_))
    ));
  }

  #[test]
  fn load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max-completions = 3").unwrap();
    let config = CommandBarConfig::load(file.path()).unwrap();
    assert_eq!(config.max_completions, 3);
    assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);

    assert!(matches!(
      CommandBarConfig::load(file.path().with_extension("missing")),
      Err(ConfigError::Error(_))
    ));
  }
}
