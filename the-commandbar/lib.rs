//! The command bar host: named text commands, their history and the
//! built-in `find` command, all driven by `the-cmdline` grammars.

pub mod bar;
pub mod command;
pub mod config;
pub mod find;
pub mod history;
pub mod registry;

pub use bar::CommandBar;
pub use command::{
  CommandError,
  CommandFn,
  CommandResult,
  TextCommand,
};
pub use config::{
  CommandBarConfig,
  ConfigError,
};
pub use find::{
  FindAction,
  FindContext,
  FindOptions,
  FindTarget,
  Finder,
  SearchType,
};
pub use history::{
  DEFAULT_HISTORY_LIMIT,
  History,
  HistoryEntry,
  load_options,
  save_options,
};
pub use registry::CommandRegistry;
