pub mod cli;
pub mod clipboard;
pub mod command;
pub mod config;
pub mod executor;
pub mod logger;
pub mod options;
pub mod parser;
pub mod report;
pub mod runner;
pub mod theme;
pub mod tui;

pub use cli::{Cli, Commands};
pub use command::{parse_command, BuildCommand, CommandBuilder};
pub use config::Config;
pub use executor::{execute_build, BuildOutcome, OutcomeKind};
pub use options::{BuildOptions, ValidationError};
pub use report::BuildReport;
pub use runner::{BuildError, BuildEvent, BuildState, BuildWorker};
pub use theme::{Palette, ThemeName};
