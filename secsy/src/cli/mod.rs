pub mod app;
pub mod commands;
pub mod dynamic;

pub use app::{Cli, Commands, UtilsSubcommand};
pub use dynamic::{EarlyArgs, build_command};
