pub mod commands;
pub mod context;
pub mod help;
pub mod output;
pub mod registry;
mod shell;
pub mod system_clock;

pub use context::{CliMode, CommandError, CommandResult, ShellContext};
pub use shell::{run_cli, SCRIPT_ENV};
