//! Line-oriented shell around the closure calculator and the ledger.
//!
//! Interactive sessions use a line editor with completion; setting
//! `NIGHTLY_CLOSE_CLI_SCRIPT` reads commands from stdin instead.

pub mod commands;
mod context;
pub mod output;
mod shell;

pub use context::{CliError, CliMode, CommandError, CommandResult, ShellContext};
pub use shell::{run_cli, SCRIPT_ENV};
