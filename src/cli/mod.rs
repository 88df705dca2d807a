//! CLI module for shapestat
//!
//! Provides command-line interface for:
//! - init: write a default config, prepare the data directory
//! - serve: HTTP API
//! - start: line-delimited JSON requests on stdin
//! - check: offline validation of one record file

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{boot, check, init, run_command, serve, serve_lines, start, EXIT_VIOLATIONS};
pub use config::{Config, LogConfig, StorageBackend};
pub use errors::{CliError, CliResult};

/// Parse arguments and run, returning the process exit status.
pub fn run() -> CliResult<i32> {
    run_command(Cli::parse_args().command)
}
