//! CLI argument definitions using clap
//!
//! Commands:
//! - shapestat init --config <path>
//! - shapestat serve --config <path> [--port N]
//! - shapestat start --config <path>
//! - shapestat check --schema <file> --record <file>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// shapestat - schema-driven record validation with running statistics
#[derive(Parser, Debug)]
#[command(name = "shapestat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Write a default config and create the data directory
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./shapestat.json")]
        config: PathBuf,
    },

    /// Serve the HTTP API
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./shapestat.json")]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Answer line-delimited JSON requests on stdin
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./shapestat.json")]
        config: PathBuf,
    },

    /// Validate one record file against one schema file and exit
    Check {
        /// Schema in wire format (JSON field array)
        #[arg(long)]
        schema: PathBuf,

        /// Record as a JSON object
        #[arg(long)]
        record: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
