//! Observability for shapestat
//!
//! Structured logging through `tracing`. Call sites attach an `event`
//! field from [`Event`] plus whatever identifiers matter
//! (`schema_id`, `record_id`, counts). The subscriber is configured
//! once at startup from the log section of the config file.
//!
//! Logs go to stderr so the stdin/stdout request loop stays clean.

mod events;

pub use events::Event;

use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// Newline-delimited JSON
    Json,
}

/// Levels accepted in the config file
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Initialise the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` applies to every target.
/// Only the first call in a process takes effect.
pub fn init_tracing(format: LogFormat, level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr)
                        .json(),
                )
                .try_init()
                .ok();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .try_init()
                .ok();
        }
    }
}
