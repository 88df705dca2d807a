//! CLI command implementations
//!
//! Boot sequence shared by `serve` and `start`:
//! 1. Load and validate config
//! 2. Initialise tracing from the log section
//! 3. Open the configured stores
//! 4. Build the API handler

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tracing::info;

use super::args::Command;
use super::config::{Config, StorageBackend};
use super::errors::CliResult;
use super::io::{read_json_file, read_lines, write_line, write_pretty};
use crate::api::ApiHandler;
use crate::http_server::HttpServer;
use crate::observability::{init_tracing, Event, LogFormat};
use crate::record::Record;
use crate::schema::{SchemaTree, SchemaValidator};
use crate::store::Stores;

/// Exit status of `check` when the record has violations
pub const EXIT_VIOLATIONS: i32 = 2;

/// Run a parsed command, returning the process exit status.
pub fn run_command(command: Command) -> CliResult<i32> {
    match command {
        Command::Init { config } => init(&config).map(|_| 0),
        Command::Serve { config, port } => serve(&config, port).map(|_| 0),
        Command::Start { config } => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            start(&config, stdin.lock(), &mut stdout.lock()).map(|_| 0)
        }
        Command::Check { schema, record } => {
            init_tracing(LogFormat::Pretty, "warn");
            check(&schema, &record, &mut io::stdout().lock())
        }
    }
}

/// Writes a default config when none exists, then prepares the data
/// directory for file storage.
pub fn init(config_path: &Path) -> CliResult<Config> {
    if !config_path.exists() {
        Config::default().save(config_path)?;
    }
    let config = Config::load(config_path)?;
    init_tracing(config.log.format, &config.log.level);

    if config.storage == StorageBackend::File {
        Stores::open_dir(&config.data_path())?;
    }
    info!(
        event = Event::ConfigLoaded.as_str(),
        config = %config_path.display(),
        data_dir = %config.data_dir,
        "initialized"
    );
    Ok(config)
}

/// Load config, start logging, open stores.
pub fn boot(config_path: &Path) -> CliResult<(Config, ApiHandler)> {
    let config = Config::load(config_path)?;
    init_tracing(config.log.format, &config.log.level);
    info!(
        event = Event::ConfigLoaded.as_str(),
        config = %config_path.display(),
        "config loaded"
    );

    let stores = open_stores(&config)?;
    info!(
        event = Event::StoresOpened.as_str(),
        storage = ?config.storage,
        analysis_mode = ?config.analysis_mode,
        "stores opened"
    );
    let handler = ApiHandler::new(stores, config.analysis_mode);
    Ok((config, handler))
}

fn open_stores(config: &Config) -> CliResult<Stores> {
    match config.storage {
        StorageBackend::Memory => Ok(Stores::in_memory()),
        StorageBackend::File => Ok(Stores::open_dir(&config.data_path())?),
    }
}

/// Serve HTTP until interrupted.
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let (mut config, handler) = boot(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let server = HttpServer::new(config.http.clone(), Arc::new(handler));

    runtime.block_on(async move {
        tokio::select! {
            result = server.start() => result,
            _ = tokio::signal::ctrl_c() => {
                info!(event = Event::Shutdown.as_str(), "interrupt received");
                Ok(())
            }
        }
    })?;
    Ok(())
}

/// Answer one JSON envelope per input line until EOF.
pub fn start<R: BufRead, W: Write>(config_path: &Path, input: R, output: &mut W) -> CliResult<()> {
    let (_, handler) = boot(config_path)?;
    info!(event = Event::StdinLoopStart.as_str(), "reading requests");
    serve_lines(&handler, input, output)
}

/// Request loop without the boot step
pub fn serve_lines<R: BufRead, W: Write>(
    handler: &ApiHandler,
    input: R,
    output: &mut W,
) -> CliResult<()> {
    for line in read_lines(input) {
        let response = handler.handle(&line?);
        write_line(output, &response.to_json())?;
    }
    Ok(())
}

/// Validate one record against one schema, print the report, and
/// return 0 when clean or `EXIT_VIOLATIONS` otherwise.
pub fn check<W: Write>(schema_path: &Path, record_path: &Path, output: &mut W) -> CliResult<i32> {
    let schema = SchemaTree::parse(&read_json_file(schema_path)?)?;
    let record = Record::from_json(&read_json_file(record_path)?)?;
    let report = SchemaValidator::new(&schema).inspect(&record);

    let clean = report.outcome.is_clean();
    write_pretty(
        output,
        &json!({
            "clean": clean,
            "outcome": report.outcome,
            "violations": report.violations,
        }),
    )?;
    Ok(if clean { 0 } else { EXIT_VIOLATIONS })
}
