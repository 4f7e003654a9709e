//! # Schema Form Session
//!
//! A line-oriented host for the schema form engine. It opens a schema
//! document and optional persisted form data, then answers one JSON command
//! per stdin line with one JSON response per stdout line.
//!
//! Logs go to a file in the log directory, never to stdout.

use std::io;
use std::process::ExitCode;

use config::SessionConfig;
use session::Session;
use support::tracing::TracingLevel;

mod command;
mod config;
mod error;
mod session;
mod support;

fn main() -> ExitCode {
    let config = match SessionConfig::from_env() {
        Ok(config) => config,
        Err(report) => {
            eprintln!("{}", report.current_context());
            return ExitCode::FAILURE;
        }
    };

    // Log file is created lazily on the first write
    TracingLevel::init_file_tracing(config.log_level, config.log_path());
    tracing::info!("Starting session for '{}'", config.schema_path.display());

    let result = Session::open(&config).and_then(|mut session| {
        tracing::info!(
            "Session ready with {} field(s)",
            session.editor().all_field_paths().len()
        );
        session.run(io::stdin().lock(), io::stdout().lock())
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            tracing::error!("Session failed: {report:?}");
            eprintln!("{}", report.current_context());
            ExitCode::FAILURE
        }
    }
}
