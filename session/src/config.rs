//! Session configuration from process arguments and environment

use std::ffi::OsString;
use std::path::PathBuf;

use error_stack::Report;

use crate::error::{Error, Result};
use crate::support::tracing::TracingLevel;

/// Environment variable selecting the log level
pub const LOG_LEVEL_ENV: &str = "SCHEMA_FORM_LOG_LEVEL";

/// Environment variable selecting the log directory
pub const LOG_DIR_ENV: &str = "SCHEMA_FORM_LOG_DIR";

/// File name of the session log inside the log directory
pub const LOG_FILE_NAME: &str = "schema_form_session.log";

const USAGE: &str = "usage: schema_form_session <schema.json> [form-data.json]";

/// Everything the session needs before it starts reading commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Schema document to open
    pub schema_path:    PathBuf,
    /// Persisted form data to open, if any
    pub form_data_path: Option<PathBuf>,
    /// Initial log level
    pub log_level:      TracingLevel,
    /// Directory of the log file
    pub log_dir:        PathBuf,
}

impl SessionConfig {
    /// Read the configuration of this process
    pub fn from_env() -> Result<Self> {
        Self::from_parts(std::env::args_os().skip(1), |key| std::env::var(key).ok())
    }

    /// Build a configuration from positional arguments and an environment lookup
    pub fn from_parts<I, E>(args: I, env: E) -> Result<Self>
    where
        I: IntoIterator<Item = OsString>,
        E: Fn(&str) -> Option<String>,
    {
        let mut args = args.into_iter();
        let schema_path = args
            .next()
            .map(PathBuf::from)
            .ok_or_else(|| Report::new(Error::Config(format!("missing schema path; {USAGE}"))))?;
        let form_data_path = args.next().map(PathBuf::from);
        if let Some(extra) = args.next() {
            return Err(Report::new(Error::Config(format!(
                "unexpected argument '{}'; {USAGE}",
                extra.to_string_lossy()
            ))));
        }

        let log_level = match env(LOG_LEVEL_ENV).filter(|value| !value.trim().is_empty()) {
            Some(value) => value.trim().parse::<TracingLevel>().map_err(|_| {
                Report::new(Error::Config(format!(
                    "Invalid {LOG_LEVEL_ENV} '{value}'. Valid levels are: error, warn, info, debug, trace"
                )))
            })?,
            None => TracingLevel::Warn,
        };
        let log_dir = env(LOG_DIR_ENV)
            .filter(|value| !value.trim().is_empty())
            .map_or_else(std::env::temp_dir, PathBuf::from);

        Ok(Self {
            schema_path,
            form_data_path,
            log_level,
            log_dir,
        })
    }

    /// Full path of the log file
    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(LOG_FILE_NAME)
    }
}
