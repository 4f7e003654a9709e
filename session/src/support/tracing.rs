use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

use super::lazy_file_writer::LazyFileWriter;

static CURRENT_LEVEL: AtomicU8 = AtomicU8::new(TracingLevel::Warn.as_u8());

/// Level filter that can be changed while the session runs
#[derive(Clone)]
pub struct DynamicFilter;

impl<S> Layer<S> for DynamicFilter
where
    S: Subscriber,
{
    fn enabled(&self, metadata: &tracing::Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        level_value(*metadata.level()) <= CURRENT_LEVEL.load(Ordering::Relaxed)
    }
}

const fn level_value(level: Level) -> u8 {
    match level {
        Level::ERROR => 0,
        Level::WARN => 1,
        Level::INFO => 2,
        Level::DEBUG => 3,
        Level::TRACE => 4,
    }
}

/// Tracing levels accepted in configuration and at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum TracingLevel {
    /// Errors only
    Error,
    /// Rejected edits and unsupported schema content
    Warn,
    /// Session lifecycle
    Info,
    /// Every command and cascade
    Debug,
    /// Everything
    Trace,
}

impl TracingLevel {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Error => 0,
            Self::Warn => 1,
            Self::Info => 2,
            Self::Debug => 3,
            Self::Trace => 4,
        }
    }

    /// Install the file subscriber at `level`
    ///
    /// The log file is only created once something is written to it; nothing
    /// is ever written to stdout, which carries the responses.
    pub fn init_file_tracing(level: Self, log_path: PathBuf) {
        CURRENT_LEVEL.store(level.as_u8(), Ordering::Relaxed);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(LazyFileWriter::new(log_path))
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        let subscriber = Registry::default().with(DynamicFilter).with(file_layer);
        if let Err(e) = subscriber.try_init() {
            eprintln!("Tracing subscriber already installed: {e}");
        }
    }

    /// The level currently in effect
    pub fn current() -> Self {
        match CURRENT_LEVEL.load(Ordering::Relaxed) {
            0 => Self::Error,
            2 => Self::Info,
            3 => Self::Debug,
            4 => Self::Trace,
            _ => Self::Warn,
        }
    }

    /// Change the level while the session runs
    pub fn set_tracing_level(level: Self) {
        CURRENT_LEVEL.store(level.as_u8(), Ordering::Relaxed);
        match level {
            Self::Error => tracing::error!("Tracing level set to: error"),
            Self::Warn => tracing::warn!("Tracing level set to: warn"),
            Self::Info => tracing::info!("Tracing level set to: info"),
            Self::Debug => tracing::debug!("Tracing level set to: debug"),
            Self::Trace => tracing::trace!("Tracing level set to: trace"),
        }
    }
}
