use error_stack::Report;
use thiserror::Error;

/// Result type for the session host
pub type Result<T> = std::result::Result<T, Report<Error>>;

/// Errors surfaced by the session host
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid process arguments or environment
    #[error("Configuration error: {0}")]
    Config(String),

    /// The engine rejected an operation; the message is the engine's own
    #[error("{0}")]
    Engine(String),

    /// Reading or writing a document failed
    #[error("File operation failed: {0}")]
    FileOperation(String),

    /// A request line could not be understood
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// A document did not parse or serialize
    #[error("Invalid JSON document: {0}")]
    InvalidDocument(String),

    /// The request or response stream failed
    #[error("Session stream failed")]
    Stream,
}

impl Error {
    /// Lift an engine report, keeping the engine's message on top
    pub fn from_engine(report: Report<schema_form_engine::Error>) -> Report<Self> {
        let message = report.current_context().to_string();
        report.change_context(Self::Engine(message))
    }

    /// Create a file operation error naming the path
    pub fn file(action: &str, path: &std::path::Path) -> Self {
        Self::FileOperation(format!("{action} '{}'", path.display()))
    }
}
