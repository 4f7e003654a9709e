//! Error types for schema authoring and form editing

use thiserror::Error;

/// Result type for the `schema_form_engine` library
pub type Result<T> = std::result::Result<T, error_stack::Report<Error>>;

/// Errors surfaced by schema authoring and form editing
///
/// None of these are fatal: every operation that returns one leaves the
/// schema and form data exactly as they were before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A key is already used in the list it is being added to
    #[error("A {what} with key '{key}' already exists")]
    DuplicateKey {
        /// What kind of item collided (field, section, subsection)
        what: &'static str,
        /// The colliding key
        key:  String,
    },

    /// A location entry already holds the requested country
    #[error("Country '{country}' is already selected in entry {index}")]
    DuplicateCountry {
        /// Country that is already taken
        country: String,
        /// Entry that holds it
        index:   usize,
    },

    /// Location entry index is past the end of the entry list
    #[error("Location entry {index} not found (len {len})")]
    EntryIndexOutOfRange {
        /// Requested entry
        index: usize,
        /// Number of entries
        len:   usize,
    },

    /// Field index is past the end of the field list
    #[error("Field index {index} not found (len {len})")]
    FieldIndexOutOfRange {
        /// Requested field index
        index: usize,
        /// Number of fields
        len:   usize,
    },

    /// Authoring input is missing a required attribute
    #[error("Incomplete input: {0}")]
    IncompleteField(String),

    /// Persisted form data does not have the expected shape
    #[error("Invalid form data: {0}")]
    InvalidFormData(String),

    /// A schema document has the schema envelope but not a schema's shape
    #[error("Invalid schema document: {0}")]
    InvalidSchema(String),

    /// A path string cannot address a value
    #[error("Invalid path '{0}'")]
    InvalidPath(String),

    /// The last location entry cannot be removed
    #[error("At least one location entry is required")]
    LastEntry,

    /// A portion edit would push the running total over the cap
    #[error("{message} (total would be {proposed}, max {max_total})")]
    PortionLimitExceeded {
        /// Total the edit would have produced
        proposed:  f64,
        /// Configured cap
        max_total: f64,
        /// Author supplied message
        message:   String,
    },

    /// No section with the given key
    #[error("Section '{0}' not found")]
    UnknownSection(String),

    /// No subsection with the given key in the section
    #[error("Subsection '{subsection}' not found in section '{section}'")]
    UnknownSubsection {
        /// Owning section key
        section:    String,
        /// Requested subsection key
        subsection: String,
    },
}

impl Error {
    /// Create a duplicate field key error
    pub fn duplicate_field(key: impl Into<String>) -> Self {
        Self::DuplicateKey {
            what: "field",
            key:  key.into(),
        }
    }

    /// Create a duplicate section key error
    pub fn duplicate_section(key: impl Into<String>) -> Self {
        Self::DuplicateKey {
            what: "section",
            key:  key.into(),
        }
    }

    /// Create a duplicate subsection key error
    pub fn duplicate_subsection(key: impl Into<String>) -> Self {
        Self::DuplicateKey {
            what: "subsection",
            key:  key.into(),
        }
    }

    /// Create a "missing X" incomplete input error
    pub fn missing(what: &str) -> Self {
        Self::IncompleteField(format!("missing {what}"))
    }
}
