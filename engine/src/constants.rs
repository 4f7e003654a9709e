//! Constants shared across the form engine
//!
//! Defaults applied when a schema or field leaves a setting out, plus the
//! JSON member names used when the engine inspects raw form data.

// ============================================================================
// SCHEMA DEFAULTS
// ============================================================================

/// JSON Schema dialect stamped into newly created schema documents
pub const JSON_SCHEMA_DRAFT: &str = "http://json-schema.org/draft-07/schema#";

/// Root namespace used when no valid schema was supplied
pub const DEFAULT_SECTION_KEY: &str = "generalInfo";

/// Title used when no valid schema was supplied
pub const DEFAULT_SCHEMA_TITLE: &str = "Untitled";

// ============================================================================
// LOCATION PORTION
// ============================================================================

/// Cap applied to the sum of location portions when a field sets none
pub const DEFAULT_MAX_TOTAL: f64 = 100.0;

/// Message shown when the portion total is over the cap
pub const DEFAULT_PORTION_ERROR: &str = "exceeds 100%";

/// JSON member holding the country of a location entry
pub const ENTRY_COUNTRY: &str = "country";

/// JSON member holding the portion of a location entry
pub const ENTRY_PORTION: &str = "portion";

// ============================================================================
// PATHS AND CASCADE
// ============================================================================

/// Separator between segments of a form data path
pub const PATH_SEPARATOR: char = '.';

/// Separator for comma-separated authoring input (options, condition lists)
pub const LIST_SEPARATOR: char = ',';

/// Upper bound on cascade passes before the reset loop gives up
///
/// Each pass can only move values toward their defaults, so an acyclic schema
/// settles in at most one pass per field. The ceiling only matters for
/// conditions that reference each other in a cycle.
pub const MAX_CASCADE_PASSES: usize = 64;
