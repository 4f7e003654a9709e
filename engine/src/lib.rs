//! Declarative schema-driven form engine
//!
//! A [`FormSchema`] describes a multi-section form: fields of eleven kinds,
//! grouped in sections and conditionally visible subsections, each of which
//! may be gated on another field's value. The engine provides:
//!
//! - [`path`]: dotted-path reads and writes into nested form data
//! - [`evaluator`]: the condition predicate
//! - [`builder`]: field list authoring with key uniqueness
//! - [`renderer`]: normalization, the reset cascade and widget descriptors
//! - [`editor`]: the owner of one schema and its form data
//!
//! The invariant the engine maintains: after any edit, every field whose
//! condition is false holds its type default, and every hidden subsection's
//! data slice is `null`.

pub mod builder;
pub mod constants;
pub mod editor;
pub mod error;
pub mod evaluator;
pub mod form_data;
pub mod json_traits;
pub mod path;
pub mod renderer;
pub mod schema;

pub use builder::{BuilderSession, FieldDraft, FieldListEditor, MoveDirection};
pub use editor::{FieldScope, FormEdit, SchemaEditor, normalize_bundle};
pub use error::{Error, Result};
pub use evaluator::evaluate;
pub use form_data::FormData;
pub use path::{FieldPath, get_value_from_path, set_value_at_path};
pub use renderer::{FormRenderer, LocationEntry, LocationPortion, RenderedSection, Widget};
pub use schema::{
    Condition, ConditionValue, Field, FieldKind, FieldType, FormSchema, PlantSchemas, SchemaIssue,
    Section, Severity, Subsection, Validation,
};
