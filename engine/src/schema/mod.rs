//! Declarative schema model
//!
//! A [`FormSchema`] is a list of [`Section`]s, each holding [`Field`]s and
//! optional [`Subsection`]s. Fields and subsections may carry a
//! [`Condition`] that gates their visibility on another field's value.

mod bundle;
mod condition;
mod field;
mod index;
mod section;
mod validate;

pub use bundle::PlantSchemas;
pub use condition::{Condition, ConditionValue};
pub use field::{Field, FieldKind, FieldType, Validation};
pub use index::{FieldId, FieldNode, SchemaIndex};
pub use section::{FormSchema, Section, Subsection, format_json_schema};
pub use validate::{SchemaIssue, Severity, has_errors, validate};
