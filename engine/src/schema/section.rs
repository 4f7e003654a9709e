//! Sections, subsections and the schema document itself

use error_stack::Report;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::condition::Condition;
use super::field::Field;
use crate::constants::{DEFAULT_SCHEMA_TITLE, DEFAULT_SECTION_KEY, JSON_SCHEMA_DRAFT};
use crate::error::{Error, Result};
use crate::path::FieldPath;

/// Conditionally visible group of fields inside a section
///
/// Its data lives in its own slice `{section}.{subsection}`; while hidden
/// that whole slice is `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Subsection {
    /// Heading
    pub title:     String,
    /// Key of the subsection's data slice within its section
    pub key:       String,
    /// Visibility gate for the whole group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    /// Fields of the group
    #[serde(default)]
    pub fields:    Vec<Field>,
}

impl Subsection {
    /// An empty, always visible subsection
    pub fn new(title: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            title:     title.into(),
            key:       key.into(),
            condition: None,
            fields:    Vec::new(),
        }
    }

    /// Set the visibility gate
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Set the fields
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }
}

/// Top-level group of fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Section {
    /// Heading
    pub title:       String,
    /// Key of the section's data slice under the schema root
    pub key:         String,
    /// Top-level fields
    #[serde(default)]
    pub fields:      Vec<Field>,
    /// Conditionally visible groups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsections: Option<Vec<Subsection>>,
}

impl Section {
    /// An empty section
    pub fn new(title: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            title:       title.into(),
            key:         key.into(),
            fields:      Vec::new(),
            subsections: None,
        }
    }

    /// Set the top-level fields
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    /// Append a subsection
    #[must_use]
    pub fn with_subsection(mut self, subsection: Subsection) -> Self {
        self.subsections.get_or_insert_with(Vec::new).push(subsection);
        self
    }

    /// Subsections, empty when none are declared
    pub fn subsections(&self) -> &[Subsection] {
        self.subsections.as_deref().unwrap_or_default()
    }

    /// Subsection by key
    pub fn subsection(&self, key: &str) -> Option<&Subsection> {
        self.subsections().iter().find(|s| s.key == key)
    }

    /// Mutable subsection by key
    pub fn subsection_mut(&mut self, key: &str) -> Option<&mut Subsection> {
        self.subsections
            .as_mut()
            .and_then(|subs| subs.iter_mut().find(|s| s.key == key))
    }
}

/// Declarative description of one multi-section form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    /// JSON Schema dialect marker carried by persisted documents
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema_uri:  Option<String>,
    /// Display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title:       Option<String>,
    /// Root namespace for all form data this schema produces
    pub section_key: String,
    /// Sections in display order
    #[serde(default)]
    pub sections:    Vec<Section>,
}

impl Default for FormSchema {
    fn default() -> Self {
        Self::empty(DEFAULT_SECTION_KEY, DEFAULT_SCHEMA_TITLE)
    }
}

impl FormSchema {
    /// A schema with no sections, stamped with the draft-07 dialect
    pub fn empty(section_key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            schema_uri:  Some(JSON_SCHEMA_DRAFT.to_string()),
            title:       Some(title.into()),
            section_key: section_key.into(),
            sections:    Vec::new(),
        }
    }

    /// Parse a persisted document, falling back to the default schema
    ///
    /// A document without a `sectionKey` or without a `sections` list is
    /// treated the same as no document at all. A document that has both but
    /// does not describe a schema is an error.
    pub fn from_value_or_default(value: &Value) -> Result<Self> {
        let well_formed = value
            .get("sectionKey")
            .and_then(Value::as_str)
            .is_some_and(|key| !key.is_empty())
            && value.get("sections").is_some_and(Value::is_array);
        if !well_formed {
            tracing::debug!("Schema document missing sectionKey or sections, using default");
            return Ok(Self::default());
        }
        serde_json::from_value(value.clone()).map_err(|e| {
            tracing::warn!("Schema document failed to parse: {e}");
            Report::new(Error::InvalidSchema(e.to_string()))
        })
    }

    /// Append a section
    #[must_use]
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Section by key
    pub fn section(&self, key: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.key == key)
    }

    /// Mutable section by key
    pub fn section_mut(&mut self, key: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.key == key)
    }

    /// Path of a section's data slice
    pub fn section_path(&self, section: &str) -> FieldPath {
        FieldPath::new(self.section_key.as_str()).join(section)
    }

    /// Path of a top-level field's value
    pub fn field_path(&self, section: &str, field: &str) -> FieldPath {
        self.section_path(section).join(field)
    }

    /// Path of a subsection's data slice
    pub fn subsection_path(&self, section: &str, subsection: &str) -> FieldPath {
        self.section_path(section).join(subsection)
    }
}

/// JSON Schema describing the schema document format
pub fn format_json_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(FormSchema)).unwrap_or(Value::Null)
}
