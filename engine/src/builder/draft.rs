//! Authoring form for a single field
//!
//! Everything here works on the raw text an author types: option lists are
//! comma separated and condition values are parsed from free text into a
//! boolean, a list or a plain string.

use error_stack::Report;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::FieldListEditor;
use crate::constants::LIST_SEPARATOR;
use crate::error::{Error, Result};
use crate::json_traits::IntoStrings;
use crate::schema::{Condition, ConditionValue, Field, FieldKind, FieldType, Validation};

/// Split comma-separated option input into trimmed, non-empty options
pub fn parse_options(input: &str) -> Vec<String> {
    input
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|option| !option.is_empty())
        .into_strings()
}

/// Interpret free-text condition input
///
/// `true`/`false` in any case become booleans, a JSON object becomes a
/// member-subset condition, text containing a comma becomes a list of trimmed
/// strings and anything else is kept as typed.
pub fn parse_condition_value(input: &str) -> ConditionValue {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        return ConditionValue::Flag(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return ConditionValue::Flag(false);
    }
    if trimmed.starts_with('{')
        && let Ok(Value::Object(members)) = serde_json::from_str::<Value>(trimmed)
    {
        return ConditionValue::Subset(members);
    }
    if input.contains(LIST_SEPARATOR) {
        return ConditionValue::AnyOf(input.split(LIST_SEPARATOR).map(str::trim).into_strings());
    }
    ConditionValue::Text(input.to_string())
}

/// Text an author would type to produce `value`
fn condition_value_input(value: &ConditionValue) -> String {
    match value {
        ConditionValue::Flag(flag) => flag.to_string(),
        ConditionValue::Number(number) => number.to_string(),
        ConditionValue::Text(text) => text.clone(),
        ConditionValue::AnyOf(options) => options.join(", "),
        ConditionValue::Subset(members) => Value::Object(members.clone()).to_string(),
    }
}

/// Raw state of the field authoring form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldDraft {
    /// Field key
    pub key:              String,
    /// Question text
    pub label:            String,
    /// Selected type
    #[serde(rename = "type")]
    pub field_type:       FieldType,
    /// Comma-separated options
    pub options_input:    String,
    /// Companion key (`radioWithInput`)
    pub with_input_key:   String,
    /// Companion label (`radioWithInput`)
    pub with_input_label: String,
    /// Portion cap (`locationPortion`)
    pub max_total:        Option<Number>,
    /// Over-cap message (`locationPortion`)
    pub error_message:    String,
    /// Path of the field this one depends on, empty for none
    pub condition_field:  String,
    /// Free-text expected value
    pub condition_input:  String,
    /// Carried over from an edited field
    pub required:         Option<bool>,
}

impl FieldDraft {
    /// Blank draft of the given kind
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            field_type: FieldType::Known(kind),
            ..Self::default()
        }
    }

    /// Reopen an existing field for editing
    pub fn from_field(field: &Field) -> Self {
        let validation = field.validation.clone().unwrap_or_default();
        Self {
            key:              field.key.clone(),
            label:            field.label.clone(),
            field_type:       field.field_type.clone(),
            options_input:    field.options().join(", "),
            with_input_key:   field.with_input_key.clone().unwrap_or_default(),
            with_input_label: field.with_input_label.clone().unwrap_or_default(),
            max_total:        validation.max_total,
            error_message:    validation.error_message.unwrap_or_default(),
            condition_field:  field
                .condition
                .as_ref()
                .map(|c| c.field.to_string())
                .unwrap_or_default(),
            condition_input:  field
                .condition
                .as_ref()
                .map(|c| condition_value_input(&c.value))
                .unwrap_or_default(),
            required:         field.required,
        }
    }

    /// Turn the draft into a field
    ///
    /// Key and label are required. Options, companion and validation are only
    /// kept for the kinds that use them.
    pub fn build(&self) -> Result<Field> {
        if self.key.trim().is_empty() {
            return Err(Report::new(Error::missing("key")));
        }
        if self.label.trim().is_empty() {
            return Err(Report::new(Error::missing("label")));
        }

        let kind = self.field_type.kind();
        let options = kind
            .filter(|kind| kind.uses_options())
            .map(|_| parse_options(&self.options_input))
            .filter(|options| !options.is_empty());

        let is_kind = |wanted: FieldKind| kind == Some(wanted);
        let companion = is_kind(FieldKind::RadioWithInput) && !self.with_input_key.trim().is_empty();
        let validation = (is_kind(FieldKind::LocationPortion)
            && (self.max_total.is_some() || !self.error_message.is_empty()))
        .then(|| Validation {
            max_total:     self.max_total.clone(),
            error_message: (!self.error_message.is_empty()).then(|| self.error_message.clone()),
        });

        let condition = (!self.condition_field.trim().is_empty()).then(|| {
            Condition::new(
                self.condition_field.trim(),
                parse_condition_value(&self.condition_input),
            )
        });

        Ok(Field {
            key: self.key.trim().to_string(),
            label: self.label.clone(),
            field_type: self.field_type.clone(),
            options,
            required: self.required,
            with_input_key: companion.then(|| self.with_input_key.trim().to_string()),
            with_input_label: companion.then(|| self.with_input_label.clone()),
            validation,
            condition,
        })
    }
}

/// Authoring form state for one field list: a draft plus what it edits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuilderSession {
    /// The form contents
    pub draft:     FieldDraft,
    editing_index: Option<usize>,
}

impl BuilderSession {
    /// Empty form in add mode
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the field being edited, `None` in add mode
    pub const fn editing_index(&self) -> Option<usize> {
        self.editing_index
    }

    /// Load the field at `index` into the form and switch to edit mode
    pub fn begin_edit(&mut self, fields: &[Field], index: usize) -> Result<()> {
        let field = fields.get(index).ok_or_else(|| {
            Report::new(Error::FieldIndexOutOfRange {
                index,
                len: fields.len(),
            })
        })?;
        self.draft = FieldDraft::from_field(field);
        self.editing_index = Some(index);
        Ok(())
    }

    /// Drop the draft and return to add mode
    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    /// Commit the draft: update the edited field, or append a new one
    ///
    /// On success the form resets to an empty add-mode draft. On failure
    /// (incomplete draft, duplicate key) the draft is kept for correction.
    pub fn save(&mut self, editor: &mut FieldListEditor<'_>) -> Result<()> {
        let field = self.draft.build()?;
        match self.editing_index {
            Some(index) => editor.update_field(index, field)?,
            None => editor.add_field(field)?,
        }
        self.cancel();
        Ok(())
    }
}
