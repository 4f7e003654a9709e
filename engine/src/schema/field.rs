//! Leaf input definitions and their kinds

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value, json};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use super::condition::Condition;
use crate::constants::{DEFAULT_MAX_TOTAL, DEFAULT_PORTION_ERROR, ENTRY_COUNTRY, ENTRY_PORTION};

/// Every field kind the renderer has a widget for
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    /// Single line of text
    Text,
    /// Numeric input
    Number,
    /// Dropdown with one choice
    Select,
    /// Dropdown allowing several choices
    MultiSelect,
    /// Single yes/no toggle
    Radio,
    /// One choice from a row of radio buttons
    RadioGroup,
    /// Toggle paired with a free-text companion value
    RadioWithInput,
    /// Calendar date
    Date,
    /// Multi-line text
    Textarea,
    /// List of `{country, portion}` entries under a running-total cap
    LocationPortion,
    /// Dropdown shown read-only
    DisabledSelect,
}

impl FieldKind {
    /// Authoring type menu, in display order
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    /// Value a field of this kind holds when absent or hidden
    pub fn default_value(self) -> Value {
        match self {
            Self::MultiSelect => Value::Array(Vec::new()),
            Self::Radio => Value::Bool(false),
            Self::LocationPortion => json!([{ ENTRY_COUNTRY: "", ENTRY_PORTION: 0 }]),
            Self::Text
            | Self::Number
            | Self::Select
            | Self::RadioGroup
            | Self::RadioWithInput
            | Self::Date
            | Self::Textarea
            | Self::DisabledSelect => Value::String(String::new()),
        }
    }

    /// Kinds whose widget offers a list of options
    pub const fn uses_options(self) -> bool {
        matches!(
            self,
            Self::Select | Self::MultiSelect | Self::RadioGroup | Self::DisabledSelect
        )
    }

    /// Kinds the authoring form asks options for
    pub const fn requires_options(self) -> bool {
        matches!(self, Self::Select | Self::MultiSelect | Self::RadioGroup)
    }
}

/// Declared type of a field, tolerating names this build does not know
///
/// Persisted schemas may come from a newer authoring tool. Loading keeps the
/// unknown name so the document round-trips; validation reports it and the
/// renderer skips it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// A kind the renderer can dispatch
    Known(FieldKind),
    /// Type name with no widget in this build
    Unsupported(String),
}

impl FieldType {
    /// The known kind, if any
    pub const fn kind(&self) -> Option<FieldKind> {
        match self {
            Self::Known(kind) => Some(*kind),
            Self::Unsupported(_) => None,
        }
    }

    /// Type name as it appears in the schema document
    pub fn name(&self) -> &str {
        match self {
            Self::Known(kind) => kind.as_ref(),
            Self::Unsupported(name) => name,
        }
    }
}

impl Default for FieldType {
    fn default() -> Self {
        Self::Known(FieldKind::Text)
    }
}

impl From<FieldKind> for FieldType {
    fn from(kind: FieldKind) -> Self {
        Self::Known(kind)
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        name.parse::<FieldKind>()
            .map_or(Self::Unsupported(name), Self::Known)
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Known(kind) => kind.to_string(),
            FieldType::Unsupported(name) => name,
        }
    }
}

/// Running-total rule of a `locationPortion` field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    /// Cap on the sum of portions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total:     Option<Number>,
    /// Message shown when the sum is over the cap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Validation {
    /// Cap to enforce, falling back to 100 when unset, zero or negative
    pub fn max_total_or_default(&self) -> f64 {
        self.max_total
            .as_ref()
            .and_then(Number::as_f64)
            .filter(|max| *max > 0.0)
            .unwrap_or(DEFAULT_MAX_TOTAL)
    }

    /// Message to show, falling back to the stock one
    pub fn error_message_or_default(&self) -> &str {
        self.error_message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_PORTION_ERROR)
    }
}

/// One leaf input definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Key of the value inside its section or subsection slice
    pub key:              String,
    /// Question text
    pub label:            String,
    /// Widget kind
    #[serde(rename = "type")]
    #[schemars(with = "String")]
    pub field_type:       FieldType,
    /// Choices for choice kinds, in display order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options:          Option<Vec<String>>,
    /// Whether an answer is expected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required:         Option<bool>,
    /// Key of the companion free-text value (`radioWithInput`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_input_key:   Option<String>,
    /// Label of the companion free-text value (`radioWithInput`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_input_label: Option<String>,
    /// Running-total rule (`locationPortion`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation:       Option<Validation>,
    /// Visibility gate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition:        Option<Condition>,
}

impl Field {
    /// A field with no options, companion, validation or condition
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key:              key.into(),
            label:            label.into(),
            field_type:       FieldType::Known(kind),
            options:          None,
            required:         None,
            with_input_key:   None,
            with_input_label: None,
            validation:       None,
            condition:        None,
        }
    }

    /// Set the option list
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Set the visibility gate
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Set the companion free-text value
    #[must_use]
    pub fn with_companion(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.with_input_key = Some(key.into());
        self.with_input_label = Some(label.into());
        self
    }

    /// Set the running-total rule
    #[must_use]
    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validation = Some(validation);
        self
    }

    /// The known kind, `None` for unsupported type names
    pub const fn kind(&self) -> Option<FieldKind> {
        self.field_type.kind()
    }

    /// Value held when absent or hidden; unsupported kinds fall back to `""`
    pub fn default_value(&self) -> Value {
        self.kind()
            .map_or_else(|| Value::String(String::new()), FieldKind::default_value)
    }

    /// Companion key, ignoring an empty one
    pub fn companion_key(&self) -> Option<&str> {
        self.with_input_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Options, empty when none are set
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "tests")]

    use serde_json::json;

    use super::*;

    #[test]
    fn kind_names_match_schema_documents() {
        let names: Vec<String> = FieldKind::all().iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            vec![
                "text",
                "number",
                "select",
                "multiSelect",
                "radio",
                "radioGroup",
                "radioWithInput",
                "date",
                "textarea",
                "locationPortion",
                "disabledSelect",
            ]
        );
    }

    #[test]
    fn type_defaults() {
        assert_eq!(FieldKind::MultiSelect.default_value(), json!([]));
        assert_eq!(FieldKind::Radio.default_value(), json!(false));
        assert_eq!(
            FieldKind::LocationPortion.default_value(),
            json!([{ "country": "", "portion": 0 }])
        );
        assert_eq!(FieldKind::Text.default_value(), json!(""));
        assert_eq!(FieldKind::Select.default_value(), json!(""));
    }

    #[test]
    fn unknown_type_round_trips() {
        let raw = json!({ "key": "sig", "label": "Signature", "type": "signature" });
        let field: Field = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(field.field_type, FieldType::Unsupported("signature".into()));
        assert_eq!(field.kind(), None);
        assert_eq!(field.default_value(), json!(""));
        assert_eq!(serde_json::to_value(&field).unwrap(), raw);
    }

    #[test]
    fn full_field_serializes_camel_case() {
        let field = Field::new("share", "Share", FieldKind::RadioWithInput)
            .with_companion("sharePct", "Percentage")
            .with_condition(Condition::new("root.S.A", true));
        assert_eq!(
            serde_json::to_value(&field).unwrap(),
            json!({
                "key": "share",
                "label": "Share",
                "type": "radioWithInput",
                "withInputKey": "sharePct",
                "withInputLabel": "Percentage",
                "condition": { "field": "root.S.A", "value": true }
            })
        );
    }

    #[test]
    fn validation_fallbacks() {
        let empty = Validation::default();
        assert!((empty.max_total_or_default() - 100.0).abs() < f64::EPSILON);
        assert_eq!(empty.error_message_or_default(), "exceeds 100%");

        let custom = Validation {
            max_total:     Some(Number::from(80)),
            error_message: Some("too much".into()),
        };
        assert!((custom.max_total_or_default() - 80.0).abs() < f64::EPSILON);
        assert_eq!(custom.error_message_or_default(), "too much");

        let fractional: Validation = serde_json::from_value(json!({ "maxTotal": 99.5 })).unwrap();
        assert!((fractional.max_total_or_default() - 99.5).abs() < f64::EPSILON);
        let negative: Validation = serde_json::from_value(json!({ "maxTotal": -5 })).unwrap();
        assert!((negative.max_total_or_default() - 100.0).abs() < f64::EPSILON);
    }
}
