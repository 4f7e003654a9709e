//! Visibility predicates attached to fields and subsections

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::path::FieldPath;

/// Gate on another field's current value: `{ field: path, value: expected }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Condition {
    /// Full dotted path of the referenced field, root key included
    pub field: FieldPath,
    /// Expected value
    pub value: ConditionValue,
}

impl Condition {
    /// Create a condition on `field`
    pub fn new(field: impl Into<FieldPath>, value: impl Into<ConditionValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Expected value of a condition
///
/// The variant decides the comparison: scalars compare strictly, a list is a
/// membership test and a mapping requires every listed member to match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ConditionValue {
    /// Actual value must be this boolean
    Flag(bool),
    /// Actual value must be this number
    Number(#[schemars(with = "f64")] Number),
    /// Actual value must be this string
    Text(String),
    /// Actual value must be one of these strings
    AnyOf(Vec<String>),
    /// Every member here must equal the same member of the actual value
    Subset(Map<String, Value>),
}

impl From<bool> for ConditionValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<&str> for ConditionValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<String>> for ConditionValue {
    fn from(values: Vec<String>) -> Self {
        Self::AnyOf(values)
    }
}

impl From<Map<String, Value>> for ConditionValue {
    fn from(members: Map<String, Value>) -> Self {
        Self::Subset(members)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "tests")]

    use serde_json::json;

    use super::*;

    #[test]
    fn deserializes_each_value_shape() {
        let parse = |v: Value| serde_json::from_value::<ConditionValue>(v).unwrap();
        assert_eq!(parse(json!(true)), ConditionValue::Flag(true));
        assert_eq!(parse(json!("yes")), ConditionValue::Text("yes".into()));
        assert_eq!(
            parse(json!(["a", "b"])),
            ConditionValue::AnyOf(vec!["a".into(), "b".into()])
        );
        assert!(matches!(parse(json!({ "k": "v" })), ConditionValue::Subset(_)));
        assert!(matches!(parse(json!(3)), ConditionValue::Number(_)));
    }

    #[test]
    fn serializes_as_plain_json() {
        let condition = Condition::new("root.S.A", "yes");
        assert_eq!(
            serde_json::to_value(&condition).unwrap(),
            json!({ "field": "root.S.A", "value": "yes" })
        );
    }
}
