//! The nested value tree produced by filling out a schema
//!
//! Shape: `{ [schema.sectionKey]: { [section.key]: { [field.key]: value,
//! [subsection.key]: { [field.key]: value } | null } } }`. Several schemas
//! may share one tree, each under its own root key.

use error_stack::Report;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::path::{get_value_from_path, set_value_at_path};

/// Form data owned by one editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(Value);

impl Default for FormData {
    fn default() -> Self {
        Self::new()
    }
}

impl FormData {
    /// An empty tree
    pub fn new() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Adopt a persisted tree; anything that is not a mapping starts over empty
    pub fn from_value(value: Value) -> Self {
        if value.is_object() {
            Self(value)
        } else {
            if !value.is_null() {
                tracing::warn!("Discarding non-object form data: {value}");
            }
            Self::new()
        }
    }

    /// Adopt a persisted tree, rejecting anything but a mapping or `null`
    pub fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Object(_) => Ok(Self(value)),
            other => Err(Report::new(Error::InvalidFormData(format!(
                "expected an object, found {other}"
            )))),
        }
    }

    /// Value at a dotted path, `None` when any segment is absent
    pub fn get(&self, path: impl AsRef<str>) -> Option<&Value> {
        get_value_from_path(&self.0, path.as_ref())
    }

    /// Store a value at a dotted path, creating intermediate mappings
    pub fn set(&mut self, path: impl AsRef<str>, value: Value) -> Result<()> {
        set_value_at_path(&mut self.0, path.as_ref(), value)
    }

    /// Borrow the underlying JSON tree
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Give up the underlying JSON tree
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for FormData {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "tests")]

    use serde_json::json;

    use super::*;

    #[test]
    fn non_object_input_starts_empty() {
        assert_eq!(FormData::from_value(json!([1, 2])), FormData::new());
        assert_eq!(FormData::from_value(Value::Null), FormData::new());
    }

    #[test]
    fn strict_adoption_rejects_non_objects() {
        assert_eq!(FormData::try_from_value(Value::Null).unwrap(), FormData::new());
        let err = FormData::try_from_value(json!("text")).unwrap_err();
        assert_eq!(
            err.current_context(),
            &Error::InvalidFormData("expected an object, found \"text\"".into())
        );
    }

    #[test]
    fn set_then_get() {
        let mut data = FormData::new();
        data.set("root.S.A", json!("yes")).unwrap();
        assert_eq!(data.get("root.S.A"), Some(&json!("yes")));
        assert_eq!(data.as_value(), &json!({ "root": { "S": { "A": "yes" } } }));
    }

    #[test]
    fn serializes_as_plain_tree() {
        let data = FormData::from_value(json!({ "root": { "S": {} } }));
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({ "root": { "S": {} } })
        );
    }
}
