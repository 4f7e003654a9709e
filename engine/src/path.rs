//! Dotted path addressing into nested form data
//!
//! A path such as `generalInfo.plant.stage` names `data["generalInfo"]["plant"]["stage"]`.
//! Reads never fail: a missing segment simply yields `None`. Writes build any
//! missing intermediate mappings on the way down.

use std::fmt::Display;

use error_stack::Report;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::PATH_SEPARATOR;
use crate::error::{Error, Result};

/// A dot-delimited location inside form data or the schema's field set
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    /// Wrap a dotted path string
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Build a path from its segments
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = segments
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(&PATH_SEPARATOR.to_string());
        Self(joined)
    }

    /// Append one segment
    #[must_use]
    pub fn join(&self, segment: impl AsRef<str>) -> Self {
        if self.0.is_empty() {
            Self(segment.as_ref().to_string())
        } else {
            Self(format!("{}{PATH_SEPARATOR}{}", self.0, segment.as_ref()))
        }
    }

    /// Iterate the segments of the path
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(PATH_SEPARATOR)
    }

    /// The path as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// Walk `data` along `path`, returning `None` as soon as a segment is absent
///
/// Object members are looked up by name; array elements by decimal index.
/// Scalars (including `null`) have no children, so walking through one
/// yields `None` rather than an error.
pub fn get_value_from_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split(PATH_SEPARATOR)
        .try_fold(data, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Store `value` at `path`, creating empty mappings for missing segments
///
/// Any intermediate that is not a mapping (absent, `null`, a scalar) is
/// replaced by an empty mapping. Array elements are addressed by index when
/// the index is in range.
pub fn set_value_at_path(data: &mut Value, path: &str, value: Value) -> Result<()> {
    let segments = split_path(path)?;
    let Some((last, parents)) = segments.split_last() else {
        return Err(Report::new(Error::InvalidPath(path.to_string())));
    };

    let target = parents
        .iter()
        .fold(data, |current, segment| descend(current, segment));
    assign(target, last, value);
    Ok(())
}

fn split_path(path: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(Report::new(Error::InvalidPath(path.to_string())));
    }
    Ok(segments)
}

fn array_index(value: &Value, segment: &str) -> Option<usize> {
    value.as_array().and_then(|items| {
        segment
            .parse::<usize>()
            .ok()
            .filter(|index| *index < items.len())
    })
}

fn ensure_object(value: &mut Value) {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
}

fn descend<'a>(parent: &'a mut Value, segment: &str) -> &'a mut Value {
    let index = array_index(parent, segment);
    match (parent, index) {
        (Value::Array(items), Some(index)) => &mut items[index],
        (parent, _) => {
            ensure_object(parent);
            &mut parent[segment]
        }
    }
}

fn assign(parent: &mut Value, segment: &str, value: Value) {
    let index = array_index(parent, segment);
    match (parent, index) {
        (Value::Array(items), Some(index)) => items[index] = value,
        (parent, _) => {
            ensure_object(parent);
            parent[segment] = value;
        }
    }
}
