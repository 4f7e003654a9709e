//! Condition evaluation against a form data tree
//!
//! Comparison is strict in the JSON sense: a string never equals a number or
//! a boolean, and an absent value equals nothing (not even `null`).

use serde_json::Value;

use crate::path::get_value_from_path;
use crate::schema::{Condition, ConditionValue};

/// Whether `condition` holds against `data`; an absent condition always holds
pub fn evaluate(data: &Value, condition: Option<&Condition>) -> bool {
    let Some(condition) = condition else {
        return true;
    };
    let actual = get_value_from_path(data, condition.field.as_str());
    matches_expected(actual, &condition.value)
}

/// Compare a resolved value with the expected value of a condition
pub fn matches_expected(actual: Option<&Value>, expected: &ConditionValue) -> bool {
    match expected {
        ConditionValue::Subset(members) => members
            .iter()
            .all(|(key, value)| strict_equals(actual.and_then(|a| a.get(key)), value)),
        ConditionValue::AnyOf(options) => actual
            .and_then(Value::as_str)
            .is_some_and(|actual| options.iter().any(|option| option == actual)),
        ConditionValue::Flag(flag) => actual.and_then(Value::as_bool) == Some(*flag),
        ConditionValue::Text(text) => actual.and_then(Value::as_str) == Some(text.as_str()),
        ConditionValue::Number(number) => {
            strict_equals(actual, &Value::Number(number.clone()))
        }
    }
}

/// Strict equality between a possibly absent value and an expected value
///
/// Containers are never equal, mirroring identity comparison of freshly
/// parsed objects. Numbers compare by value so `1` equals `1.0`.
fn strict_equals(actual: Option<&Value>, expected: &Value) -> bool {
    match (actual, expected) {
        (Some(Value::Null), Value::Null) => true,
        (Some(Value::Bool(a)), Value::Bool(b)) => a == b,
        (Some(Value::String(a)), Value::String(b)) => a == b,
        (Some(Value::Number(a)), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => (a - b).abs() < f64::EPSILON,
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "tests")]

    use serde_json::json;

    use super::*;

    fn condition(value: Value) -> Condition {
        Condition {
            field: "root.S.A".into(),
            value: serde_json::from_value(value).unwrap(),
        }
    }

    #[test]
    fn absent_condition_is_true() {
        assert!(evaluate(&json!({}), None));
    }

    #[test]
    fn scalar_equality_is_strict() {
        let data = json!({ "root": { "S": { "A": "yes" } } });
        assert!(evaluate(&data, Some(&condition(json!("yes")))));
        assert!(!evaluate(&data, Some(&condition(json!("no")))));
        assert!(!evaluate(&data, Some(&condition(json!(true)))));

        let flagged = json!({ "root": { "S": { "A": true } } });
        assert!(evaluate(&flagged, Some(&condition(json!(true)))));
        assert!(!evaluate(&flagged, Some(&condition(json!("true")))));

        let numbered = json!({ "root": { "S": { "A": 3 } } });
        assert!(evaluate(&numbered, Some(&condition(json!(3)))));
        assert!(evaluate(&numbered, Some(&condition(json!(3.0)))));
        assert!(!evaluate(&numbered, Some(&condition(json!("3")))));
    }

    #[test]
    fn missing_value_matches_nothing() {
        let data = json!({ "root": {} });
        assert!(!evaluate(&data, Some(&condition(json!("")))));
        assert!(!evaluate(&data, Some(&condition(json!(false)))));
        assert!(!evaluate(&data, Some(&condition(json!([""])))));
    }

    #[test]
    fn list_is_membership() {
        let data = json!({ "root": { "S": { "A": "b" } } });
        assert!(evaluate(&data, Some(&condition(json!(["a", "b"])))));
        assert!(!evaluate(&data, Some(&condition(json!(["c"])))));

        let multi = json!({ "root": { "S": { "A": ["a"] } } });
        assert!(!evaluate(&multi, Some(&condition(json!(["a"])))));
    }

    #[test]
    fn mapping_is_member_subset() {
        let data = json!({ "root": { "S": { "A": { "kind": "solar", "grid": true, "extra": 1 } } } });
        assert!(evaluate(&data, Some(&condition(json!({ "kind": "solar" })))));
        assert!(evaluate(&data, Some(&condition(json!({ "kind": "solar", "grid": true })))));
        assert!(!evaluate(&data, Some(&condition(json!({ "kind": "wind" })))));
        assert!(!evaluate(&data, Some(&condition(json!({ "missing": "x" })))));

        let absent = json!({});
        assert!(!evaluate(&absent, Some(&condition(json!({ "kind": "solar" })))));
        assert!(evaluate(&absent, Some(&condition(json!({})))));
    }
}
