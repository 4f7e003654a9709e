//! Helpers for reading form values and collecting strings
//!
//! Form data is plain `serde_json` values; widgets and the location editor
//! read them leniently through the functions here.

use serde_json::Value;

/// Extension trait for converting iterators to `Vec<String>`
///
/// Replaces the `.map(String::from).collect()` pattern when turning parsed
/// authoring input into owned option lists.
pub trait IntoStrings<T> {
    /// Convert an iterator of items that can become strings into a `Vec<String>`
    fn into_strings(self) -> Vec<String>;
}

impl<I, T> IntoStrings<T> for I
where
    I: Iterator<Item = T>,
    T: Into<String>,
{
    fn into_strings(self) -> Vec<String> {
        self.map(Into::into).collect()
    }
}

/// Text shown for a value in a text-like widget
///
/// Strings pass through, numbers print in JSON form, everything else
/// (absent, null, booleans, containers) shows as empty.
pub fn value_as_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Numeric reading of a value, treating anything non-numeric as zero
///
/// Numeric strings are accepted since authoring widgets hand back raw input.
pub fn value_as_f64(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn strings_collect_from_slices() {
        let owned = ["a", "b"].into_iter().into_strings();
        assert_eq!(owned, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn text_and_number_readings() {
        assert_eq!(value_as_text(Some(&json!("abc"))), "abc");
        assert_eq!(value_as_text(Some(&json!(12))), "12");
        assert_eq!(value_as_text(Some(&json!(null))), "");
        assert_eq!(value_as_text(None), "");

        assert!((value_as_f64(Some(&json!(12.5))) - 12.5).abs() < f64::EPSILON);
        assert!((value_as_f64(Some(&json!(" 40 "))) - 40.0).abs() < f64::EPSILON);
        assert!(value_as_f64(Some(&json!(true))).abs() < f64::EPSILON);
    }
}
