//! Render descriptors handed to the widget layer
//!
//! Each visible field becomes one [`Widget`], a variant per field kind
//! carrying its label, current value and the type-specific extras.

use serde::Serialize;
use serde_json::Value;

use super::location::{LocationEntry, LocationPortion};
use crate::form_data::FormData;
use crate::json_traits::value_as_text;
use crate::path::FieldPath;
use crate::schema::{Field, FieldKind};

/// Widget contract for one field kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Widget {
    /// Single line of text
    Text {
        /// Question text
        label: String,
        /// Current text
        value: String,
    },
    /// Numeric input, kept as typed
    Number {
        /// Question text
        label: String,
        /// Current input
        value: String,
    },
    /// Dropdown with one choice
    Select {
        /// Question text
        label:   String,
        /// Choices
        options: Vec<String>,
        /// Current choice, empty for none
        value:   String,
    },
    /// Read-only dropdown
    DisabledSelect {
        /// Question text
        label:   String,
        /// Choices
        options: Vec<String>,
        /// Current choice
        value:   String,
    },
    /// Dropdown allowing several choices
    MultiSelect {
        /// Question text
        label:    String,
        /// Choices
        options:  Vec<String>,
        /// Current choices
        selected: Vec<String>,
    },
    /// Yes/no toggle
    Radio {
        /// Question text
        label:   String,
        /// Current state
        checked: bool,
    },
    /// Row of radio buttons
    RadioGroup {
        /// Question text
        label:   String,
        /// Choices
        options: Vec<String>,
        /// Current choice
        value:   String,
    },
    /// Toggle with a companion free-text value
    RadioWithInput {
        /// Question text
        label:       String,
        /// Current state
        checked:     bool,
        /// Key of the companion value in the same slice
        input_key:   Option<String>,
        /// Label of the companion input
        input_label: Option<String>,
        /// Current companion value
        percentage:  String,
    },
    /// Calendar date
    Date {
        /// Question text
        label: String,
        /// Current date text
        value: String,
    },
    /// Multi-line text
    Textarea {
        /// Question text
        label: String,
        /// Current text
        value: String,
    },
    /// Country/portion entry list under a cap
    LocationPortion {
        /// Question text
        label:         String,
        /// Current entries
        entries:       Vec<LocationEntry>,
        /// Sum of portions
        total:         f64,
        /// Cap on the sum
        max_total:     f64,
        /// Whether the add button is offered
        can_add:       bool,
        /// Message to show, present only while over the cap
        error_message: Option<String>,
    },
}

impl Widget {
    /// Build the widget for `field` from the value stored at `path`
    pub fn for_field(kind: FieldKind, field: &Field, path: &FieldPath, data: &FormData) -> Self {
        let value = data.get(path);
        let label = field.label.clone();
        let options = field.options().to_vec();
        match kind {
            FieldKind::Text => Self::Text {
                label,
                value: value_as_text(value),
            },
            FieldKind::Number => Self::Number {
                label,
                value: value_as_text(value),
            },
            FieldKind::Select => Self::Select {
                label,
                options,
                value: value_as_text(value),
            },
            FieldKind::DisabledSelect => Self::DisabledSelect {
                label,
                options,
                value: value_as_text(value),
            },
            FieldKind::MultiSelect => Self::MultiSelect {
                label,
                options,
                selected: value
                    .and_then(Value::as_array)
                    .map(|items| items.iter().filter_map(Value::as_str).map(String::from).collect())
                    .unwrap_or_default(),
            },
            FieldKind::Radio => Self::Radio {
                label,
                checked: value.and_then(Value::as_bool).unwrap_or(false),
            },
            FieldKind::RadioGroup => Self::RadioGroup {
                label,
                options,
                value: value_as_text(value),
            },
            FieldKind::RadioWithInput => {
                let percentage = field
                    .companion_key()
                    .map(|key| value_as_text(data.get(sibling_path(path, key))))
                    .unwrap_or_default();
                Self::RadioWithInput {
                    label,
                    checked: value.and_then(Value::as_bool).unwrap_or(false),
                    input_key: field.companion_key().map(String::from),
                    input_label: field.with_input_label.clone(),
                    percentage,
                }
            }
            FieldKind::Date => Self::Date {
                label,
                value: value_as_text(value),
            },
            FieldKind::Textarea => Self::Textarea {
                label,
                value: value_as_text(value),
            },
            FieldKind::LocationPortion => {
                let portion = LocationPortion::from_value(value, field.validation.as_ref());
                Self::LocationPortion {
                    label,
                    entries: portion.entries().to_vec(),
                    total: portion.total(),
                    max_total: portion.max_total(),
                    can_add: portion.can_add_entry(),
                    error_message: portion
                        .exceeds_limit()
                        .then(|| portion.error_message().to_string()),
                }
            }
        }
    }
}

/// Path of another key in the same slice as `path`
pub(crate) fn sibling_path(path: &FieldPath, key: &str) -> FieldPath {
    let segments: Vec<&str> = path.segments().collect();
    let parent = segments.split_last().map_or(&[][..], |(_, parent)| parent);
    FieldPath::from_segments(parent).join(key)
}

/// One visible field ready to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedField {
    /// Field key
    pub key:      String,
    /// Full path of the value
    pub path:     FieldPath,
    /// Whether an answer is expected
    pub required: bool,
    /// What to draw
    pub widget:   Widget,
}

/// One visible subsection ready to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSubsection {
    /// Heading
    pub title:  String,
    /// Subsection key
    pub key:    String,
    /// Visible fields in order
    pub fields: Vec<RenderedField>,
}

/// One section ready to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSection {
    /// Heading
    pub title:       String,
    /// Section key
    pub key:         String,
    /// Visible top-level fields in order
    pub fields:      Vec<RenderedField>,
    /// Visible subsections in order
    pub subsections: Vec<RenderedSubsection>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn data() -> FormData {
        FormData::from_value(json!({
            "root": { "S": {
                "share": true,
                "sharePct": "35",
                "picks": ["a", 3, "b"],
                "where": [{ "country": "Chile", "portion": 120 }]
            } }
        }))
    }

    #[test]
    fn radio_with_input_reads_companion_from_same_slice() {
        let field = Field::new("share", "Share", FieldKind::RadioWithInput).with_companion("sharePct", "Pct");
        let widget = Widget::for_field(
            FieldKind::RadioWithInput,
            &field,
            &FieldPath::new("root.S.share"),
            &data(),
        );
        assert_eq!(
            widget,
            Widget::RadioWithInput {
                label:       "Share".into(),
                checked:     true,
                input_key:   Some("sharePct".into()),
                input_label: Some("Pct".into()),
                percentage:  "35".into(),
            }
        );
    }

    #[test]
    fn multi_select_keeps_only_strings() {
        let field = Field::new("picks", "Picks", FieldKind::MultiSelect).with_options(["a", "b"]);
        let widget = Widget::for_field(FieldKind::MultiSelect, &field, &FieldPath::new("root.S.picks"), &data());
        assert!(matches!(widget, Widget::MultiSelect { selected, .. } if selected == ["a", "b"]));
    }

    #[test]
    fn location_portion_reports_over_cap() {
        let field = Field::new("where", "Where", FieldKind::LocationPortion);
        let widget = Widget::for_field(FieldKind::LocationPortion, &field, &FieldPath::new("root.S.where"), &data());
        assert!(matches!(
            widget,
            Widget::LocationPortion { can_add: false, ref error_message, .. }
                if error_message.as_deref() == Some("exceeds 100%")
        ));
    }

    #[test]
    fn widget_serializes_with_type_tag() {
        let field = Field::new("name", "Name", FieldKind::Text);
        let widget = Widget::for_field(FieldKind::Text, &field, &FieldPath::new("root.S.missing"), &data());
        assert_eq!(
            serde_json::to_value(&widget).unwrap_or_default(),
            json!({ "type": "text", "label": "Name", "value": "" })
        );
    }

    #[test]
    fn sibling_paths_share_the_parent() {
        assert_eq!(
            sibling_path(&FieldPath::new("root.S.sub.a"), "b").as_str(),
            "root.S.sub.b"
        );
    }
}
