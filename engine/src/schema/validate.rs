//! Whole-schema validation
//!
//! The builder only guards one field list at a time. This pass looks at the
//! schema as a whole: key collisions inside every data slice, keys that cannot
//! name a path segment, type names with no widget, conditions pointing nowhere
//! or in circles, and authoring gaps.

use itertools::Itertools;
use serde::Serialize;
use strum::Display;
use thiserror::Error;

use super::field::{Field, FieldKind, FieldType};
use super::index::SchemaIndex;
use super::section::FormSchema;
use crate::constants::PATH_SEPARATOR;
use crate::path::FieldPath;

/// How much an issue matters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// The form will misbehave: values overwrite each other or fields vanish
    Error,
    /// The form works, possibly not as the author intended
    Warning,
}

/// One finding of [`validate`]
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "camelCase")]
pub enum SchemaIssue {
    /// Two sections share a key
    #[error("Section key '{key}' is used more than once")]
    DuplicateSectionKey {
        /// The repeated key
        key: String,
    },

    /// Two values in one data slice share a key
    #[error("Key '{key}' is used more than once in '{slice}'")]
    DuplicateKey {
        /// Path of the data slice
        slice: FieldPath,
        /// The repeated key
        key:   String,
    },

    /// A key is empty or contains the path separator
    #[error("Key '{key}' in '{slice}' is empty or contains '.'")]
    InvalidKey {
        /// Path of the data slice
        slice: FieldPath,
        /// The offending key
        key:   String,
    },

    /// A field type has no widget in this build
    #[error("Field '{path}' has unsupported type '{type_name}'")]
    UnknownFieldType {
        /// Path of the field
        path:      FieldPath,
        /// Declared type name
        type_name: String,
    },

    /// A condition targets a path that is not a field of this schema
    #[error("Condition on '{path}' refers to unknown field '{target}'")]
    DanglingCondition {
        /// Path of the gated field or subsection
        path:   FieldPath,
        /// Referenced path
        target: FieldPath,
    },

    /// Conditions reference each other in a loop
    #[error("Conditions form a cycle: {}", .paths.iter().join(" -> "))]
    ConditionCycle {
        /// Fields along the cycle
        paths: Vec<FieldPath>,
    },

    /// A choice field has no options to choose from
    #[error("Field '{path}' of type '{kind}' has no options")]
    MissingOptions {
        /// Path of the field
        path: FieldPath,
        /// Its kind
        kind: String,
    },

    /// A `radioWithInput` field has no companion key
    #[error("Field '{path}' has no withInputKey for its companion value")]
    MissingCompanion {
        /// Path of the field
        path: FieldPath,
    },

    /// A `locationPortion` field has no cap configured
    #[error("Field '{path}' has no validation.maxTotal, the default cap applies")]
    MissingMaxTotal {
        /// Path of the field
        path: FieldPath,
    },
}

impl SchemaIssue {
    /// Severity of this issue
    pub const fn severity(&self) -> Severity {
        match self {
            Self::DuplicateSectionKey { .. }
            | Self::DuplicateKey { .. }
            | Self::InvalidKey { .. }
            | Self::UnknownFieldType { .. } => Severity::Error,
            Self::DanglingCondition { .. }
            | Self::ConditionCycle { .. }
            | Self::MissingOptions { .. }
            | Self::MissingCompanion { .. }
            | Self::MissingMaxTotal { .. } => Severity::Warning,
        }
    }
}

/// Check the whole schema, returning every issue found in display order
pub fn validate(schema: &FormSchema) -> Vec<SchemaIssue> {
    let mut issues: Vec<SchemaIssue> = schema
        .sections
        .iter()
        .map(|section| section.key.clone())
        .duplicates()
        .map(|key| SchemaIssue::DuplicateSectionKey { key })
        .collect();

    let root = FieldPath::new(schema.section_key.as_str());
    issues.extend(invalid_keys(&root, schema.sections.iter().map(|s| s.key.as_str())));

    for section in &schema.sections {
        let section_path = schema.section_path(&section.key);
        let section_keys: Vec<&str> = slice_keys(&section.fields)
            .chain(section.subsections().iter().map(|sub| sub.key.as_str()))
            .collect();
        issues.extend(invalid_keys(&section_path, section_keys.iter().copied()));
        issues.extend(duplicate_keys(&section_path, section_keys.into_iter()));

        for sub in section.subsections() {
            let sub_path = schema.subsection_path(&section.key, &sub.key);
            issues.extend(invalid_keys(&sub_path, slice_keys(&sub.fields)));
            issues.extend(duplicate_keys(&sub_path, slice_keys(&sub.fields)));
        }
    }

    let index = SchemaIndex::build(schema);
    for node in index.nodes() {
        issues.extend(field_issues(&node.path, node.field));
    }

    for section in &schema.sections {
        for field in &section.fields {
            let path = schema.field_path(&section.key, &field.key);
            issues.extend(dangling(&index, &path, field.condition.as_ref()));
        }
        for sub in section.subsections() {
            let sub_path = schema.subsection_path(&section.key, &sub.key);
            issues.extend(dangling(&index, &sub_path, sub.condition.as_ref()));
            for field in &sub.fields {
                issues.extend(dangling(&index, &sub_path.join(&field.key), field.condition.as_ref()));
            }
        }
    }

    issues.extend(
        index
            .condition_cycles()
            .into_iter()
            .map(|paths| SchemaIssue::ConditionCycle { paths }),
    );

    if !issues.is_empty() {
        tracing::debug!(
            "Schema '{}' has {} issue(s)",
            schema.section_key,
            issues.len()
        );
    }
    issues
}

/// Whether any issue is an error
pub fn has_errors(issues: &[SchemaIssue]) -> bool {
    issues.iter().any(|issue| issue.severity() == Severity::Error)
}

/// Field keys of a list plus the companion keys they claim
fn slice_keys(fields: &[Field]) -> impl Iterator<Item = &str> {
    fields
        .iter()
        .flat_map(|field| std::iter::once(field.key.as_str()).chain(field.companion_key()))
}

fn invalid_keys<'a>(slice: &FieldPath, keys: impl Iterator<Item = &'a str>) -> Vec<SchemaIssue> {
    keys.filter(|key| key.trim().is_empty() || key.contains(PATH_SEPARATOR))
        .map(|key| SchemaIssue::InvalidKey {
            slice: slice.clone(),
            key:   key.to_string(),
        })
        .collect()
}

fn duplicate_keys<'a>(
    slice: &FieldPath,
    keys: impl Iterator<Item = &'a str>,
) -> Vec<SchemaIssue> {
    keys.duplicates()
        .map(|key| SchemaIssue::DuplicateKey {
            slice: slice.clone(),
            key:   key.to_string(),
        })
        .collect()
}

fn field_issues(path: &FieldPath, field: &Field) -> Vec<SchemaIssue> {
    let kind = match &field.field_type {
        FieldType::Known(kind) => *kind,
        FieldType::Unsupported(type_name) => {
            return vec![SchemaIssue::UnknownFieldType {
                path:      path.clone(),
                type_name: type_name.clone(),
            }];
        }
    };

    let mut issues = Vec::new();
    if kind.requires_options() && field.options().is_empty() {
        issues.push(SchemaIssue::MissingOptions {
            path: path.clone(),
            kind: kind.to_string(),
        });
    }
    if kind == FieldKind::RadioWithInput && field.companion_key().is_none() {
        issues.push(SchemaIssue::MissingCompanion { path: path.clone() });
    }
    if kind == FieldKind::LocationPortion
        && field.validation.as_ref().and_then(|v| v.max_total.as_ref()).is_none()
    {
        issues.push(SchemaIssue::MissingMaxTotal { path: path.clone() });
    }
    issues
}

fn dangling(
    index: &SchemaIndex<'_>,
    path: &FieldPath,
    condition: Option<&super::condition::Condition>,
) -> Option<SchemaIssue> {
    let condition = condition?;
    if index.lookup(&condition.field).is_some() {
        return None;
    }
    Some(SchemaIssue::DanglingCondition {
        path:   path.clone(),
        target: condition.field.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::condition::Condition;
    use crate::schema::field::Validation;
    use crate::schema::section::{Section, Subsection};

    #[test]
    fn clean_schema_has_no_issues() {
        let schema = FormSchema::empty("root", "Root").with_section(
            Section::new("S", "S").with_fields(vec![
                Field::new("A", "A", FieldKind::Select).with_options(["yes", "no"]),
                Field::new("B", "B", FieldKind::Text).with_condition(Condition::new("root.S.A", "yes")),
            ]),
        );
        assert!(validate(&schema).is_empty());
    }

    #[test]
    fn reports_collisions_in_each_slice() {
        let schema = FormSchema::empty("root", "Root")
            .with_section(
                Section::new("S", "S")
                    .with_fields(vec![
                        Field::new("share", "Share", FieldKind::RadioWithInput)
                            .with_companion("pct", "Pct"),
                        Field::new("pct", "Pct", FieldKind::Number),
                        Field::new("sub", "Clash", FieldKind::Text),
                    ])
                    .with_subsection(Subsection::new("Sub", "sub")),
            )
            .with_section(Section::new("Again", "S"));

        let issues = validate(&schema);
        assert!(issues.contains(&SchemaIssue::DuplicateSectionKey { key: "S".into() }));
        assert!(issues.contains(&SchemaIssue::DuplicateKey {
            slice: FieldPath::new("root.S"),
            key:   "pct".into(),
        }));
        assert!(issues.contains(&SchemaIssue::DuplicateKey {
            slice: FieldPath::new("root.S"),
            key:   "sub".into(),
        }));
        assert!(has_errors(&issues));
    }

    #[test]
    fn reports_keys_that_cannot_be_path_segments() {
        let schema = FormSchema::empty("root", "Root").with_section(
            Section::new("S", "S")
                .with_fields(vec![
                    Field::new("a.b", "Dotted", FieldKind::Text),
                    Field::new("", "Blank", FieldKind::Text),
                ])
                .with_subsection(Subsection::new("Sub", "sub.x")),
        );
        let issues = validate(&schema);
        for key in ["a.b", "", "sub.x"] {
            assert!(issues.contains(&SchemaIssue::InvalidKey {
                slice: FieldPath::new("root.S"),
                key:   key.into(),
            }));
        }
        assert!(has_errors(&issues));
    }

    #[test]
    fn reports_unknown_types_and_authoring_gaps() {
        let schema = FormSchema::empty("root", "Root").with_section(
            Section::new("S", "S").with_fields(vec![
                Field {
                    field_type: FieldType::Unsupported("signature".into()),
                    ..Field::new("sig", "Signature", FieldKind::Text)
                },
                Field::new("pick", "Pick", FieldKind::MultiSelect),
                Field::new("share", "Share", FieldKind::RadioWithInput),
                Field::new("where", "Where", FieldKind::LocationPortion).with_validation(Validation::default()),
            ]),
        );
        let issues = validate(&schema);
        assert_eq!(issues.len(), 4);
        assert_eq!(issues[0].severity(), Severity::Error);
        assert!(matches!(issues[0], SchemaIssue::UnknownFieldType { .. }));
        assert!(matches!(issues[1], SchemaIssue::MissingOptions { .. }));
        assert!(matches!(issues[2], SchemaIssue::MissingCompanion { .. }));
        assert!(matches!(issues[3], SchemaIssue::MissingMaxTotal { .. }));
        assert_eq!(
            issues[0].to_string(),
            "Field 'root.S.sig' has unsupported type 'signature'"
        );
    }

    #[test]
    fn reports_dangling_and_cyclic_conditions_as_warnings() {
        let schema = FormSchema::empty("root", "Root").with_section(
            Section::new("S", "S")
                .with_fields(vec![
                    Field::new("A", "A", FieldKind::Text).with_condition(Condition::new("root.S.B", "x")),
                    Field::new("B", "B", FieldKind::Text).with_condition(Condition::new("root.S.A", "y")),
                ])
                .with_subsection(
                    Subsection::new("Sub", "sub")
                        .with_condition(Condition::new("otherRoot.T.flag", true)),
                ),
        );
        let issues = validate(&schema);
        assert!(issues.contains(&SchemaIssue::DanglingCondition {
            path:   FieldPath::new("root.S.sub"),
            target: FieldPath::new("otherRoot.T.flag"),
        }));
        assert!(issues.iter().any(|i| matches!(i, SchemaIssue::ConditionCycle { .. })));
        assert!(!has_errors(&issues));
    }
}
