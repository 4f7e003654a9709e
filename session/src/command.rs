//! Request and response lines
//!
//! Requests are JSON objects tagged by `command`; every request gets exactly
//! one response, `{"status":"ok","result":...}` or
//! `{"status":"error","message":"..."}`.

use std::path::PathBuf;

use schema_form_engine::{FieldDraft, FieldScope, FormEdit, MoveDirection, Subsection};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::support::tracing::TracingLevel;

/// One request line
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    /// Apply a value edit with its cascade
    Apply {
        /// The edit
        edit: FormEdit,
    },
    /// Render descriptors for the visible fields
    Render,
    /// Current form data
    FormData,
    /// Current schema document
    Schema,
    /// Whole-schema validation issues
    Validate,
    /// Every field path, for condition authoring
    AllFieldPaths,
    /// JSON Schema of the schema document format
    FormatSchema,
    /// Append a section
    AddSection {
        /// Heading
        title: String,
        /// Data key
        key:   String,
    },
    /// Remove a section and its data
    RemoveSection {
        /// Section key
        key: String,
    },
    /// Append a subsection to a section
    AddSubsection {
        /// Section key
        section:    String,
        /// The subsection
        subsection: Subsection,
    },
    /// Remove a subsection
    RemoveSubsection {
        /// Section key
        section: String,
        /// Subsection key
        key:     String,
    },
    /// Build a field from an authoring draft and append it
    AddField {
        /// Target field list
        scope: FieldScope,
        /// Authoring form contents
        draft: FieldDraft,
    },
    /// Build a field from an authoring draft and replace the field at `index`
    UpdateField {
        /// Target field list
        scope: FieldScope,
        /// Field to replace
        index: usize,
        /// Authoring form contents
        draft: FieldDraft,
    },
    /// Remove a field
    RemoveField {
        /// Target field list
        scope: FieldScope,
        /// Field to remove
        index: usize,
    },
    /// Swap a field with its neighbor
    MoveField {
        /// Target field list
        scope:     FieldScope,
        /// Field to move
        index:     usize,
        /// Direction
        direction: MoveDirection,
    },
    /// Write the schema and form data to disk
    Save {
        /// Destination, a `.json` file
        path: PathBuf,
    },
    /// Change the log level, answering with the previous one
    SetLogLevel {
        /// New level
        level: TracingLevel,
    },
}

/// One response line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Response {
    /// The command succeeded
    Ok {
        /// Command output, `null` for pure edits
        result: Value,
    },
    /// The command was rejected; nothing changed
    Error {
        /// Why
        message: String,
    },
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "tests")]

    use serde_json::json;

    use super::*;

    #[test]
    fn commands_parse_from_camel_case() {
        let command: Command = serde_json::from_value(json!({
            "command": "moveField",
            "scope": { "section": "S", "subsection": "sub" },
            "index": 2,
            "direction": "up"
        }))
        .unwrap();
        assert_eq!(
            command,
            Command::MoveField {
                scope:     FieldScope::subsection("S", "sub"),
                index:     2,
                direction: MoveDirection::Up,
            }
        );

        let command: Command = serde_json::from_value(json!({
            "command": "apply",
            "edit": { "edit": "setValue", "section": "S", "keyPath": "A", "value": "yes" }
        }))
        .unwrap();
        assert!(matches!(command, Command::Apply { edit: FormEdit::SetValue { .. } }));

        let command: Command = serde_json::from_value(json!({ "command": "setLogLevel", "level": "debug" })).unwrap();
        assert_eq!(command, Command::SetLogLevel { level: TracingLevel::Debug });
    }

    #[test]
    fn responses_are_tagged_by_status() {
        assert_eq!(
            serde_json::to_value(Response::Ok { result: json!(1) }).unwrap(),
            json!({ "status": "ok", "result": 1 })
        );
        assert_eq!(
            serde_json::to_value(Response::Error { message: "no".into() }).unwrap(),
            json!({ "status": "error", "message": "no" })
        );
    }
}
