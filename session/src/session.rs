//! Command loop over one schema editor

use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use error_stack::{Report, ResultExt};
use schema_form_engine::schema::{format_json_schema, has_errors};
use schema_form_engine::{FormData, FormSchema, SchemaEditor, SchemaIssue, Severity};
use serde::Serialize;
use serde_json::Value;

use crate::command::{Command, Response};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::support::tracing::TracingLevel;

/// Validation issue as reported to the client
#[derive(Serialize)]
struct IssueReport<'a> {
    severity: Severity,
    message:  String,
    #[serde(flatten)]
    issue:    &'a SchemaIssue,
}

/// One editing session: a schema editor driven by request lines
pub struct Session {
    editor: SchemaEditor,
}

impl Session {
    /// Session over an already opened editor
    pub const fn new(editor: SchemaEditor) -> Self {
        Self { editor }
    }

    /// Open the documents named by `config`
    ///
    /// A schema document without `sectionKey` or `sections` opens the
    /// default schema instead. A file that cannot be read or parsed, a schema
    /// document that does not describe a schema, or form data that is not an
    /// object, is an error.
    pub fn open(config: &SessionConfig) -> Result<Self> {
        let schema_path = &config.schema_path;
        let schema = FormSchema::from_value_or_default(&read_json(schema_path)?).map_err(|report| {
            let message = format!("{}: {}", schema_path.display(), report.current_context());
            report.change_context(Error::InvalidDocument(message))
        })?;
        let form_data = match &config.form_data_path {
            Some(path) => FormData::try_from_value(read_json(path)?).map_err(Error::from_engine)?,
            None => FormData::new(),
        };
        let editor = SchemaEditor::new(schema, form_data);
        tracing::info!(
            "Opened schema '{}' with {} section(s)",
            editor.schema().section_key,
            editor.schema().sections.len()
        );
        let issues = editor.validate();
        if has_errors(&issues) {
            tracing::warn!(
                "Schema '{}' has {} issue(s), some of them errors",
                editor.schema().section_key,
                issues.len()
            );
        }
        Ok(Self::new(editor))
    }

    /// The editor
    pub const fn editor(&self) -> &SchemaEditor {
        &self.editor
    }

    /// Answer every non-blank input line with one response line
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line.change_context(Error::Stream)?;
            if line.trim().is_empty() {
                continue;
            }
            let response = self.handle_line(&line);
            let text = serde_json::to_string(&response).change_context(Error::Stream)?;
            writeln!(output, "{text}").change_context(Error::Stream)?;
            output.flush().change_context(Error::Stream)?;
        }
        tracing::info!("Input closed, ending session");
        Ok(())
    }

    /// Parse and execute one request line
    pub fn handle_line(&mut self, line: &str) -> Response {
        let outcome = serde_json::from_str::<Command>(line)
            .map_err(|e| Report::new(Error::InvalidCommand(e.to_string())))
            .and_then(|command| self.execute(command));
        match outcome {
            Ok(result) => Response::Ok { result },
            Err(report) => {
                tracing::warn!("Command rejected: {report:?}");
                Response::Error {
                    message: report.current_context().to_string(),
                }
            }
        }
    }

    /// Execute one command against the editor
    pub fn execute(&mut self, command: Command) -> Result<Value> {
        tracing::debug!("Executing {command:?}");
        let editor = &mut self.editor;
        match command {
            Command::Apply { edit } => done(editor.apply(edit)),
            Command::Render => to_json(&editor.render()),
            Command::FormData => to_json(editor.form_data()),
            Command::Schema => to_json(editor.schema()),
            Command::Validate => {
                let issues = editor.validate();
                let reports: Vec<IssueReport<'_>> = issues
                    .iter()
                    .map(|issue| IssueReport {
                        severity: issue.severity(),
                        message: issue.to_string(),
                        issue,
                    })
                    .collect();
                to_json(&reports)
            }
            Command::AllFieldPaths => to_json(&editor.all_field_paths()),
            Command::FormatSchema => Ok(format_json_schema()),
            Command::AddSection { title, key } => done(editor.add_section(&title, &key)),
            Command::RemoveSection { key } => {
                let removed = editor.remove_section(&key).map_err(Error::from_engine)?;
                to_json(&removed)
            }
            Command::AddSubsection {
                section,
                subsection,
            } => done(editor.add_subsection(&section, subsection)),
            Command::RemoveSubsection { section, key } => {
                let removed = editor
                    .remove_subsection(&section, &key)
                    .map_err(Error::from_engine)?;
                to_json(&removed)
            }
            Command::AddField { scope, draft } => {
                let field = draft.build().map_err(Error::from_engine)?;
                done(editor.add_field(&scope, field))
            }
            Command::UpdateField {
                scope,
                index,
                draft,
            } => {
                let field = draft.build().map_err(Error::from_engine)?;
                done(editor.update_field(&scope, index, field))
            }
            Command::RemoveField { scope, index } => {
                let removed = editor
                    .remove_field(&scope, index)
                    .map_err(Error::from_engine)?;
                to_json(&removed)
            }
            Command::MoveField {
                scope,
                index,
                direction,
            } => editor
                .move_field(&scope, index, direction)
                .map(Value::Bool)
                .map_err(Error::from_engine),
            Command::Save { path } => {
                save(editor, &path)?;
                Ok(Value::Null)
            }
            Command::SetLogLevel { level } => {
                let previous = TracingLevel::current();
                TracingLevel::set_tracing_level(level);
                to_json(&previous)
            }
        }
    }
}

fn done(outcome: schema_form_engine::Result<()>) -> Result<Value> {
    outcome.map(|()| Value::Null).map_err(Error::from_engine)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .change_context(Error::InvalidDocument("response did not serialize".to_string()))
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).change_context(Error::file("Failed to read", path))?;
    serde_json::from_str(&text).change_context(Error::InvalidDocument(path.display().to_string()))
}

fn save(editor: &SchemaEditor, path: &Path) -> Result<()> {
    let mut document = serde_json::Map::new();
    document.insert("schema".to_string(), to_json(editor.schema())?);
    document.insert("formData".to_string(), to_json(editor.form_data())?);
    let text = serde_json::to_string_pretty(&Value::Object(document))
        .change_context(Error::InvalidDocument(path.display().to_string()))?;
    fs::write(path, text).change_context(Error::file("Failed to write", path))?;
    tracing::info!("Saved session to '{}'", path.display());
    Ok(())
}
