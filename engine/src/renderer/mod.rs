//! Runtime interpreter over a schema and its form data
//!
//! [`FormRenderer`] fills form data with type defaults, applies edits and
//! keeps the data consistent with the schema's conditions:
//!
//! - a hidden field holds its type default, and its companion value is `""`
//! - a hidden subsection's whole data slice is `null`
//! - a visible subsection whose slice is missing gets one derived right away
//!
//! Every edit is applied to a copy of the tree and the reset cascade runs on
//! that copy until nothing changes, so callers only ever see the settled
//! result.

mod location;
mod widget;

use error_stack::Report;
use serde_json::{Map, Value};

pub use location::{LocationEntry, LocationPortion};
pub use widget::{RenderedField, RenderedSection, RenderedSubsection, Widget};

use crate::constants::MAX_CASCADE_PASSES;
use crate::error::{Error, Result};
use crate::evaluator::evaluate;
use crate::form_data::FormData;
use crate::path::FieldPath;
use crate::schema::{Condition, Field, FieldKind, FormSchema, SchemaIndex};

/// Interpreter for one schema
#[derive(Debug, Clone)]
pub struct FormRenderer<'a> {
    schema: &'a FormSchema,
    index:  SchemaIndex<'a>,
}

impl<'a> FormRenderer<'a> {
    /// Index `schema` for rendering
    pub fn new(schema: &'a FormSchema) -> Self {
        Self {
            schema,
            index: SchemaIndex::build(schema),
        }
    }

    /// The schema being interpreted
    pub const fn schema(&self) -> &'a FormSchema {
        self.schema
    }

    /// Fill absent values with type defaults and settle visibility
    ///
    /// Persisted values are kept wherever the field is visible. Running this
    /// on its own output returns the same tree.
    pub fn normalize_form_data(&self, data: &FormData) -> FormData {
        let mut tree = data.clone();
        self.settle(&mut tree);
        tree
    }

    /// Whether `field` is visible against `data`
    pub fn should_show_field(data: &FormData, field: &Field) -> bool {
        evaluate(data.as_value(), field.condition.as_ref())
    }

    /// Whether `condition` holds against `data`; absent conditions hold
    pub fn should_show_condition(data: &FormData, condition: Option<&Condition>) -> bool {
        evaluate(data.as_value(), condition)
    }

    /// Store `value` at `key_path` inside a section's slice, then cascade
    ///
    /// `key_path` is relative to the section: `field` for a top-level field,
    /// `subsection.field` for a subsection field. Returns the settled tree;
    /// `data` itself is left untouched.
    pub fn handle_change(
        &self,
        data: &FormData,
        section: &str,
        key_path: &str,
        value: Value,
    ) -> Result<FormData> {
        let path = self.section_relative_path(section, key_path)?;
        let mut tree = data.clone();
        tree.set(&path, value)?;
        tracing::debug!("Set '{path}', running cascade");
        self.settle(&mut tree);
        Ok(tree)
    }

    /// Apply an edit to a `locationPortion` value, then cascade
    ///
    /// A rejected edit (over the cap, duplicate country, last entry) leaves
    /// the data as it was and surfaces the error.
    pub fn edit_location<F>(
        &self,
        data: &FormData,
        section: &str,
        key_path: &str,
        edit: F,
    ) -> Result<FormData>
    where
        F: FnOnce(&mut LocationPortion) -> Result<()>,
    {
        let path = self.section_relative_path(section, key_path)?;
        let field = self
            .index
            .lookup(&path)
            .and_then(|id| self.index.get(id))
            .map(|node| node.field)
            .filter(|field| field.kind() == Some(FieldKind::LocationPortion))
            .ok_or_else(|| Report::new(Error::InvalidPath(path.to_string())))?;

        let mut portion = LocationPortion::from_value(data.get(&path), field.validation.as_ref());
        edit(&mut portion)?;
        self.handle_change(data, section, key_path, portion.to_value())
    }

    /// Render descriptors for every section, visible fields only
    pub fn render(&self, data: &FormData) -> Vec<RenderedSection> {
        self.schema
            .sections
            .iter()
            .map(|section| {
                let section_path = self.schema.section_path(&section.key);
                RenderedSection {
                    title:       section.title.clone(),
                    key:         section.key.clone(),
                    fields:      render_fields(data, &section_path, &section.fields),
                    subsections: section
                        .subsections()
                        .iter()
                        .filter(|sub| Self::should_show_condition(data, sub.condition.as_ref()))
                        .map(|sub| RenderedSubsection {
                            title:  sub.title.clone(),
                            key:    sub.key.clone(),
                            fields: render_fields(data, &section_path.join(&sub.key), &sub.fields),
                        })
                        .collect(),
                }
            })
            .collect()
    }

    /// Widget for one field; unsupported types render nothing
    pub fn render_field(data: &FormData, field: &Field, path: &FieldPath) -> Option<Widget> {
        let Some(kind) = field.kind() else {
            tracing::warn!(
                "Skipping field '{path}' with unsupported type '{}'",
                field.field_type.name()
            );
            return None;
        };
        Some(Widget::for_field(kind, field, path, data))
    }

    fn section_relative_path(&self, section: &str, key_path: &str) -> Result<FieldPath> {
        if self.schema.section(section).is_none() {
            return Err(Report::new(Error::UnknownSection(section.to_string())));
        }
        Ok(self.schema.section_path(section).join(key_path))
    }

    /// Reconcile until a pass changes nothing
    fn settle(&self, tree: &mut FormData) {
        for pass in 1..=MAX_CASCADE_PASSES {
            if !self.reconcile(tree) {
                tracing::debug!("Form data settled after {pass} pass(es)");
                return;
            }
        }
        tracing::warn!(
            "Form data for '{}' did not settle after {MAX_CASCADE_PASSES} passes, conditions may form a cycle",
            self.schema.section_key
        );
    }

    /// One pass over every section; true if anything was written
    fn reconcile(&self, tree: &mut FormData) -> bool {
        let mut changed = false;
        for section in &self.schema.sections {
            let section_path = self.schema.section_path(&section.key);
            for field in &section.fields {
                changed |= reconcile_field(tree, &section_path, field);
            }

            for sub in section.subsections() {
                let sub_path = section_path.join(&sub.key);
                if !evaluate(tree.as_value(), sub.condition.as_ref()) {
                    if tree.get(&sub_path).is_none_or(|slice| !slice.is_null()) {
                        tracing::debug!("Subsection '{sub_path}' hidden, clearing its slice");
                        changed |= write(tree, &sub_path, Value::Null);
                    }
                    continue;
                }
                if !tree.get(&sub_path).is_some_and(Value::is_object) {
                    tracing::debug!("Subsection '{sub_path}' visible, deriving its slice");
                    changed |= write(tree, &sub_path, Value::Object(Map::new()));
                }
                for field in &sub.fields {
                    changed |= reconcile_field(tree, &sub_path, field);
                }
            }
        }
        changed
    }
}

fn render_fields(data: &FormData, parent: &FieldPath, fields: &[Field]) -> Vec<RenderedField> {
    fields
        .iter()
        .filter(|field| FormRenderer::should_show_field(data, field))
        .filter_map(|field| {
            let path = parent.join(&field.key);
            FormRenderer::render_field(data, field, &path).map(|widget| RenderedField {
                key: field.key.clone(),
                path,
                required: field.required.unwrap_or(false),
                widget,
            })
        })
        .collect()
}

/// Bring one field (and its companion) in line with its visibility
fn reconcile_field(tree: &mut FormData, parent: &FieldPath, field: &Field) -> bool {
    let path = parent.join(&field.key);
    let visible = evaluate(tree.as_value(), field.condition.as_ref());
    let current = tree.get(&path);

    let mut changed = if visible {
        needs_default(field, current) && write(tree, &path, field.default_value())
    } else {
        let default = field.default_value();
        if current == Some(&default) {
            false
        } else {
            tracing::debug!("Field '{path}' hidden, resetting to default");
            write(tree, &path, default)
        }
    };

    if let Some(companion) = field.companion_key() {
        let companion_path = parent.join(companion);
        let empty = Value::String(String::new());
        let current = tree.get(&companion_path);
        let reset = if visible {
            current.is_none_or(Value::is_null)
        } else {
            current != Some(&empty)
        };
        if reset {
            changed |= write(tree, &companion_path, empty);
        }
    }
    changed
}

/// Whether a visible field's stored value must be replaced by its default
fn needs_default(field: &Field, current: Option<&Value>) -> bool {
    match (field.kind(), current) {
        (_, None | Some(Value::Null)) => true,
        (Some(FieldKind::LocationPortion), Some(value)) => {
            !value.as_array().is_some_and(|entries| !entries.is_empty())
        }
        _ => false,
    }
}

/// Store a value, logging and skipping paths that cannot be addressed
fn write(tree: &mut FormData, path: &FieldPath, value: Value) -> bool {
    match tree.set(path, value) {
        Ok(()) => true,
        Err(report) => {
            tracing::warn!("Skipping unwritable path '{path}': {report:?}");
            false
        }
    }
}
