//! Top-level owner of one schema and its form data
//!
//! [`SchemaEditor`] is the single place where the schema and form data
//! change. Structural edits (sections, subsections, fields) re-normalize the
//! form data afterwards so new fields pick up their defaults; value edits go
//! through [`FormRenderer`] and replace the tree in one step.

use error_stack::Report;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::builder::{BuilderSession, FieldListEditor, MoveDirection};
use crate::constants::MAX_CASCADE_PASSES;
use crate::error::{Error, Result};
use crate::form_data::FormData;
use crate::path::FieldPath;
use crate::renderer::{FormRenderer, LocationPortion, RenderedSection};
use crate::schema::{
    Field, FormSchema, PlantSchemas, SchemaIndex, SchemaIssue, Section, Subsection, validate,
};

/// Which field list an edit targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldScope {
    /// Section key
    pub section:    String,
    /// Subsection key, `None` for the section's own fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsection: Option<String>,
}

impl FieldScope {
    /// The top-level fields of a section
    pub fn section(section: impl Into<String>) -> Self {
        Self {
            section:    section.into(),
            subsection: None,
        }
    }

    /// The fields of a subsection
    pub fn subsection(section: impl Into<String>, subsection: impl Into<String>) -> Self {
        Self {
            section:    section.into(),
            subsection: Some(subsection.into()),
        }
    }
}

/// A value edit, applied and cascaded as one state transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "edit", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FormEdit {
    /// Store a value
    SetValue {
        /// Section key
        section:  String,
        /// Path inside the section's slice
        key_path: String,
        /// New value
        value:    Value,
    },
    /// Append an empty location entry
    AddLocationEntry {
        /// Section key
        section:  String,
        /// Path of the `locationPortion` field inside the section's slice
        key_path: String,
    },
    /// Choose the country of a location entry
    UpdateLocationCountry {
        /// Section key
        section:  String,
        /// Path of the `locationPortion` field inside the section's slice
        key_path: String,
        /// Entry index
        index:    usize,
        /// Country, empty to clear
        country:  String,
    },
    /// Change the portion of a location entry
    UpdateLocationPortion {
        /// Section key
        section:  String,
        /// Path of the `locationPortion` field inside the section's slice
        key_path: String,
        /// Entry index
        index:    usize,
        /// New portion
        portion:  Number,
    },
    /// Remove a location entry
    RemoveLocationEntry {
        /// Section key
        section:  String,
        /// Path of the `locationPortion` field inside the section's slice
        key_path: String,
        /// Entry index
        index:    usize,
    },
}

/// Owner of a schema and the form data filled out against it
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaEditor {
    schema:    FormSchema,
    form_data: FormData,
}

impl Default for SchemaEditor {
    fn default() -> Self {
        Self::new(FormSchema::default(), FormData::new())
    }
}

impl SchemaEditor {
    /// Take ownership of a schema and normalize the form data against it
    pub fn new(schema: FormSchema, form_data: FormData) -> Self {
        let form_data = FormRenderer::new(&schema).normalize_form_data(&form_data);
        Self { schema, form_data }
    }

    /// The schema
    pub const fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// The current form data
    pub const fn form_data(&self) -> &FormData {
        &self.form_data
    }

    /// Give up the schema and form data, e.g. to persist them
    pub fn into_parts(self) -> (FormSchema, FormData) {
        (self.schema, self.form_data)
    }

    /// A renderer over the current schema
    pub fn renderer(&self) -> FormRenderer<'_> {
        FormRenderer::new(&self.schema)
    }

    /// Render descriptors for the current form data
    pub fn render(&self) -> Vec<RenderedSection> {
        self.renderer().render(&self.form_data)
    }

    /// Whole-schema validation
    pub fn validate(&self) -> Vec<SchemaIssue> {
        validate(&self.schema)
    }

    /// Every field path in the schema; the condition-target menu
    pub fn all_field_paths(&self) -> Vec<FieldPath> {
        SchemaIndex::build(&self.schema).all_field_paths()
    }

    /// Append an empty section
    ///
    /// Title and key must be non-empty and the key unused.
    pub fn add_section(&mut self, title: &str, key: &str) -> Result<()> {
        let (title, key) = (title.trim(), key.trim());
        if title.is_empty() {
            return Err(Report::new(Error::missing("section title")));
        }
        if key.is_empty() {
            return Err(Report::new(Error::missing("section key")));
        }
        if self.schema.section(key).is_some() {
            tracing::warn!("Rejected section with duplicate key '{key}'");
            return Err(Report::new(Error::duplicate_section(key)));
        }
        self.schema.sections.push(Section::new(title, key));
        tracing::debug!("Added section '{key}'");
        Ok(())
    }

    /// Remove a section along with its data slice
    pub fn remove_section(&mut self, key: &str) -> Result<Section> {
        let position = self
            .schema
            .sections
            .iter()
            .position(|section| section.key == key)
            .ok_or_else(|| Report::new(Error::UnknownSection(key.to_string())))?;
        let section = self.schema.sections.remove(position);

        let mut tree = self.form_data.clone().into_value();
        if let Some(root) = tree
            .get_mut(&self.schema.section_key)
            .and_then(Value::as_object_mut)
        {
            root.remove(key);
        }
        self.form_data = FormData::from_value(tree);
        self.renormalize();
        tracing::debug!("Removed section '{key}'");
        Ok(section)
    }

    /// Append a subsection to a section
    ///
    /// Its key must not be used by another subsection or a top-level field
    /// of the section, and its own field keys must be unique.
    pub fn add_subsection(&mut self, section: &str, subsection: Subsection) -> Result<()> {
        let target = self.section_mut(section)?;
        if target.subsection(&subsection.key).is_some() {
            tracing::warn!("Rejected subsection with duplicate key '{}'", subsection.key);
            return Err(Report::new(Error::duplicate_subsection(subsection.key)));
        }
        if target.fields.iter().any(|field| field.key == subsection.key) {
            tracing::warn!("Rejected subsection '{}' shadowing a field", subsection.key);
            return Err(Report::new(Error::duplicate_field(subsection.key)));
        }
        if let Some(key) = subsection.fields.iter().map(|field| &field.key).duplicates().next() {
            tracing::warn!("Rejected subsection '{}' with duplicate field '{key}'", subsection.key);
            return Err(Report::new(Error::duplicate_field(key.as_str())));
        }
        target
            .subsections
            .get_or_insert_with(Vec::new)
            .push(subsection);
        self.renormalize();
        Ok(())
    }

    /// Remove a subsection from a section
    pub fn remove_subsection(&mut self, section: &str, key: &str) -> Result<Subsection> {
        let target = self.section_mut(section)?;
        let position = target
            .subsections()
            .iter()
            .position(|sub| sub.key == key)
            .ok_or_else(|| {
                Report::new(Error::UnknownSubsection {
                    section:    section.to_string(),
                    subsection: key.to_string(),
                })
            })?;
        let removed = target
            .subsections
            .as_mut()
            .map(|subs| subs.remove(position))
            .ok_or_else(|| Report::new(Error::UnknownSection(section.to_string())))?;
        self.renormalize();
        Ok(removed)
    }

    /// Edit one field list, then re-normalize the form data
    pub fn with_fields<T, F>(&mut self, scope: &FieldScope, edit: F) -> Result<T>
    where
        F: FnOnce(&mut FieldListEditor<'_>) -> Result<T>,
    {
        let (fields, reserved) = self.fields_mut(scope)?;
        let outcome = edit(&mut FieldListEditor::with_reserved_keys(fields, reserved));
        if outcome.is_ok() {
            self.renormalize();
        }
        outcome
    }

    /// Append a field, rejecting duplicate keys
    pub fn add_field(&mut self, scope: &FieldScope, field: Field) -> Result<()> {
        self.with_fields(scope, |editor| editor.add_field(field))
    }

    /// Replace the field at `index`
    pub fn update_field(&mut self, scope: &FieldScope, index: usize, field: Field) -> Result<()> {
        self.with_fields(scope, |editor| editor.update_field(index, field))
    }

    /// Remove the field at `index`, `None` when out of range
    pub fn remove_field(&mut self, scope: &FieldScope, index: usize) -> Result<Option<Field>> {
        self.with_fields(scope, |editor| Ok(editor.remove_field(index)))
    }

    /// Swap a field with its neighbor; `false` at either end
    pub fn move_field(
        &mut self,
        scope: &FieldScope,
        index: usize,
        direction: MoveDirection,
    ) -> Result<bool> {
        self.with_fields(scope, |editor| Ok(editor.move_field(index, direction)))
    }

    /// Commit an authoring draft into a field list
    pub fn save_draft(&mut self, scope: &FieldScope, session: &mut BuilderSession) -> Result<()> {
        self.with_fields(scope, |editor| session.save(editor))
    }

    /// Store a value and cascade
    pub fn set_value(&mut self, section: &str, key_path: &str, value: Value) -> Result<()> {
        let next = self
            .renderer()
            .handle_change(&self.form_data, section, key_path, value)?;
        self.form_data = next;
        Ok(())
    }

    /// Edit a `locationPortion` value and cascade
    pub fn edit_location<F>(&mut self, section: &str, key_path: &str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut LocationPortion) -> Result<()>,
    {
        let next = self
            .renderer()
            .edit_location(&self.form_data, section, key_path, edit)?;
        self.form_data = next;
        Ok(())
    }

    /// Apply one value edit; on error nothing changes
    pub fn apply(&mut self, edit: FormEdit) -> Result<()> {
        match edit {
            FormEdit::SetValue {
                section,
                key_path,
                value,
            } => self.set_value(&section, &key_path, value),
            FormEdit::AddLocationEntry { section, key_path } => {
                self.edit_location(&section, &key_path, LocationPortion::add_entry)
            }
            FormEdit::UpdateLocationCountry {
                section,
                key_path,
                index,
                country,
            } => self.edit_location(&section, &key_path, |portion| {
                portion.update_country(index, country)
            }),
            FormEdit::UpdateLocationPortion {
                section,
                key_path,
                index,
                portion,
            } => self.edit_location(&section, &key_path, |entries| {
                entries.update_portion(index, portion)
            }),
            FormEdit::RemoveLocationEntry {
                section,
                key_path,
                index,
            } => self.edit_location(&section, &key_path, |portion| {
                portion.remove_entry(index).map(|_| ())
            }),
        }
    }

    fn section_mut(&mut self, key: &str) -> Result<&mut Section> {
        self.schema
            .section_mut(key)
            .ok_or_else(|| Report::new(Error::UnknownSection(key.to_string())))
    }

    /// Field list of a scope, plus the keys its fields may not take
    fn fields_mut(&mut self, scope: &FieldScope) -> Result<(&mut Vec<Field>, Vec<String>)> {
        let section = self.section_mut(&scope.section)?;
        match &scope.subsection {
            None => {
                let reserved = section.subsections().iter().map(|sub| sub.key.clone()).collect();
                Ok((&mut section.fields, reserved))
            }
            Some(subsection) => section
                .subsection_mut(subsection)
                .map(|sub| (&mut sub.fields, Vec::new()))
                .ok_or_else(|| {
                    Report::new(Error::UnknownSubsection {
                        section:    scope.section.clone(),
                        subsection: subsection.clone(),
                    })
                }),
        }
    }

    fn renormalize(&mut self) {
        let next = self.renderer().normalize_form_data(&self.form_data);
        self.form_data = next;
    }
}

/// Normalize one tree shared by every schema of a bundle
///
/// Conditions may cross schemas, so the steps are normalized in order and
/// the round repeats until the tree stops changing.
pub fn normalize_bundle(bundle: &PlantSchemas, data: &FormData) -> FormData {
    let renderers = bundle.steps().map(FormRenderer::new);
    let mut current = data.clone();
    for _ in 0..MAX_CASCADE_PASSES {
        let next = renderers
            .iter()
            .fold(current.clone(), |tree, renderer| renderer.normalize_form_data(&tree));
        if next == current {
            return next;
        }
        current = next;
    }
    tracing::warn!("Bundle {} form data did not settle", bundle.coverage_id);
    current
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "tests")]

    use serde_json::json;

    use super::*;
    use crate::builder::FieldDraft;
    use crate::schema::{Condition, FieldKind};

    fn editor() -> SchemaEditor {
        let schema = FormSchema::empty("root", "Root").with_section(
            Section::new("Main", "S").with_fields(vec![
                Field::new("A", "A", FieldKind::Select).with_options(["yes", "no"]),
                Field::new("B", "B", FieldKind::Text).with_condition(Condition::new("root.S.A", "yes")),
            ]),
        );
        SchemaEditor::new(schema, FormData::new())
    }

    #[test]
    fn construction_normalizes() {
        let editor = editor();
        assert_eq!(
            editor.form_data().as_value(),
            &json!({ "root": { "S": { "A": "", "B": "" } } })
        );
    }

    #[test]
    fn add_section_rejects_blank_and_duplicate_keys() {
        let mut editor = editor();
        editor.add_section("Second", "T").unwrap();
        assert_eq!(editor.schema().sections.len(), 2);

        let err = editor.add_section("Again", "T").unwrap_err();
        assert_eq!(err.current_context(), &Error::duplicate_section("T"));
        assert!(editor.add_section("", "U").is_err());
        assert!(editor.add_section("Untitled", "  ").is_err());
        assert_eq!(editor.schema().sections.len(), 2);
    }

    #[test]
    fn remove_section_drops_its_data() {
        let mut editor = editor();
        let removed = editor.remove_section("S").unwrap();
        assert_eq!(removed.key, "S");
        assert!(editor.schema().sections.is_empty());
        assert_eq!(editor.form_data().as_value(), &json!({ "root": {} }));
        assert_eq!(
            editor.remove_section("S").unwrap_err().current_context(),
            &Error::UnknownSection("S".into())
        );
    }

    #[test]
    fn new_fields_pick_up_defaults() {
        let mut editor = editor();
        let scope = FieldScope::section("S");
        editor
            .add_field(&scope, Field::new("C", "C", FieldKind::MultiSelect).with_options(["x"]))
            .unwrap();
        assert_eq!(editor.form_data().get("root.S.C"), Some(&json!([])));

        assert!(editor.add_field(&scope, Field::new("C", "Dup", FieldKind::Text)).is_err());
        assert!(editor.move_field(&scope, 2, MoveDirection::Up).unwrap());
        assert!(!editor.move_field(&scope, 0, MoveDirection::Up).unwrap());
        let keys: Vec<&str> = editor.schema().sections[0].fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, ["A", "C", "B"]);
        assert_eq!(editor.remove_field(&scope, 1).unwrap().map(|f| f.key), Some("C".into()));
        assert_eq!(editor.remove_field(&scope, 9).unwrap(), None);
    }

    #[test]
    fn subsection_fields_are_edited_in_place() {
        let mut editor = editor();
        editor
            .add_subsection(
                "S",
                Subsection::new("Extra", "extra").with_condition(Condition::new("root.S.A", "no")),
            )
            .unwrap();
        assert!(editor.add_subsection("S", Subsection::new("Again", "extra")).is_err());
        assert_eq!(editor.form_data().get("root.S.extra"), Some(&Value::Null));

        let scope = FieldScope::subsection("S", "extra");
        editor.add_field(&scope, Field::new("D", "D", FieldKind::Radio)).unwrap();
        editor.set_value("S", "A", json!("no")).unwrap();
        assert_eq!(editor.form_data().get("root.S.extra"), Some(&json!({ "D": false })));
        assert_eq!(
            editor.all_field_paths(),
            [FieldPath::new("root.S.A"), FieldPath::new("root.S.B"), FieldPath::new("root.S.extra.D")]
        );

        let missing = FieldScope::subsection("S", "nope");
        let err = editor.add_field(&missing, Field::new("E", "E", FieldKind::Text)).unwrap_err();
        assert!(matches!(err.current_context(), Error::UnknownSubsection { .. }));

        editor.remove_subsection("S", "extra").unwrap();
        assert!(editor.remove_subsection("S", "extra").is_err());
        assert!(editor.schema().sections[0].subsections().is_empty());
    }

    #[test]
    fn subsection_keys_stay_unique_in_their_slice() {
        let mut editor = editor();
        let before = editor.clone();

        let err = editor.add_subsection("S", Subsection::new("Shadow", "B")).unwrap_err();
        assert_eq!(err.current_context(), &Error::duplicate_field("B"));

        let x = Field::new("x", "X", FieldKind::Text);
        let repeated = Subsection::new("Extra", "extra").with_fields(vec![x.clone(), x]);
        let err = editor.add_subsection("S", repeated).unwrap_err();
        assert_eq!(err.current_context(), &Error::duplicate_field("x"));
        assert_eq!(editor, before);

        editor.add_subsection("S", Subsection::new("Extra", "extra")).unwrap();
        let err = editor
            .add_field(&FieldScope::section("S"), Field::new("extra", "Extra", FieldKind::Text))
            .unwrap_err();
        assert_eq!(err.current_context(), &Error::duplicate_subsection("extra"));
        assert!(editor.validate().is_empty());
    }

    #[test]
    fn builder_session_saves_through_the_editor() {
        let mut editor = editor();
        let scope = FieldScope::section("S");
        let mut session = BuilderSession::new();
        session.draft = FieldDraft {
            condition_field: "root.S.A".into(),
            condition_input: "yes, maybe".into(),
            ..FieldDraft::new("notes", "Notes", FieldKind::Textarea)
        };
        editor.save_draft(&scope, &mut session).unwrap();

        let notes = &editor.schema().sections[0].fields[2];
        assert_eq!(
            notes.condition,
            Some(Condition::new("root.S.A", vec!["yes".to_string(), "maybe".to_string()]))
        );
        assert_eq!(editor.form_data().get("root.S.notes"), Some(&json!("")));
    }

    #[test]
    fn apply_cascades_in_one_step() {
        let mut editor = editor();
        let set = |key_path: &str, value: Value| FormEdit::SetValue {
            section: "S".into(),
            key_path: key_path.into(),
            value,
        };
        editor.apply(set("A", json!("yes"))).unwrap();
        editor.apply(set("B", json!("hello"))).unwrap();
        editor.apply(set("A", json!("no"))).unwrap();
        assert_eq!(editor.form_data().get("root.S.B"), Some(&json!("")));

        let before = editor.form_data().clone();
        assert!(editor.apply(set("", json!(1))).is_err());
        assert_eq!(editor.form_data(), &before);
    }

    #[test]
    fn location_edits_deserialize_and_apply() {
        let mut editor = editor();
        editor
            .add_field(&FieldScope::section("S"), Field::new("where", "Where", FieldKind::LocationPortion))
            .unwrap();
        let edits: Vec<FormEdit> = serde_json::from_value(json!([
            { "edit": "updateLocationCountry", "section": "S", "keyPath": "where", "index": 0, "country": "Chile" },
            { "edit": "updateLocationPortion", "section": "S", "keyPath": "where", "index": 0, "portion": 60 },
            { "edit": "addLocationEntry", "section": "S", "keyPath": "where" },
            { "edit": "updateLocationPortion", "section": "S", "keyPath": "where", "index": 1, "portion": 40 }
        ]))
        .unwrap();
        for edit in edits {
            editor.apply(edit).unwrap();
        }
        assert_eq!(
            editor.form_data().get("root.S.where"),
            Some(&json!([{ "country": "Chile", "portion": 60 }, { "country": "", "portion": 40 }]))
        );

        let too_much = FormEdit::UpdateLocationPortion {
            section:  "S".into(),
            key_path: "where".into(),
            index:    1,
            portion:  Number::from(41),
        };
        assert!(editor.apply(too_much).is_err());
        let remove = FormEdit::RemoveLocationEntry {
            section:  "S".into(),
            key_path: "where".into(),
            index:    0,
        };
        editor.apply(remove).unwrap();
        assert_eq!(
            editor.form_data().get("root.S.where"),
            Some(&json!([{ "country": "", "portion": 40 }]))
        );
    }

    #[test]
    fn bundle_conditions_cross_schemas() {
        let mut bundle = PlantSchemas::empty(1);
        bundle.section_general_info = bundle.section_general_info.clone().with_section(
            Section::new("Plant", "plant")
                .with_fields(vec![Field::new("grid", "Grid", FieldKind::Radio)]),
        );
        bundle.section_traceability = bundle.section_traceability.clone().with_section(
            Section::new("Meter", "meter").with_fields(vec![
                Field::new("meterId", "Meter", FieldKind::Text)
                    .with_condition(Condition::new("generalInfo.plant.grid", true)),
            ]),
        );
        let persisted = FormData::from_value(json!({ "traceability": { "meter": { "meterId": "M-1" } } }));
        let data = normalize_bundle(&bundle, &persisted);
        assert_eq!(
            data.as_value(),
            &json!({
                "traceability": { "meter": { "meterId": "" } },
                "generalInfo": { "plant": { "grid": false } }
            })
        );
        assert_eq!(normalize_bundle(&bundle, &data), data);
    }
}
