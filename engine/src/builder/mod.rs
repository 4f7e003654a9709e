//! Schema authoring over one field list
//!
//! [`FieldListEditor`] edits the fields of a single section or subsection and
//! keeps their keys unique, including against the subsection keys that share
//! a section's data slice. [`BuilderSession`] layers the authoring form on
//! top: a [`FieldDraft`] that is either appended or written back over the
//! field being edited.

mod draft;

use error_stack::Report;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

pub use draft::{BuilderSession, FieldDraft, parse_condition_value, parse_options};

use crate::error::{Error, Result};
use crate::schema::Field;

/// Direction of a reorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MoveDirection {
    /// Toward the start of the list
    Up,
    /// Toward the end of the list
    Down,
}

/// Editor over one field list
pub struct FieldListEditor<'a> {
    fields:   &'a mut Vec<Field>,
    reserved: Vec<String>,
}

impl<'a> FieldListEditor<'a> {
    /// Edit `fields` in place
    pub fn new(fields: &'a mut Vec<Field>) -> Self {
        Self::with_reserved_keys(fields, Vec::new())
    }

    /// Edit `fields` in place, refusing keys already taken by sibling subsections
    pub fn with_reserved_keys(fields: &'a mut Vec<Field>, reserved: Vec<String>) -> Self {
        Self { fields, reserved }
    }

    /// Current fields
    pub fn fields(&self) -> &[Field] {
        self.fields.as_slice()
    }

    /// Whether a field already uses `key`
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|f| f.key == key)
    }

    /// Append a field, rejecting a key that is already used
    pub fn add_field(&mut self, field: Field) -> Result<()> {
        if self.contains_key(&field.key) {
            tracing::warn!("Rejected field with duplicate key '{}'", field.key);
            return Err(Report::new(Error::duplicate_field(field.key)));
        }
        self.check_reserved(&field.key)?;
        tracing::debug!("Added field '{}'", field.key);
        self.fields.push(field);
        Ok(())
    }

    /// Replace the field at `index`
    ///
    /// The replacement may keep its own key but not take the key of another
    /// field in the list.
    pub fn update_field(&mut self, index: usize, field: Field) -> Result<()> {
        let len = self.fields.len();
        if index >= len {
            return Err(Report::new(Error::FieldIndexOutOfRange { index, len }));
        }
        let clashes = self
            .fields
            .iter()
            .enumerate()
            .any(|(i, f)| i != index && f.key == field.key);
        if clashes {
            tracing::warn!("Rejected update of field {index} to duplicate key '{}'", field.key);
            return Err(Report::new(Error::duplicate_field(field.key)));
        }
        self.check_reserved(&field.key)?;
        self.fields[index] = field;
        Ok(())
    }

    /// Remove and return the field at `index`, `None` when out of range
    pub fn remove_field(&mut self, index: usize) -> Option<Field> {
        (index < self.fields.len()).then(|| self.fields.remove(index))
    }

    /// Swap the field at `index` with its neighbor
    ///
    /// Moving the first field up or the last field down leaves the list
    /// untouched and returns `false`.
    pub fn move_field(&mut self, index: usize, direction: MoveDirection) -> bool {
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => index.checked_add(1),
        };
        match target {
            Some(target) if index < self.fields.len() && target < self.fields.len() => {
                self.fields.swap(index, target);
                true
            }
            _ => false,
        }
    }

    fn check_reserved(&self, key: &str) -> Result<()> {
        if self.reserved.iter().any(|reserved| reserved == key) {
            tracing::warn!("Rejected field key '{key}' taken by a subsection");
            return Err(Report::new(Error::duplicate_subsection(key)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "tests")]

    use super::*;
    use crate::schema::FieldKind;

    fn fields() -> Vec<Field> {
        vec![
            Field::new("a", "A", FieldKind::Text),
            Field::new("b", "B", FieldKind::Number),
            Field::new("c", "C", FieldKind::Date),
        ]
    }

    fn keys(fields: &[Field]) -> Vec<&str> {
        fields.iter().map(|f| f.key.as_str()).collect()
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let mut list = Vec::new();
        let mut editor = FieldListEditor::new(&mut list);
        editor.add_field(Field::new("x", "X", FieldKind::Text)).unwrap();
        let err = editor
            .add_field(Field::new("x", "Other", FieldKind::Radio))
            .unwrap_err();
        assert_eq!(err.current_context(), &Error::duplicate_field("x"));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].label, "X");
    }

    #[test]
    fn subsection_keys_are_reserved() {
        let mut list = fields();
        let mut editor = FieldListEditor::with_reserved_keys(&mut list, vec!["extra".into()]);
        let err = editor
            .add_field(Field::new("extra", "Extra", FieldKind::Text))
            .unwrap_err();
        assert_eq!(err.current_context(), &Error::duplicate_subsection("extra"));
        assert!(editor.update_field(0, Field::new("extra", "Extra", FieldKind::Text)).is_err());
        assert_eq!(keys(&list), ["a", "b", "c"]);
    }

    #[test]
    fn update_replaces_in_place() {
        let mut list = fields();
        let mut editor = FieldListEditor::new(&mut list);
        editor
            .update_field(1, Field::new("b", "Renamed", FieldKind::Textarea))
            .unwrap();
        assert_eq!(editor.fields()[1].label, "Renamed");

        assert!(editor.update_field(1, Field::new("a", "Clash", FieldKind::Text)).is_err());
        assert!(editor.update_field(9, Field::new("z", "Z", FieldKind::Text)).is_err());
        assert_eq!(keys(&list), ["a", "b", "c"]);
    }

    #[test]
    fn remove_deletes_in_place() {
        let mut list = fields();
        let mut editor = FieldListEditor::new(&mut list);
        assert_eq!(editor.remove_field(1).map(|f| f.key), Some("b".to_string()));
        assert!(editor.remove_field(5).is_none());
        assert_eq!(keys(&list), ["a", "c"]);
    }

    #[test]
    fn move_swaps_with_neighbor() {
        let mut list = fields();
        let mut editor = FieldListEditor::new(&mut list);
        assert!(editor.move_field(0, MoveDirection::Down));
        assert!(editor.move_field(2, MoveDirection::Up));
        assert_eq!(keys(&list), ["b", "c", "a"]);
    }

    #[test]
    fn move_past_either_end_is_a_no_op() {
        let mut list = fields();
        let before = list.clone();
        let mut editor = FieldListEditor::new(&mut list);
        assert!(!editor.move_field(0, MoveDirection::Up));
        assert!(!editor.move_field(2, MoveDirection::Down));
        assert!(!editor.move_field(7, MoveDirection::Up));
        assert_eq!(list, before);
    }
}
