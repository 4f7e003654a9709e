//! Running-total editor for `locationPortion` values
//!
//! A value is a list of `{country, portion}` entries. Edits that would push
//! the sum of portions over the cap are rejected outright, never clamped, and
//! a country may only be held by one entry at a time.

use error_stack::Report;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value, json};

use crate::constants::{ENTRY_COUNTRY, ENTRY_PORTION};
use crate::error::{Error, Result};
use crate::json_traits::{value_as_f64, value_as_text};
use crate::schema::Validation;

/// One `{country, portion}` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEntry {
    /// Selected country, empty until chosen
    pub country: String,
    /// Share of the total
    pub portion: Number,
}

impl Default for LocationEntry {
    fn default() -> Self {
        Self {
            country: String::new(),
            portion: Number::from(0),
        }
    }
}

impl LocationEntry {
    fn portion_f64(&self) -> f64 {
        self.portion.as_f64().unwrap_or(0.0)
    }

    fn from_value(value: &Value) -> Self {
        let portion = match value.get(ENTRY_PORTION) {
            Some(Value::Number(number)) => number.clone(),
            other => Number::from_f64(value_as_f64(other)).unwrap_or_else(|| Number::from(0)),
        };
        Self {
            country: value_as_text(value.get(ENTRY_COUNTRY)),
            portion,
        }
    }

    fn to_value(&self) -> Value {
        json!({ ENTRY_COUNTRY: self.country, ENTRY_PORTION: self.portion })
    }
}

/// Editable `locationPortion` value together with its cap
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPortion {
    entries:       Vec<LocationEntry>,
    max_total:     f64,
    error_message: String,
}

impl LocationPortion {
    /// One empty entry under the given rule
    pub fn new(validation: Option<&Validation>) -> Self {
        let validation = validation.cloned().unwrap_or_default();
        Self {
            entries:       vec![LocationEntry::default()],
            max_total:     validation.max_total_or_default(),
            error_message: validation.error_message_or_default().to_string(),
        }
    }

    /// Read a stored value; anything but a non-empty list starts with one empty entry
    pub fn from_value(value: Option<&Value>, validation: Option<&Validation>) -> Self {
        let mut portion = Self::new(validation);
        let entries: Vec<LocationEntry> = value
            .and_then(Value::as_array)
            .map(|items| items.iter().map(LocationEntry::from_value).collect())
            .unwrap_or_default();
        if !entries.is_empty() {
            portion.entries = entries;
        }
        portion
    }

    /// The value to store in form data
    pub fn to_value(&self) -> Value {
        Value::Array(self.entries.iter().map(LocationEntry::to_value).collect())
    }

    /// Current entries
    pub fn entries(&self) -> &[LocationEntry] {
        &self.entries
    }

    /// Cap on the total
    pub const fn max_total(&self) -> f64 {
        self.max_total
    }

    /// Message shown while over the cap
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Sum of all portions
    pub fn total(&self) -> f64 {
        self.entries.iter().map(LocationEntry::portion_f64).sum()
    }

    /// Whether another entry may be added
    pub fn can_add_entry(&self) -> bool {
        self.total() < self.max_total
    }

    /// Whether the total is over the cap, as persisted data may be
    pub fn exceeds_limit(&self) -> bool {
        self.total() > self.max_total
    }

    /// Append an empty entry, rejected once the cap is reached
    pub fn add_entry(&mut self) -> Result<()> {
        if !self.can_add_entry() {
            return Err(self.limit_exceeded(self.total()));
        }
        self.entries.push(LocationEntry::default());
        Ok(())
    }

    /// Choose the country of one entry
    ///
    /// A country held by another entry is rejected. Clearing back to the
    /// empty selection is always allowed.
    pub fn update_country(&mut self, index: usize, country: impl Into<String>) -> Result<()> {
        let country = country.into();
        self.check_index(index)?;
        if !country.is_empty()
            && let Some(holder) = self
                .entries
                .iter()
                .enumerate()
                .position(|(i, entry)| i != index && entry.country == country)
        {
            return Err(Report::new(Error::DuplicateCountry {
                country,
                index: holder,
            }));
        }
        self.entries[index].country = country;
        Ok(())
    }

    /// Change the portion of one entry, rejected if the total would pass the cap
    pub fn update_portion(&mut self, index: usize, portion: impl Into<Number>) -> Result<()> {
        let portion = portion.into();
        self.check_index(index)?;
        let proposed: f64 = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                if i == index {
                    portion.as_f64().unwrap_or(0.0)
                } else {
                    entry.portion_f64()
                }
            })
            .sum();
        if proposed > self.max_total {
            tracing::warn!(
                "Rejected portion {portion} for entry {index}: total {proposed} over {}",
                self.max_total
            );
            return Err(self.limit_exceeded(proposed));
        }
        self.entries[index].portion = portion;
        Ok(())
    }

    /// Remove one entry; the last remaining entry stays
    pub fn remove_entry(&mut self, index: usize) -> Result<LocationEntry> {
        self.check_index(index)?;
        if self.entries.len() == 1 {
            return Err(Report::new(Error::LastEntry));
        }
        Ok(self.entries.remove(index))
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(Report::new(Error::EntryIndexOutOfRange {
                index,
                len: self.entries.len(),
            }))
        }
    }

    fn limit_exceeded(&self, proposed: f64) -> Report<Error> {
        Report::new(Error::PortionLimitExceeded {
            proposed,
            max_total: self.max_total,
            message: self.error_message.clone(),
        })
    }
}
