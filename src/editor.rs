//! Quarter draft: the editable working copy behind `record` commands.
//!
//! Rows are added, edited and deleted per category, then the whole draft is
//! committed as one [`WealthRecord`] that replaces any record with the same
//! quarter label.

use crate::analysis::{category_totals, sum_entries};
use crate::categories::CategoryId;
use crate::models::{quarter_label, Entry, QuarterData, WealthRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors from editing a draft.
#[derive(Debug, Error, PartialEq)]
pub enum EditorError {
    #[error("no entry with id '{id}' in {category}")]
    UnknownEntry { category: CategoryId, id: String },

    #[error("quarter label must not be empty")]
    EmptyQuarterLabel,
}

/// One field change on an existing row.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryUpdate {
    Label(String),
    Value(f64),
}

/// Working copy of a quarter record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterDraft {
    /// Label the draft will be saved under.
    pub quarter_id: String,
    /// Entries being edited.
    pub data: QuarterData,
}

impl QuarterDraft {
    /// Empty draft with the given quarter label.
    pub fn new(quarter_id: impl Into<String>) -> Self {
        Self {
            quarter_id: quarter_id.into(),
            data: QuarterData::empty(),
        }
    }

    /// Empty draft labelled with the quarter containing `now`.
    pub fn for_quarter_of(now: DateTime<Utc>) -> Self {
        Self::new(quarter_label(&now))
    }

    /// Draft pre-filled from an existing record.
    pub fn from_record(record: &WealthRecord) -> Self {
        Self {
            quarter_id: record.id.clone(),
            data: record.data.clone(),
        }
    }

    /// Change the label the draft will be saved under.
    pub fn set_quarter(&mut self, label: &str) -> Result<(), EditorError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(EditorError::EmptyQuarterLabel);
        }
        self.quarter_id = label.to_string();
        Ok(())
    }

    /// Append a row to a category, returning its new id.
    pub fn add_entry(&mut self, category: CategoryId, label: impl Into<String>, value: f64) -> String {
        let id = self.fresh_id(category);
        self.data
            .get_mut(category)
            .push(Entry::new(id.clone(), label, value));
        id
    }

    /// Change one field of an existing row.
    pub fn update_entry(
        &mut self,
        category: CategoryId,
        id: &str,
        update: EntryUpdate,
    ) -> Result<&Entry, EditorError> {
        let entry = self
            .data
            .get_mut(category)
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| EditorError::UnknownEntry {
                category,
                id: id.to_string(),
            })?;

        match update {
            EntryUpdate::Label(label) => entry.label = label,
            EntryUpdate::Value(value) => entry.value = value,
        }

        Ok(entry)
    }

    /// Remove a row, returning it.
    pub fn delete_entry(&mut self, category: CategoryId, id: &str) -> Result<Entry, EditorError> {
        let entries = self.data.get_mut(category);
        let idx = entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| EditorError::UnknownEntry {
                category,
                id: id.to_string(),
            })?;
        Ok(entries.remove(idx))
    }

    /// Running total of one category.
    pub fn category_total(&self, category: CategoryId) -> f64 {
        sum_entries(self.data.get(category))
    }

    /// Running totals of every category in canonical order.
    pub fn category_totals(&self) -> Vec<(CategoryId, f64)> {
        category_totals(&self.data)
    }

    /// Turn the draft into a record stamped at `now`.
    pub fn commit(&self, now: DateTime<Utc>) -> WealthRecord {
        WealthRecord {
            id: self.quarter_id.clone(),
            timestamp: now.timestamp_millis(),
            data: self.data.clone(),
        }
    }

    fn fresh_id(&self, category: CategoryId) -> String {
        let existing = self.data.get(category);
        loop {
            let id = Uuid::new_v4().simple().to_string()[..8].to_string();
            if !existing.iter().any(|e| e.id == id) {
                return id;
            }
        }
    }
}

/// Parse a user-typed amount.
///
/// Thousands separators, spaces and a leading currency sign are ignored.
/// The minus sign may sit on either side of the currency sign.
/// Malformed or non-finite input yields 0.
pub fn parse_amount(input: &str) -> f64 {
    let trimmed = input.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };

    let digits: String = rest
        .trim_start_matches(|c: char| matches!(c, '¥' | '$' | '€' | '£'))
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' '))
        .collect();
    let cleaned = if negative { format!("-{}", digits) } else { digits };

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            if !cleaned.is_empty() {
                tracing::warn!("Could not parse amount '{}', using 0", input);
            }
            0.0
        }
    }
}
