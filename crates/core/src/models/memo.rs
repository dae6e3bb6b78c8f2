use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::date_key::DateKey;

/// One memo per day, persisted as `{ "2024-2-5": "dentist", ... }`.
///
/// A key mapped to an empty string is "present but blank": it is kept,
/// but the calendar does not mark the day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoBook {
    entries: BTreeMap<DateKey, String>,
}

impl MemoBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or overwrite the memo for `key`. Text is trimmed before storing.
    pub fn upsert(&mut self, key: DateKey, text: &str) {
        self.entries.insert(key, text.trim().to_string());
    }

    /// Remove the entry entirely. Returns the old text, if any.
    pub fn delete(&mut self, key: &DateKey) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &DateKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// True iff a non-empty memo exists for `key`.
    pub fn has_record(&self, key: &DateKey) -> bool {
        self.get(key).is_some_and(|text| !text.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in date order.
    pub fn iter(&self) -> impl Iterator<Item = (&DateKey, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
