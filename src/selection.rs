//! Row selection for bulk actions.
//!
//! Selection is an ordered list of keys. Which field supplies the key and
//! which rows "select all" covers are both configurable; the defaults keep
//! the established behaviour (patient name keys, whole filtered set).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ConsoleError;
use crate::types::QueueEntry;

/// Rows covered by the "select all" checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectAllScope {
    /// Every row matching the current filter, across all pages.
    #[default]
    Filtered,
    /// Only the rows on the visible page.
    Page,
}

enum_display_fromstr!(
    SelectAllScope,
    ConsoleError::Config,
    {
        Filtered => "filtered",
        Page => "page",
    }
);

/// Field a row is identified by when selected.
///
/// `PatientName` treats two entries for the same patient as one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKey {
    #[default]
    PatientName,
    Id,
}

enum_display_fromstr!(
    SelectionKey,
    ConsoleError::Config,
    {
        PatientName => "patient_name",
        Id => "id",
    }
);

impl SelectionKey {
    pub fn key_of(self, entry: &QueueEntry) -> String {
        match self {
            SelectionKey::PatientName => entry.patient_name.clone().unwrap_or_default(),
            SelectionKey::Id => entry.id.to_string(),
        }
    }

    /// Distinct keys of `rows`, first occurrence wins.
    pub fn keys_of<'a>(self, rows: impl IntoIterator<Item = &'a QueueEntry>) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for entry in rows {
            let key = self.key_of(entry);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

/// Checkbox state of the header, derived from the selection and the rows
/// "select all" would cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    NoneSelected,
    SomeSelected,
    AllSelected,
}

/// Selected row keys.
///
/// Keys stay sorted by the rank they got when first selected since the last
/// clear, so deselecting and reselecting a key puts it back in its old slot.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    keys: Vec<String>,
    ranks: HashMap<String, u64>,
    next_rank: u64,
}

impl PartialEq for SelectionSet {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys
    }
}

impl Eq for SelectionSet {}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    fn rank(&mut self, key: &str) -> u64 {
        if let Some(&rank) = self.ranks.get(key) {
            return rank;
        }
        let rank = self.next_rank;
        self.next_rank += 1;
        self.ranks.insert(key.to_string(), rank);
        rank
    }

    /// Remove exactly `key`, or insert it at its rank. A key never selected
    /// before lands at the end. Survivors keep their relative order.
    pub fn toggle(&mut self, key: &str) {
        if let Some(index) = self.keys.iter().position(|k| k == key) {
            self.keys.remove(index);
            return;
        }

        let rank = self.rank(key);
        let ranks = &self.ranks;
        let index = self
            .keys
            .partition_point(|k| ranks.get(k).is_some_and(|&r| r < rank));
        self.keys.insert(index, key.to_string());
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.ranks.clear();
        self.next_rank = 0;
    }

    pub fn state(&self, candidates: &[String]) -> SelectionState {
        if self.keys.is_empty() {
            return SelectionState::NoneSelected;
        }
        if !candidates.is_empty() && candidates.iter().all(|c| self.contains(c)) {
            SelectionState::AllSelected
        } else {
            SelectionState::SomeSelected
        }
    }

    /// Header checkbox: select every candidate unless all are already
    /// selected, in which case clear.
    pub fn toggle_all(&mut self, candidates: &[String]) {
        let all_selected = self.state(candidates) == SelectionState::AllSelected;
        self.clear();
        if all_selected {
            return;
        }
        for key in candidates {
            if !self.contains(key) {
                self.rank(key);
                self.keys.push(key.clone());
            }
        }
    }
}
