//! Per-key tally records and the store that owns them.
//!
//! The store keeps two views of the same records: a map keyed by character for
//! lookups, and an insertion-ordered key list that gives iteration a stable
//! order. Every mutating operation creates an unseen key first, so the two
//! views never drift apart.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One tallied key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Display label; defaults to the key itself.
    pub label: String,
    /// Identifying character. Never changes after creation.
    pub key: char,
    /// Current tally.
    pub count: u64,
}

impl Record {
    /// Fresh record for `key` with the default label and a zero count.
    #[must_use]
    pub fn new(key: char) -> Self {
        Self {
            label: key.to_string(),
            key,
            count: 0,
        }
    }

    /// Display order: count descending, then label ascending, then key ascending.
    #[must_use]
    pub fn display_cmp(&self, other: &Self) -> Ordering {
        other
            .count
            .cmp(&self.count)
            .then_with(|| self.label.cmp(&other.label))
            .then_with(|| self.key.cmp(&other.key))
    }
}

/// All records of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    records: HashMap<char, Record>,
    order: Vec<char>,
}

impl RecordStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing record for `key`, or a newly created one appended to the order.
    pub fn ensure(&mut self, key: char) -> &mut Record {
        let order = &mut self.order;
        self.records.entry(key).or_insert_with(|| {
            order.push(key);
            Record::new(key)
        })
    }

    /// Add `delta` to the count, saturating at `u64::MAX`.
    pub fn increment(&mut self, key: char, delta: u64) {
        let record = self.ensure(key);
        record.count = record.count.saturating_add(delta);
    }

    /// Subtract `delta` from the count, clamping at zero.
    pub fn decrement(&mut self, key: char, delta: u64) {
        let record = self.ensure(key);
        record.count = record.count.saturating_sub(delta);
    }

    /// Replace the label, leaving the count untouched.
    pub fn relabel(&mut self, key: char, label: impl Into<String>) {
        self.ensure(key).label = label.into();
    }

    /// Pre-seed a label from a startup argument.
    pub fn seed(&mut self, key: char, label: impl Into<String>) {
        self.relabel(key, label);
    }

    /// Insert a fully-formed record, replacing any record with the same key in
    /// place. New keys are appended to the order.
    pub fn insert(&mut self, record: Record) {
        if !self.records.contains_key(&record.key) {
            self.order.push(record.key);
        }
        self.records.insert(record.key, record);
    }

    /// Merge `other` on top of this store; records from `other` win.
    pub fn absorb(&mut self, other: Self) {
        let Self { mut records, order } = other;
        for key in order {
            if let Some(record) = records.remove(&key) {
                self.insert(record);
            }
        }
    }

    /// Record for `key`, if it has been touched.
    #[must_use]
    pub fn get(&self, key: char) -> Option<&Record> {
        self.records.get(&key)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no key has a record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.order.iter().filter_map(|key| self.records.get(key))
    }

    /// Records sorted for display. The stored order is left as is.
    #[must_use]
    pub fn ordered_view(&self) -> Vec<&Record> {
        let mut view: Vec<&Record> = self.iter().collect();
        view.sort_by(|a, b| a.display_cmp(b));
        view
    }
}

impl FromIterator<Record> for RecordStore {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut store = Self::new();
        for record in iter {
            store.insert(record);
        }
        store
    }
}
