//! Collection - the ordered, id-unique set of records shown to callers.
//!
//! Order is display-relevant: newly created records are prepended. Equality
//! is structural, so a snapshot taken with `clone()` compares equal to the
//! collection it was taken from until either side changes.

use crate::record::{Record, RecordId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    records: Vec<Record>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from fetched records, dropping later duplicates of
    /// an id. Returns the collection and the number of records dropped.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> (Self, usize) {
        let mut collection = Self::new();
        let mut dropped = 0;
        for record in records {
            if collection.contains(record.id) {
                dropped += 1;
                continue;
            }
            collection.records.push(record);
        }
        (collection, dropped)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn to_vec(&self) -> Vec<Record> {
        self.records.clone()
    }

    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Insert at position 0. Returns false (and leaves the collection
    /// untouched) if the id is already present.
    pub fn prepend(&mut self, record: Record) -> bool {
        if self.contains(record.id) {
            return false;
        }
        self.records.insert(0, record);
        true
    }

    /// Swap in a new value for the record with the same id, keeping its
    /// position. Returns the previous value.
    pub fn replace(&mut self, record: Record) -> Option<Record> {
        let index = self.position(record.id)?;
        Some(std::mem::replace(&mut self.records[index], record))
    }

    pub fn remove(&mut self, id: RecordId) -> Option<Record> {
        let index = self.position(id)?;
        Some(self.records.remove(index))
    }
}

impl From<Collection> for Vec<Record> {
    fn from(collection: Collection) -> Self {
        collection.records
    }
}
