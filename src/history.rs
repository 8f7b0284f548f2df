//! Recently-viewed history.
//!
//! A bounded, deduplicated sequence of the last distinct records a caller
//! looked up, most recently accessed last. Re-adding a record promotes it
//! to the most-recent position; exceeding capacity evicts the least
//! recently used entry.

use std::collections::VecDeque;

use serde::Serialize;

use crate::model::{ItemKind, TaskRecord};

pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// A snapshot of a record at the moment it was viewed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub kind: ItemKind,
    pub record: TaskRecord,
}

/// Bounded LRU of viewed records
#[derive(Debug, Clone)]
pub struct History {
    capacity: usize,
    entries: VecDeque<HistoryEntry>,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::new(),
        }
    }

    /// Record a view, promoting an existing entry for the same id
    pub fn add(&mut self, kind: ItemKind, record: TaskRecord) {
        if self.capacity == 0 {
            return;
        }
        self.entries.retain(|entry| entry.record.id != record.id);
        self.entries.push_back(HistoryEntry { kind, record });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Drop the entry for `id`, if present (used when the record is deleted)
    pub fn remove(&mut self, id: u64) {
        self.entries.retain(|entry| entry.record.id != id);
    }

    /// Snapshot, oldest first
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;

    fn record(id: u64) -> TaskRecord {
        TaskRecord {
            id,
            name: format!("item-{id}"),
            description: String::new(),
            status: Status::New,
            start_time: None,
            duration_min: None,
        }
    }

    fn ids(history: &History) -> Vec<u64> {
        history.entries().iter().map(|e| e.record.id).collect()
    }

    #[test]
    fn capacity_two_evicts_oldest_and_promotes_on_readd() {
        let mut history = History::new(2);
        history.add(ItemKind::Task, record(1));
        history.add(ItemKind::Task, record(2));
        history.add(ItemKind::Task, record(3));
        assert_eq!(ids(&history), vec![2, 3]);

        history.add(ItemKind::Task, record(2));
        assert_eq!(ids(&history), vec![3, 2]);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn readd_keeps_a_single_entry_per_id() {
        let mut history = History::new(5);
        history.add(ItemKind::Task, record(1));
        history.add(ItemKind::Epic, record(2));
        history.add(ItemKind::Task, record(1));
        assert_eq!(ids(&history), vec![2, 1]);
    }

    #[test]
    fn remove_drops_only_the_given_id() {
        let mut history = History::new(5);
        history.add(ItemKind::Task, record(1));
        history.add(ItemKind::Task, record(2));
        history.remove(1);
        history.remove(42);
        assert_eq!(ids(&history), vec![2]);
    }

    #[test]
    fn zero_capacity_records_nothing() {
        let mut history = History::new(0);
        history.add(ItemKind::Task, record(1));
        assert!(history.is_empty());
    }

    #[test]
    fn clear_empties_the_sequence() {
        let mut history = History::default();
        history.add(ItemKind::Task, record(1));
        history.clear();
        assert!(history.is_empty());
    }
}
