//! Time-slot reservations and overlap detection.
//!
//! A slot is a half-open interval `[start, end)`. Two slots overlap iff
//! `a.start < b.end && b.start < a.end`, so touching endpoints never
//! conflict. Intervals are compared directly, not bucketed, so arbitrarily
//! short overlaps are detected exactly.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};

/// Half-open time interval occupied by a scheduled record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Slot {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Half-open overlap test; touching endpoints do not overlap
    pub fn overlaps(&self, other: &Slot) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Index of reserved slots, keyed by the owning record's id.
///
/// Holds no entity copies; the store resolves ids back to records.
#[derive(Debug, Clone, Default)]
pub struct SlotIndex {
    reserved: HashMap<u64, Slot>,
}

impl SlotIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot for `id`.
    ///
    /// Replaces any previous reservation held by the same id, so an update
    /// never conflicts with its own prior slot. Fails without mutating when
    /// the slot overlaps a reservation held by a different id.
    pub fn reserve(&mut self, id: u64, slot: Slot) -> Result<()> {
        if let Some(other) = self
            .reserved
            .iter()
            .find(|(&held, held_slot)| held != id && held_slot.overlaps(&slot))
            .map(|(&held, _)| held)
        {
            return Err(Error::SlotConflict { id, other });
        }
        self.reserved.insert(id, slot);
        Ok(())
    }

    /// Drop the reservation for `id`; releasing an unreserved id is a no-op
    pub fn release(&mut self, id: u64) {
        self.reserved.remove(&id);
    }

    /// True iff no reservation intersects `[start, end)`
    pub fn is_available(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        let probe = Slot::new(start, end);
        !self.reserved.values().any(|slot| slot.overlaps(&probe))
    }

    /// The slot currently held by `id`, if any
    pub fn slot_for(&self, id: u64) -> Option<Slot> {
        self.reserved.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.reserved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reserved.is_empty()
    }
}
