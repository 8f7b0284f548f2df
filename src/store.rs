//! The task store: owner of the entity collections and their invariants.
//!
//! `TaskStore` is the sole mutator of tasks, epics, and subtasks. It issues
//! ids, validates every change before applying it, keeps the slot index and
//! epic rollups consistent on each mutation, and records lookups in the
//! viewed-history. Collections are id-keyed arenas sharing a single id
//! space; every cross-entity link is a plain id resolved here.
//!
//! Mutators take `&mut self`. Embedders with concurrent callers wrap the
//! store in one mutex; no operation blocks on I/O (persistence lives in
//! `persist`).

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::history::{History, HistoryEntry, DEFAULT_HISTORY_CAPACITY};
use crate::ids::IdGen;
use crate::model::{Epic, ItemKind, NewEpic, NewSubtask, NewTask, Subtask, TaskRecord};
use crate::rollup::rollup;
use crate::slot::{Slot, SlotIndex};

#[derive(Debug)]
pub struct TaskStore {
    tasks: BTreeMap<u64, TaskRecord>,
    epics: BTreeMap<u64, Epic>,
    subtasks: BTreeMap<u64, Subtask>,
    slots: SlotIndex,
    history: History,
    ids: IdGen,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self::with_history_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_history_capacity(capacity: usize) -> Self {
        Self {
            tasks: BTreeMap::new(),
            epics: BTreeMap::new(),
            subtasks: BTreeMap::new(),
            slots: SlotIndex::new(),
            history: History::new(capacity),
            ids: IdGen::new(),
        }
    }

    /// The id the generator would issue next (persisted as metadata)
    pub fn next_id(&self) -> u64 {
        self.ids.peek()
    }

    // =========================================================================
    // Creation
    // =========================================================================

    pub fn create_task(&mut self, new: NewTask) -> Result<u64> {
        self.validate_draft(&new.name, new.duration_min, None)?;
        let id = self.ids.issue();
        self.insert_task(id, new)
    }

    /// Secondary creation path with a caller-supplied id.
    ///
    /// Used by the codec on reload and by callers that manage their own
    /// ids. The generator is bumped past `id` so it is never re-issued.
    pub fn create_task_with_id(&mut self, id: u64, new: NewTask) -> Result<u64> {
        self.validate_supplied_id(id)?;
        self.validate_draft(&new.name, new.duration_min, None)?;
        self.ids.bump_past(id);
        self.insert_task(id, new)
    }

    pub fn create_epic(&mut self, new: NewEpic) -> Result<u64> {
        self.validate_draft(&new.name, None, None)?;
        let id = self.ids.issue();
        self.insert_epic(id, new)
    }

    pub fn create_epic_with_id(&mut self, id: u64, new: NewEpic) -> Result<u64> {
        self.validate_supplied_id(id)?;
        self.validate_draft(&new.name, None, None)?;
        self.ids.bump_past(id);
        self.insert_epic(id, new)
    }

    pub fn create_subtask(&mut self, new: NewSubtask) -> Result<u64> {
        self.validate_draft(&new.name, new.duration_min, None)?;
        if !self.epics.contains_key(&new.epic_id) {
            return Err(Error::EpicNotFound(new.epic_id));
        }
        let id = self.ids.issue();
        self.insert_subtask(id, new)
    }

    pub fn create_subtask_with_id(&mut self, id: u64, new: NewSubtask) -> Result<u64> {
        self.validate_supplied_id(id)?;
        self.validate_draft(&new.name, new.duration_min, None)?;
        if !self.epics.contains_key(&new.epic_id) {
            return Err(Error::EpicNotFound(new.epic_id));
        }
        self.ids.bump_past(id);
        self.insert_subtask(id, new)
    }

    fn insert_task(&mut self, id: u64, new: NewTask) -> Result<u64> {
        let record = TaskRecord {
            id,
            name: new.name,
            description: new.description,
            status: new.status,
            start_time: new.start_time,
            duration_min: new.duration_min,
        };
        if let Some(slot) = record.slot() {
            self.slots.reserve(id, slot)?;
        }
        self.tasks.insert(id, record);
        debug!(id, "task created");
        Ok(id)
    }

    fn insert_epic(&mut self, id: u64, new: NewEpic) -> Result<u64> {
        let epic = Epic {
            record: TaskRecord {
                id,
                name: new.name,
                description: new.description,
                status: Default::default(),
                start_time: None,
                duration_min: None,
            },
            subtask_ids: Vec::new(),
            end_time: None,
        };
        self.epics.insert(id, epic);
        debug!(id, "epic created");
        Ok(id)
    }

    fn insert_subtask(&mut self, id: u64, new: NewSubtask) -> Result<u64> {
        let subtask = Subtask {
            record: TaskRecord {
                id,
                name: new.name,
                description: new.description,
                status: new.status,
                start_time: new.start_time,
                duration_min: new.duration_min,
            },
            epic_id: new.epic_id,
        };
        if let Some(slot) = subtask.record.slot() {
            self.slots.reserve(id, slot)?;
        }
        let epic_id = subtask.epic_id;
        self.subtasks.insert(id, subtask);
        if let Some(epic) = self.epics.get_mut(&epic_id) {
            epic.subtask_ids.push(id);
        }
        self.refresh_epic(epic_id);
        debug!(id, epic_id, "subtask created");
        Ok(id)
    }

    // =========================================================================
    // Updates
    // =========================================================================

    /// Replace a stored task. The id must already exist.
    pub fn update_task(&mut self, record: TaskRecord) -> Result<()> {
        if !self.tasks.contains_key(&record.id) {
            return Err(Error::TaskNotFound(record.id));
        }
        self.validate_draft(&record.name, record.duration_min, Some(record.id))?;
        self.apply_schedule(record.id, record.slot())?;
        debug!(id = record.id, "task updated");
        self.tasks.insert(record.id, record);
        Ok(())
    }

    /// Replace a stored subtask, re-aggregating the parent epic.
    ///
    /// When `epic_id` moves, the new epic must exist and both old and new
    /// parents are re-aggregated.
    pub fn update_subtask(&mut self, subtask: Subtask) -> Result<()> {
        let id = subtask.record.id;
        let old_epic_id = match self.subtasks.get(&id) {
            Some(existing) => existing.epic_id,
            None => return Err(Error::SubtaskNotFound(id)),
        };
        if subtask.epic_id != old_epic_id && !self.epics.contains_key(&subtask.epic_id) {
            return Err(Error::EpicNotFound(subtask.epic_id));
        }
        self.validate_draft(&subtask.record.name, subtask.record.duration_min, Some(id))?;
        self.apply_schedule(id, subtask.record.slot())?;

        let new_epic_id = subtask.epic_id;
        self.subtasks.insert(id, subtask);
        if new_epic_id != old_epic_id {
            if let Some(epic) = self.epics.get_mut(&old_epic_id) {
                epic.subtask_ids.retain(|&member| member != id);
            }
            if let Some(epic) = self.epics.get_mut(&new_epic_id) {
                epic.subtask_ids.push(id);
            }
            self.refresh_epic(old_epic_id);
        }
        self.refresh_epic(new_epic_id);
        debug!(id, epic_id = new_epic_id, "subtask updated");
        Ok(())
    }

    /// Rename an epic or change its description.
    ///
    /// Everything else on an epic is derived; callers cannot set it.
    pub fn update_epic_details(&mut self, id: u64, name: String, description: String) -> Result<()> {
        if !self.epics.contains_key(&id) {
            return Err(Error::EpicNotFound(id));
        }
        self.validate_draft(&name, None, Some(id))?;
        if let Some(epic) = self.epics.get_mut(&id) {
            epic.record.name = name;
            epic.record.description = description;
        }
        debug!(id, "epic updated");
        Ok(())
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Owned copy of a task; a hit is recorded in the viewed-history
    pub fn task(&mut self, id: u64) -> Option<TaskRecord> {
        let record = self.tasks.get(&id).cloned()?;
        self.history.add(ItemKind::Task, record.clone());
        Some(record)
    }

    /// Owned copy of an epic; a hit is recorded in the viewed-history
    pub fn epic(&mut self, id: u64) -> Option<Epic> {
        let epic = self.epics.get(&id).cloned()?;
        self.history.add(ItemKind::Epic, epic.record.clone());
        Some(epic)
    }

    /// Owned copy of a subtask; a hit is recorded in the viewed-history
    pub fn subtask(&mut self, id: u64) -> Option<Subtask> {
        let subtask = self.subtasks.get(&id).cloned()?;
        self.history.add(ItemKind::Subtask, subtask.record.clone());
        Some(subtask)
    }

    /// Snapshot of all tasks, ascending by id
    pub fn tasks(&self) -> Vec<TaskRecord> {
        self.tasks.values().cloned().collect()
    }

    /// Snapshot of all epics, ascending by id
    pub fn epics(&self) -> Vec<Epic> {
        self.epics.values().cloned().collect()
    }

    /// Snapshot of all subtasks, ascending by id
    pub fn subtasks(&self) -> Vec<Subtask> {
        self.subtasks.values().cloned().collect()
    }

    /// Members of an epic in membership order; empty when the epic has
    /// none or does not exist
    pub fn subtasks_of(&self, epic_id: u64) -> Vec<Subtask> {
        let Some(epic) = self.epics.get(&epic_id) else {
            return Vec::new();
        };
        epic.subtask_ids
            .iter()
            .filter_map(|id| self.subtasks.get(id))
            .cloned()
            .collect()
    }

    /// All scheduled tasks and subtasks, ascending by start time.
    ///
    /// Records without a start time have no position in this view and are
    /// excluded. Epics are envelopes, not schedulable, so they never appear.
    pub fn prioritized(&self) -> Vec<TaskRecord> {
        let mut out: Vec<TaskRecord> = self
            .tasks
            .values()
            .filter(|task| task.start_time.is_some())
            .cloned()
            .chain(
                self.subtasks
                    .values()
                    .filter(|subtask| subtask.record.start_time.is_some())
                    .map(|subtask| subtask.record.clone()),
            )
            .collect();
        out.sort_by_key(|record| (record.start_time, record.id));
        out
    }

    /// Snapshot of the viewed-history, oldest first
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.entries()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Pairwise interval-overlap predicate, independent of the index
    pub fn tasks_overlap(a: &TaskRecord, b: &TaskRecord) -> bool {
        match (a.slot(), b.slot()) {
            (Some(x), Some(y)) => x.overlaps(&y),
            _ => false,
        }
    }

    /// True iff no reservation intersects `[start, end)`
    pub fn is_available(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.slots.is_available(start, end)
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Delete a task; absent ids are an error, uniformly with the other
    /// delete operations.
    pub fn delete_task(&mut self, id: u64) -> Result<()> {
        if self.tasks.remove(&id).is_none() {
            return Err(Error::TaskNotFound(id));
        }
        self.forget(id);
        debug!(id, "task deleted");
        Ok(())
    }

    /// Delete a subtask, updating and re-aggregating its parent epic
    pub fn delete_subtask(&mut self, id: u64) -> Result<()> {
        let Some(subtask) = self.subtasks.remove(&id) else {
            return Err(Error::SubtaskNotFound(id));
        };
        self.forget(id);
        if let Some(epic) = self.epics.get_mut(&subtask.epic_id) {
            epic.subtask_ids.retain(|&member| member != id);
        }
        self.refresh_epic(subtask.epic_id);
        debug!(id, epic_id = subtask.epic_id, "subtask deleted");
        Ok(())
    }

    /// Delete an epic, cascading over its member subtasks first
    pub fn delete_epic(&mut self, id: u64) -> Result<()> {
        let Some(epic) = self.epics.remove(&id) else {
            return Err(Error::EpicNotFound(id));
        };
        for member in &epic.subtask_ids {
            self.subtasks.remove(member);
            self.forget(*member);
        }
        self.forget(id);
        debug!(id, members = epic.subtask_ids.len(), "epic deleted");
        Ok(())
    }

    pub fn delete_all_tasks(&mut self) {
        let ids: Vec<u64> = self.tasks.keys().copied().collect();
        for id in ids {
            self.forget(id);
        }
        self.tasks.clear();
        debug!("all tasks deleted");
    }

    pub fn delete_all_subtasks(&mut self) {
        let ids: Vec<u64> = self.subtasks.keys().copied().collect();
        for id in ids {
            self.forget(id);
        }
        self.subtasks.clear();
        let epic_ids: Vec<u64> = self.epics.keys().copied().collect();
        for epic_id in epic_ids {
            if let Some(epic) = self.epics.get_mut(&epic_id) {
                epic.subtask_ids.clear();
            }
            self.refresh_epic(epic_id);
        }
        debug!("all subtasks deleted");
    }

    /// Delete all epics; their subtasks go with them
    pub fn delete_all_epics(&mut self) {
        let ids: Vec<u64> = self.subtasks.keys().copied().collect();
        for id in ids {
            self.forget(id);
        }
        self.subtasks.clear();
        let ids: Vec<u64> = self.epics.keys().copied().collect();
        for id in ids {
            self.forget(id);
        }
        self.epics.clear();
        debug!("all epics deleted");
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Release the slot and history entries belonging to a removed id
    fn forget(&mut self, id: u64) {
        self.slots.release(id);
        self.history.remove(id);
    }

    /// Re-reserve or release a record's slot on update.
    ///
    /// `SlotIndex::reserve` ignores the record's own prior reservation and
    /// leaves it intact on conflict, so a failed update changes nothing.
    fn apply_schedule(&mut self, id: u64, slot: Option<Slot>) -> Result<()> {
        match slot {
            Some(slot) => self.slots.reserve(id, slot),
            None => {
                self.slots.release(id);
                Ok(())
            }
        }
    }

    /// Recompute an epic's derived status and time envelope
    fn refresh_epic(&mut self, epic_id: u64) {
        let derived = rollup(
            self.subtasks
                .values()
                .filter(|subtask| subtask.epic_id == epic_id),
        );
        if let Some(epic) = self.epics.get_mut(&epic_id) {
            epic.record.status = derived.status;
            epic.record.start_time = derived.start_time;
            epic.record.duration_min = derived.duration_min;
            epic.end_time = derived.end_time;
        }
    }

    /// Shared creation/update validation: non-empty name, name unique
    /// across the whole id space (excluding the record itself on update),
    /// positive duration when set.
    fn validate_draft(
        &self,
        name: &str,
        duration_min: Option<i64>,
        exclude_id: Option<u64>,
    ) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::EmptyName);
        }
        if self.name_taken(name, exclude_id) {
            return Err(Error::DuplicateName(name.to_string()));
        }
        if let Some(minutes) = duration_min {
            if minutes <= 0 {
                return Err(Error::InvalidArgument(format!(
                    "duration must be positive, got {minutes}"
                )));
            }
            if Duration::try_minutes(minutes).is_none() {
                return Err(Error::InvalidArgument(format!(
                    "duration out of range: {minutes} minutes"
                )));
            }
        }
        Ok(())
    }

    fn name_taken(&self, name: &str, exclude_id: Option<u64>) -> bool {
        self.tasks
            .values()
            .map(|task| (task.id, task.name.as_str()))
            .chain(
                self.epics
                    .values()
                    .map(|epic| (epic.record.id, epic.record.name.as_str())),
            )
            .chain(
                self.subtasks
                    .values()
                    .map(|subtask| (subtask.record.id, subtask.record.name.as_str())),
            )
            .any(|(id, held)| Some(id) != exclude_id && held == name)
    }

    fn validate_supplied_id(&self, id: u64) -> Result<()> {
        if id == 0 {
            return Err(Error::InvalidId(id));
        }
        if self.tasks.contains_key(&id)
            || self.epics.contains_key(&id)
            || self.subtasks.contains_key(&id)
        {
            return Err(Error::DuplicateId(id));
        }
        Ok(())
    }
}
