//! Core entity model: tasks, epics, and subtasks.
//!
//! There is no inheritance here. `TaskRecord` is the shared base record;
//! `Epic` and `Subtask` wrap one, and `ItemKind` is the explicit discriminant
//! used by the persistence codec and the viewed-history. All cross-entity
//! links (`Epic::subtask_ids`, `Subtask::epic_id`) are plain ids resolved
//! through the store, never live references.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::slot::Slot;

// =============================================================================
// Status
// =============================================================================

/// Work status of a task, subtask, or (derived) epic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Not started
    #[default]
    New,
    /// Work underway
    InProgress,
    /// Finished
    Done,
}

impl Status {
    /// Canonical storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::New => "new",
            Status::InProgress => "in_progress",
            Status::Done => "done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(Status::New),
            "in_progress" | "in-progress" => Ok(Status::InProgress),
            "done" => Ok(Status::Done),
            _ => Err(Error::InvalidArgument(format!(
                "Invalid status '{}'. Expected: new, in_progress, done",
                s
            ))),
        }
    }
}

// =============================================================================
// Item kind
// =============================================================================

/// Discriminant across the three entity collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Task,
    Epic,
    Subtask,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Task => "task",
            ItemKind::Epic => "epic",
            ItemKind::Subtask => "subtask",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = Error;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "task" => Ok(ItemKind::Task),
            "epic" => Ok(ItemKind::Epic),
            "subtask" => Ok(ItemKind::Subtask),
            _ => Err(Error::InvalidArgument(format!(
                "Invalid item kind '{}'. Expected: task, epic, subtask",
                s
            ))),
        }
    }
}

// =============================================================================
// Records
// =============================================================================

/// Shared base record for all three entity kinds.
///
/// The id is immutable after creation; everything else changes through
/// store updates. `start_time` and `duration_min` are both optional; a
/// record only occupies a time slot when both are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_min: Option<i64>,
}

impl TaskRecord {
    /// End of the scheduled interval, when fully scheduled.
    ///
    /// Absent when the duration does not fit a `chrono::Duration` or the
    /// sum would leave the representable time range; the store rejects
    /// such durations before they are ever stored.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        let start = self.start_time?;
        let span = Duration::try_minutes(self.duration_min?)?;
        start.checked_add_signed(span)
    }

    /// The half-open reservation interval, when fully scheduled
    pub fn slot(&self) -> Option<Slot> {
        Some(Slot::new(self.start_time?, self.end_time()?))
    }
}

/// Container of subtasks. Status, start, duration, and end are derived
/// from the members and never set by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epic {
    pub record: TaskRecord,
    /// Member subtask ids in insertion order
    pub subtask_ids: Vec<u64>,
    /// Latest member end time, when any member is scheduled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

/// A task bound to exactly one epic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub record: TaskRecord,
    pub epic_id: u64,
}

// =============================================================================
// Drafts
// =============================================================================

/// Draft for creating a standalone task; the store assigns the id
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub status: Status,
    pub start_time: Option<DateTime<Utc>>,
    pub duration_min: Option<i64>,
}

/// Draft for creating an epic; derived fields start empty
#[derive(Debug, Clone, Default)]
pub struct NewEpic {
    pub name: String,
    pub description: String,
}

/// Draft for creating a subtask under an existing epic
#[derive(Debug, Clone, Default)]
pub struct NewSubtask {
    pub epic_id: u64,
    pub name: String,
    pub description: String,
    pub status: Status,
    pub start_time: Option<DateTime<Utc>>,
    pub duration_min: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn status_round_trips_through_str() {
        for status in [Status::New, Status::InProgress, Status::Done] {
            assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
        }
        assert!("blocked".parse::<Status>().is_err());
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [ItemKind::Task, ItemKind::Epic, ItemKind::Subtask] {
            assert_eq!(kind.as_str().parse::<ItemKind>().unwrap(), kind);
        }
    }

    #[test]
    fn slot_requires_both_start_and_duration() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let mut record = TaskRecord {
            id: 1,
            name: "demo".to_string(),
            description: String::new(),
            status: Status::New,
            start_time: Some(start),
            duration_min: None,
        };
        assert!(record.slot().is_none());
        assert!(record.end_time().is_none());

        record.duration_min = Some(30);
        let slot = record.slot().unwrap();
        assert_eq!(slot.start, start);
        assert_eq!(slot.end, start + chrono::Duration::minutes(30));
    }

    #[test]
    fn unrepresentable_durations_leave_the_schedule_absent() {
        let record = TaskRecord {
            id: 1,
            name: "forever".to_string(),
            description: String::new(),
            status: Status::New,
            start_time: Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()),
            duration_min: Some(i64::MAX),
        };
        assert!(record.end_time().is_none());
        assert!(record.slot().is_none());
    }
}
