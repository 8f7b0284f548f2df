//! Epic state derivation.
//!
//! An epic's status and time bounds are a pure function of its current
//! subtasks; the store re-runs this after every mutation that touches a
//! member or the membership itself.

use chrono::{DateTime, Utc};

use crate::model::{Status, Subtask};

/// Derived epic state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpicRollup {
    pub status: Status,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_min: Option<i64>,
}

impl EpicRollup {
    /// State of an epic with no subtasks
    pub fn empty() -> Self {
        Self {
            status: Status::New,
            start_time: None,
            end_time: None,
            duration_min: None,
        }
    }
}

/// Derive an epic's status and time envelope from its subtasks.
///
/// Status: empty or all-new is `New`; non-empty all-done is `Done`;
/// every other mix is `InProgress`. The envelope is the earliest member
/// start to the latest member end; duration is their difference in whole
/// minutes, absent unless both bounds exist.
pub fn rollup<'a, I>(subtasks: I) -> EpicRollup
where
    I: IntoIterator<Item = &'a Subtask>,
{
    let mut any = false;
    let mut all_new = true;
    let mut all_done = true;
    let mut start: Option<DateTime<Utc>> = None;
    let mut end: Option<DateTime<Utc>> = None;

    for subtask in subtasks {
        any = true;
        match subtask.record.status {
            Status::New => all_done = false,
            Status::InProgress => {
                all_new = false;
                all_done = false;
            }
            Status::Done => all_new = false,
        }
        if let Some(s) = subtask.record.start_time {
            start = Some(start.map_or(s, |current| current.min(s)));
        }
        if let Some(e) = subtask.record.end_time() {
            end = Some(end.map_or(e, |current| current.max(e)));
        }
    }

    if !any {
        return EpicRollup::empty();
    }

    let status = if all_new {
        Status::New
    } else if all_done {
        Status::Done
    } else {
        Status::InProgress
    };
    let duration_min = match (start, end) {
        (Some(s), Some(e)) => Some((e - s).num_minutes()),
        _ => None,
    };

    EpicRollup {
        status,
        start_time: start,
        end_time: end,
        duration_min,
    }
}
