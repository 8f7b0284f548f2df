//! Flat-file codec for the task store.
//!
//! The format is line-oriented and comma-delimited: one header line, then
//! one row per entity (tasks, then epics, then subtasks grouped per epic
//! in membership order), then optionally a blank line and a trailing
//! history section of bare ids, oldest first.
//! Fields containing a comma, quote, or newline are quoted CSV-style with
//! doubled inner quotes; timestamps are RFC 3339 UTC; an empty field is an
//! absent optional.
//!
//! Epic rows carry the derived status and bounds for readability only.
//! Decoding replays the store's creation paths, so rollups, slot
//! reservations, and the id generator are re-derived rather than trusted
//! from the file. Decoding builds a fresh store; a failure leaves whatever
//! the caller was running untouched.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::warn;

use crate::error::{Error, Result};
use crate::model::{ItemKind, NewEpic, NewSubtask, NewTask, Status, TaskRecord};
use crate::store::TaskStore;

pub const HEADER: &str = "id,kind,name,status,description,start,duration_min,epic";
const FIELDS_PER_ROW: usize = 8;

// =============================================================================
// Encoding
// =============================================================================

pub fn encode(store: &TaskStore) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    for task in store.tasks() {
        push_row(&mut out, &task, ItemKind::Task, None);
    }
    for epic in store.epics() {
        push_row(&mut out, &epic.record, ItemKind::Epic, None);
    }
    // Subtask rows go out grouped per epic in membership order, so the
    // replay on decode rebuilds each epic's membership as it was.
    for epic in store.epics() {
        for subtask in store.subtasks_of(epic.record.id) {
            push_row(&mut out, &subtask.record, ItemKind::Subtask, Some(subtask.epic_id));
        }
    }

    let history = store.history();
    if !history.is_empty() {
        out.push('\n');
        for entry in history {
            out.push_str(&entry.record.id.to_string());
            out.push('\n');
        }
    }
    out
}

fn push_row(out: &mut String, record: &TaskRecord, kind: ItemKind, epic_id: Option<u64>) {
    let start = record
        .start_time
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default();
    let duration = record
        .duration_min
        .map(|m| m.to_string())
        .unwrap_or_default();
    let epic = epic_id.map(|e| e.to_string()).unwrap_or_default();
    let fields = [
        record.id.to_string(),
        kind.as_str().to_string(),
        record.name.clone(),
        record.status.as_str().to_string(),
        record.description.clone(),
        start,
        duration,
        epic,
    ];
    let row: Vec<String> = fields.iter().map(|field| escape(field)).collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

// =============================================================================
// Decoding
// =============================================================================

pub fn decode(text: &str, history_capacity: usize) -> Result<TaskStore> {
    let mut store = TaskStore::with_history_capacity(history_capacity);
    let mut lines = text.lines().enumerate();

    match lines.next() {
        None => return Ok(store),
        Some((_, header)) if header == HEADER => {}
        Some((_, other)) => {
            return Err(Error::CorruptRow {
                line: 1,
                reason: format!("unexpected header: {other}"),
            })
        }
    }

    let mut in_history = false;
    for (index, line) in lines {
        let line_no = index + 1;
        if line.trim().is_empty() {
            // Blank line switches to the trailing history section.
            in_history = true;
            continue;
        }
        if in_history {
            replay_view(&mut store, line, line_no)?;
        } else {
            replay_row(&mut store, line, line_no)?;
        }
    }
    Ok(store)
}

fn replay_row(store: &mut TaskStore, line: &str, line_no: usize) -> Result<()> {
    let fields = split_row(line).map_err(|reason| Error::CorruptRow {
        line: line_no,
        reason,
    })?;
    if fields.len() != FIELDS_PER_ROW {
        return Err(Error::CorruptRow {
            line: line_no,
            reason: format!("expected {FIELDS_PER_ROW} fields, got {}", fields.len()),
        });
    }

    let id = parse_field(&fields[0], line_no, "id", |raw| raw.parse::<u64>().ok())?;
    let kind = parse_field(&fields[1], line_no, "kind", |raw| {
        raw.parse::<ItemKind>().ok()
    })?;
    let status = parse_field(&fields[3], line_no, "status", |raw| {
        raw.parse::<Status>().ok()
    })?;
    let start_time = parse_optional(&fields[5], line_no, "start", |raw| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    })?;
    let duration_min = parse_optional(&fields[6], line_no, "duration_min", |raw| {
        raw.parse::<i64>().ok()
    })?;

    let name = fields[2].clone();
    let description = fields[4].clone();

    let replayed = match kind {
        ItemKind::Task => store.create_task_with_id(
            id,
            NewTask {
                name,
                description,
                status,
                start_time,
                duration_min,
            },
        ),
        ItemKind::Epic => store.create_epic_with_id(id, NewEpic { name, description }),
        ItemKind::Subtask => {
            let epic_id = parse_field(&fields[7], line_no, "epic", |raw| raw.parse::<u64>().ok())?;
            store.create_subtask_with_id(
                id,
                NewSubtask {
                    epic_id,
                    name,
                    description,
                    status,
                    start_time,
                    duration_min,
                },
            )
        }
    };
    replayed.map_err(|err| Error::CorruptRow {
        line: line_no,
        reason: err.to_string(),
    })?;
    Ok(())
}

fn replay_view(store: &mut TaskStore, line: &str, line_no: usize) -> Result<()> {
    let id = line.trim().parse::<u64>().map_err(|_| Error::CorruptRow {
        line: line_no,
        reason: format!("invalid history id: {line}"),
    })?;
    // Lookups re-record the view; the kind comes from whichever collection
    // owns the id. Ids no row claimed are logged and skipped.
    if store.task(id).is_none() && store.epic(id).is_none() && store.subtask(id).is_none() {
        warn!(id, line = line_no, "history entry references no known id");
    }
    Ok(())
}

fn parse_field<T>(
    raw: &str,
    line_no: usize,
    field: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T> {
    parse(raw).ok_or_else(|| Error::CorruptRow {
        line: line_no,
        reason: format!("invalid {field}: {raw}"),
    })
}

fn parse_optional<T>(
    raw: &str,
    line_no: usize,
    field: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<Option<T>> {
    if raw.is_empty() {
        return Ok(None);
    }
    parse_field(raw, line_no, field, parse).map(Some)
}

/// Split one row on commas, honoring CSV-style quoting.
fn split_row(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;

    while let Some(ch) = chars.next() {
        if quoted {
            match ch {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        current.push('"');
                    } else {
                        quoted = false;
                    }
                }
                other => current.push(other),
            }
        } else {
            match ch {
                ',' => fields.push(std::mem::take(&mut current)),
                '"' if current.is_empty() => quoted = true,
                '"' => return Err("quote inside unquoted field".to_string()),
                other => current.push(other),
            }
        }
    }
    if quoted {
        return Err("unterminated quote".to_string());
    }
    fields.push(current);
    Ok(fields)
}
