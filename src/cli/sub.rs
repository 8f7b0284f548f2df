//! `slate sub` command implementations.

use std::path::PathBuf;

use crate::cli::{format_record, open, parse_start, SubCommands};
use crate::error::{Error, Result};
use crate::model::{NewSubtask, Status, Subtask};
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub fn run(command: SubCommands, dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    match command {
        SubCommands::New {
            epic,
            name,
            desc,
            status,
            at,
            minutes,
        } => run_new(dir, output, epic, name, desc, status, at, minutes),
        SubCommands::Ls { epic } => run_ls(dir, output, epic),
        SubCommands::Show { id } => run_show(dir, output, id),
        SubCommands::Update {
            id,
            epic,
            name,
            desc,
            status,
            at,
            clear_at,
            minutes,
            clear_duration,
        } => run_update(
            dir,
            output,
            UpdateOptions {
                id,
                epic,
                name,
                desc,
                status,
                at,
                clear_at,
                minutes,
                clear_duration,
            },
        ),
        SubCommands::Rm { id } => run_rm(dir, output, id),
        SubCommands::Clear => run_clear(dir, output),
    }
}

fn sub_line(subtask: &Subtask) -> String {
    format!(
        "{}  (epic {})",
        format_record(&subtask.record),
        subtask.epic_id
    )
}

#[allow(clippy::too_many_arguments)]
fn run_new(
    dir: Option<PathBuf>,
    output: OutputOptions,
    epic: u64,
    name: String,
    desc: String,
    status: String,
    at: Option<String>,
    minutes: Option<i64>,
) -> Result<()> {
    let workspace = open(dir.as_deref())?;
    let mut store = workspace.backend.load()?;

    let status: Status = status.parse()?;
    let start_time = at.as_deref().map(parse_start).transpose()?;

    let id = store.create_subtask(NewSubtask {
        epic_id: epic,
        name,
        description: desc,
        status,
        start_time,
        duration_min: minutes,
    })?;
    let subtask = store
        .subtasks()
        .into_iter()
        .find(|subtask| subtask.record.id == id);
    workspace.backend.save(&store)?;

    let mut human = HumanOutput::new(format!("Created subtask {id} under epic {epic}"));
    if let Some(subtask) = &subtask {
        human.push_detail(sub_line(subtask));
    }
    emit_success(output, "sub new", &subtask, Some(&human))
}

fn run_ls(dir: Option<PathBuf>, output: OutputOptions, epic: Option<u64>) -> Result<()> {
    let workspace = open(dir.as_deref())?;
    let store = workspace.backend.load()?;

    let subtasks = match epic {
        Some(epic_id) => store.subtasks_of(epic_id),
        None => store.subtasks(),
    };

    let mut human = HumanOutput::new(format!("{} subtask(s)", subtasks.len()));
    for subtask in &subtasks {
        human.push_detail(sub_line(subtask));
    }
    emit_success(output, "sub ls", &subtasks, Some(&human))
}

fn run_show(dir: Option<PathBuf>, output: OutputOptions, id: u64) -> Result<()> {
    let workspace = open(dir.as_deref())?;
    let mut store = workspace.backend.load()?;

    let subtask = store.subtask(id).ok_or(Error::SubtaskNotFound(id))?;
    // The lookup lands in the viewed-history, so persist it.
    workspace.backend.save(&store)?;

    let mut human = HumanOutput::new(sub_line(&subtask));
    if !subtask.record.description.is_empty() {
        human.push_summary("description", &subtask.record.description);
    }
    if let Some(end) = subtask.record.end_time() {
        human.push_summary("ends", end.format("%Y-%m-%d %H:%M").to_string());
    }
    emit_success(output, "sub show", &subtask, Some(&human))
}

struct UpdateOptions {
    id: u64,
    epic: Option<u64>,
    name: Option<String>,
    desc: Option<String>,
    status: Option<String>,
    at: Option<String>,
    clear_at: bool,
    minutes: Option<i64>,
    clear_duration: bool,
}

fn run_update(dir: Option<PathBuf>, output: OutputOptions, options: UpdateOptions) -> Result<()> {
    let workspace = open(dir.as_deref())?;
    let mut store = workspace.backend.load()?;

    let mut subtask = store
        .subtask(options.id)
        .ok_or(Error::SubtaskNotFound(options.id))?;
    if let Some(epic) = options.epic {
        subtask.epic_id = epic;
    }
    if let Some(name) = options.name {
        subtask.record.name = name;
    }
    if let Some(desc) = options.desc {
        subtask.record.description = desc;
    }
    if let Some(status) = options.status {
        subtask.record.status = status.parse()?;
    }
    if let Some(at) = options.at {
        subtask.record.start_time = Some(parse_start(&at)?);
    } else if options.clear_at {
        subtask.record.start_time = None;
    }
    if let Some(minutes) = options.minutes {
        subtask.record.duration_min = Some(minutes);
    } else if options.clear_duration {
        subtask.record.duration_min = None;
    }

    store.update_subtask(subtask.clone())?;
    workspace.backend.save(&store)?;

    let mut human = HumanOutput::new(format!("Updated subtask {}", subtask.record.id));
    human.push_detail(sub_line(&subtask));
    emit_success(output, "sub update", &subtask, Some(&human))
}

fn run_rm(dir: Option<PathBuf>, output: OutputOptions, id: u64) -> Result<()> {
    let workspace = open(dir.as_deref())?;
    let mut store = workspace.backend.load()?;

    store.delete_subtask(id)?;
    workspace.backend.save(&store)?;

    let human = HumanOutput::new(format!("Deleted subtask {id}"));
    emit_success(
        output,
        "sub rm",
        &serde_json::json!({ "id": id }),
        Some(&human),
    )
}

fn run_clear(dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let workspace = open(dir.as_deref())?;
    let mut store = workspace.backend.load()?;

    let removed = store.subtasks().len();
    store.delete_all_subtasks();
    workspace.backend.save(&store)?;

    let human = HumanOutput::new(format!("Deleted {removed} subtask(s)"));
    emit_success(
        output,
        "sub clear",
        &serde_json::json!({ "removed": removed }),
        Some(&human),
    )
}
