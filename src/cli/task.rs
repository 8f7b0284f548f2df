//! `slate task` command implementations.

use std::path::PathBuf;

use crate::cli::{format_record, open, parse_start, TaskCommands};
use crate::error::{Error, Result};
use crate::model::{NewTask, Status};
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub fn run(command: TaskCommands, dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    match command {
        TaskCommands::New {
            name,
            desc,
            status,
            at,
            minutes,
        } => run_new(dir, output, name, desc, status, at, minutes),
        TaskCommands::Ls => run_ls(dir, output),
        TaskCommands::Show { id } => run_show(dir, output, id),
        TaskCommands::Update {
            id,
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
                name,
                desc,
                status,
                at,
                clear_at,
                minutes,
                clear_duration,
            },
        ),
        TaskCommands::Rm { id } => run_rm(dir, output, id),
        TaskCommands::Clear => run_clear(dir, output),
    }
}

fn run_new(
    dir: Option<PathBuf>,
    output: OutputOptions,
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

    let id = store.create_task(NewTask {
        name,
        description: desc,
        status,
        start_time,
        duration_min: minutes,
    })?;
    let record = store.tasks().into_iter().find(|task| task.id == id);
    workspace.backend.save(&store)?;

    let mut human = HumanOutput::new(format!("Created task {id}"));
    if let Some(record) = &record {
        human.push_detail(format_record(record));
    }
    emit_success(output, "task new", &record, Some(&human))
}

fn run_ls(dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let workspace = open(dir.as_deref())?;
    let store = workspace.backend.load()?;
    let tasks = store.tasks();

    let mut human = HumanOutput::new(format!("{} task(s)", tasks.len()));
    for task in &tasks {
        human.push_detail(format_record(task));
    }
    emit_success(output, "task ls", &tasks, Some(&human))
}

fn run_show(dir: Option<PathBuf>, output: OutputOptions, id: u64) -> Result<()> {
    let workspace = open(dir.as_deref())?;
    let mut store = workspace.backend.load()?;

    let record = store.task(id).ok_or(Error::TaskNotFound(id))?;
    // The lookup lands in the viewed-history, so persist it.
    workspace.backend.save(&store)?;

    let mut human = HumanOutput::new(format_record(&record));
    if !record.description.is_empty() {
        human.push_summary("description", &record.description);
    }
    if let Some(end) = record.end_time() {
        human.push_summary("ends", end.format("%Y-%m-%d %H:%M").to_string());
    }
    emit_success(output, "task show", &record, Some(&human))
}

struct UpdateOptions {
    id: u64,
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

    let mut record = store
        .task(options.id)
        .ok_or(Error::TaskNotFound(options.id))?;
    if let Some(name) = options.name {
        record.name = name;
    }
    if let Some(desc) = options.desc {
        record.description = desc;
    }
    if let Some(status) = options.status {
        record.status = status.parse()?;
    }
    if let Some(at) = options.at {
        record.start_time = Some(parse_start(&at)?);
    } else if options.clear_at {
        record.start_time = None;
    }
    if let Some(minutes) = options.minutes {
        record.duration_min = Some(minutes);
    } else if options.clear_duration {
        record.duration_min = None;
    }

    store.update_task(record.clone())?;
    workspace.backend.save(&store)?;

    let mut human = HumanOutput::new(format!("Updated task {}", record.id));
    human.push_detail(format_record(&record));
    emit_success(output, "task update", &record, Some(&human))
}

fn run_rm(dir: Option<PathBuf>, output: OutputOptions, id: u64) -> Result<()> {
    let workspace = open(dir.as_deref())?;
    let mut store = workspace.backend.load()?;

    store.delete_task(id)?;
    workspace.backend.save(&store)?;

    let human = HumanOutput::new(format!("Deleted task {id}"));
    emit_success(output, "task rm", &serde_json::json!({ "id": id }), Some(&human))
}

fn run_clear(dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let workspace = open(dir.as_deref())?;
    let mut store = workspace.backend.load()?;

    let removed = store.tasks().len();
    store.delete_all_tasks();
    workspace.backend.save(&store)?;

    let human = HumanOutput::new(format!("Deleted {removed} task(s)"));
    emit_success(
        output,
        "task clear",
        &serde_json::json!({ "removed": removed }),
        Some(&human),
    )
}
