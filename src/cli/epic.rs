//! `slate epic` command implementations.

use std::path::PathBuf;

use crate::cli::{format_record, open, EpicCommands};
use crate::error::{Error, Result};
use crate::model::{Epic, NewEpic};
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub fn run(command: EpicCommands, dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    match command {
        EpicCommands::New { name, desc } => run_new(dir, output, name, desc),
        EpicCommands::Ls => run_ls(dir, output),
        EpicCommands::Show { id } => run_show(dir, output, id),
        EpicCommands::Update { id, name, desc } => run_update(dir, output, id, name, desc),
        EpicCommands::Rm { id } => run_rm(dir, output, id),
        EpicCommands::Clear => run_clear(dir, output),
    }
}

fn epic_line(epic: &Epic) -> String {
    format!(
        "{}  [{} subtask(s)]",
        format_record(&epic.record),
        epic.subtask_ids.len()
    )
}

fn run_new(dir: Option<PathBuf>, output: OutputOptions, name: String, desc: String) -> Result<()> {
    let workspace = open(dir.as_deref())?;
    let mut store = workspace.backend.load()?;

    let id = store.create_epic(NewEpic {
        name,
        description: desc,
    })?;
    let epic = store.epics().into_iter().find(|epic| epic.record.id == id);
    workspace.backend.save(&store)?;

    let mut human = HumanOutput::new(format!("Created epic {id}"));
    if let Some(epic) = &epic {
        human.push_detail(epic_line(epic));
    }
    emit_success(output, "epic new", &epic, Some(&human))
}

fn run_ls(dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let workspace = open(dir.as_deref())?;
    let store = workspace.backend.load()?;
    let epics = store.epics();

    let mut human = HumanOutput::new(format!("{} epic(s)", epics.len()));
    for epic in &epics {
        human.push_detail(epic_line(epic));
    }
    emit_success(output, "epic ls", &epics, Some(&human))
}

fn run_show(dir: Option<PathBuf>, output: OutputOptions, id: u64) -> Result<()> {
    let workspace = open(dir.as_deref())?;
    let mut store = workspace.backend.load()?;

    let epic = store.epic(id).ok_or(Error::EpicNotFound(id))?;
    let members = store.subtasks_of(id);
    // The lookup lands in the viewed-history, so persist it.
    workspace.backend.save(&store)?;

    let mut human = HumanOutput::new(epic_line(&epic));
    if !epic.record.description.is_empty() {
        human.push_summary("description", &epic.record.description);
    }
    if let Some(end) = epic.end_time {
        human.push_summary("ends", end.format("%Y-%m-%d %H:%M").to_string());
    }
    for member in &members {
        human.push_detail(format_record(&member.record));
    }

    let data = serde_json::json!({ "epic": epic, "subtasks": members });
    emit_success(output, "epic show", &data, Some(&human))
}

fn run_update(
    dir: Option<PathBuf>,
    output: OutputOptions,
    id: u64,
    name: Option<String>,
    desc: Option<String>,
) -> Result<()> {
    let workspace = open(dir.as_deref())?;
    let mut store = workspace.backend.load()?;

    let current = store.epic(id).ok_or(Error::EpicNotFound(id))?;
    let name = name.unwrap_or(current.record.name);
    let desc = desc.unwrap_or(current.record.description);
    store.update_epic_details(id, name, desc)?;
    let epic = store.epics().into_iter().find(|epic| epic.record.id == id);
    workspace.backend.save(&store)?;

    let mut human = HumanOutput::new(format!("Updated epic {id}"));
    if let Some(epic) = &epic {
        human.push_detail(epic_line(epic));
    }
    emit_success(output, "epic update", &epic, Some(&human))
}

fn run_rm(dir: Option<PathBuf>, output: OutputOptions, id: u64) -> Result<()> {
    let workspace = open(dir.as_deref())?;
    let mut store = workspace.backend.load()?;

    let members = store.subtasks_of(id).len();
    store.delete_epic(id)?;
    workspace.backend.save(&store)?;

    let human = HumanOutput::new(format!("Deleted epic {id} and {members} subtask(s)"));
    emit_success(
        output,
        "epic rm",
        &serde_json::json!({ "id": id, "subtasks_removed": members }),
        Some(&human),
    )
}

fn run_clear(dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let workspace = open(dir.as_deref())?;
    let mut store = workspace.backend.load()?;

    let removed = store.epics().len();
    let subtasks_removed = store.subtasks().len();
    store.delete_all_epics();
    workspace.backend.save(&store)?;

    let human = HumanOutput::new(format!(
        "Deleted {removed} epic(s) and {subtasks_removed} subtask(s)"
    ));
    emit_success(
        output,
        "epic clear",
        &serde_json::json!({ "removed": removed, "subtasks_removed": subtasks_removed }),
        Some(&human),
    )
}
