//! `slate agenda` and `slate history` command implementations.

use std::path::PathBuf;

use crate::cli::{format_record, open};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub fn run_agenda(dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let workspace = open(dir.as_deref())?;
    let store = workspace.backend.load()?;
    let agenda = store.prioritized();

    let mut human = HumanOutput::new(format!("{} scheduled item(s)", agenda.len()));
    for record in &agenda {
        human.push_detail(format_record(record));
    }
    emit_success(output, "agenda", &agenda, Some(&human))
}

pub fn run_history(dir: Option<PathBuf>, output: OutputOptions, clear: bool) -> Result<()> {
    let workspace = open(dir.as_deref())?;
    let mut store = workspace.backend.load()?;

    if clear {
        store.clear_history();
        workspace.backend.save(&store)?;
        let human = HumanOutput::new("History cleared");
        return emit_success(
            output,
            "history",
            &serde_json::json!({ "cleared": true }),
            Some(&human),
        );
    }

    let history = store.history();

    let mut human = HumanOutput::new(format!("{} recently viewed item(s)", history.len()));
    for entry in &history {
        human.push_detail(format!(
            "{}  [{}]",
            format_record(&entry.record),
            entry.kind
        ));
    }
    emit_success(output, "history", &history, Some(&human))
}
