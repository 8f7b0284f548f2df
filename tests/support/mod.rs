use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    #[allow(dead_code)]
    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(".slate.toml");
        fs::write(&path, contents)?;
        Ok(path)
    }

    #[allow(dead_code)]
    pub fn data_file(&self) -> PathBuf {
        self.dir.path().join(".slate").join("tasks.csv")
    }
}

pub fn slate_cmd(workspace: &Workspace) -> Command {
    let mut cmd = Command::cargo_bin("slate").expect("slate binary");
    cmd.current_dir(workspace.path());
    cmd
}

/// Run a command with `--json` appended and parse the envelope.
pub fn json_output(workspace: &Workspace, args: &[&str]) -> Value {
    let mut full_args: Vec<&str> = args.to_vec();
    full_args.push("--json");
    let output = slate_cmd(workspace)
        .args(&full_args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).expect("json envelope")
}

/// Create a task and return its id.
#[allow(dead_code)]
pub fn new_task(workspace: &Workspace, name: &str) -> u64 {
    let value = json_output(workspace, &["task", "new", name]);
    value["data"]["id"].as_u64().expect("task id")
}

/// Create an epic and return its id.
#[allow(dead_code)]
pub fn new_epic(workspace: &Workspace, name: &str) -> u64 {
    let value = json_output(workspace, &["epic", "new", name]);
    value["data"]["record"]["id"].as_u64().expect("epic id")
}
