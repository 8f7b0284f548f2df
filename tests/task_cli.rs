mod support;

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;

use support::{json_output, new_task, slate_cmd, Workspace};

#[test]
fn task_lifecycle_round_trips_through_the_data_file() {
    let ws = Workspace::new();

    let id = new_task(&ws, "write report");
    assert_eq!(id, 1);
    assert!(ws.data_file().exists());

    // A separate invocation sees the stored task.
    let value = json_output(&ws, &["task", "show", "1"]);
    assert_eq!(value["schema_version"].as_str(), Some("slate.v1"));
    assert_eq!(value["command"].as_str(), Some("task show"));
    assert_eq!(value["data"]["name"].as_str(), Some("write report"));
    assert_eq!(value["data"]["status"].as_str(), Some("new"));

    slate_cmd(&ws)
        .args(["task", "update", "1", "--status", "done"])
        .assert()
        .success();
    let value = json_output(&ws, &["task", "show", "1"]);
    assert_eq!(value["data"]["status"].as_str(), Some("done"));

    slate_cmd(&ws).args(["task", "rm", "1"]).assert().success();
    let value = json_output(&ws, &["task", "ls"]);
    assert_eq!(value["data"].as_array().map(Vec::len), Some(0));
}

#[test]
fn ids_keep_increasing_after_deletes() {
    let ws = Workspace::new();

    assert_eq!(new_task(&ws, "first"), 1);
    assert_eq!(new_task(&ws, "second"), 2);
    slate_cmd(&ws).args(["task", "rm", "1"]).assert().success();
    // Reload resumes past the largest surviving id; 1 is not reissued.
    assert_eq!(new_task(&ws, "third"), 3);
}

#[test]
fn duplicate_names_are_a_user_error() {
    let ws = Workspace::new();
    new_task(&ws, "unique");

    slate_cmd(&ws)
        .args(["task", "new", "unique"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Name already in use"));
}

#[test]
fn empty_names_are_rejected() {
    let ws = Workspace::new();
    slate_cmd(&ws)
        .args(["task", "new", "   "])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Name must not be empty"));
}

#[test]
fn unknown_ids_are_a_user_error() {
    let ws = Workspace::new();
    slate_cmd(&ws)
        .args(["task", "show", "99"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Task not found: 99"));
    slate_cmd(&ws)
        .args(["task", "rm", "99"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn json_error_envelope_carries_kind_and_code() {
    let ws = Workspace::new();
    let output = slate_cmd(&ws)
        .args(["task", "show", "99", "--json"])
        .assert()
        .failure()
        .code(2)
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output).expect("error envelope");
    assert_eq!(value["status"].as_str(), Some("error"));
    assert_eq!(value["error"]["kind"].as_str(), Some("not_found"));
    assert_eq!(value["error"]["code"].as_i64(), Some(2));
}

#[test]
fn quiet_suppresses_human_output() {
    let ws = Workspace::new();
    let mut cmd: Command = slate_cmd(&ws);
    cmd.args(["task", "new", "silent", "--quiet"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn clear_removes_only_tasks() {
    let ws = Workspace::new();
    new_task(&ws, "a");
    new_task(&ws, "b");
    support::new_epic(&ws, "keep me");

    slate_cmd(&ws).args(["task", "clear"]).assert().success();

    let value = json_output(&ws, &["task", "ls"]);
    assert_eq!(value["data"].as_array().map(Vec::len), Some(0));
    let value = json_output(&ws, &["epic", "ls"]);
    assert_eq!(value["data"].as_array().map(Vec::len), Some(1));
}

#[test]
fn names_survive_commas_and_quotes_on_disk() {
    let ws = Workspace::new();
    let value = json_output(&ws, &["task", "new", "plan, \"draft\" phase"]);
    let id = value["data"]["id"].as_u64().unwrap();

    let value = json_output(&ws, &["task", "show", &id.to_string()]);
    assert_eq!(value["data"]["name"].as_str(), Some("plan, \"draft\" phase"));
}
