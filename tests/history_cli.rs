mod support;

use serde_json::Value;

use support::{json_output, new_epic, new_task, slate_cmd, Workspace};

fn history_ids(ws: &Workspace) -> Vec<u64> {
    let value = json_output(ws, &["history"]);
    value["data"]
        .as_array()
        .expect("history array")
        .iter()
        .map(|entry| entry["record"]["id"].as_u64().unwrap())
        .collect()
}

#[test]
fn history_records_views_across_invocations() {
    let ws = Workspace::new();
    let t = new_task(&ws, "t");
    let e = new_epic(&ws, "e");

    slate_cmd(&ws)
        .args(["task", "show", &t.to_string()])
        .assert()
        .success();
    slate_cmd(&ws)
        .args(["epic", "show", &e.to_string()])
        .assert()
        .success();

    let value = json_output(&ws, &["history"]);
    let entries = value["data"].as_array().expect("history array");
    let kinds: Vec<&str> = entries
        .iter()
        .map(|entry| entry["kind"].as_str().unwrap())
        .collect();
    // Oldest first; creating an item is not a view, showing it is.
    assert_eq!(kinds, vec!["task", "epic"]);
}

#[test]
fn revisiting_moves_an_item_to_the_newest_slot() {
    let ws = Workspace::new();
    let a = new_task(&ws, "a");
    let b = new_task(&ws, "b");

    slate_cmd(&ws)
        .args(["task", "show", &a.to_string()])
        .assert()
        .success();
    slate_cmd(&ws)
        .args(["task", "show", &b.to_string()])
        .assert()
        .success();
    slate_cmd(&ws)
        .args(["task", "show", &a.to_string()])
        .assert()
        .success();

    let ids = history_ids(&ws);
    assert_eq!(ids.last(), Some(&a));
    assert_eq!(ids.iter().filter(|&&id| id == a).count(), 1);
}

#[test]
fn history_is_bounded_by_the_configured_capacity() {
    let ws = Workspace::new();
    ws.write_config("[history]\ncapacity = 2\n").unwrap();

    let a = new_task(&ws, "a");
    let b = new_task(&ws, "b");
    let c = new_task(&ws, "c");
    for id in [a, b, c] {
        slate_cmd(&ws)
            .args(["task", "show", &id.to_string()])
            .assert()
            .success();
    }

    assert_eq!(history_ids(&ws), vec![b, c]);
}

#[test]
fn deleting_an_item_scrubs_it_from_history() {
    let ws = Workspace::new();
    let a = new_task(&ws, "a");
    let b = new_task(&ws, "b");
    slate_cmd(&ws)
        .args(["task", "show", &a.to_string()])
        .assert()
        .success();
    slate_cmd(&ws)
        .args(["task", "show", &b.to_string()])
        .assert()
        .success();

    slate_cmd(&ws)
        .args(["task", "rm", &a.to_string()])
        .assert()
        .success();

    let ids = history_ids(&ws);
    assert!(!ids.contains(&a));
    assert!(ids.contains(&b));
}

#[test]
fn history_clear_forgets_views_but_keeps_items() {
    let ws = Workspace::new();
    let a = new_task(&ws, "a");
    slate_cmd(&ws)
        .args(["task", "show", &a.to_string()])
        .assert()
        .success();
    assert_eq!(history_ids(&ws), vec![a]);

    slate_cmd(&ws)
        .args(["history", "--clear"])
        .assert()
        .success();

    assert!(history_ids(&ws).is_empty());
    let value = json_output(&ws, &["task", "ls"]);
    assert_eq!(value["data"].as_array().map(Vec::len), Some(1));
}

#[test]
fn memory_backend_keeps_nothing_between_invocations() {
    let ws = Workspace::new();
    ws.write_config("[storage]\nbackend = \"memory\"\n").unwrap();

    slate_cmd(&ws)
        .args(["task", "new", "volatile"])
        .assert()
        .success();

    let value = json_output(&ws, &["task", "ls"]);
    assert_eq!(value["data"].as_array().map(Vec::len), Some(0));
    assert!(!ws.data_file().exists());
}

#[test]
fn corrupt_data_file_fails_with_the_operation_code() {
    let ws = Workspace::new();
    std::fs::create_dir_all(ws.path().join(".slate")).unwrap();
    std::fs::write(ws.data_file(), "not,a,valid,header\n").unwrap();

    let output = slate_cmd(&ws)
        .args(["task", "ls", "--json"])
        .assert()
        .failure()
        .code(4)
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output).expect("error envelope");
    assert_eq!(value["error"]["kind"].as_str(), Some("io"));
    assert_eq!(value["error"]["details"]["line"].as_u64(), Some(1));
}
