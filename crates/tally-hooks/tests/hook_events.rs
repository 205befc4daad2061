//! End-to-end tests that run the actual tally-hooks binary, feeding
//! payloads on stdin the way the agent does. The event's working
//! directory carries a `.tally/config.toml` pointing the database at a
//! temp file so nothing touches the real user database.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tally_core::storage::SqliteStorage;

fn run_hook(payload: &str, args: &[&str]) -> std::process::Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_tally-hooks"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn tally-hooks");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(payload.as_bytes())
        .unwrap();
    child.wait_with_output().expect("failed to wait for hook")
}

/// Working directory with a project-local config pinning the db path.
fn project_dir_with_db(root: &Path) -> (PathBuf, PathBuf) {
    let cwd = root.join("work");
    let db_path = root.join("tally.db");
    std::fs::create_dir_all(cwd.join(".tally")).unwrap();
    std::fs::write(
        cwd.join(".tally").join("config.toml"),
        format!("[storage]\npath = \"{}\"\n", db_path.display()),
    )
    .unwrap();
    (cwd, db_path)
}

fn payload(event: &str, session_id: &str, cwd: &Path, prompt: Option<&str>) -> String {
    let mut value = serde_json::json!({
        "session_id": session_id,
        "cwd": cwd.to_str().unwrap(),
        "hook_event_name": event,
    });
    if let Some(text) = prompt {
        value["prompt"] = serde_json::Value::String(text.to_string());
    }
    value.to_string()
}

#[test]
fn start_then_stop_records_one_completed_prompt() {
    let tmp = tempfile::tempdir().unwrap();
    let (cwd, db_path) = project_dir_with_db(tmp.path());

    let start = run_hook(
        &payload("UserPromptSubmit", "s1", &cwd, Some("implement X")),
        &[],
    );
    assert!(start.status.success());

    let stop = run_hook(&payload("Stop", "s1", &cwd, None), &[]);
    assert!(stop.status.success());

    let storage = SqliteStorage::open(&db_path).unwrap();
    let prompts = storage.prompts_for_session("s1").unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].completed_at.is_some());
    assert_eq!(prompts[0].prompt_text.as_deref(), Some("implement X"));
}

#[test]
fn stop_without_start_still_exits_zero() {
    let tmp = tempfile::tempdir().unwrap();
    let (cwd, db_path) = project_dir_with_db(tmp.path());

    let out = run_hook(&payload("Stop", "ghost", &cwd, None), &[]);
    assert!(out.status.success());

    let storage = SqliteStorage::open(&db_path).unwrap();
    assert!(storage.prompts_for_session("ghost").unwrap().is_empty());
}

#[test]
fn unhandled_event_types_are_ignored() {
    let tmp = tempfile::tempdir().unwrap();
    let (cwd, db_path) = project_dir_with_db(tmp.path());

    let out = run_hook(&payload("PostToolUse", "s1", &cwd, None), &[]);
    assert!(out.status.success());
    // Nothing recorded, database never created.
    assert!(!db_path.exists());
}

#[test]
fn malformed_payload_exits_zero() {
    let out = run_hook("{definitely not json", &[]);
    assert!(out.status.success());
}

#[test]
fn unknown_agent_type_exits_zero() {
    let tmp = tempfile::tempdir().unwrap();
    let (cwd, _db_path) = project_dir_with_db(tmp.path());

    let out = run_hook(&payload("Stop", "s1", &cwd, None), &["some-future-agent"]);
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("unknown agent type"));
}

#[test]
fn capture_disabled_drops_events() {
    let tmp = tempfile::tempdir().unwrap();
    let (cwd, db_path) = project_dir_with_db(tmp.path());
    std::fs::write(
        cwd.join(".tally").join("config.toml"),
        format!(
            "[storage]\npath = \"{}\"\n\n[capture]\nenabled = false\n",
            db_path.display()
        ),
    )
    .unwrap();

    let out = run_hook(&payload("UserPromptSubmit", "s1", &cwd, Some("x")), &[]);
    assert!(out.status.success());
    assert!(!db_path.exists());
}
