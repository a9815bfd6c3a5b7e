//! Basic CLI E2E tests.
//!
//! Each test runs the built `foco` binary against its own data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_foco"))
        .args(args)
        .env("FOCO_DATA_DIR", dir)
        .env("FOCO_LOG", "off")
        .output()
        .expect("failed to execute foco");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(dir, args);
    assert_eq!(code, 0, "foco {args:?} failed: {stderr}");
    stdout
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("valid JSON output")
}

#[test]
fn task_add_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_ok(dir.path(), &["task", "add", "  Write docs "]);
    assert!(out.starts_with("Task added: "));

    let tasks = json(&run_ok(dir.path(), &["task", "list", "--json"]));
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Write docs");
    assert_eq!(tasks[0]["focusTime"], 0);
}

#[test]
fn blank_task_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["task", "add", "   "]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn task_done_and_remove_by_prefix() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["task", "add", "first"]);
    let tasks = json(&run_ok(dir.path(), &["task", "list", "--json"]));
    let id = tasks[0]["id"].as_str().unwrap().to_string();

    run_ok(dir.path(), &["task", "done", &id[..8]]);
    let open = json(&run_ok(dir.path(), &["task", "list", "--json"]));
    assert!(open.as_array().unwrap().is_empty());
    let all = json(&run_ok(dir.path(), &["task", "list", "--all", "--json"]));
    assert_eq!(all[0]["completed"], true);

    run_ok(dir.path(), &["task", "rm", &id]);
    let all = json(&run_ok(dir.path(), &["task", "list", "--all", "--json"]));
    assert!(all.as_array().unwrap().is_empty());

    let (_, _, code) = run_cli(dir.path(), &["task", "rm", &id]);
    assert_eq!(code, 1);
}

#[test]
fn zero_length_focus_session_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["settings", "set", "focus-time", "0"]);
    run_ok(dir.path(), &["task", "add", "deep work"]);
    let tasks = json(&run_ok(dir.path(), &["task", "list", "--json"]));
    let id = tasks[0]["id"].as_str().unwrap().to_string();
    run_ok(dir.path(), &["task", "current", &id]);

    let out = run_ok(dir.path(), &["session", "start", "focus"]);
    assert!(out.contains("Focus session complete"));
    assert!(out.contains("deep work: 0m focused"));
    assert!(out.contains("Next up: Short break"));

    let stats = json(&run_ok(dir.path(), &["stats", "--json"]));
    assert_eq!(stats["focus_sessions"], 1);

    let status = json(&run_ok(dir.path(), &["session", "status", "--json"]));
    assert_eq!(status["completedSessions"], 1);
    assert_eq!(status["currentTask"]["id"], id.as_str());
    assert_eq!(status["lastSession"]["taskId"], id.as_str());
}

#[test]
fn unknown_session_type_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["session", "start", "nap"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown session type"));
}

#[test]
fn settings_get_set_reset() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(run_ok(dir.path(), &["settings", "get", "focusTime"]).trim(), "25");
    run_ok(dir.path(), &["settings", "set", "focus_time", "50"]);
    assert_eq!(run_ok(dir.path(), &["settings", "get", "focus-time"]).trim(), "50");

    let (_, _, code) = run_cli(dir.path(), &["settings", "set", "focus-time", "soon"]);
    assert_eq!(code, 1);

    run_ok(dir.path(), &["settings", "reset"]);
    let settings = json(&run_ok(dir.path(), &["settings", "list"]));
    assert_eq!(settings["focusTime"], 25);
    assert_eq!(settings["sessionsUntilLongBreak"], 4);
}

#[test]
fn block_list_normalizes_and_checks() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_ok(dir.path(), &["block", "add", "https://www.Reddit.com/r/rust"]);
    assert_eq!(out.trim(), "Blocked: reddit.com");
    let out = run_ok(dir.path(), &["block", "add", "reddit.com"]);
    assert_eq!(out.trim(), "already blocked");

    let list = run_ok(dir.path(), &["block", "list"]);
    assert_eq!(list.lines().filter(|l| *l == "reddit.com").count(), 1);

    let (out, _, code) = run_cli(dir.path(), &["block", "check", "https://old.reddit.com/"]);
    assert_eq!(code, 2);
    assert!(out.starts_with("blocked"));
    let (out, _, code) = run_cli(dir.path(), &["block", "check", "https://docs.rs/"]);
    assert_eq!(code, 0);
    assert_eq!(out.trim(), "allowed");

    run_ok(dir.path(), &["block", "rm", "reddit.com"]);
    let (_, _, code) = run_cli(dir.path(), &["block", "check", "reddit.com"]);
    assert_eq!(code, 0);
}

#[test]
fn stats_reset_requires_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["task", "add", "keep me"]);
    let tasks = json(&run_ok(dir.path(), &["task", "list", "--json"]));
    let id = tasks[0]["id"].as_str().unwrap().to_string();
    run_ok(dir.path(), &["task", "current", &id]);

    let (_, _, code) = run_cli(dir.path(), &["stats", "reset"]);
    assert_eq!(code, 1);
    run_ok(dir.path(), &["stats", "reset", "--yes"]);
    let tasks = json(&run_ok(dir.path(), &["task", "list", "--json"]));
    assert!(tasks.as_array().unwrap().is_empty());

    let db = foco_core::Database::open(&dir.path().join("foco.db")).unwrap();
    assert_eq!(db.kv_get("cli_current_task").unwrap(), None);
}

#[test]
fn unreadable_config_falls_back_with_warning() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "tick_interval_ms = \"fast\"\n").unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_foco"))
        .args(["task", "list"])
        .env("FOCO_DATA_DIR", dir.path())
        .env_remove("FOCO_LOG")
        .output()
        .expect("failed to execute foco");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("using default configuration"), "stderr: {stderr}");
}

#[test]
fn config_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = run_ok(dir.path(), &["config", "path"]);
    assert!(path.trim().ends_with("config.toml"));

    run_ok(dir.path(), &["config", "set", "tick_interval_ms", "250"]);
    assert_eq!(run_ok(dir.path(), &["config", "get", "tick_interval_ms"]).trim(), "250");
    let (_, _, code) = run_cli(dir.path(), &["config", "get", "theme"]);
    assert_eq!(code, 1);

    run_ok(dir.path(), &["config", "reset"]);
    let config = json(&run_ok(dir.path(), &["config", "list"]));
    assert_eq!(config["tick_interval_ms"], 1000);
    assert_eq!(config["database_file"], "foco.db");
}

#[test]
fn completions_are_generated() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_ok(dir.path(), &["completions", "bash"]);
    assert!(out.contains("foco"));
}
