//! End-to-end runs of the `clique` binary against a temporary state file.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn state(&self) -> PathBuf {
        self.dir.path().join("state.json")
    }

    fn clique(&self) -> Command {
        let mut cmd = Command::cargo_bin("clique").unwrap();
        cmd.arg("--state")
            .arg(self.state())
            .arg("--config")
            .arg(self.dir.path().join("absent.toml"))
            .arg("--actor")
            .arg("admin-1")
            .env_remove("RUST_LOG");
        cmd
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self
            .clique()
            .args(["--output", "json"])
            .args(args)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "clique {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    fn ok(&self, args: &[&str]) {
        self.clique().args(args).assert().success();
    }

    fn register(&self, event: &str, title: &str, roster: &[&str]) {
        let mut args = vec!["event", "add", "--event", event, "--title", title];
        for member in roster {
            args.push("--participant");
            args.push(member);
        }
        self.ok(&args);
    }

    /// Create a group, seat the members, confirm and lock it
    fn locked_group(&self, event: &str, members: &[&str]) -> String {
        let group = self.json(&["group", "create", "--event", event]);
        let id = group["id"].as_str().unwrap().to_string();
        for member in members {
            self.ok(&["group", "assign", "--group", &id, "--participant", member]);
        }
        self.ok(&["group", "transition", "--group", &id, "--step", "confirm"]);
        self.ok(&["group", "lock", "--group", &id]);
        id
    }
}

fn snapshot(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn event_add_writes_the_state_file() {
    let ws = Workspace::new();
    ws.clique()
        .args([
            "event",
            "add",
            "--event",
            "hike",
            "--title",
            "Sunday Hike",
            "--participant",
            "a",
            "--participant",
            "b",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 participants"));

    let state = snapshot(&ws.state());
    assert_eq!(state["events"]["hike"]["title"], "Sunday Hike");

    // Adding again extends the roster without duplicates
    ws.register("hike", "Sunday Hike", &["b", "c"]);
    let event = ws.json(&["event", "show", "--event", "hike"]);
    assert_eq!(event["participants"].as_array().unwrap().len(), 3);
}

#[test]
fn full_lifecycle_ends_in_a_persistent_group() {
    let ws = Workspace::new();
    ws.register("hike", "Sunday Hike", &["a", "b"]);
    let group = ws.locked_group("hike", &["a", "b"]);

    let warming = ws.json(&["group", "transition", "--group", &group, "--step", "warm-up"]);
    assert_eq!(warming["status"], "warming_up");

    for member in ["a", "b"] {
        ws.ok(&[
            "group",
            "respond",
            "--group",
            &group,
            "--participant",
            member,
            "--text",
            "See you there",
        ]);
        ws.ok(&["group", "ready", "--group", &group, "--participant", member]);
    }

    let progress = ws.json(&["progress", "--group", &group]);
    assert_eq!(progress["percent"], 100);
    assert_eq!(progress["is_complete"], true);

    let groups = ws.json(&["groups", "--event", "hike"]);
    assert_eq!(groups[0]["status"], "ready_for_review");

    for step in ["approve", "activate", "complete"] {
        ws.ok(&["group", "transition", "--group", &group, "--step", step]);
    }

    ws.ok(&["keep", "--group", &group, "--participant", "a", "--pick", "b"]);
    ws.ok(&["keep", "--group", &group, "--participant", "b", "--pick", "a"]);

    let report = ws.json(&["resolve-matches"]);
    assert_eq!(report["requests_processed"], 2);
    let created = report["persistent_groups_created"].as_array().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0]["name"], "Sunday Hike 1 crew");

    ws.clique()
        .arg("crews")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sunday Hike 1 crew"));

    // A second pass has nothing left to do
    let again = ws.json(&["resolve-matches"]);
    assert_eq!(again["requests_processed"], 0);
}

#[test]
fn engine_rejections_exit_non_zero() {
    let ws = Workspace::new();
    ws.register("hike", "Sunday Hike", &[]);
    let group = ws.locked_group("hike", &["a"]);

    ws.clique()
        .args(["group", "assign", "--group", &group, "--participant", "b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is locked"));

    ws.clique()
        .args(["group", "transition", "--group", &group, "--step", "approve"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid transition"));

    ws.clique()
        .args(["members", "--group", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("group not found"));
}

#[test]
fn auto_form_seats_the_unassigned_pool() {
    let ws = Workspace::new();
    ws.register("quiz", "Pub Quiz", &["a", "b", "c", "d", "e"]);

    let report = ws.json(&["auto-form", "--event", "quiz", "--size", "2"]);
    assert_eq!(report["created"].as_array().unwrap().len(), 3);
    assert!(report["failures"].as_array().unwrap().is_empty());

    let groups = ws.json(&["groups", "--event", "quiz"]);
    let names: Vec<&str> = groups
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Pub Quiz 1", "Pub Quiz 2", "Pub Quiz 3"]);
    assert!(groups
        .as_array()
        .unwrap()
        .iter()
        .all(|g| g["status"] == "confirmed"));

    ws.clique()
        .args(["groups", "--event", "quiz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("capacity"))
        .stdout(predicate::str::contains("Pub Quiz 2"))
        .stdout(predicate::str::contains("confirmed"));

    ws.clique()
        .args(["event", "unassigned", "--event", "quiz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No results"));
}

#[test]
fn swap_and_audit_trail() {
    let ws = Workspace::new();
    ws.register("hike", "Sunday Hike", &[]);
    let first = ws.json(&["group", "create", "--event", "hike"]);
    let second = ws.json(&["group", "create", "--event", "hike", "--capacity", "3"]);
    let first = first["id"].as_str().unwrap().to_string();
    let second = second["id"].as_str().unwrap().to_string();
    ws.ok(&["group", "assign", "--group", &first, "--participant", "a"]);
    ws.ok(&["group", "assign", "--group", &second, "--participant", "b"]);

    let rows = ws.json(&["group", "swap", "--event", "hike", "a", "b"]);
    assert_eq!(rows[0]["group_id"], second.as_str());
    assert_eq!(rows[1]["group_id"], first.as_str());

    let audit = ws.json(&["audit", "--limit", "1"]);
    let records = audit.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["event"]["action"], "members_swapped");
    assert_eq!(records[0]["event"]["actor"], "admin-1");

    let all = ws.json(&["audit", "--limit", "0"]);
    assert_eq!(all.as_array().unwrap().len(), 5);

    ws.clique()
        .args(["audit", "--limit", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("action"))
        .stdout(predicate::str::contains("members_swapped"))
        .stdout(predicate::str::contains("member_assigned"));
}

#[test]
fn config_reports_resolved_paths() {
    let ws = Workspace::new();
    ws.clique()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("state.json"))
        .stdout(predicate::str::contains("admin-1"));
    assert!(!ws.state().exists());
}
