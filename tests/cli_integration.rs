//! CLI integration tests for the board binary
//!
//! Each test runs against its own board file in a temp directory, with a
//! config path that points inside the same directory.

use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A temp board plus the command to drive it
struct Board {
    dir: TempDir,
}

impl Board {
    /// Board that starts with the three example tasks
    fn seeded() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Board that starts empty
    fn empty() -> Self {
        let board = Self::seeded();
        fs::write(board.config_path(), "seed_examples = false\n").unwrap();
        board
    }

    fn store_path(&self) -> PathBuf {
        self.dir.path().join("board.json")
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("board"));
        cmd.env_remove("TASKBOARD_STORE")
            .env_remove("TASKBOARD_LOG")
            .env("TASKBOARD_CONFIG", self.config_path())
            .arg("--store")
            .arg(self.store_path());
        cmd
    }

    /// Runs a command with JSON output and parses stdout
    fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("--format")
            .arg("json")
            .args(args)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "{:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    fn add(&self, title: &str, extra: &[&str]) -> String {
        let mut args = vec!["add", title];
        args.extend_from_slice(extra);
        self.json(&args)["id"].as_str().unwrap().to_string()
    }

    /// Task ids of one column, as filtered
    fn column(&self, index: usize) -> Vec<String> {
        self.json(&["board"])["columns"][index]["tasks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap().to_string())
            .collect()
    }
}

// =============================================================================
// Initial State
// =============================================================================

#[test]
fn test_fresh_board_has_example_tasks() {
    let board = Board::seeded();

    board
        .cmd()
        .arg("board")
        .assert()
        .success()
        .stdout(predicate::str::contains("To Do (1)"))
        .stdout(predicate::str::contains("In Progress (1)"))
        .stdout(predicate::str::contains("Done (1)"))
        .stdout(predicate::str::contains("Design System Implementation"));

    assert!(board.store_path().is_file());
}

#[test]
fn test_empty_board_when_examples_disabled() {
    let board = Board::empty();

    board
        .cmd()
        .arg("ls")
        .assert()
        .success()
        .stdout(predicate::str::contains("To Do (0)"))
        .stdout(predicate::str::contains("(empty)"));
}

// =============================================================================
// Task Commands
// =============================================================================

#[test]
fn test_add_assigns_next_id() {
    let board = Board::seeded();

    let task = board.json(&["add", "Write tests", "--priority", "high", "--due", "2030-01-02"]);
    assert_eq!(task["id"], "t-4");
    assert_eq!(task["stage"], "pending");
    assert_eq!(task["priority"], "high");
    assert_eq!(task["due_date"], "2030-01-02");

    assert_eq!(board.add("Another", &[]), "t-5");
}

#[test]
fn test_add_rejects_blank_title() {
    let board = Board::empty();

    board
        .cmd()
        .args(["add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("title cannot be empty"));
}

#[test]
fn test_add_rejects_unknown_stage() {
    let board = Board::empty();

    board
        .cmd()
        .args(["add", "x", "--stage", "someday"])
        .assert()
        .failure();
}

#[test]
fn test_remove_twice_fails() {
    let board = Board::empty();
    let id = board.add("x", &[]);

    board
        .cmd()
        .args(["rm", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted task"));

    board
        .cmd()
        .args(["rm", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains(format!("Task not found: {}", id)));
}

#[test]
fn test_edit_and_show() {
    let board = Board::empty();
    let id = board.add("Draft", &["--category", "personal"]);

    board
        .cmd()
        .args(["edit", &id, "--title", "Final", "--description", "All done soon"])
        .assert()
        .success();

    board
        .cmd()
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title: Final"))
        .stdout(predicate::str::contains("Category: personal"))
        .stdout(predicate::str::contains("All done soon"));

    let shown = board.json(&["show", &id]);
    assert_eq!(shown["task"]["title"], "Final");
    assert_eq!(shown["position"], 1);
}

#[test]
fn test_overdue_marker() {
    let board = Board::empty();
    board.add("Late", &["--due", "2000-01-01"]);
    board.add("Finished", &["--due", "2000-01-01", "--stage", "done"]);

    board
        .cmd()
        .arg("board")
        .assert()
        .success()
        .stdout(predicate::str::contains("OVERDUE").count(1));
}

#[test]
fn test_move_appends_to_target_stage() {
    let board = Board::empty();
    let a = board.add("A", &[]);
    let b = board.add("B", &[]);
    let c = board.add("C", &["--stage", "in-progress"]);

    board
        .cmd()
        .args(["move", &a, "in-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("To Do -> In Progress"));

    assert_eq!(board.column(0), vec![b]);
    assert_eq!(board.column(1), vec![c, a]);
}

#[test]
fn test_reorder_absolute() {
    let board = Board::empty();
    let a = board.add("A", &[]);
    let b = board.add("B", &[]);
    let c = board.add("C", &[]);

    board
        .cmd()
        .args(["reorder", "todo", "3", "1", "--absolute"])
        .assert()
        .success();

    assert_eq!(board.column(0), vec![c, a, b]);
}

#[test]
fn test_reorder_uses_filtered_positions() {
    let board = Board::empty();
    let alpha = board.add("alpha api", &[]);
    let beta = board.add("beta", &[]);
    let gamma = board.add("gamma api", &[]);

    board
        .cmd()
        .args(["filter", "set", "--search", "api"])
        .assert()
        .success();
    assert_eq!(board.column(0), vec![alpha.clone(), gamma.clone()]);

    // Second visible card onto the first
    board
        .cmd()
        .args(["reorder", "todo", "2", "1"])
        .assert()
        .success();

    board.cmd().args(["filter", "clear"]).assert().success();
    assert_eq!(board.column(0), vec![gamma, alpha, beta]);
}

#[test]
fn test_reorder_out_of_range() {
    let board = Board::empty();
    board.add("only", &[]);

    board
        .cmd()
        .args(["reorder", "todo", "1", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Position 5 is out of range"));
}

// =============================================================================
// Filters
// =============================================================================

#[test]
fn test_filters_persist_between_runs() {
    let board = Board::empty();
    board.add("Groceries", &["--category", "personal"]);
    board.add("Report", &[]);

    board
        .cmd()
        .args(["filter", "set", "--category", "personal"])
        .assert()
        .success();

    let filters = board.json(&["filter", "show"]);
    assert_eq!(filters["category"], "personal");
    assert_eq!(filters["priority"], Value::Null);

    let shown = board.json(&["board"]);
    assert_eq!(shown["shown"], 1);
    assert_eq!(shown["hidden"], 1);

    board
        .cmd()
        .args(["filter", "set", "--category", "any"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Filters: none"));
}

#[test]
fn test_filter_rejects_unknown_priority() {
    let board = Board::empty();

    board
        .cmd()
        .args(["filter", "set", "--priority", "critical"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid filter value"));
}

// =============================================================================
// Storage
// =============================================================================

#[test]
fn test_corrupt_board_is_set_aside() {
    let board = Board::seeded();
    fs::write(board.store_path(), "{ this is not a board").unwrap();

    board
        .cmd()
        .arg("board")
        .assert()
        .success()
        .stderr(predicate::str::contains("Warning"))
        .stdout(predicate::str::contains("Design System Implementation"));

    let corrupt = board.dir.path().join("board.json.corrupt");
    assert_eq!(
        fs::read_to_string(corrupt).unwrap(),
        "{ this is not a board"
    );

    // The fresh board was saved and loads cleanly
    board
        .cmd()
        .arg("board")
        .assert()
        .success()
        .stderr(predicate::str::contains("Warning").not());
}

#[test]
fn test_non_utf8_board_is_set_aside() {
    let board = Board::empty();
    fs::write(board.store_path(), [0xff, 0xfe, b'{', b'}']).unwrap();

    board
        .cmd()
        .arg("board")
        .assert()
        .success()
        .stderr(predicate::str::contains("board.json.corrupt"));

    // A second bad file does not replace the first copy
    fs::write(board.store_path(), "not json either").unwrap();
    board
        .cmd()
        .arg("board")
        .assert()
        .success()
        .stderr(predicate::str::contains("board.json.corrupt.1"));

    assert_eq!(
        fs::read(board.dir.path().join("board.json.corrupt")).unwrap(),
        vec![0xff, 0xfe, b'{', b'}']
    );
    assert_eq!(
        fs::read_to_string(board.dir.path().join("board.json.corrupt.1")).unwrap(),
        "not json either"
    );
}

#[test]
fn test_legacy_nested_snapshot_loads() {
    let board = Board::empty();
    fs::write(
        board.store_path(),
        r#"{
  "tasks": {
    "tasks": [
      {
        "id": "legacy-1",
        "title": "Old task",
        "description": "",
        "status": "in-progress",
        "category": "work",
        "priority": "low",
        "dueDate": "2030-05-01",
        "createdAt": "2024-01-01T00:00:00Z"
      }
    ],
    "filters": { "search": "", "category": "", "priority": "" }
  }
}"#,
    )
    .unwrap();

    assert_eq!(board.column(1), vec!["legacy-1".to_string()]);
    assert_eq!(board.add("New", &[]), "t-1");
}

#[test]
fn test_config_shows_paths() {
    let board = Board::empty();

    board
        .cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("board.json"))
        .stdout(predicate::str::contains("seed_examples = false"));
}

#[test]
fn test_verbose_logs_to_stderr() {
    let board = Board::empty();

    board
        .cmd()
        .args(["--verbose", "board"])
        .assert()
        .success()
        .stderr(predicate::str::contains("board opened"));
}
