use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::TempDir;

const BIN_NAME: &str = "attendance_cli";

fn script_command(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
    cmd.env("ATTENDANCE_CLI_SCRIPT", "1")
        .env("ATTENDANCE_CORE_HOME", home.path())
        .env_remove("ATTENDANCE_STUDENT")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    script_command(&home)
        .write_stdin("help\nexit\n")
        .assert()
        .success()
        .stdout(contains("Available commands").and(contains("add-subject")));
}

#[test]
fn version_prints_build_and_ledger_layout() {
    let home = tempfile::tempdir().unwrap();
    script_command(&home)
        .write_stdin("version\n")
        .assert()
        .success()
        .stdout(
            contains("Attendance Core")
                .and(contains("Ledger schema"))
                .and(contains("keeps 5")),
        );
}

#[test]
fn unknown_command_gets_a_suggestion() {
    let home = tempfile::tempdir().unwrap();
    script_command(&home)
        .write_stdin("sumary\nexit\n")
        .assert()
        .success()
        .stdout(contains("Unknown command `sumary`").and(contains("Suggestion: `summary`?")));
}

#[test]
fn commands_without_a_student_report_an_error() {
    let home = tempfile::tempdir().unwrap();
    script_command(&home)
        .write_stdin("subjects\nexit\n")
        .assert()
        .success()
        .stderr(contains("No student selected"));
}

#[test]
fn marking_past_the_budget_flags_the_subject() {
    let home = tempfile::tempdir().unwrap();
    let script = "\
student 2021CS042
add-subject DBMS 4
mark dbms 6 2024-08-12
mark DBMS 6 2024-08-13
summary
exit
";
    script_command(&home)
        .write_stdin(script)
        .assert()
        .success()
        .stdout(
            contains("Subject `DBMS` added (4 credits, 11 h of leave).")
                .and(contains("5 h left"))
                .and(contains("over its leave budget by 1 h"))
                .and(contains("Critical subjects  1")),
        );

    let ledger_dir = home.path().join("data").join("ledgers");
    let stored = fs::read_dir(&ledger_dir).unwrap().count();
    assert_eq!(stored, 1);
}

#[test]
fn ledgers_persist_between_runs() {
    let home = tempfile::tempdir().unwrap();
    script_command(&home)
        .write_stdin("student alice\nabsent \"Operating Systems\" 3 2 2024-09-02\nexit\n")
        .assert()
        .success()
        .stdout(contains("Marked 2 h absent for Operating Systems on 2024-09-02"));

    script_command(&home)
        .env("ATTENDANCE_STUDENT", "alice")
        .write_stdin("history\nsubjects\nexit\n")
        .assert()
        .success()
        .stdout(contains("2024-09-02").and(contains("Operating Systems")));
}

#[test]
fn deleting_the_last_entry_prunes_the_subject() {
    let home = tempfile::tempdir().unwrap();
    script_command(&home)
        .write_stdin("student bob\nabsent Lab1 1.5 2 2024-09-03\nexit\n")
        .assert()
        .success();

    let mut cmd = script_command(&home);
    let output = cmd
        .env("ATTENDANCE_STUDENT", "bob")
        .write_stdin("history\n")
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let entry = stdout
        .lines()
        .find(|line| line.contains("Lab1"))
        .and_then(|line| line.split_whitespace().next())
        .expect("history row")
        .to_string();

    script_command(&home)
        .env("ATTENDANCE_STUDENT", "bob")
        .write_stdin(format!("delete-entry {entry}\nsubjects\nexit\n"))
        .assert()
        .success()
        .stdout(contains("was removed").and(contains("No subjects yet")));
}

#[test]
fn export_and_import_round_trip_through_a_file() {
    let home = tempfile::tempdir().unwrap();
    let snapshot = home.path().join("snapshot.json");
    let script = format!(
        "student carol\nadd-subject Maths 4.5\nexport {}\nexit\n",
        snapshot.display()
    );
    script_command(&home)
        .write_stdin(script)
        .assert()
        .success()
        .stdout(contains("Exported 1 ledger to"));
    assert!(fs::read_to_string(&snapshot).unwrap().contains("\"carol\""));

    let other = tempfile::tempdir().unwrap();
    script_command(&other)
        .write_stdin(format!(
            "import {}\nstudents\nexit\n",
            snapshot.display()
        ))
        .assert()
        .success()
        .stdout(contains("Imported 1 ledger(s), removed 0.").and(contains("carol")));
}

#[test]
fn config_set_changes_pruning() {
    let home = tempfile::tempdir().unwrap();
    let script = "\
config set prune_empty_subjects false
config show
exit
";
    script_command(&home)
        .write_stdin(script)
        .assert()
        .success()
        .stdout(contains("`prune_empty_subjects` set to false."));

    let config = fs::read_to_string(home.path().join("config").join("config.json")).unwrap();
    assert!(config.contains("\"prune_empty_subjects\": false"));
}

#[test]
fn summary_can_be_emitted_as_json() {
    let home = tempfile::tempdir().unwrap();
    let output = script_command(&home)
        .write_stdin("student dana\nabsent DBMS 4 12 2024-09-05\nsummary --json\n")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let json = &stdout[stdout.find('{').expect("json object")..];
    let value: serde_json::Value = serde_json::from_str(json).unwrap();
    assert_eq!(value["critical_count"], 1);
    assert_eq!(value["subjects"][0]["remaining_hours"], -1);
}
