//! Integration tests for the RRT CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to get an rrt command with a fixed register context
fn rrt() -> Command {
    let mut cmd = Command::cargo_bin("rrt").unwrap();
    cmd.env("RRT_USER", "tester").env("RRT_PERIOD", "2025");
    cmd
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    rrt().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Run a creation command with --quiet and return the bare id it prints
fn create(tmp: &TempDir, args: &[&str]) -> String {
    let output = rrt()
        .current_dir(tmp.path())
        .args(args)
        .arg("--quiet")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "command {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn count(tmp: &TempDir, args: &[&str]) -> usize {
    let output = rrt()
        .current_dir(tmp.path())
        .args(args)
        .arg("--count")
        .output()
        .unwrap();
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse()
        .unwrap()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    rrt()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("risk register"));
}

#[test]
fn test_version_displays() {
    rrt()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rrt"));
}

#[test]
fn test_unknown_command_fails() {
    rrt()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_completions_generate() {
    rrt()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rrt"));
}

// ============================================================================
// Init Command Tests
// ============================================================================

#[test]
fn test_init_creates_project_structure() {
    let tmp = TempDir::new().unwrap();

    rrt()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(tmp.path().join(".rrt/config.yaml").exists());
    assert!(tmp.path().join("register").is_dir());
}

#[test]
fn test_init_twice_fails() {
    let tmp = setup_test_project();
    rrt().current_dir(tmp.path()).arg("init").assert().failure();
}

#[test]
fn test_commands_outside_project_fail() {
    let tmp = TempDir::new().unwrap();
    rrt()
        .current_dir(tmp.path())
        .args(["goal", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rrt init"));
}

// ============================================================================
// Goal Tests
// ============================================================================

#[test]
fn test_goal_create_and_list() {
    let tmp = setup_test_project();
    create(&tmp, &["goal", "new", "-n", "Availability", "-d", "Keep it up"]);

    rrt()
        .current_dir(tmp.path())
        .args(["goal", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("S1"))
        .stdout(predicate::str::contains("Availability"));
}

#[test]
fn test_goal_codes_increment() {
    let tmp = setup_test_project();
    create(&tmp, &["goal", "new", "-n", "First", "-d", "d"]);
    create(&tmp, &["goal", "new", "-n", "Second", "-d", "d"]);

    rrt()
        .current_dir(tmp.path())
        .args(["goal", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("S1"))
        .stdout(predicate::str::contains("S2"));
}

#[test]
fn test_goal_show_yaml() {
    let tmp = setup_test_project();
    let id = create(&tmp, &["goal", "new", "-n", "Availability", "-d", "Keep it up"]);

    rrt()
        .current_dir(tmp.path())
        .args(["goal", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("code: S1"))
        .stdout(predicate::str::contains("name: Availability"));
}

#[test]
fn test_goal_update() {
    let tmp = setup_test_project();
    let id = create(&tmp, &["goal", "new", "-n", "Old", "-d", "d"]);

    rrt()
        .current_dir(tmp.path())
        .args(["goal", "update", &id, "-n", "New name"])
        .assert()
        .success();

    rrt()
        .current_dir(tmp.path())
        .args(["goal", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("New name"));
}

#[test]
fn test_goals_scoped_by_period() {
    let tmp = setup_test_project();
    create(&tmp, &["goal", "new", "-n", "This year", "-d", "d"]);

    let output = rrt()
        .current_dir(tmp.path())
        .env("RRT_PERIOD", "2026")
        .args(["goal", "list", "--count"])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "0");
}

// ============================================================================
// Register Tree Tests
// ============================================================================

#[test]
fn test_full_register_tree_with_codes() {
    let tmp = setup_test_project();
    let goal = create(&tmp, &["goal", "new", "-n", "G", "-d", "d"]);
    let risk = create(&tmp, &["risk", "new", "-g", &goal, "-d", "Vendor outage"]);
    create(&tmp, &["risk", "new", "-g", &goal, "-d", "Data loss"]);
    let cause = create(&tmp, &["cause", "new", "-r", &risk, "-d", "No SLA in contract"]);
    create(
        &tmp,
        &["control", "new", "-c", &cause, "-t", "preventive", "-d", "Renegotiate SLA"],
    );

    rrt()
        .current_dir(tmp.path())
        .args(["risk", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("S1.PR1"))
        .stdout(predicate::str::contains("S1.PR2"));

    rrt()
        .current_dir(tmp.path())
        .args(["cause", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("S1.PR1.PC1"));

    rrt()
        .current_dir(tmp.path())
        .args(["control", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("S1.PR1.PC1.Prv.1"));
}

#[test]
fn test_analyze_scores_and_guides() {
    let tmp = setup_test_project();
    let goal = create(&tmp, &["goal", "new", "-n", "G", "-d", "d"]);
    let risk = create(&tmp, &["risk", "new", "-g", &goal, "-d", "r"]);
    let cause = create(&tmp, &["cause", "new", "-r", &risk, "-d", "c"]);

    rrt()
        .current_dir(tmp.path())
        .args(["cause", "analyze", &cause, "-l", "high", "-i", "very_high"])
        .assert()
        .success()
        .stdout(predicate::str::contains("20"))
        .stdout(predicate::str::contains("very_high"))
        .stdout(predicate::str::contains("corrective"));
}

#[test]
fn test_delete_risk_cascades() {
    let tmp = setup_test_project();
    let goal = create(&tmp, &["goal", "new", "-n", "G", "-d", "d"]);
    let risk1 = create(&tmp, &["risk", "new", "-g", &goal, "-d", "doomed"]);
    create(&tmp, &["risk", "new", "-g", &goal, "-d", "survivor"]);
    let cause = create(&tmp, &["cause", "new", "-r", &risk1, "-d", "c"]);
    create(
        &tmp,
        &["control", "new", "-c", &cause, "-t", "preventive", "-d", "p"],
    );

    rrt()
        .current_dir(tmp.path())
        .args(["risk", "delete", &risk1, "-y"])
        .assert()
        .success();

    assert_eq!(count(&tmp, &["goal", "list"]), 1);
    assert_eq!(count(&tmp, &["risk", "list"]), 1);
    assert_eq!(count(&tmp, &["cause", "list"]), 0);
    assert_eq!(count(&tmp, &["control", "list"]), 0);
}

#[test]
fn test_sequence_not_reused_after_delete() {
    let tmp = setup_test_project();
    let goal = create(&tmp, &["goal", "new", "-n", "G", "-d", "d"]);
    create(&tmp, &["risk", "new", "-g", &goal, "-d", "first"]);
    let second = create(&tmp, &["risk", "new", "-g", &goal, "-d", "second"]);

    rrt()
        .current_dir(tmp.path())
        .args(["risk", "delete", &second, "-y"])
        .assert()
        .success();
    create(&tmp, &["risk", "new", "-g", &goal, "-d", "third"]);

    rrt()
        .current_dir(tmp.path())
        .args(["risk", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("S1.PR1"))
        .stdout(predicate::str::contains("S1.PR3"));
}

#[test]
fn test_risk_import_from_catalog() {
    let tmp = setup_test_project();
    let goal = create(&tmp, &["goal", "new", "-n", "G", "-d", "d"]);

    let catalog = tmp.path().join("catalog.csv");
    std::fs::write(
        &catalog,
        "description,category,source\n\
         Vendor contract lapses,legal,external\n\
         Vendor outage,operational,external\n\
         Payroll error,financial,internal\n",
    )
    .unwrap();

    rrt()
        .current_dir(tmp.path())
        .args([
            "risk",
            "import",
            "-g",
            &goal,
            "--catalog",
            catalog.to_str().unwrap(),
            "-t",
            "vendor",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2"));

    assert_eq!(count(&tmp, &["risk", "list"]), 2);
}

// ============================================================================
// Monitoring Tests
// ============================================================================

fn setup_monitored_cause(tmp: &TempDir) -> (String, String, String) {
    let goal = create(tmp, &["goal", "new", "-n", "G", "-d", "d"]);
    let risk = create(tmp, &["risk", "new", "-g", &goal, "-d", "r"]);
    let cause = create(tmp, &["cause", "new", "-r", &risk, "-d", "c"]);
    let control = create(
        tmp,
        &[
            "control",
            "new",
            "-c",
            &cause,
            "-t",
            "preventive",
            "-d",
            "audit",
            "--target",
            "100",
            "--kci",
            "audits completed",
        ],
    );
    let session = create(
        tmp,
        &[
            "session", "new", "-n", "Q3", "--start", "2025-07-01", "--end", "2025-09-30",
        ],
    );
    (cause, control, session)
}

#[test]
fn test_monitor_record_computes_performance() {
    let tmp = setup_test_project();
    let (cause, control, session) = setup_monitored_cause(&tmp);

    rrt()
        .current_dir(tmp.path())
        .args([
            "monitor",
            "record",
            "-s",
            &session,
            "-c",
            &cause,
            "--value",
            "2",
            "--unit",
            "incidents",
            "--control",
            &format!("{}=120", control),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("120%"));
}

#[test]
fn test_monitor_record_upserts_single_record() {
    let tmp = setup_test_project();
    let (cause, control, session) = setup_monitored_cause(&tmp);

    for realization in ["50", "80"] {
        rrt()
            .current_dir(tmp.path())
            .args([
                "monitor",
                "record",
                "-s",
                &session,
                "-c",
                &cause,
                "--control",
                &format!("{}={}", control, realization),
            ])
            .assert()
            .success();
    }

    assert_eq!(count(&tmp, &["monitor", "list", "-s", &session]), 1);

    rrt()
        .current_dir(tmp.path())
        .args(["monitor", "show", "-s", &session, "-c", &cause])
        .assert()
        .success()
        .stdout(predicate::str::contains("performancePercentage: 80"));
}

#[test]
fn test_session_invalid_window_rejected() {
    let tmp = setup_test_project();
    rrt()
        .current_dir(tmp.path())
        .args([
            "session", "new", "-n", "Bad", "--start", "2025-09-30", "--end", "2025-07-01",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("end date"));
}

#[test]
fn test_session_delete_removes_exposures() {
    let tmp = setup_test_project();
    let (cause, control, session) = setup_monitored_cause(&tmp);

    rrt()
        .current_dir(tmp.path())
        .args([
            "monitor",
            "record",
            "-s",
            &session,
            "-c",
            &cause,
            "--control",
            &format!("{}=90", control),
        ])
        .assert()
        .success();

    rrt()
        .current_dir(tmp.path())
        .args(["session", "delete", &session, "-y"])
        .assert()
        .success();

    assert_eq!(count(&tmp, &["session", "list"]), 0);
}

// ============================================================================
// Status Tests
// ============================================================================

#[test]
fn test_status_dashboard() {
    let tmp = setup_test_project();
    let goal = create(&tmp, &["goal", "new", "-n", "G", "-d", "d"]);
    create(&tmp, &["risk", "new", "-g", &goal, "-d", "r"]);

    rrt()
        .current_dir(tmp.path())
        .args(["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tester@2025"))
        .stdout(predicate::str::contains("Goals:            1"))
        .stdout(predicate::str::contains("Potential risks:  1"));
}
