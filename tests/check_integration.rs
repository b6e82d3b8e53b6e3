use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use ltlnorm_bench::check_cmd::{self, CheckOptions};
use ltlnorm_bench::engine::RunStatus;
use ltlnorm_bench::implementation::{ProcessLauncher, TerminationStatus};
use ltlnorm_bench::storage::read_records_from_path;
use ltlnorm_bench::BenchError;
use tempfile::tempdir;

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

fn config(dir: &Path, implementations: &[(&str, &Path)]) -> PathBuf {
    let mut text = String::new();
    for (name, program) in implementations {
        text.push_str(&format!(
            "[[implementation]]\nname = \"{name}\"\ncommand = [\"{}\"]\n\n",
            program.display()
        ));
    }
    let path = dir.join("implementations.toml");
    fs::write(&path, text).unwrap();
    path
}

const ECHO: &str = "while IFS= read -r line; do printf '%s\\n' \"$line\"; done";

#[test]
fn echo_normalizer_reproduces_inputs() {
    let dir = tempdir().unwrap();
    let echo = script(dir.path(), "echo.sh", ECHO);
    let test = dir.path().join("cases.ltl");
    fs::write(&test, "G(a U b)\n\nF(a W b)\na U (b W c)\n").unwrap();

    let mut options = CheckOptions::new(&test);
    options.imp = "echo".into();
    options.output = dir.path().join("out").join("result.csv");
    options.config = Some(config(dir.path(), &[("echo", &echo)]));
    check_cmd::run(options.clone()).unwrap();

    let records = read_records_from_path(&options.output).unwrap();
    assert_eq!(records.len(), 3);
    for r in &records {
        assert_eq!(r.imp, "echo");
        assert_eq!(r.file, test.display().to_string());
        assert_eq!(r.fin_size, Some(r.init_size));
        assert_eq!(r.fin_dagsize, Some(r.init_dagsize));
        assert_eq!(r.final_normal, r.already_normal);
        assert_eq!(r.final_gfnorm, r.already_gfnorm);
    }
    assert_eq!(records[0].formula, "G(a U b)");
    assert_eq!(records[2].formula, "a U (b W c)");
}

#[test]
fn implementations_run_in_requested_order() {
    let dir = tempdir().unwrap();
    let echo = script(dir.path(), "echo.sh", ECHO);
    let test = dir.path().join("cases.ltl");
    fs::write(&test, "GFa\nFGa\n").unwrap();

    let mut options = CheckOptions::new(&test);
    options.imp = "second,first,missing".into();
    options.output = dir.path().join("result.csv");
    options.config = Some(config(dir.path(), &[("first", &echo), ("second", &echo)]));
    let outcome = check_cmd::execute(&options, &ProcessLauncher::new()).unwrap();

    assert_eq!(outcome.status, RunStatus::Completed);
    let names: Vec<&str> = outcome.reports.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["second", "first"]);

    let imps: Vec<String> = read_records_from_path(&options.output)
        .unwrap()
        .into_iter()
        .map(|r| r.imp)
        .collect();
    assert_eq!(imps, vec!["second", "second", "first", "first"]);
}

#[test]
fn non_normalized_replies_fail_the_check() {
    let dir = tempdir().unwrap();
    let echo = script(dir.path(), "echo.sh", ECHO);
    let test = dir.path().join("cases.ltl");
    fs::write(&test, "GFa\nFGFa\n").unwrap();

    let mut options = CheckOptions::new(&test);
    options.imp = "echo".into();
    options.output = dir.path().join("result.csv");
    options.config = Some(config(dir.path(), &[("echo", &echo)]));

    let outcome = check_cmd::execute(&options, &ProcessLauncher::new()).unwrap();
    assert_eq!(outcome.total_errors(), 1);
    assert_eq!(outcome.fatal_errors(), 0);

    let err = check_cmd::run(options.clone()).unwrap_err();
    assert_eq!(err.to_string(), "1 normalization errors");

    // the offending row is still recorded
    let records = read_records_from_path(&options.output).unwrap();
    assert_eq!(records.len(), 2);
    assert!(!records[1].final_normal);
}

#[test]
fn binary_garbage_reply_is_a_classification_error() {
    let dir = tempdir().unwrap();
    let garbage = script(
        dir.path(),
        "garbage.sh",
        "while IFS= read -r line; do printf '\\377\\376\\n'; done",
    );
    let test = dir.path().join("cases.ltl");
    fs::write(&test, "a\nb\n").unwrap();

    let mut options = CheckOptions::new(&test);
    options.imp = "garbage".into();
    options.output = dir.path().join("result.csv");
    options.config = Some(config(dir.path(), &[("garbage", &garbage)]));

    let outcome = check_cmd::execute(&options, &ProcessLauncher::new()).unwrap();
    assert_eq!(outcome.status, RunStatus::Completed);
    assert_eq!(outcome.total_errors(), 2);

    let records = read_records_from_path(&options.output).unwrap();
    assert_eq!(records.len(), 2);
    for r in &records {
        assert_eq!(r.fin_size, None);
        assert_eq!(r.fin_dagsize, None);
        assert!(!r.final_normal);
    }
}

#[test]
fn dying_normalizer_is_fatal() {
    let dir = tempdir().unwrap();
    let dead = script(dir.path(), "dead.sh", "exit 3");
    let test = dir.path().join("cases.ltl");
    fs::write(&test, "GFa\nFGa\n").unwrap();

    let mut options = CheckOptions::new(&test);
    options.imp = "dead".into();
    options.output = dir.path().join("result.csv");
    options.config = Some(config(dir.path(), &[("dead", &dead)]));

    let outcome = check_cmd::execute(&options, &ProcessLauncher::new()).unwrap();
    assert_eq!(outcome.fatal_errors(), 1);
    assert_eq!(
        outcome.status,
        RunStatus::Failed {
            implementation: "dead".into(),
            status: TerminationStatus::Exited(3),
        }
    );
    assert!(read_records_from_path(&options.output).unwrap().is_empty());

    let err = check_cmd::run(options).unwrap_err();
    assert!(matches!(err, BenchError::ImplementationDied { .. }));
    assert_eq!(
        err.to_string(),
        "something went wrong during the execution of dead (returned 3)"
    );
}

#[test]
fn unparseable_test_line_names_its_location() {
    let dir = tempdir().unwrap();
    let echo = script(dir.path(), "echo.sh", ECHO);
    let test = dir.path().join("cases.ltl");
    fs::write(&test, "GFa\n(a U\n").unwrap();

    let mut options = CheckOptions::new(&test);
    options.imp = "echo".into();
    options.output = dir.path().join("result.csv");
    options.config = Some(config(dir.path(), &[("echo", &echo)]));

    let err = check_cmd::execute(&options, &ProcessLauncher::new()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("cases.ltl:2"), "{msg}");
}

#[test]
fn missing_test_file() {
    let dir = tempdir().unwrap();
    let mut options = CheckOptions::new(dir.path().join("nope.ltl"));
    options.output = dir.path().join("result.csv");
    let err = check_cmd::execute(&options, &ProcessLauncher::new()).unwrap_err();
    assert!(err.to_string().contains("nope.ltl"));
}
