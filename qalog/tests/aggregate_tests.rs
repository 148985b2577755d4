//! End-to-end tests driving the aggregator over on-disk fixtures.

use artifacts::ScratchDir;
use qalog::{AggregateError, Aggregator, ParsePolicy, ReportConfig};
use results::{ParseError, ReportFormat, Status, SuiteKey};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn suite_dir(root: &Path, name: &str, results: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("test_results"), results).unwrap();
    dir
}

fn aggregator(scratch: &Path, config: ReportConfig) -> Aggregator {
    Aggregator::new(config, Box::new(ScratchDir::new(scratch)))
}

fn run_to_string(aggregator: &Aggregator, entries: &[PathBuf]) -> String {
    let mut out = Vec::new();
    aggregator.run(entries, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn tar_available() -> bool {
    Command::new("tar")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

#[test]
fn test_all_passing_suite_produces_no_output() {
    let tmp = TempDir::new().unwrap();
    let dir = suite_dir(
        tmp.path(),
        "clean-1-2-3-4-5-6",
        "caseA\n0 1 1 3 0 0\n\ncaseB\n0 4 4 9 0 0\n",
    );

    let agg = aggregator(&tmp.path().join("scratch"), ReportConfig::default());
    let mut out = Vec::new();
    let summary = agg.run(&[dir], &mut out).unwrap();

    assert!(out.is_empty());
    assert_eq!(summary.clean, vec![SuiteKey::Named("clean".to_string())]);
    assert!(summary.reported.is_empty());
}

#[test]
fn test_one_failing_case_produces_one_banner_and_row() {
    let tmp = TempDir::new().unwrap();
    let dir = suite_dir(
        tmp.path(),
        "mytest-1-2-3-4-5-6",
        "caseA\n0 1 1 3 0 0\n\ncaseB\n1 0 1 17 0 0\n",
    );

    let agg = aggregator(&tmp.path().join("scratch"), ReportConfig::default());
    let output = run_to_string(&agg, &[dir]);
    let lines: Vec<_> = output.lines().collect();

    let banners: Vec<_> = lines.iter().filter(|l| l.starts_with(">> Testsuite:")).collect();
    assert_eq!(banners.len(), 1);
    assert!(banners[0].starts_with(">> Testsuite: mytest ="));
    assert_eq!(banners[0].len(), 80);

    let rows: Vec<_> = lines
        .iter()
        .filter(|l| l.starts_with("caseB"))
        .collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        *rows[0],
        format!(
            "{:<35}{:<10}{:<7}{}",
            "caseB", "FAIL", 17, "mytest-1-2-3-4-5-6/caseB"
        )
    );
    assert!(!output.contains("caseA"));
}

#[test]
fn test_parent_component_in_entry_resolves_suite_name() {
    let tmp = TempDir::new().unwrap();
    let dir = suite_dir(tmp.path(), "mytest-1-2-3-4-5-6", "caseA\n1 0 1 2 0 0\n");
    fs::create_dir(dir.join("logs")).unwrap();

    let agg = aggregator(&tmp.path().join("scratch"), ReportConfig::default());
    let output = run_to_string(&agg, &[dir.join("logs").join("..")]);

    assert!(output.starts_with(">> Testsuite: mytest ="));
    assert!(output.contains(&format!(
        "{:<35}{:<10}{:<7}{}",
        "caseA", "FAIL", 2, "mytest-1-2-3-4-5-6/caseA"
    )));
    assert!(!output.contains(".."));
}

#[test]
fn test_report_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let a = suite_dir(tmp.path(), "alpha-1-1-1-1-1-1", "x\n0 1 2 0 0 0\n");
    let b = suite_dir(tmp.path(), "beta-1-1-1-1-1-1", "y\n0 1 1 0 1 0\n");
    let entries = vec![a, b];

    let agg = aggregator(&tmp.path().join("scratch"), ReportConfig::default());
    let first = run_to_string(&agg, &entries);
    let second = run_to_string(&agg, &entries);
    assert!(!first.is_empty());
    assert_eq!(first, second);

    let fresh = aggregator(&tmp.path().join("scratch"), ReportConfig::default());
    assert_eq!(run_to_string(&fresh, &entries), first);
}

#[test]
fn test_suites_reported_in_entry_order() {
    let tmp = TempDir::new().unwrap();
    let b = suite_dir(tmp.path(), "beta-1-1-1-1-1-1", "y\n1 0 1 0 0 0\n");
    let a = suite_dir(tmp.path(), "alpha-1-1-1-1-1-1", "x\n1 0 1 0 0 0\n");

    let agg = aggregator(&tmp.path().join("scratch"), ReportConfig::default());
    let mut out = Vec::new();
    let summary = agg.run(&[b, a], &mut out).unwrap();
    assert_eq!(
        summary.reported,
        vec![
            SuiteKey::Named("beta".to_string()),
            SuiteKey::Named("alpha".to_string()),
        ]
    );
}

#[test]
fn test_later_entry_replaces_same_suite_name() {
    let tmp = TempDir::new().unwrap();
    let old = suite_dir(&tmp.path().join("old"), "mytest-1-1-1-1-1-1", "old\n1 0 1 0 0 0\n");
    let new = suite_dir(&tmp.path().join("new"), "mytest-2-2-2-2-2-2", "new\n1 0 1 0 0 0\n");

    let agg = aggregator(&tmp.path().join("scratch"), ReportConfig::default());
    let output = run_to_string(&agg, &[old, new]);
    assert_eq!(output.matches(">> Testsuite:").count(), 1);
    assert!(output.contains("mytest-2-2-2-2-2-2/new"));
    assert!(!output.contains("old"));
}

#[test]
fn test_unmatched_directories_are_all_reported() {
    let tmp = TempDir::new().unwrap();
    let one = suite_dir(tmp.path(), "one", "a\n1 0 1 0 0 0\n");
    let two = suite_dir(tmp.path(), "two", "b\n0 0 0 0 0 1\n");

    let agg = aggregator(&tmp.path().join("scratch"), ReportConfig::default());
    let output = run_to_string(&agg, &[one, two]);
    assert!(output.contains(">> Testsuite: <unnamed:one> "));
    assert!(output.contains(">> Testsuite: <unnamed:two> "));
    assert!(output.contains(Status::Skipped.as_str()));
}

#[test]
fn test_missing_results_file_does_not_stop_the_run() {
    let tmp = TempDir::new().unwrap();
    let empty = tmp.path().join("empty-1-1-1-1-1-1");
    fs::create_dir(&empty).unwrap();
    let failing = suite_dir(tmp.path(), "failing-1-1-1-1-1-1", "a\n1 0 1 0 0 0\n");

    let agg = aggregator(&tmp.path().join("scratch"), ReportConfig::default());
    let mut out = Vec::new();
    let summary = agg.run(&[empty.clone(), failing], &mut out).unwrap();

    assert_eq!(summary.missing, vec![empty.join("test_results")]);
    assert_eq!(summary.reported, vec![SuiteKey::Named("failing".to_string())]);
}

#[test]
fn test_no_registered_suites_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let note = tmp.path().join("notes.txt");
    fs::write(&note, "").unwrap();

    let agg = aggregator(&tmp.path().join("scratch"), ReportConfig::default());
    let mut out = Vec::new();
    let err = agg.run(&[note], &mut out).unwrap_err();
    assert!(matches!(err, AggregateError::NoResultsFiles { .. }));
}

#[test]
fn test_malformed_file_aborts_strict_run() {
    let tmp = TempDir::new().unwrap();
    let bad = suite_dir(tmp.path(), "bad-1-1-1-1-1-1", "0 1 1 0 0 0\n");
    let good = suite_dir(tmp.path(), "good-1-1-1-1-1-1", "a\n1 0 1 0 0 0\n");

    let agg = aggregator(&tmp.path().join("scratch"), ReportConfig::default());
    let mut out = Vec::new();
    let err = agg.run(&[bad, good], &mut out).unwrap_err();
    match err {
        AggregateError::Parse(ParseError::OrphanResult { line, .. }) => assert_eq!(line, 1),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_malformed_file_skipped_with_keep_going() {
    let tmp = TempDir::new().unwrap();
    let bad = suite_dir(tmp.path(), "bad-1-1-1-1-1-1", "a\nb\n0 1 1 0 0 0\n");
    let good = suite_dir(tmp.path(), "good-1-1-1-1-1-1", "a\n1 0 1 0 0 0\n");

    let config = ReportConfig::default().with_parse_policy(ParsePolicy::KeepGoing);
    let agg = aggregator(&tmp.path().join("scratch"), config);
    let mut out = Vec::new();
    let summary = agg.run(&[bad, good], &mut out).unwrap();

    assert_eq!(summary.malformed.len(), 1);
    assert_eq!(summary.malformed[0].0, SuiteKey::Named("bad".to_string()));
    assert!(matches!(
        summary.malformed[0].1,
        ParseError::MissingResult { line: 2, .. }
    ));
    assert_eq!(summary.reported, vec![SuiteKey::Named("good".to_string())]);
    assert!(String::from_utf8(out).unwrap().contains(">> Testsuite: good "));
}

#[test]
fn test_custom_results_file_name() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("custom-1-1-1-1-1-1");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("results.txt"), "a\n0 0 1 0 0 0\n").unwrap();

    let config = ReportConfig::default().with_results_file_name("results.txt");
    let agg = aggregator(&tmp.path().join("scratch"), config);
    let output = run_to_string(&agg, &[dir]);
    assert!(output.contains("ERROR"));
}

#[test]
fn test_json_report() {
    let tmp = TempDir::new().unwrap();
    let dir = suite_dir(tmp.path(), "mytest-1-2-3-4-5-6", "caseA\n0 1 1 0 0 0\ncaseB\n1 0 1 4 0 0\n");

    let config = ReportConfig::default().with_format(ReportFormat::Json);
    let agg = aggregator(&tmp.path().join("scratch"), config);
    let output = run_to_string(&agg, &[dir]);

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    let suites = value.as_array().unwrap();
    assert_eq!(suites.len(), 1);
    assert_eq!(suites[0]["suite"]["named"], "mytest");
    assert_eq!(suites[0]["cases"].as_array().unwrap().len(), 1);
    assert_eq!(suites[0]["cases"][0]["name"], "caseB");
    assert_eq!(suites[0]["cases"][0]["status"], "FAIL");
}

#[test]
fn test_archive_entry() {
    if !tar_available() {
        return;
    }
    let tmp = TempDir::new().unwrap();
    let staging = tmp.path().join("staging");
    suite_dir(&staging, "alpha-1-1-1-1-1-1", "a\n1 0 1 2 0 0\n");
    suite_dir(&staging, "beta-1-1-1-1-1-1", "b\n0 1 1 0 0 0\n");
    let archive = tmp.path().join("nightly.tar.gz");
    let status = Command::new("tar")
        .arg("czf")
        .arg(&archive)
        .args(["alpha-1-1-1-1-1-1", "beta-1-1-1-1-1-1"])
        .current_dir(&staging)
        .status()
        .unwrap();
    assert!(status.success());

    let scratch = tmp.path().join("scratch");
    let agg = aggregator(&scratch, ReportConfig::default());
    let mut out = Vec::new();
    let summary = agg.run(&[archive.clone()], &mut out).unwrap();

    assert_eq!(summary.reported, vec![SuiteKey::Named("alpha".to_string())]);
    assert_eq!(summary.clean, vec![SuiteKey::Named("beta".to_string())]);
    assert!(scratch.join("nightly").join("alpha-1-1-1-1-1-1").is_dir());

    let output = String::from_utf8(out).unwrap();
    assert!(output.contains("alpha-1-1-1-1-1-1/a"));

    // A second run resets the scratch directory and reports the same thing.
    assert_eq!(run_to_string(&agg, &[archive]), output);
}

#[test]
fn test_broken_archive_aborts_run() {
    if !tar_available() {
        return;
    }
    let tmp = TempDir::new().unwrap();
    let archive = tmp.path().join("broken.tar");
    fs::write(&archive, "not an archive").unwrap();
    let dir = suite_dir(tmp.path(), "mytest-1-1-1-1-1-1", "a\n1 0 1 0 0 0\n");

    let agg = aggregator(&tmp.path().join("scratch"), ReportConfig::default());
    let mut out = Vec::new();
    let err = agg.run(&[dir, archive], &mut out).unwrap_err();
    assert!(matches!(err, AggregateError::Extraction(_)));
    assert!(out.is_empty());
}
