mod common;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use serde_json::Value;

use common::{PEOPLE_CSV, TestWorkspace};

fn analyzer_cmd() -> Command {
    let mut cmd = Command::cargo_bin("csv-analyzer").expect("binary exists");
    cmd.env("RUST_LOG", "off");
    cmd
}

fn run_analyze_json(workspace: &TestWorkspace, extra: &[&str]) -> Value {
    let mut args = vec![
        "analyze",
        "--storage",
        workspace.path().to_str().expect("utf-8 path"),
    ];
    args.extend_from_slice(extra);
    let output = analyzer_cmd()
        .args(&args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).expect("report json")
}

#[test]
fn analyze_prints_json_report() {
    let workspace = TestWorkspace::new();
    workspace.write("people.csv", PEOPLE_CSV);

    let report = run_analyze_json(&workspace, &["people.csv"]);
    assert_eq!(report["filename"], "people.csv");
    assert_eq!(report["columns_total"], 3);
    assert_eq!(report["rows"], 3);
    assert_eq!(report["columns_selected"], "All");
    assert_eq!(
        report["preview"],
        "name,age,salary\nJohn,25,50000\nJane,30,60000\nBob,35,70000"
    );
    let age = &report["analysis"][1];
    assert_eq!(age["column"], "age");
    assert_eq!(age["sum"], 90.0);
    assert_eq!(age["average"], 30.0);
    assert_eq!(age["max"], 35.0);
}

#[test]
fn analyze_respects_columns_and_null_policy() {
    let workspace = TestWorkspace::new();
    workspace.write("people.csv", PEOPLE_CSV);

    let report = run_analyze_json(
        &workspace,
        &["people.csv", "-C", "1,3", "--empty-columns", "null"],
    );
    assert_eq!(report["columns_selected"], serde_json::json!([1, 3]));
    let analysis = report["analysis"].as_array().expect("analysis array");
    assert_eq!(analysis.len(), 2);
    assert_eq!(analysis[0]["column"], "name");
    assert!(analysis[0]["sum"].is_null());
    assert_eq!(analysis[1]["column"], "salary");
    assert_eq!(analysis[1]["max"], 70000.0);
}

#[test]
fn analyze_reads_settings_from_config_file() {
    let workspace = TestWorkspace::new();
    workspace.write("prices.csv", "item;price\npen;1,50\nbook;12,25\nlamp;30\n");
    let config = workspace.write(
        "analyzer.yml",
        &format!(
            "storage_dir: {}\npreview_rows: 2\ndelimiter: semicolon\n",
            workspace.path().display()
        ),
    );

    let output = analyzer_cmd()
        .args([
            "analyze",
            "prices.csv",
            "--config",
            config.to_str().expect("utf-8 path"),
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: Value = serde_json::from_slice(&output).expect("report json");
    assert_eq!(report["preview"], "item;price\npen;1,50");
    assert_eq!(report["analysis"][1]["sum"], 43.75);
}

#[test]
fn analyze_table_format_lists_columns() {
    let workspace = TestWorkspace::new();
    workspace.write("people.csv", PEOPLE_CSV);

    analyzer_cmd()
        .args([
            "analyze",
            "--storage",
            workspace.path().to_str().expect("utf-8 path"),
            "people.csv",
            "--format",
            "table",
        ])
        .assert()
        .success()
        .stdout(
            contains("column")
                .and(contains("average"))
                .and(contains("salary"))
                .and(contains("180000")),
        );
}

#[test]
fn missing_file_reports_not_found() {
    let workspace = TestWorkspace::new();

    analyzer_cmd()
        .args([
            "analyze",
            "--storage",
            workspace.path().to_str().expect("utf-8 path"),
            "nonexistent.csv",
        ])
        .assert()
        .code(2)
        .stderr(contains("\"kind\":\"not_found\"").and(contains("\"status\":404")));
}

#[test]
fn out_of_range_column_reports_bad_request() {
    let workspace = TestWorkspace::new();
    workspace.write("people.csv", PEOPLE_CSV);

    analyzer_cmd()
        .args([
            "analyze",
            "--storage",
            workspace.path().to_str().expect("utf-8 path"),
            "people.csv",
            "--columns",
            "10,20",
        ])
        .assert()
        .code(2)
        .stderr(contains("invalid_column").and(contains("10")));
}

#[test]
fn empty_file_reports_bad_request() {
    let workspace = TestWorkspace::new();
    workspace.write("empty.csv", "");

    analyzer_cmd()
        .args([
            "analyze",
            "--storage",
            workspace.path().to_str().expect("utf-8 path"),
            "empty.csv",
        ])
        .assert()
        .code(2)
        .stderr(contains("empty_file"));
}

#[test]
fn unknown_encoding_is_a_configuration_error() {
    let workspace = TestWorkspace::new();
    workspace.write("people.csv", PEOPLE_CSV);

    analyzer_cmd()
        .args([
            "analyze",
            "--storage",
            workspace.path().to_str().expect("utf-8 path"),
            "people.csv",
            "--input-encoding",
            "klingon",
        ])
        .assert()
        .code(1)
        .stderr(contains("Unknown encoding 'klingon'"));
}

#[test]
fn preview_prints_requested_rows() {
    let workspace = TestWorkspace::new();
    workspace.write("people.csv", PEOPLE_CSV);

    analyzer_cmd()
        .args([
            "preview",
            "--storage",
            workspace.path().to_str().expect("utf-8 path"),
            "people.csv",
            "--rows",
            "2",
        ])
        .assert()
        .success()
        .stdout(
            contains("name")
                .and(contains("Jane"))
                .and(contains("Bob").not()),
        );
}
