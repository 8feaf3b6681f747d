use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde_json::Value;

const PEOPLE: &str = r#"
files: [names]
root:
  name: {type: string, from: names}
  age: {type: integer, range: [18, 90]}
  tags:
    type: array
    length: [0, 3]
    elements: {type: enum, choices: [a, b, 3]}
"#;

fn jsonsmith() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_jsonsmith"));
    command.env_remove("RUST_LOG");
    command
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8 stdout")
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).expect("utf8 stderr")
}

fn assert_person(value: &Value) {
    assert!(matches!(value["name"].as_str(), Some("Ada" | "Grace" | "Linus")));
    let age = value["age"].as_i64().expect("age");
    assert!((18..=90).contains(&age));
    assert!(value["tags"].as_array().expect("tags").len() <= 3);
}

#[test]
fn seeded_runs_are_reproducible() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = write_file(dir.path(), "people.yaml", PEOPLE);
    let names = write_file(dir.path(), "names.txt", "Ada\nGrace\nLinus\n");
    let binding = format!("names={}", names.display());

    let run = || {
        jsonsmith()
            .args(["generate", "--seed", "7", "-a", "20", "-f", binding.as_str()])
            .arg(&schema)
            .output()
            .expect("run jsonsmith")
    };
    let first = run();
    let second = run();

    assert!(first.status.success(), "{}", stderr_text(&first));
    assert_eq!(first.stdout, second.stdout);

    let value: Value = serde_json::from_slice(&first.stdout).expect("json");
    let people = value.as_array().expect("array");
    assert_eq!(people.len(), 20);
    people.iter().for_each(assert_person);
}

#[test]
fn stream_reads_corpus_from_stdin() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = write_file(dir.path(), "people.yaml", PEOPLE);

    let mut child = jsonsmith()
        .args(["generate", "-f", "names=-", "-s", "5", "--corpus-buffer", "0"])
        .arg(&schema)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn jsonsmith");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"Ada\nGrace\nLinus\n")
        .expect("feed corpus");
    let output = child.wait_with_output().expect("wait");

    assert!(output.status.success(), "{}", stderr_text(&output));
    let text = stdout_text(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    for line in lines {
        assert_person(&serde_json::from_str(line).expect("json line"));
    }
}

#[test]
fn unbounded_stream_stops_cleanly_when_reader_leaves() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = write_file(dir.path(), "flag.yaml", "root: {flag: bool}\n");

    let mut child = jsonsmith()
        .arg("generate")
        .arg(&schema)
        .arg("--stream")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn jsonsmith");

    let stdout = child.stdout.take().expect("stdout");
    let mut reader = BufReader::new(stdout);
    for _ in 0..3 {
        let mut line = String::new();
        reader.read_line(&mut line).expect("read line");
        let value: Value = serde_json::from_str(&line).expect("json line");
        assert!(value["flag"].is_boolean());
    }
    drop(reader);

    let output = child.wait_with_output().expect("wait");
    assert!(output.status.success(), "{}", stderr_text(&output));
}

#[test]
fn unbound_declared_file_fails_before_generating() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = write_file(dir.path(), "people.yaml", PEOPLE);

    let output = jsonsmith()
        .arg("generate")
        .arg(&schema)
        .output()
        .expect("run jsonsmith");

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert_eq!(stderr_text(&output).trim(), "error: file names is not provided");
}

#[test]
fn validate_reports_every_undeclared_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = write_file(
        dir.path(),
        "broken.yaml",
        "root:\n  a: {type: string, from: first}\n  b: {type: array, elements: {type: string, from: second}}\n",
    );

    let output = jsonsmith()
        .arg("validate")
        .arg(&schema)
        .output()
        .expect("run jsonsmith");

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr_text(&output);
    assert!(stderr.starts_with("error: invalid schema: "), "{stderr}");
    assert!(stderr.contains(r#"$.a: unknown file "first""#), "{stderr}");
    assert!(stderr.contains(r#"$.b[*]: unknown file "second""#), "{stderr}");
}

#[test]
fn validate_accepts_consistent_schema_and_warns_on_unused_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = write_file(
        dir.path(),
        "ok.yaml",
        "files: [spare]\nroot:\n  n: int\n",
    );

    let output = jsonsmith()
        .arg("validate")
        .arg(&schema)
        .output()
        .expect("run jsonsmith");

    assert!(output.status.success());
    assert!(stdout_text(&output).trim_end().ends_with(": ok"));
    assert!(stderr_text(&output).contains(r#"file "spare" is declared but never used"#));
}

#[test]
fn malformed_schema_reports_node_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = write_file(
        dir.path(),
        "bad.yaml",
        "root:\n  users:\n    type: array\n    elements:\n      type: object\n      fields:\n        age: {type: integer, range: [9, 1]}\n",
    );

    let output = jsonsmith()
        .arg("generate")
        .arg(&schema)
        .output()
        .expect("run jsonsmith");

    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr_text(&output).contains("$.users[*].age: "),
        "{}",
        stderr_text(&output)
    );
}

#[test]
fn config_supplies_files_seed_and_output_settings() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = write_file(dir.path(), "people.yaml", PEOPLE);
    write_file(dir.path(), "names.txt", "Ada\nGrace\nLinus\n");
    let config = write_file(
        dir.path(),
        "jsonsmith.toml",
        "seed = 3\noutput_buffer_bytes = 0\nsort_keys = false\n\n[files]\nnames = \"names.txt\"\n",
    );
    let out = dir.path().join("out.json");

    let output = jsonsmith()
        .arg("generate")
        .arg(&schema)
        .arg("--config")
        .arg(&config)
        .arg("-o")
        .arg(&out)
        .output()
        .expect("run jsonsmith");

    assert!(output.status.success(), "{}", stderr_text(&output));
    assert!(output.stdout.is_empty());
    let text = std::fs::read_to_string(&out).expect("output file");
    assert!(text.starts_with(r#"{"name":"#), "{text}");
    assert_person(&serde_json::from_str(&text).expect("json"));
}

#[test]
fn verbose_logs_go_to_stderr_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = write_file(dir.path(), "flag.yaml", "root: {flag: bool}\n");

    let output = jsonsmith()
        .args(["-v", "--log-format", "json", "generate", "--seed", "1"])
        .arg(&schema)
        .output()
        .expect("run jsonsmith");

    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).expect("stdout is only data");
    assert!(value["flag"].is_boolean());
    let stderr = stderr_text(&output);
    let events: Vec<Value> = stderr
        .lines()
        .map(|line| serde_json::from_str(line).expect("json log line"))
        .collect();
    assert!(events.iter().any(|event| event["fields"]["message"] == "generation completed"));
}

#[test]
fn report_flag_writes_run_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = write_file(dir.path(), "flag.yaml", "root: {flag: bool}\n");
    let report_path = dir.path().join("report.json");

    let output = jsonsmith()
        .args(["generate", "--seed", "5", "-s", "4", "--report"])
        .arg(&report_path)
        .arg(&schema)
        .output()
        .expect("run jsonsmith");

    assert!(output.status.success(), "{}", stderr_text(&output));
    assert_eq!(stdout_text(&output).lines().count(), 4);

    let report: Value = serde_json::from_str(
        &std::fs::read_to_string(&report_path).expect("read report.json"),
    )
    .expect("parse report");
    assert_eq!(report["layout"]["kind"], "stream");
    assert_eq!(report["layout"]["count"], 4);
    assert_eq!(report["documents"], 4);
    assert_eq!(report["bytes_written"], output.stdout.len() as u64);
    assert_eq!(report["closed_by_reader"], false);
    assert!(report["run_id"].as_str().is_some_and(|id| !id.is_empty()));
}
