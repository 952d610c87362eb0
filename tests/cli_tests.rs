//! Tests for the `playreport` binary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

const EVENTS: &str = r#"{"event":"playbook_start","playbook":{"path":"/srv/site.yml"}}
{"event":"play_start","play":{"name":"webservers","hosts":["web1"]}}

{"event":"task_start","task":{"name":"Install nginx"},"is_conditional":false}
{"event":"runner_ok","result":{"host":"web1","payload":{"changed":true}}}
{"event":"stats"}
"#;

fn playreport() -> Command {
    let mut cmd = Command::cargo_bin("playreport").unwrap();
    cmd.env_remove("ANSIBLE_CONFIG")
        .env_remove("ANSIBLE_ansiboard_URL")
        .env_remove("ANSIBLE_ansiboard_TIMEOUT")
        .env_remove("ANSIBLE_ansiboard_TOKEN")
        .env_remove("PLAYREPORT_API_TOKEN")
        .env_remove("RUST_LOG")
        .env("HOME", std::env::temp_dir())
        .current_dir(std::env::temp_dir());
    cmd
}

#[test]
fn test_help() {
    playreport()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--api-url"));
}

#[test]
fn test_stream_without_url_warns_and_succeeds() {
    playreport()
        .write_stdin(EVENTS)
        .assert()
        .success()
        .stderr(predicate::str::contains("was not sent"));
}

#[test]
fn test_malformed_lines_are_skipped() {
    let mut input = NamedTempFile::new().unwrap();
    writeln!(input, "{{\"event\":\"play_start\",\"play\":{{\"name\":\"p\"}}}}").unwrap();
    writeln!(input, "this is not json").unwrap();
    writeln!(input, "{{\"event\":\"stats\"}}").unwrap();
    input.flush().unwrap();

    playreport()
        .arg(input.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipping malformed event on line 2"));
}

#[test]
fn test_invalid_utf8_line_is_skipped() {
    let mut input = Vec::new();
    input.extend_from_slice(b"{\"event\":\"play_start\",\"play\":{\"name\":\"p\",\"hosts\":[\"web1\"]}}\n");
    input.extend_from_slice(b"\xff\xfe\n");
    input.extend_from_slice(b"{\"event\":\"stats\"}\n");

    playreport()
        .write_stdin(input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipping malformed event on line 2"))
        .stderr(predicate::str::contains("was not sent"));
}

#[test]
fn test_zero_timeout_is_rejected() {
    playreport()
        .args(["--timeout", "0"])
        .write_stdin(EVENTS)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--timeout"));
}

#[test]
fn test_missing_input_file_fails() {
    playreport()
        .arg("/nonexistent/events.jsonl")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open"));
}
