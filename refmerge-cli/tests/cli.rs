//! End-to-end tests for the refmerge binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

const MENTIONS: &str = r#"
# Moscow under two names, then the short one again
{"kind": "geo", "slots": {"NAME": ["Moscow", "MSK"]}, "begin": 0, "end": 6}
{"kind": "geo", "slots": {"NAME": "MSK"}, "begin": 8, "end": 11}
{"kind": "geo", "slots": {"NAME": "Kyiv"}, "begin": 13, "end": 17}
"#;

#[test]
fn test_resolve_merges_mentions() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "mentions.jsonl", MENTIONS);

    Command::cargo_bin("refmerge")
        .unwrap()
        .args(["resolve", &input])
        .assert()
        .success()
        .stdout(predicate::str::contains("GEO MSK"))
        .stdout(predicate::str::contains("mentions=2"))
        .stdout(predicate::str::contains("GEO KYIV"))
        .stderr(predicate::str::contains("3 records, 2 entities, 0 rejected"));
}

#[test]
fn test_resolve_alias() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "mentions.jsonl", MENTIONS);

    Command::cargo_bin("refmerge")
        .unwrap()
        .args(["r", &input, "--quiet"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_resolve_json_output() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "mentions.jsonl", MENTIONS);
    let text = write(&dir, "doc.txt", "Moscow, MSK, Kyiv.");

    let output = Command::cargo_bin("refmerge")
        .unwrap()
        .args(["resolve", &input, "--text", &text, "--format", "json", "-q"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let entities: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entities = entities.as_array().unwrap();
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0]["kind"], "geo");
    assert_eq!(entities[0]["canonical"], "MSK");
    assert_eq!(entities[0]["mentions"], serde_json::json!(["Moscow", "MSK"]));
    assert_eq!(entities[0]["attachments"], 2);
    assert_eq!(entities[1]["canonical"], "KYIV");
}

#[test]
fn test_resolve_jsonl_to_file() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "mentions.jsonl", MENTIONS);
    let out = dir.path().join("entities.jsonl");

    Command::cargo_bin("refmerge")
        .unwrap()
        .args(["resolve", &input, "--format", "jsonl", "-q", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        let entity: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(entity["id"].is_number());
    }
}

#[test]
fn test_resolve_counts_rejected() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "mentions.jsonl",
        r#"{"kind": "geo", "slots": {"TYPE": "city"}}
{"kind": "person", "slots": {"LASTNAME": "Petrov", "FIRSTNAME": "I."}}
{"kind": "person", "slots": {"LASTNAME": "Petrov", "FIRSTNAME": "Ivan"}}
"#,
    );

    Command::cargo_bin("refmerge")
        .unwrap()
        .args(["resolve", &input])
        .assert()
        .success()
        .stdout(predicate::str::contains("PERSON PETROV"))
        .stdout(predicate::str::contains("FIRSTNAME=Ivan"))
        .stderr(predicate::str::contains("3 records, 1 entities, 1 rejected"));
}

#[test]
fn test_resolve_record_references() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "mentions.jsonl",
        r#"{"kind": "geo", "slots": {"NAME": "Moscow"}, "begin": 0, "end": 6}
{"kind": "street", "slots": {"NAME": "Arbat", "GEO": {"ref": 0}}, "begin": 8, "end": 13}
"#,
    );

    let output = Command::cargo_bin("refmerge")
        .unwrap()
        .args(["resolve", &input, "--format", "json", "-q"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let entities: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let street = &entities[1];
    assert_eq!(street["kind"], "street");
    let geo_slot = street["slots"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == "GEO")
        .unwrap();
    assert_eq!(geo_slot["value"]["referent"], entities[0]["id"]);
}

#[test]
fn test_resolve_reference_past_end_fails() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "mentions.jsonl",
        r#"{"kind": "street", "slots": {"NAME": "Arbat", "GEO": {"ref": 4}}}"#,
    );

    Command::cargo_bin("refmerge")
        .unwrap()
        .args(["resolve", &input])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 1"))
        .stderr(predicate::str::contains("ref 4"));
}

#[test]
fn test_resolve_honors_config() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "mentions.jsonl",
        r#"{"kind": "street", "slots": {"NAME": "Arbat"}}"#,
    );
    let config = write(&dir, "refmerge.toml", "[required]\nstreet = [\"GEO\"]\n");

    Command::cargo_bin("refmerge")
        .unwrap()
        .args(["resolve", &input, "--config", &config])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("0 entities, 1 rejected"));
}

#[test]
fn test_resolve_bad_config_fails() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "mentions.jsonl", MENTIONS);
    let config = write(&dir, "refmerge.toml", "[required]\nplanet = [\"NAME\"]\n");

    Command::cargo_bin("refmerge")
        .unwrap()
        .args(["resolve", &input, "-c", &config])
        .assert()
        .failure()
        .stderr(predicate::str::contains("planet"));
}

#[test]
fn test_resolve_unknown_kind_fails() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "mentions.jsonl", r#"{"kind": "planet", "slots": {"NAME": "Mars"}}"#);

    Command::cargo_bin("refmerge")
        .unwrap()
        .args(["resolve", &input])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown referent kind"));
}

#[test]
fn test_resolve_malformed_line_fails() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "mentions.jsonl", "{\"kind\": \"geo\"}\nnot json\n");

    Command::cargo_bin("refmerge")
        .unwrap()
        .args(["resolve", &input])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_resolve_missing_file_fails() {
    Command::cargo_bin("refmerge")
        .unwrap()
        .args(["resolve", "/nonexistent/mentions.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn test_info_lists_kinds() {
    Command::cargo_bin("refmerge")
        .unwrap()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("GEO"))
        .stdout(predicate::str::contains("PERSON"))
        .stdout(predicate::str::contains("LASTNAME, IDENTITY"));
}

#[test]
fn test_help() {
    Command::cargo_bin("refmerge")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resolve"));
}
