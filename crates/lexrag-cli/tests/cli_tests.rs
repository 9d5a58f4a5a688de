//! Integration tests for the lexrag binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command isolated from the user's config, index and audit log
fn lexrag_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("lexrag").unwrap();
    cmd.env("LEXRAG_CONFIG", dir.path().join("config.yml"))
        .env("LEXRAG_INDEX_PATH", dir.path().join("index.sqlite"))
        .env("LEXRAG_AUDIT_LOG", dir.path().join("audit.json"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_empty_query_exits_with_invalid_input() {
    let dir = TempDir::new().unwrap();

    lexrag_cmd(&dir)
        .args(["ipc", ""])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Query text is required"));

    lexrag_cmd(&dir)
        .arg("draft")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Question is required"));

    // Nothing was answered, so nothing was audited
    assert!(!dir.path().join("audit.json").exists());
}

#[test]
fn test_invalid_config_exits_with_invalid_input() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.yml"), "fanout:\n  backends: []\n").unwrap();

    lexrag_cmd(&dir)
        .args(["precedent", "grave and sudden provocation"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("at least one backend"));
}

#[test]
fn test_backends_lists_default_fanout_set() {
    let dir = TempDir::new().unwrap();

    lexrag_cmd(&dir)
        .arg("backends")
        .assert()
        .success()
        .stdout(predicate::str::contains("Llama-3.2-1B"))
        .stdout(predicate::str::contains("qwen3:1.7b"))
        .stdout(predicate::str::contains("gemini-2.0-flash-exp"));
}

#[test]
fn test_backends_json() {
    let dir = TempDir::new().unwrap();

    let output = lexrag_cmd(&dir)
        .args(["--format", "json", "backends"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["fanout"]["backends"].as_array().unwrap().len(), 4);
    assert_eq!(value["drafting"]["provider"], "gemini");
}

#[test]
fn test_backends_reads_config_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("config.yml"),
        "fanout:\n  backends:\n    - name: Mistral-7B\n      model: mistral:7b\ndrafting:\n  provider:\n    kind: ollama\n    model: llama3.1:8b\n",
    )
    .unwrap();

    lexrag_cmd(&dir)
        .arg("backends")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mistral-7B"))
        .stdout(predicate::str::contains("Phi-2.7B").not())
        .stdout(predicate::str::contains("llama3.1:8b (ollama)"));
}

#[test]
fn test_config_path_init_and_show() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("nested").join("lexrag.yml");

    lexrag_cmd(&dir)
        .arg("--config")
        .arg(&config_path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lexrag.yml"));

    lexrag_cmd(&dir)
        .arg("--config")
        .arg(&config_path)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config_path.exists());

    lexrag_cmd(&dir)
        .arg("--config")
        .arg(&config_path)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    lexrag_cmd(&dir)
        .arg("--config")
        .arg(&config_path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("IPC_collection"))
        .stdout(predicate::str::contains("timeout_secs: 500"));
}

#[test]
fn test_config_init_does_not_write_api_keys() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("lexrag.yml");

    lexrag_cmd(&dir)
        .arg("--config")
        .arg(&config_path)
        .env("GEMINI_API_KEY", "gemini-secret-value")
        .env("LEXRAG_EMBEDDING_API_KEY", "embedding-secret-value")
        .args(["config", "init"])
        .assert()
        .success();

    let written = fs::read_to_string(&config_path).unwrap();
    assert!(!written.contains("gemini-secret-value"));
    assert!(!written.contains("embedding-secret-value"));

    lexrag_cmd(&dir)
        .arg("--config")
        .arg(&config_path)
        .env("GEMINI_API_KEY", "gemini-secret-value")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gemini-secret-value").not());
}

#[test]
fn test_status_on_fresh_index() {
    let dir = TempDir::new().unwrap();

    lexrag_cmd(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Collections:     0"));
    assert!(dir.path().join("index.sqlite").exists());
}
