//! End-to-end tests of the command line binary
//!
//! Every run uses `--fake-api`, so no network access or settings file is needed.

use assert_cmd::Command;
use tempfile::TempDir;

fn harvester() -> Command {
    let mut cmd = Command::cargo_bin("listing-harvester").unwrap();
    cmd.env_remove("HARVESTER_API_BASE_URL")
        .env_remove("HARVESTER_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_command() {
    let output = harvester().arg("--help").assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8(output).unwrap();

    assert!(stdout.contains("top-selling-agents"));
}

#[test]
fn test_top_agents_with_fake_api() {
    let output = harvester()
        .args([
            "top-selling-agents",
            "--fake-api",
            "--per-second",
            "50",
            "--progress",
            "none",
            "-t",
            "amsterdam",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();

    // 180 generated listings over 8 pages; the last page is not requested
    assert!(stdout.contains("175 listings retrieved"), "{stdout}");
    assert!(stdout.lines().next().unwrap().contains("Agent"));
}

#[test]
fn test_json_output() {
    let output = harvester()
        .args([
            "--output-format",
            "json",
            "top-selling-agents",
            "--fake-api",
            "--fetch-last-page",
            "--per-second",
            "50",
            "--progress",
            "log",
            "--results",
            "3",
            "-t",
            "Amsterdam",
            "tuin",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed["listings"], 180);
    assert_eq!(parsed["terms"], serde_json::json!(["amsterdam", "tuin"]));
    assert_eq!(parsed["agents"].as_array().unwrap().len(), 3);
}

#[test]
fn test_terms_are_required() {
    harvester()
        .args(["top-selling-agents", "--fake-api"])
        .assert()
        .failure();
}

#[test]
fn test_blank_terms_rejected() {
    harvester()
        .args(["top-selling-agents", "--fake-api", "--progress", "none", "-t", "  "])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_too_many_pages_fails() {
    let output = harvester()
        .args([
            "top-selling-agents",
            "--fake-api",
            "--max-pages",
            "4",
            "--progress",
            "none",
            "-t",
            "amsterdam",
        ])
        .assert()
        .failure()
        .code(1)
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(output).unwrap();

    assert!(stderr.contains("too many entries"), "{stderr}");
}

#[test]
fn test_remote_api_without_settings_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("appsettings.json");

    harvester()
        .args(["top-selling-agents", "--progress", "none", "-t", "amsterdam", "--settings"])
        .arg(&missing)
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_invalid_concurrency_rejected() {
    harvester()
        .args(["top-selling-agents", "--fake-api", "-t", "amsterdam", "--concurrency", "0"])
        .assert()
        .failure();
}
