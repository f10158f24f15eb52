#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn sticker() -> Command {
    let mut cmd = Command::cargo_bin("sticker").unwrap();
    cmd.env_remove("STICKER_CONFIG");
    cmd
}

// ---------------------------------------------------------------------------
// sticker next
// ---------------------------------------------------------------------------

#[test]
fn next_with_future_anchor_prints_anchor() {
    sticker()
        .args([
            "next",
            "--first",
            "2345-01-01T00:00:00Z",
            "--interval-ms",
            "60000",
            "--count",
            "2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2345-01-01T00:00:00.000Z"))
        .stdout(predicate::str::contains("2345-01-01T00:01:00.000Z"));
}

#[test]
fn next_json_lists_fires() {
    let output = sticker()
        .args([
            "next",
            "--json",
            "--first",
            "2345-01-01T00:00:00Z",
            "--interval-ms",
            "1000",
            "--count",
            "3",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["interval_ms"], 1000);
    assert_eq!(json["fires"].as_array().unwrap().len(), 3);
}

#[test]
fn next_rejects_zero_interval() {
    sticker()
        .args(["next", "--interval-ms", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-positive interval"));
}

#[test]
fn next_requires_interval_without_config() {
    sticker()
        .arg("next")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--interval-ms is required"));
}

#[test]
fn next_reads_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ticker.yaml");
    std::fs::write(&path, "first: 2300-06-01T12:00:00Z\ninterval_ms: 900000\n").unwrap();

    sticker()
        .arg("--config")
        .arg(&path)
        .args(["next", "--count", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2300-06-01T12:00:00.000Z"))
        .stdout(predicate::str::contains("2300-06-01T12:15:00.000Z"));
}

#[test]
fn flags_override_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ticker.yaml");
    std::fs::write(&path, "first: 2300-06-01T12:00:00Z\ninterval_ms: 900000\n").unwrap();

    sticker()
        .arg("--config")
        .arg(&path)
        .args(["next", "--count", "2", "--interval-ms", "60000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2300-06-01T12:01:00.000Z"));
}

#[test]
fn missing_config_file_fails() {
    sticker()
        .args(["--config", "/nonexistent/ticker.yaml", "next"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}

// ---------------------------------------------------------------------------
// sticker watch
// ---------------------------------------------------------------------------

#[test]
fn watch_prints_requested_ticks() {
    let output = sticker()
        .args(["watch", "--interval-ms", "20", "--count", "3"])
        .timeout(std::time::Duration::from_secs(10))
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("1\t"));
    assert!(lines[2].starts_with("3\t"));
}

#[test]
fn watch_json_emits_one_document_per_tick() {
    let output = sticker()
        .args(["watch", "-j", "--interval-ms", "15", "--count", "2"])
        .timeout(std::time::Duration::from_secs(10))
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let seqs: Vec<u64> = stdout
        .lines()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["seq"].as_u64().unwrap())
        .collect();
    assert_eq!(seqs, vec![1, 2]);
}

#[cfg(unix)]
#[test]
fn watch_exits_cleanly_on_sigint_while_ticking() {
    use std::process::Stdio;
    use std::time::{Duration, Instant};

    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("sticker"))
        .args(["watch", "--interval-ms", "5"])
        .env_remove("STICKER_CONFIG")
        .stdout(Stdio::null())
        .spawn()
        .unwrap();

    // Let it tick for a while so the signal lands between and during prints.
    std::thread::sleep(Duration::from_millis(300));
    let status = std::process::Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let deadline = Instant::now() + Duration::from_secs(5);
    let exit = loop {
        if let Some(exit) = child.try_wait().unwrap() {
            break exit;
        }
        if Instant::now() > deadline {
            child.kill().unwrap();
            panic!("watch did not exit after SIGINT");
        }
        std::thread::sleep(Duration::from_millis(20));
    };
    assert!(exit.success(), "watch exited with {exit:?}");
}
