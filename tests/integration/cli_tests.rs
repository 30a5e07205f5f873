//! Runs the connpoll binary and checks what lands on stdout

use std::process::{Command, Output};

fn connpoll(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_connpoll"))
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("run connpoll binary")
}

#[test]
fn test_json_stdout_is_json_lines_only() {
    let output = connpoll(&["host.invalid", "1", "--json"]);
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.trim().is_empty(), "startup values missing from stdout");
    for line in stdout.lines() {
        let parsed: Result<serde_json::Value, _> = serde_json::from_str(line);
        assert!(parsed.is_ok(), "non-JSON stdout line: {:?}", line);
    }

    let first: serde_json::Value = serde_json::from_str(stdout.lines().next().unwrap()).unwrap();
    assert_eq!(first["event"]["kind"], "started");
    assert_eq!(first["event"]["address"], "host.invalid");
    assert_eq!(first["event"]["interval_secs"], 1);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("connect_failed"));
}

#[test]
fn test_text_startup_lines() {
    let output = connpoll(&["host.invalid", "-1"]);
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Using IP address: host.invalid"));
    assert!(stdout.contains("Using time span: 5 seconds"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid time span provided, using default."));
    assert!(stderr.contains("Failed to connect to host.invalid:80"));
}
