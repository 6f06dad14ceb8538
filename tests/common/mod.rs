#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use assert_cmd::Command;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated application home for one test.
pub fn test_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// The CLI binary in script mode, rooted at `home`, with colour disabled.
pub fn script_command(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("duo_ledger_cli").expect("locate cli binary");
    cmd.env("DUO_LEDGER_HOME", home)
        .env("DUO_LEDGER_CLI_SCRIPT", "1")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

/// Joins script lines and appends a trailing `exit`.
pub fn script(lines: &[&str]) -> String {
    let mut input = lines.join("\n");
    input.push_str("\nexit\n");
    input
}
