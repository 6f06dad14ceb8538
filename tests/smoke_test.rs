mod common;

use duo_ledger::{
    core::aggregate,
    domain::{Expense, ProjectionPolicy, SplitPolicy},
    init,
};
use predicates::prelude::*;
use regex::Regex;

use common::{script, script_command, test_home};

#[test]
fn engine_smoke() {
    init();

    let records = vec![Expense::new(
        "2025-01-15",
        "Market",
        300.0,
        3,
        "Alex",
        SplitPolicy::EvenSplit,
    )];
    let period = "2025-02".parse().expect("period");
    let stats = aggregate(&records, period, ProjectionPolicy::purchase_month());
    assert_eq!(stats.current_bill_total, 100.0);
    assert_eq!(stats.future_commitments_total, 100.0);
}

#[test]
fn version_reports_semver() {
    let home = test_home();
    let output = script_command(&home)
        .write_stdin(script(&["version"]))
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let semver = Regex::new(r"Duo Ledger \d+\.\d+\.\d+").expect("regex");
    assert!(semver.is_match(&stdout), "unexpected output: {stdout}");
}

#[test]
fn help_lists_engine_commands() {
    let home = test_home();
    script_command(&home)
        .write_stdin(script(&["help"]))
        .assert()
        .success()
        .stdout(predicate::str::contains("summary"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("policy"));
}
