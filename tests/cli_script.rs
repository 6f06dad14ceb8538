mod common;

use predicates::prelude::*;
use predicates::str::contains;

use common::{script, script_command, test_home};

#[test]
fn script_mode_adds_and_summarizes() {
    let home = test_home();
    let input = script(&[
        "config set party_a Alex",
        "config set party_b Sam",
        "period 2025-03",
        "add 2025-03-05 Market 100,00 Alex",
        "add 2025-03-10 Pharmacy 40,00 Sam split=b",
        "summary",
    ]);

    script_command(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Current bill"))
        .stdout(contains("140.00"))
        .stdout(contains("50.00 (36%)"))
        .stdout(contains("90.00 (64%)"));

    let data = std::fs::read_to_string(home.join("data").join("expense-tracker-data.json"))
        .expect("data file written");
    assert!(data.contains("\"Market\""));
    assert!(data.contains("\"Pharmacy\""));
}

#[test]
fn export_writes_csv_for_the_period() {
    let home = test_home();
    let target = home.join("out").join("march.csv");
    let export = format!("export \"{}\"", target.display());
    let input = script(&[
        "config set party_a Alex",
        "config set party_b Sam",
        "policy a",
        "period 2025-03",
        "add 2025-02-07 \"Store X\" \"1.000,00\" Alex count=10 split=a",
        export.as_str(),
    ]);

    script_command(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Exported 1 row(s)"));

    let csv = std::fs::read_to_string(&target).expect("csv written");
    assert!(csv.starts_with('\u{feff}'));
    let mut reader =
        csv::ReaderBuilder::new().from_reader(csv.trim_start_matches('\u{feff}').as_bytes());
    let headers = reader.headers().expect("headers").clone();
    assert!(headers.iter().any(|h| h == "Alex"));
    assert!(headers.iter().any(|h| h == "Sam"));
    let records: Vec<csv::StringRecord> =
        reader.records().collect::<Result<_, _>>().expect("rows");
    assert_eq!(records.len(), 1);
    let column = |name: &str| headers.iter().position(|h| h == name).expect("column present");
    assert_eq!(&records[0][column("Month")], "MAR");
    assert_eq!(&records[0][column("Installment")], "2");
    assert_eq!(&records[0][column("Installment Value")], "100.00");
    assert_eq!(&records[0][column("Alex")], "100.00");
    assert_eq!(&records[0][column("Sam")], "0.00");
}

#[test]
fn duplicate_entries_are_skipped_without_force() {
    let home = test_home();
    let line = "add 2025-03-05 Bakery 12,50 Sam";
    let input = script(&[line, line, "list"]);

    script_command(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("looks like a duplicate"))
        .stdout(contains("Expenses (1)"));
}

#[test]
fn invalid_amount_reports_error_and_continues() {
    let home = test_home();
    let input = script(&["add 2025-03-05 Bakery -5 Sam", "list"]);

    script_command(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("No expenses recorded."));
}

#[test]
fn unknown_command_suggests_closest_match() {
    let home = test_home();
    script_command(&home)
        .write_stdin(script(&["sumary"]))
        .assert()
        .success()
        .stdout(contains("Unknown command `sumary`"))
        .stdout(contains("Suggestion: `summary`?"));
}

#[test]
fn restore_brings_back_previous_records() {
    let home = test_home();
    script_command(&home)
        .write_stdin(script(&[
            "add 2025-03-05 Bakery 12,50 Sam",
            "add 2025-03-06 Garage 80,00 Alex",
        ]))
        .assert()
        .success();

    // The second save backed up the one-record list; it is the newest backup.
    script_command(&home)
        .write_stdin(script(&["backups", "restore 1", "list"]))
        .assert()
        .success()
        .stdout(contains("Restored 1 record(s)"))
        .stdout(contains("Expenses (1)"))
        .stdout(contains("Garage").not());
}

#[test]
fn legacy_data_file_loads_with_defaults() {
    use assert_fs::prelude::*;

    let home = assert_fs::TempDir::new().expect("temp home");
    home.child("data/expense-tracker-data.json")
        .write_str(
            r#"[{"id":"6f1c2d3e-0000-4000-8000-000000000001","purchase_date":"2025-03-02",
                "establishment":"Old Shop","total_amount":60.0,"payer":"Sam"}]"#,
        )
        .expect("seed data");

    script_command(home.path())
        .write_stdin(script(&["period 2025-03", "rows"]))
        .assert()
        .success()
        .stdout(contains("Old Shop"))
        .stdout(contains("1/1"))
        .stdout(contains("30.00"));
}
