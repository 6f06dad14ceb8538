use assert_fs::prelude::*;
use duo_core::{CoreError, ExpenseStore, DEFAULT_STORE_KEY};
use duo_domain::{Expense, SplitPolicy};
use duo_storage_json::JsonExpenseStore;
use std::fs;
use tempfile::tempdir;

fn sample(establishment: &str) -> Expense {
    Expense::new("2025-02-07", establishment, 120.0, 3, "alex", SplitPolicy::EvenSplit)
}

#[test]
fn missing_key_loads_as_empty_list() {
    let dir = tempdir().expect("tempdir");
    let store = JsonExpenseStore::under(dir.path()).expect("create store");
    let records = store.load(DEFAULT_STORE_KEY).expect("load");
    assert!(records.is_empty());
    assert!(store.list_backups(DEFAULT_STORE_KEY).expect("list").is_empty());
}

#[test]
fn saves_and_loads_records_including_deleted() {
    let dir = tempdir().expect("tempdir");
    let store = JsonExpenseStore::under(dir.path()).expect("create store");
    let mut gone = sample("Old Shop");
    gone.deleted = true;
    let records = vec![sample("Market").with_product("Fruit"), gone];

    store.save(DEFAULT_STORE_KEY, &records).expect("save");
    let loaded = store.load(DEFAULT_STORE_KEY).expect("load");
    assert_eq!(loaded, records);

    let path = store.data_path(DEFAULT_STORE_KEY);
    assert_eq!(
        path.file_name().and_then(|name| name.to_str()),
        Some("expense-tracker-data.json")
    );
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn legacy_records_fill_in_defaults() {
    let temp = assert_fs::TempDir::new().expect("tempdir");
    let store = JsonExpenseStore::under(temp.path()).expect("create store");
    let data = temp.child("data").child("expense-tracker-data.json");
    data.write_str(
        r#"[{
            "id": "6f1c1d8e-3d7a-4a53-9a43-2f4b4d6a9b10",
            "purchase_date": "07/02/2025",
            "establishment": "Store X",
            "total_amount": 1000.0,
            "payer": "alex"
        }]"#,
    )
    .expect("write legacy file");

    let loaded = store.load(DEFAULT_STORE_KEY).expect("load");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].installment_count, 1);
    assert_eq!(loaded[0].installments_paid, 0);
    assert_eq!(loaded[0].split_policy, SplitPolicy::EvenSplit);
    assert!(!loaded[0].deleted);
    assert!(loaded[0].is_active());
}

#[test]
fn every_save_backs_up_the_previous_file_with_retention() {
    let dir = tempdir().expect("tempdir");
    let store = JsonExpenseStore::with_retention(
        dir.path().join("data"),
        dir.path().join("backups"),
        2,
    )
    .expect("create store");

    let mut records = Vec::new();
    for name in ["One", "Two", "Three", "Four"] {
        records.push(sample(name));
        store.save(DEFAULT_STORE_KEY, &records).expect("save");
    }

    let backups = store.list_backups(DEFAULT_STORE_KEY).expect("list backups");
    assert_eq!(backups.len(), 2);
    assert!(backups[0].id > backups[1].id);
    assert!(backups.iter().all(|info| info.path.exists()));

    // Newest backup holds the state before the last save.
    let restored = store
        .restore(DEFAULT_STORE_KEY, &backups[0].id)
        .expect("restore backup");
    assert_eq!(restored.len(), 3);
    assert_eq!(store.load(DEFAULT_STORE_KEY).expect("reload").len(), 3);
}

#[test]
fn restoring_an_unknown_backup_fails() {
    let dir = tempdir().expect("tempdir");
    let store = JsonExpenseStore::under(dir.path()).expect("create store");
    let err = store
        .restore(DEFAULT_STORE_KEY, "nope.json")
        .expect_err("missing backup");
    assert!(matches!(err, CoreError::BackupNotFound(_)));
}

#[test]
fn corrupt_file_surfaces_a_serde_error() {
    let dir = tempdir().expect("tempdir");
    let store = JsonExpenseStore::under(dir.path()).expect("create store");
    fs::write(store.data_path(DEFAULT_STORE_KEY), "{not json").expect("write");
    assert!(matches!(
        store.load(DEFAULT_STORE_KEY),
        Err(CoreError::Serde(_))
    ));
}
