use std::{collections::HashSet, path::PathBuf};

use duo_domain::Expense;

use crate::CoreError;

/// Key under which the whole expense list is persisted as one JSON array.
pub const DEFAULT_STORE_KEY: &str = "expense-tracker-data";

/// A persisted snapshot of a previous save.
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub key: String,
    /// File name of the backup, also accepted by `restore`.
    pub id: String,
    pub path: PathBuf,
}

/// Persistence backend for the expense list.
pub trait ExpenseStore: Send + Sync {
    /// Stored records; an absent key yields an empty list.
    fn load(&self, key: &str) -> Result<Vec<Expense>, CoreError>;
    fn save(&self, key: &str, records: &[Expense]) -> Result<(), CoreError>;
    /// Newest first.
    fn list_backups(&self, key: &str) -> Result<Vec<BackupInfo>, CoreError>;
    fn restore(&self, key: &str, backup_id: &str) -> Result<Vec<Expense>, CoreError>;
}

/// Flags records that loaded but will be skipped by every engine operation.
pub fn record_warnings(records: &[Expense]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut warnings = Vec::new();
    for expense in records {
        if !seen.insert(expense.id) {
            warnings.push(format!("expense {} appears more than once", expense.id));
        }
        if expense.deleted {
            continue;
        }
        if expense.purchase_period().is_none() {
            warnings.push(format!(
                "expense {} has unreadable purchase date `{}`",
                expense.id, expense.purchase_date
            ));
        } else if !expense.is_valid() {
            warnings.push(format!(
                "expense {} ({}) is invalid and will be ignored",
                expense.id, expense.establishment
            ));
        }
    }
    warnings
}
