use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Expense not found: {0}")]
    ExpenseNotFound(Uuid),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Backup not found: {0}")]
    BackupNotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
