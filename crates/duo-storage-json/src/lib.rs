use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Utc;
use duo_core::{BackupInfo, CoreError, ExpenseStore};
use duo_domain::Expense;

const FILE_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";
const TMP_SUFFIX: &str = "tmp";
pub const DEFAULT_RETENTION: usize = 5;

/// Filesystem-backed JSON persistence: one file per key plus rotating backups.
#[derive(Debug, Clone)]
pub struct JsonExpenseStore {
    data_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonExpenseStore {
    pub fn new(data_dir: PathBuf, backups_dir: PathBuf) -> Result<Self, CoreError> {
        Self::with_retention(data_dir, backups_dir, DEFAULT_RETENTION)
    }

    pub fn with_retention(
        data_dir: PathBuf,
        backups_dir: PathBuf,
        retention: usize,
    ) -> Result<Self, CoreError> {
        fs::create_dir_all(&data_dir)?;
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            data_dir,
            backups_dir,
            retention: retention.max(1),
        })
    }

    /// Conventional layout below an application home: `data/` and `backups/`.
    pub fn under(root: &Path) -> Result<Self, CoreError> {
        Self::new(root.join("data"), root.join("backups"))
    }

    pub fn data_path(&self, key: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", canonical_key(key), FILE_EXTENSION))
    }

    fn backup_dir(&self, key: &str) -> PathBuf {
        self.backups_dir.join(canonical_key(key))
    }

    fn backup_existing_file(&self, key: &str, path: &Path) -> Result<(), CoreError> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(key);
        fs::create_dir_all(&dir)?;
        let stem = format!(
            "{}_{}",
            canonical_key(key),
            Utc::now().format(BACKUP_TIMESTAMP_FORMAT)
        );
        let mut backup_path = dir.join(format!("{}.{}", stem, FILE_EXTENSION));
        let mut attempt = 1;
        while backup_path.exists() {
            backup_path = dir.join(format!("{}_{}.{}", stem, attempt, FILE_EXTENSION));
            attempt += 1;
        }
        fs::copy(path, &backup_path)?;
        tracing::debug!(backup = %backup_path.display(), "previous data backed up");
        self.prune_backups(key)
    }

    fn prune_backups(&self, key: &str) -> Result<(), CoreError> {
        for entry in self.list_backups(key)?.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                tracing::warn!(backup = %entry.id, error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl ExpenseStore for JsonExpenseStore {
    fn load(&self, key: &str) -> Result<Vec<Expense>, CoreError> {
        let path = self.data_path(key);
        if !path.exists() {
            return Ok(Vec::new());
        }
        load_records_from_path(&path)
    }

    fn save(&self, key: &str, records: &[Expense]) -> Result<(), CoreError> {
        let path = self.data_path(key);
        self.backup_existing_file(key, &path)?;
        save_records_to_path(records, &path)?;
        tracing::info!(path = %path.display(), records = records.len(), "expenses saved");
        Ok(())
    }

    fn list_backups(&self, key: &str) -> Result<Vec<BackupInfo>, CoreError> {
        let dir = self.backup_dir(key);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(BackupInfo {
                    key: canonical_key(key),
                    id: file_name.to_string(),
                    path: path.clone(),
                });
            }
        }
        // Timestamped names sort chronologically.
        entries.sort_by_key(|info| Reverse(info.id.clone()));
        Ok(entries)
    }

    fn restore(&self, key: &str, backup_id: &str) -> Result<Vec<Expense>, CoreError> {
        let backup = self
            .list_backups(key)?
            .into_iter()
            .find(|info| info.id == backup_id)
            .ok_or_else(|| CoreError::BackupNotFound(backup_id.to_string()))?;
        let records = load_records_from_path(&backup.path)?;
        self.save(key, &records)?;
        tracing::info!(backup = %backup.id, "backup restored");
        Ok(records)
    }
}

/// Writes the record list to `path` through a temporary file and a rename.
pub fn save_records_to_path(records: &[Expense], path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    let data = serde_json::to_string_pretty(records)?;
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_records_from_path(path: &Path) -> Result<Vec<Expense>, CoreError> {
    let data = fs::read_to_string(path)?;
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&data)?)
}

fn canonical_key(key: &str) -> String {
    let sanitized: String = key
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches(|c| c == '_' || c == '-').is_empty() {
        duo_core::DEFAULT_STORE_KEY.into()
    } else {
        sanitized
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}
