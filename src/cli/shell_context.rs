use dialoguer::theme::ColorfulTheme;
use duo_config::{Config, ConfigManager};
use duo_domain::{Expense, ProjectionPolicy, YearMonth};
use duo_storage_json::JsonExpenseStore;

use super::registry::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// Session state shared by every command handler.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub store: JsonExpenseStore,
    pub store_key: String,
    pub config_manager: ConfigManager,
    pub config: Config,
    /// Full record list, soft-deleted entries included.
    pub records: Vec<Expense>,
    /// Month the listing, summary and export commands look at.
    pub period: YearMonth,
    /// Session projection; starts from the configured default.
    pub policy: ProjectionPolicy,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn active_records(&self) -> impl Iterator<Item = &Expense> {
        self.records.iter().filter(|expense| !expense.deleted)
    }

    pub fn status(&self) -> String {
        format!(
            "ShellContext {{ running: {}, period: {}, policy: {}, records: {} }}",
            self.running,
            self.period,
            self.policy,
            self.records.len()
        )
    }
}
