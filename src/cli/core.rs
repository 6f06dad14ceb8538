//! Shell context construction, dispatch, and helpers shared by command handlers.

use std::{collections::HashMap, io, path::Path};

use chrono::Local;
use dialoguer::theme::ColorfulTheme;
use duo_config::{Config, ConfigError, ConfigManager};
use duo_core::{record_warnings, CoreError, ExpenseStore, ExportOptions, DEFAULT_STORE_KEY};
use duo_domain::YearMonth;
use duo_storage_json::JsonExpenseStore;
use strsim::levenshtein;

pub use crate::errors::CliError;
use crate::utils;

use super::commands;
use super::io as cli_io;
use super::output::{self, OutputPreferences};
use super::registry::{CommandEntry, CommandRegistry};
pub use super::shell_context::{CliMode, ShellContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_home(mode, &utils::app_home())
    }

    /// Builds a session whose config, data and backups live under `home`.
    pub fn with_home(mode: CliMode, home: &Path) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::default();
        commands::register_all(&mut registry);

        let config_manager = ConfigManager::with_base_dir(home.to_path_buf())?;
        let config = config_manager.load()?;
        apply_output_preferences(&config, mode);

        let store = JsonExpenseStore::under(&config.resolve_data_root(home))?;
        let records = store.load(DEFAULT_STORE_KEY)?;
        for warning in record_warnings(&records) {
            cli_io::print_warning(warning);
        }
        tracing::info!(
            home = %home.display(),
            records = records.len(),
            "shell session started"
        );

        Ok(ShellContext {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            store,
            store_key: DEFAULT_STORE_KEY.to_string(),
            config_manager,
            policy: config.projection,
            config,
            records,
            period: YearMonth::from_date(Local::now().date_naive()),
            last_command: None,
            running: true,
        })
    }

    /// `(name, usage)` for every registered command, in registration order.
    pub(crate) fn command_usages(&self) -> Vec<(&'static str, &'static str)> {
        self.registry
            .list()
            .into_iter()
            .map(|entry| (entry.name, entry.usage))
            .collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        format!("duo [{} {}]> ", self.period, self.policy)
    }

    pub(crate) fn can_prompt(&self) -> bool {
        self.mode == CliMode::Interactive
    }

    /// Asks in interactive mode; scripts get `default`.
    pub(crate) fn confirm(&self, prompt: &str, default: bool) -> Result<bool, CommandError> {
        if !self.can_prompt() {
            return Ok(default);
        }
        cli_io::confirm_action(&self.theme, prompt, default)
    }

    pub(crate) fn persist_records(&self) -> CommandResult {
        self.store.save(&self.store_key, &self.records)?;
        Ok(())
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        apply_output_preferences(&self.config, self.mode);
        Ok(())
    }

    pub(crate) fn export_options(&self) -> ExportOptions {
        ExportOptions {
            party_a_label: self.config.party_a.clone(),
            party_b_label: self.config.party_b.clone(),
            locale: self.config.month_locale,
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                self.print_warning(&err.to_string());
                return Ok(LoopControl::Continue);
            }
        };
        if tokens.is_empty() {
            return Ok(LoopControl::Continue);
        }
        let command = tokens[0].to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&command, &tokens[0], &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|key| (levenshtein(key, &needle), key))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", name));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true)
            .map_err(|err| CliError::Input(err.to_string()))
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        tracing::debug!(error = %err, command = ?self.last_command, "command failed");
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(&message);
                cli_io::print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            other => {
                cli_io::print_error(other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }
}

fn apply_output_preferences(config: &Config, mode: CliMode) {
    let color_enabled = config.ui_color_enabled && mode == CliMode::Interactive;
    colored::control::set_override(color_enabled);
    output::set_preferences(OutputPreferences { color_enabled });
}

/// Command arguments split into positionals, `key=value` options and `--flags`.
#[derive(Debug, Default)]
pub(crate) struct ParsedArgs<'a> {
    pub positional: Vec<&'a str>,
    options: HashMap<String, &'a str>,
    flags: Vec<String>,
}

impl<'a> ParsedArgs<'a> {
    pub fn parse(args: &[&'a str]) -> Self {
        let mut parsed = ParsedArgs::default();
        for arg in args {
            if let Some(flag) = arg.strip_prefix("--") {
                parsed.flags.push(flag.to_ascii_lowercase());
            } else if let Some((key, value)) = arg.split_once('=') {
                parsed.options.insert(key.trim().to_ascii_lowercase(), value);
            } else {
                parsed.positional.push(arg);
            }
        }
        parsed
    }

    pub fn option(&self, key: &str) -> Option<&'a str> {
        self.options.get(key).copied()
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.iter().any(|flag| flag == name)
    }

    /// Rejects options outside `allowed`.
    pub fn ensure_known(&self, allowed: &[&str]) -> CommandResult {
        match self.options.keys().find(|key| !allowed.contains(&key.as_str())) {
            Some(key) => Err(CommandError::InvalidArguments(format!(
                "unknown option `{}` (expected one of: {})",
                key,
                allowed.join(", ")
            ))),
            None => Ok(()),
        }
    }
}

pub(crate) fn parse_period(input: &str, current: YearMonth) -> Result<YearMonth, CommandError> {
    match input.trim().to_ascii_lowercase().as_str() {
        "next" => Ok(current.next()),
        "prev" | "previous" => Ok(current.offset(-1)),
        "now" | "today" => Ok(YearMonth::from_date(Local::now().date_naive())),
        other => other.parse().map_err(|_| {
            CommandError::InvalidArguments(format!(
                "invalid period `{}` (use YYYY-MM, next or prev)",
                input
            ))
        }),
    }
}

pub(crate) fn short_id(id: uuid::Uuid) -> String {
    let mut short = id.simple().to_string();
    short.truncate(8);
    short
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

#[cfg(test)]
pub(crate) fn process_script(home: &Path, lines: &[&str]) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_home(CliMode::Script, home)?;
    for line in lines {
        match app.process_line(line)? {
            LoopControl::Continue => {}
            LoopControl::Exit => break,
        }
    }
    Ok(app)
}
