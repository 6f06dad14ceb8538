use std::path::PathBuf;

use duo_domain::{MonthLocale, ProjectionPolicy};
use serde::{Deserialize, Serialize};

/// User preferences for the shell and exports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "Config::default_party_a")]
    pub party_a: String,
    #[serde(default = "Config::default_party_b")]
    pub party_b: String,
    /// Projection used when a session starts; switchable per session.
    #[serde(default)]
    pub projection: ProjectionPolicy,
    #[serde(default)]
    pub month_locale: MonthLocale,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    /// Ask before saving an entry that looks like a duplicate.
    #[serde(default = "Config::default_confirm_duplicates")]
    pub confirm_duplicates: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for expense data. Defaults to the application home.
    pub data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            party_a: Self::default_party_a(),
            party_b: Self::default_party_b(),
            projection: ProjectionPolicy::default(),
            month_locale: MonthLocale::default(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            confirm_duplicates: Self::default_confirm_duplicates(),
            data_root: None,
        }
    }
}

impl Config {
    pub fn default_party_a() -> String {
        "Party A".into()
    }

    pub fn default_party_b() -> String {
        "Party B".into()
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_confirm_duplicates() -> bool {
        true
    }

    pub fn resolve_data_root(&self, app_home: &std::path::Path) -> PathBuf {
        match &self.data_root {
            Some(path) => path.clone(),
            None => app_home.to_path_buf(),
        }
    }

    /// `$HOME/.duo_ledger`, or the working directory when no home is known.
    pub fn default_app_home() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".duo_ledger")
    }
}
