//! duo-config
//!
//! Persistent user preferences for the expense tracker: party names, the default
//! projection policy, month-label language and output settings.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::Config;
