pub mod build_info;

use std::{env, path::PathBuf, sync::Once};

use duo_config::Config;

/// Overrides the application home (config, data and backups).
pub const HOME_ENV: &str = "DUO_LEDGER_HOME";

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber; `RUST_LOG` adds further directives.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "duo_ledger=info".parse::<Directive>() {
            filter = filter.add_directive(directive);
        }

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}

/// `$DUO_LEDGER_HOME` when set and non-empty, otherwise `~/.duo_ledger`.
pub fn app_home() -> PathBuf {
    match env::var_os(HOME_ENV) {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => Config::default_app_home(),
    }
}
