use std::path::PathBuf;

use duo_domain::{MonthLocale, ScheduleAnchor};

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;

use super::period::parse_switch;

const SET_USAGE: &str = "usage: config set <party_a|party_b|anchor|paid_offset|locale|color|confirm_duplicates|data_root> <value>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and manage preferences",
        "config [show|set <key> <value>|backup [note]|backups|restore <name>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(action) = args.first() else {
        return show_config(context);
    };

    match action.to_ascii_lowercase().as_str() {
        "show" => show_config(context),
        "set" => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(SET_USAGE.into()));
            }
            let value = args[2..].join(" ");
            set_config_value(context, args[1], value.trim())
        }
        "backup" => {
            let note = (args.len() > 1).then(|| args[1..].join(" "));
            let name = context
                .config_manager
                .backup(&context.config, note.as_deref())?;
            io::print_success(format!("Configuration backed up as {}.", name));
            Ok(())
        }
        "backups" => {
            let names = context.config_manager.list_backups()?;
            if names.is_empty() {
                io::print_info("No configuration backups yet.");
                return Ok(());
            }
            output::section("Configuration backups");
            for (idx, name) in names.iter().enumerate() {
                io::print_info(format!("  {:>2}. {}", idx + 1, name));
            }
            Ok(())
        }
        "restore" => {
            let name = args.get(1).ok_or_else(|| {
                CommandError::InvalidArguments("usage: config restore <name>".into())
            })?;
            let restored = context.config_manager.restore(name)?;
            context.config = restored;
            context.persist_config()?;
            io::print_success(format!("Configuration restored from {}.", name));
            io::print_hint("The session projection is unchanged; use `policy default` to apply it.");
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{}` (use show, set, backup, backups or restore)",
            other
        ))),
    }
}

fn show_config(context: &ShellContext) -> CommandResult {
    let config = &context.config;
    output::section("Configuration");
    io::print_info(format!("  party_a            : {}", config.party_a));
    io::print_info(format!("  party_b            : {}", config.party_b));
    io::print_info(format!("  projection         : {}", config.projection));
    io::print_info(format!("  locale             : {}", config.month_locale));
    io::print_info(format!("  color              : {}", on_off(config.ui_color_enabled)));
    io::print_info(format!(
        "  confirm_duplicates : {}",
        on_off(config.confirm_duplicates)
    ));
    io::print_info(format!(
        "  data_root          : {}",
        config
            .data_root
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "(default)".into())
    ));
    io::print_info(format!(
        "  file               : {}",
        context.config_manager.config_path().display()
    ));
    Ok(())
}

fn set_config_value(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let config = &mut context.config;
    match key.to_ascii_lowercase().as_str() {
        "party_a" | "party-a" => config.party_a = non_empty(value)?,
        "party_b" | "party-b" => config.party_b = non_empty(value)?,
        "anchor" | "policy" => {
            config.projection.anchor = match value.to_ascii_lowercase().as_str() {
                "a" | "purchase" | "purchase-month" => ScheduleAnchor::PurchaseMonth,
                "b" | "following" | "following-month" => ScheduleAnchor::FollowingMonth,
                other => {
                    return Err(CommandError::InvalidArguments(format!(
                        "unknown anchor `{}` (use a or b)",
                        other
                    )))
                }
            }
        }
        "paid_offset" | "offset" => config.projection.apply_paid_offset = parse_switch(value)?,
        "locale" => {
            config.month_locale = MonthLocale::parse_label(value).ok_or_else(|| {
                CommandError::InvalidArguments(format!(
                    "unknown locale `{}` (use en or pt)",
                    value
                ))
            })?
        }
        "color" | "colour" => config.ui_color_enabled = parse_switch(value)?,
        "confirm_duplicates" => config.confirm_duplicates = parse_switch(value)?,
        "data_root" => {
            config.data_root = match value {
                "" | "default" | "none" => None,
                path => Some(PathBuf::from(path)),
            };
            io::print_hint("The new data location is used from the next session.");
        }
        _ => return Err(CommandError::InvalidArguments(SET_USAGE.into())),
    }
    context.persist_config()?;
    io::print_success(format!("Set {}.", key));
    Ok(())
}

fn non_empty(value: &str) -> Result<String, CommandError> {
    if value.is_empty() {
        return Err(CommandError::InvalidArguments("value must not be empty".into()));
    }
    Ok(value.to_string())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}
