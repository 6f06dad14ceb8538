use duo_core::{record_warnings, ExpenseStore};

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("save", "Write the expense list to disk", "save", cmd_save),
        CommandEntry::new(
            "backups",
            "List saved snapshots of the expense list",
            "backups",
            cmd_backups,
        ),
        CommandEntry::new(
            "restore",
            "Replace the expense list with a snapshot",
            "restore <backup|index>",
            cmd_restore,
        ),
    ]
}

fn cmd_save(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.persist_records()?;
    io::print_success(format!("Saved {} record(s).", context.records.len()));
    Ok(())
}

fn cmd_backups(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let backups = context.store.list_backups(&context.store_key)?;
    if backups.is_empty() {
        io::print_info("No backups yet.");
        return Ok(());
    }
    output::section("Backups");
    for (idx, backup) in backups.iter().enumerate() {
        io::print_info(format!("  {:>2}. {}", idx + 1, backup.id));
    }
    Ok(())
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let reference = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("usage: restore <backup|index>".into()))?;
    let backups = context.store.list_backups(&context.store_key)?;
    // `backups` numbers entries from 1, newest first.
    let backup_id = match reference.parse::<usize>() {
        Ok(index) => backups
            .get(index.wrapping_sub(1))
            .map(|backup| backup.id.clone())
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!("no backup at position {}", index))
            })?,
        Err(_) => reference.to_string(),
    };

    if !context.confirm(
        &format!("Replace the current {} record(s) with {}?", context.records.len(), backup_id),
        true,
    )? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }

    let records = context.store.restore(&context.store_key, &backup_id)?;
    for warning in record_warnings(&records) {
        io::print_warning(warning);
    }
    context.records = records;
    io::print_success(format!(
        "Restored {} record(s) from {}.",
        context.records.len(),
        backup_id
    ));
    Ok(())
}
