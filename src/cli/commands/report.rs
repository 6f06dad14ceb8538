use std::{fs, path::Path};

use duo_core::{
    aggregate, list_rows, money, ExportService, OccurrenceKind, ReportService, RowFilters,
};

use crate::cli::core::{short_id, CommandError, CommandResult, ParsedArgs, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;

use super::expense::{parse_split, split_label};

const FILTER_OPTIONS: &[&str] = &["establishment", "payer", "split", "search"];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "summary",
            "Show the bill and split for the current period",
            "summary [--json]",
            cmd_summary,
        ),
        CommandEntry::new(
            "rows",
            "List the installments due in the current period",
            "rows [establishment=..] [payer=..] [split=even|a|b] [search=..]",
            cmd_rows,
        ),
        CommandEntry::new(
            "export",
            "Write the current period's rows to a CSV file",
            "export <path> [establishment=..] [payer=..] [split=..] [search=..]",
            cmd_export,
        ),
        CommandEntry::new(
            "export-records",
            "Write every stored purchase to a CSV file",
            "export-records <path>",
            cmd_export_records,
        ),
        CommandEntry::new(
            "report",
            "Show totals across all purchases",
            "report [--json]",
            cmd_report,
        ),
    ]
}

fn cmd_summary(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let stats = aggregate(&context.records, context.period, context.policy);
    if ParsedArgs::parse(args).has_flag("json") {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    output::section(format!("Summary {} ({})", context.period, context.policy));
    io::print_info(format!(
        "  Purchased this month : {}",
        money(stats.purchased_this_month_total)
    ));
    io::print_info(format!(
        "  Current bill         : {}",
        money(stats.current_bill_total)
    ));
    io::print_info(format!(
        "  {:<21}: {} ({}%)",
        context.config.party_a,
        money(stats.party_a_total),
        stats.party_a_percent
    ));
    io::print_info(format!(
        "  {:<21}: {} ({}%)",
        context.config.party_b,
        money(stats.party_b_total),
        stats.party_b_percent
    ));
    io::print_info(format!(
        "  Future commitments   : {}",
        money(stats.future_commitments_total)
    ));
    match &stats.biggest_expense_this_month {
        Some(expense) => io::print_info(format!(
            "  Biggest purchase     : {} {}",
            expense.establishment,
            money(expense.total_amount)
        )),
        None => io::print_info("  Biggest purchase     : -"),
    }

    if !stats.top_establishments.is_empty() {
        output::section("Top establishments");
        let rows: Vec<Vec<String>> = stats
            .top_establishments
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                vec![
                    format!("{}.", idx + 1),
                    entry.name.clone(),
                    money(entry.value),
                ]
            })
            .collect();
        output::table(&["#", "Establishment", "Billed"], &rows, &[2]);
    }
    Ok(())
}

fn cmd_rows(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filters = row_filters(context, &ParsedArgs::parse(args))?;
    let rows = list_rows(&context.records, context.period, &filters, context.policy);
    if rows.is_empty() {
        io::print_info(format!("Nothing due in {}.", context.period));
        return Ok(());
    }

    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let installment = match row.kind {
                OccurrenceKind::Launch => "launch".to_string(),
                OccurrenceKind::Installment => {
                    format!("{}/{}", row.installment_index, row.installment_count)
                }
            };
            vec![
                short_id(row.expense_id),
                row.purchase_date.clone(),
                row.establishment.clone(),
                row.product.clone(),
                row.payer.clone(),
                split_label(context, row.split_policy),
                installment,
                money(row.monthly_value),
                money(row.party_a_value),
                money(row.party_b_value),
            ]
        })
        .collect();
    output::section(format!("Rows {} ({})", context.period, rows.len()));
    output::table(
        &[
            "Id",
            "Date",
            "Establishment",
            "Product",
            "Payer",
            "Split",
            "Inst",
            "Value",
            context.config.party_a.as_str(),
            context.config.party_b.as_str(),
        ],
        &table,
        &[6, 7, 8, 9],
    );
    Ok(())
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args);
    let path = target_path(&parsed, "export <path>")?;
    let filters = row_filters(context, &parsed)?;
    let rows = list_rows(&context.records, context.period, &filters, context.policy);
    let csv = ExportService::rows_to_csv(&rows, &context.export_options())?;
    write_export(path, &csv)?;
    io::print_success(format!(
        "Exported {} row(s) for {} to {}.",
        rows.len(),
        context.period,
        path.display()
    ));
    Ok(())
}

fn cmd_export_records(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args);
    let path = target_path(&parsed, "export-records <path>")?;
    let csv = ExportService::records_to_csv(&context.records)?;
    write_export(path, &csv)?;
    io::print_success(format!(
        "Exported {} record(s) to {}.",
        context.records.len(),
        path.display()
    ));
    Ok(())
}

fn cmd_report(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let report = ReportService::overview(&context.records);
    if ParsedArgs::parse(args).has_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    output::section("Report");
    io::print_info(format!("  Records : {}", report.record_count));
    io::print_info(format!("  Total   : {}", money(report.total)));
    io::print_info(format!("  Average : {}", money(report.average)));
    if let Some(largest) = &report.largest {
        io::print_info(format!(
            "  Largest : {} {}",
            largest.establishment,
            money(largest.total_amount)
        ));
    }

    if !report.payers.is_empty() {
        output::section("By payer");
        let rows: Vec<Vec<String>> = report
            .payers
            .iter()
            .map(|entry| {
                vec![
                    entry.payer.clone(),
                    money(entry.total),
                    format!("{}%", entry.percent),
                ]
            })
            .collect();
        output::table(&["Payer", "Total", "Share"], &rows, &[1, 2]);
    }

    if !report.top_expenses.is_empty() {
        output::section("Top expenses");
        let rows: Vec<Vec<String>> = report
            .top_expenses
            .iter()
            .map(|expense| {
                vec![
                    expense.purchase_date.clone(),
                    expense.establishment.clone(),
                    expense.product.clone(),
                    money(expense.total_amount),
                ]
            })
            .collect();
        output::table(&["Date", "Establishment", "Product", "Total"], &rows, &[3]);
    }
    Ok(())
}

fn row_filters(context: &ShellContext, parsed: &ParsedArgs<'_>) -> Result<RowFilters, CommandError> {
    parsed.ensure_known(FILTER_OPTIONS)?;
    Ok(RowFilters {
        establishment: parsed.option("establishment").map(str::to_string),
        payer: parsed.option("payer").map(str::to_string),
        split_policy: parsed.option("split").map(parse_split).transpose()?,
        search: parsed.option("search").map(str::to_string),
        locale: context.config.month_locale,
    })
}

fn target_path<'a>(parsed: &ParsedArgs<'a>, usage: &str) -> Result<&'a Path, CommandError> {
    parsed
        .positional
        .first()
        .copied()
        .map(Path::new)
        .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {}", usage)))
}

fn write_export(path: &Path, contents: &str) -> CommandResult {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "export written");
    Ok(())
}
