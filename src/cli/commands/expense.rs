use chrono::Local;
use duo_core::{money, ExpenseDraft, ExpenseService};
use duo_domain::{Expense, SplitPolicy};
use uuid::Uuid;

use crate::cli::core::{short_id, CommandError, CommandResult, ParsedArgs, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;

const ADD_OPTIONS: &[&str] = &["count", "paid", "split", "product", "category"];
const EDIT_OPTIONS: &[&str] = &[
    "date",
    "establishment",
    "product",
    "amount",
    "count",
    "paid",
    "payer",
    "split",
    "category",
];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "add",
            "Record a purchase (prompts when no arguments are given)",
            "add [<date> <establishment> <amount> <payer> [count=N] [paid=N] [split=even|a|b] [product=..] [category=..] [--force]]",
            cmd_add,
        ),
        CommandEntry::new(
            "edit",
            "Change a recorded purchase",
            "edit <id> [date=..] [establishment=..] [amount=..] [count=N] [paid=N] [payer=..] [split=..] [product=..] [category=..] [--force]",
            cmd_edit,
        ),
        CommandEntry::new(
            "delete",
            "Remove a purchase from every view (kept in storage)",
            "delete <id>",
            cmd_delete,
        ),
        CommandEntry::new(
            "list",
            "List recorded purchases",
            "list [--all]",
            cmd_list,
        ),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args);
    parsed.ensure_known(ADD_OPTIONS)?;

    let draft = if parsed.positional.is_empty() && context.can_prompt() {
        let initial = ExpenseDraft {
            purchase_date: Local::now().date_naive().format("%Y-%m-%d").to_string(),
            installment_count: "1".into(),
            installments_paid: "0".into(),
            ..ExpenseDraft::default()
        };
        prompt_draft(context, initial)?
    } else {
        draft_from_args(&parsed)?
    };

    let candidate = draft.normalize()?;
    if !accept_possible_duplicate(context, &candidate, None, parsed.has_flag("force"))? {
        return Ok(());
    }
    let id = ExpenseService::create(&mut context.records, &draft)?;
    context.persist_records()?;
    io::print_success(format!(
        "Expense {} added: {} {} in {} installment(s).",
        short_id(id),
        candidate.establishment,
        money(candidate.total_amount),
        candidate.installment_count
    ));
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args);
    parsed.ensure_known(EDIT_OPTIONS)?;
    let reference = parsed
        .positional
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("usage: edit <id> [field=value ...]".into()))?;
    let id = ExpenseService::resolve_id(&context.records, reference)?;
    let current = ExpenseService::find(&context.records, id)?;
    let mut draft = ExpenseDraft::from_expense(current);

    let has_changes = EDIT_OPTIONS.iter().any(|key| parsed.option(key).is_some());
    if has_changes {
        apply_edit_options(&mut draft, &parsed)?;
    } else if context.can_prompt() {
        draft = prompt_draft(context, draft)?;
    } else {
        return Err(CommandError::InvalidArguments(
            "nothing to change; pass field=value pairs".into(),
        ));
    }

    let candidate = draft.normalize()?;
    if !accept_possible_duplicate(context, &candidate, Some(id), parsed.has_flag("force"))? {
        return Ok(());
    }
    ExpenseService::update(&mut context.records, id, &draft)?;
    context.persist_records()?;
    io::print_success(format!("Expense {} updated.", short_id(id)));
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let reference = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("usage: delete <id>".into()))?;
    let id = ExpenseService::resolve_id(&context.records, reference)?;
    let summary = describe(ExpenseService::find(&context.records, id)?);
    if !context.confirm(&format!("Delete {}?", summary), true)? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    ExpenseService::soft_delete(&mut context.records, id)?;
    context.persist_records()?;
    io::print_success(format!("Expense {} deleted.", short_id(id)));
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args);
    let include_deleted = parsed.has_flag("all");
    let rows: Vec<Vec<String>> = context
        .records
        .iter()
        .filter(|expense| include_deleted || !expense.deleted)
        .map(|expense| {
            vec![
                short_id(expense.id),
                expense.purchase_date.clone(),
                expense.establishment.clone(),
                expense.product.clone(),
                money(expense.total_amount),
                format!("{}/{}", expense.installments_paid, expense.installment_count),
                expense.payer.clone(),
                split_label(context, expense.split_policy),
                if expense.deleted { "deleted" } else { "" }.to_string(),
            ]
        })
        .collect();

    if rows.is_empty() {
        io::print_info("No expenses recorded.");
        return Ok(());
    }
    output::section(format!("Expenses ({})", rows.len()));
    output::table(
        &[
            "Id",
            "Date",
            "Establishment",
            "Product",
            "Total",
            "Paid",
            "Payer",
            "Split",
            "",
        ],
        &rows,
        &[4, 5],
    );
    Ok(())
}

/// True when the entry should be saved. Scripts need `--force` to keep a probable duplicate.
fn accept_possible_duplicate(
    context: &ShellContext,
    candidate: &Expense,
    editing: Option<Uuid>,
    force: bool,
) -> Result<bool, CommandError> {
    if !context.config.confirm_duplicates || force {
        return Ok(true);
    }
    let Some(existing) = ExpenseService::find_duplicate(&context.records, candidate, editing)
    else {
        return Ok(true);
    };
    io::print_warning(format!(
        "This looks like a duplicate of {} ({}).",
        short_id(existing.id),
        describe(existing)
    ));
    let proceed = if context.can_prompt() {
        context.confirm("Save it anyway?", false)?
    } else {
        io::print_hint("Add --force to save it anyway.");
        false
    };
    if !proceed {
        io::print_info("Expense not saved.");
    }
    Ok(proceed)
}

fn draft_from_args(parsed: &ParsedArgs<'_>) -> Result<ExpenseDraft, CommandError> {
    let [date, establishment, amount, payer] = parsed.positional[..] else {
        return Err(CommandError::InvalidArguments(
            "usage: add <date> <establishment> <amount> <payer> [count=N] [paid=N] [split=even|a|b]"
                .into(),
        ));
    };
    let mut draft = ExpenseDraft {
        purchase_date: date.to_string(),
        establishment: establishment.to_string(),
        total_amount: amount.to_string(),
        payer: payer.to_string(),
        ..ExpenseDraft::default()
    };
    apply_edit_options(&mut draft, parsed)?;
    Ok(draft)
}

fn apply_edit_options(draft: &mut ExpenseDraft, parsed: &ParsedArgs<'_>) -> CommandResult {
    for key in EDIT_OPTIONS {
        let Some(value) = parsed.option(key) else {
            continue;
        };
        let value = value.to_string();
        match *key {
            "date" => draft.purchase_date = value,
            "establishment" => draft.establishment = value,
            "product" => draft.product = value,
            "amount" => draft.total_amount = value,
            "count" => draft.installment_count = value,
            "paid" => draft.installments_paid = value,
            "payer" => draft.payer = value,
            "category" => draft.category = value,
            "split" => draft.split_policy = parse_split(&value)?,
            _ => {}
        }
    }
    Ok(())
}

pub(crate) fn parse_split(value: &str) -> Result<SplitPolicy, CommandError> {
    SplitPolicy::parse_label(value).ok_or_else(|| {
        CommandError::InvalidArguments(format!(
            "unknown split `{}` (use even, a or b)",
            value
        ))
    })
}

fn prompt_draft(context: &ShellContext, initial: ExpenseDraft) -> Result<ExpenseDraft, CommandError> {
    let theme = &context.theme;
    let text = |prompt: &str, value: &str| {
        io::prompt_text(theme, prompt, (!value.is_empty()).then_some(value))
    };

    let purchase_date = text("Purchase date (YYYY-MM-DD)", &initial.purchase_date)?;
    let establishment = text("Establishment", &initial.establishment)?;
    let product = text("Product", &initial.product)?;
    let total_amount = text("Total amount", &initial.total_amount)?;
    let installment_count = text("Installments", &initial.installment_count)?;
    let installments_paid = text("Installments already paid", &initial.installments_paid)?;
    let payer = text("Paid by", &initial.payer)?;

    let splits = [
        SplitPolicy::EvenSplit,
        SplitPolicy::PartyAFull,
        SplitPolicy::PartyBFull,
    ];
    let labels: Vec<String> = splits
        .iter()
        .map(|split| split_label(context, *split))
        .collect();
    let current = splits
        .iter()
        .position(|split| *split == initial.split_policy)
        .unwrap_or(0);
    let split_policy = splits[io::select_index(theme, "Split", &labels, current)?];
    let category = text("Category", &initial.category)?;

    Ok(ExpenseDraft {
        purchase_date,
        establishment,
        product,
        installment_count,
        installments_paid,
        total_amount,
        payer,
        split_policy,
        category,
    })
}

pub(crate) fn split_label(context: &ShellContext, split: SplitPolicy) -> String {
    match split {
        SplitPolicy::EvenSplit => "even".to_string(),
        SplitPolicy::PartyAFull => context.config.party_a.clone(),
        SplitPolicy::PartyBFull => context.config.party_b.clone(),
    }
}

fn describe(expense: &Expense) -> String {
    format!(
        "{} {} {}",
        expense.purchase_date,
        expense.establishment,
        money(expense.total_amount)
    )
}
