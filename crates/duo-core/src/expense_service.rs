use duo_domain::{Expense, SplitPolicy};
use uuid::Uuid;

use crate::{
    input::{parse_amount, parse_count},
    CoreError,
};

pub const DEFAULT_CATEGORY: &str = "General";
const DUPLICATE_AMOUNT_TOLERANCE: f64 = 0.01;

/// Raw form input for a new or edited expense.
#[derive(Debug, Clone, Default)]
pub struct ExpenseDraft {
    pub purchase_date: String,
    pub establishment: String,
    pub product: String,
    pub installment_count: String,
    pub installments_paid: String,
    pub total_amount: String,
    pub payer: String,
    pub split_policy: SplitPolicy,
    pub category: String,
}

impl ExpenseDraft {
    /// Validates the form and builds a record body with a fresh id.
    pub fn normalize(&self) -> Result<Expense, CoreError> {
        let establishment = required(&self.establishment, "establishment")?;
        let payer = required(&self.payer, "payer")?;
        let amount_text = required(&self.total_amount, "total amount")?;
        let total_amount = parse_amount(&amount_text)?;

        let installment_count = parse_count(&self.installment_count, 1);
        if installment_count < 1 || installment_count > i32::MAX as i64 {
            return Err(CoreError::Validation(format!(
                "installment count must be at least 1, got {}",
                installment_count
            )));
        }
        let installments_paid = parse_count(&self.installments_paid, 0);
        if installments_paid < 0 || installments_paid > installment_count {
            return Err(CoreError::Validation(format!(
                "installments paid must be between 0 and {}",
                installment_count
            )));
        }

        let mut expense = Expense::new(
            self.purchase_date.trim(),
            establishment,
            total_amount,
            installment_count as i32,
            payer,
            self.split_policy,
        )
        .with_product(self.product.trim())
        .with_installments_paid(installments_paid as u32);
        if expense.purchase_period().is_none() {
            return Err(CoreError::Validation(format!(
                "purchase date `{}` is not YYYY-MM-DD, YYYY-MM or DD/MM/YYYY",
                self.purchase_date.trim()
            )));
        }
        let category = self.category.trim();
        expense.category = Some(if category.is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            category.to_string()
        });
        Ok(expense)
    }

    /// Pre-fills a draft from a stored record, for editing.
    pub fn from_expense(expense: &Expense) -> Self {
        Self {
            purchase_date: expense.purchase_date.clone(),
            establishment: expense.establishment.clone(),
            product: expense.product.clone(),
            installment_count: expense.installment_count.to_string(),
            installments_paid: expense.installments_paid.to_string(),
            total_amount: format!("{:.2}", expense.total_amount).replace('.', ","),
            payer: expense.payer.clone(),
            split_policy: expense.split_policy,
            category: expense.category.clone().unwrap_or_default(),
        }
    }
}

pub struct ExpenseService;

impl ExpenseService {
    pub fn create(records: &mut Vec<Expense>, draft: &ExpenseDraft) -> Result<Uuid, CoreError> {
        let expense = draft.normalize()?;
        let id = expense.id;
        tracing::info!(%id, establishment = %expense.establishment, "expense created");
        records.push(expense);
        Ok(id)
    }

    /// Replaces the stored fields of `id` in place; the id itself is kept.
    pub fn update(records: &mut [Expense], id: Uuid, draft: &ExpenseDraft) -> Result<(), CoreError> {
        let slot = find_live_mut(records, id)?;
        let mut expense = draft.normalize()?;
        expense.id = id;
        *slot = expense;
        tracing::info!(%id, "expense updated");
        Ok(())
    }

    /// Marks the record deleted. It stays in storage and in the whole-record export.
    pub fn soft_delete(records: &mut [Expense], id: Uuid) -> Result<(), CoreError> {
        find_live_mut(records, id)?.deleted = true;
        tracing::info!(%id, "expense deleted");
        Ok(())
    }

    pub fn find(records: &[Expense], id: Uuid) -> Result<&Expense, CoreError> {
        records
            .iter()
            .find(|expense| expense.id == id && !expense.deleted)
            .ok_or(CoreError::ExpenseNotFound(id))
    }

    /// Resolves a full id or a unique id prefix (as shown in listings).
    pub fn resolve_id(records: &[Expense], text: &str) -> Result<Uuid, CoreError> {
        let needle = text.trim().to_ascii_lowercase();
        if let Ok(id) = Uuid::parse_str(&needle) {
            return Self::find(records, id).map(|expense| expense.id);
        }
        let mut matches = records
            .iter()
            .filter(|expense| !expense.deleted)
            .filter(|expense| !needle.is_empty() && expense.id.to_string().starts_with(&needle));
        match (matches.next(), matches.next()) {
            (Some(expense), None) => Ok(expense.id),
            (Some(_), Some(_)) => Err(CoreError::Validation(format!(
                "id prefix `{}` is ambiguous",
                needle
            ))),
            _ => Err(CoreError::Validation(format!("no expense matches `{}`", needle))),
        }
    }

    /// Advisory check for a probable re-entry of an existing purchase.
    pub fn find_duplicate<'a>(
        existing: &'a [Expense],
        candidate: &Expense,
        editing_id: Option<Uuid>,
    ) -> Option<&'a Expense> {
        existing.iter().find(|expense| {
            !expense.deleted
                && Some(expense.id) != editing_id
                && same_text(&expense.establishment, &candidate.establishment)
                && same_text(&expense.payer, &candidate.payer)
                && same_text(&expense.product, &candidate.product)
                && (expense.total_amount - candidate.total_amount).abs()
                    < DUPLICATE_AMOUNT_TOLERANCE
                && expense.purchase_date == candidate.purchase_date
        })
    }
}

fn find_live_mut(records: &mut [Expense], id: Uuid) -> Result<&mut Expense, CoreError> {
    records
        .iter_mut()
        .find(|expense| expense.id == id && !expense.deleted)
        .ok_or(CoreError::ExpenseNotFound(id))
}

fn required(value: &str, field: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn same_text(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}
