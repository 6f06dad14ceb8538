use chrono::NaiveDate;
use duo_domain::{Expense, MonthLocale, ProjectionPolicy, SplitPolicy, YearMonth};
use serde::Serialize;
use uuid::Uuid;

use crate::projection::{OccurrenceKind, ProjectionService};

/// Optional listing filters, combined with logical AND. Empty text means "no filter".
#[derive(Debug, Clone, Default)]
pub struct RowFilters {
    /// Case-insensitive substring of the establishment.
    pub establishment: Option<String>,
    /// Case-insensitive exact payer.
    pub payer: Option<String>,
    pub split_policy: Option<SplitPolicy>,
    /// Free text matched against establishment, product, payer and month abbreviation.
    pub search: Option<String>,
    /// Language of the month abbreviation consulted by `search`.
    pub locale: MonthLocale,
}

/// One listing line: an occurrence annotated with its parent record's fields.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Row {
    pub expense_id: Uuid,
    pub purchase_date: String,
    pub establishment: String,
    pub product: String,
    pub payer: String,
    pub split_policy: SplitPolicy,
    pub period: YearMonth,
    pub kind: OccurrenceKind,
    pub installment_index: u32,
    pub installment_count: u32,
    pub total_amount: f64,
    pub monthly_value: f64,
    pub party_a_value: f64,
    pub party_b_value: f64,
    /// Purchase date for launch rows, first day of the month for installments.
    pub sort_date: NaiveDate,
}

impl Row {
    pub fn month_label(&self, locale: MonthLocale) -> &'static str {
        self.period.label(locale)
    }

    pub fn is_last_installment(&self) -> bool {
        self.kind == OccurrenceKind::Installment && self.installment_index == self.installment_count
    }
}

pub struct RowService;

impl RowService {
    pub fn list(
        records: &[Expense],
        period: YearMonth,
        filters: &RowFilters,
        policy: ProjectionPolicy,
    ) -> Vec<Row> {
        let mut rows: Vec<Row> = records
            .iter()
            .flat_map(|expense| {
                ProjectionService::project(expense, period, policy)
                    .into_iter()
                    .filter_map(move |occurrence| {
                        let sort_date = match occurrence.kind {
                            OccurrenceKind::Launch => expense.purchase_day(),
                            OccurrenceKind::Installment => occurrence.period.first_day(),
                        }?;
                        Some(Row {
                            expense_id: expense.id,
                            purchase_date: expense.purchase_date.clone(),
                            establishment: expense.establishment.clone(),
                            product: expense.product.clone(),
                            payer: expense.payer.clone(),
                            split_policy: expense.split_policy,
                            period: occurrence.period,
                            kind: occurrence.kind,
                            installment_index: occurrence.installment_index,
                            installment_count: occurrence.installment_count,
                            total_amount: expense.total_amount,
                            monthly_value: occurrence.value,
                            party_a_value: occurrence.party_a,
                            party_b_value: occurrence.party_b,
                            sort_date,
                        })
                    })
            })
            .filter(|row| filters.matches(row))
            .collect();
        rows.sort_by_key(|row| row.sort_date);
        rows
    }
}

impl RowFilters {
    pub fn matches(&self, row: &Row) -> bool {
        let establishment = row.establishment.to_lowercase();
        if let Some(needle) = active(&self.establishment) {
            if !establishment.contains(&needle) {
                return false;
            }
        }
        if let Some(payer) = active(&self.payer) {
            if row.payer.to_lowercase() != payer {
                return false;
            }
        }
        if let Some(policy) = self.split_policy {
            if row.split_policy != policy {
                return false;
            }
        }
        if let Some(term) = active(&self.search) {
            let haystacks = [
                establishment,
                row.product.to_lowercase(),
                row.payer.to_lowercase(),
                row.month_label(self.locale).to_string(),
            ];
            if !haystacks.iter().any(|text| text.contains(&term)) {
                return false;
            }
        }
        true
    }
}

fn active(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_lowercase)
}
