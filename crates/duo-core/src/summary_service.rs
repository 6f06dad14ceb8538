use duo_domain::{Expense, ProjectionPolicy, YearMonth};
use serde::Serialize;

use crate::projection::ProjectionService;

const TOP_ESTABLISHMENTS: usize = 5;

/// Establishment ranked by the installment value it bills in a period.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EstablishmentTotal {
    pub name: String,
    pub value: f64,
}

/// Aggregates for one target month.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct PeriodStats {
    pub period: Option<YearMonth>,
    /// Full price of records purchased in the period, counted once.
    pub purchased_this_month_total: f64,
    /// Installment value due in the period.
    pub current_bill_total: f64,
    pub party_a_total: f64,
    pub party_b_total: f64,
    pub party_a_percent: u32,
    pub party_b_percent: u32,
    /// Installment value due in months strictly after the period.
    pub future_commitments_total: f64,
    pub biggest_expense_this_month: Option<Expense>,
    pub top_establishments: Vec<EstablishmentTotal>,
}

pub struct SummaryService;

impl SummaryService {
    pub fn aggregate(records: &[Expense], period: YearMonth, policy: ProjectionPolicy) -> PeriodStats {
        let mut stats = PeriodStats {
            period: Some(period),
            ..PeriodStats::default()
        };
        let mut establishments: Vec<EstablishmentTotal> = Vec::new();

        for expense in records.iter().filter(|expense| expense.is_active()) {
            if expense.purchased_in(period) {
                stats.purchased_this_month_total += expense.total_amount;
                let bigger = stats
                    .biggest_expense_this_month
                    .as_ref()
                    .map_or(true, |current| expense.total_amount > current.total_amount);
                if bigger {
                    stats.biggest_expense_this_month = Some(expense.clone());
                }
            }

            let mut billed = None;
            for occurrence in ProjectionService::project(expense, period, policy)
                .iter()
                .filter(|o| o.is_installment())
            {
                *billed.get_or_insert(0.0) += occurrence.value;
                stats.current_bill_total += occurrence.value;
                stats.party_a_total += occurrence.party_a;
                stats.party_b_total += occurrence.party_b;
            }
            let remaining = ProjectionService::installments_after(expense, period, policy);
            stats.future_commitments_total += remaining as f64 * expense.installment_value();

            if let Some(value) = billed {
                add_establishment(&mut establishments, &expense.establishment, value);
            }
            tracing::debug!(
                expense = %expense.id,
                establishment = %expense.establishment,
                %period,
                active = billed.is_some(),
                "aggregated expense"
            );
        }

        let denominator = match stats.party_a_total + stats.party_b_total {
            total if total == 0.0 => 1.0,
            total => total,
        };
        stats.party_a_percent = percent(stats.party_a_total, denominator);
        stats.party_b_percent = percent(stats.party_b_total, denominator);

        // Stable sort keeps first-encountered order among equal totals.
        establishments.sort_by(|a, b| b.value.total_cmp(&a.value));
        establishments.truncate(TOP_ESTABLISHMENTS);
        stats.top_establishments = establishments;

        tracing::debug!(
            %period,
            current_bill = stats.current_bill_total,
            future = stats.future_commitments_total,
            "period aggregated"
        );
        stats
    }
}

fn add_establishment(totals: &mut Vec<EstablishmentTotal>, name: &str, value: f64) {
    match totals.iter_mut().find(|entry| entry.name == name) {
        Some(entry) => entry.value += value,
        None => totals.push(EstablishmentTotal {
            name: name.to_string(),
            value,
        }),
    }
}

fn percent(part: f64, denominator: f64) -> u32 {
    ((part / denominator) * 100.0).round().max(0.0) as u32
}
