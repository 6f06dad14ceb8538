//! Expands expense records into dated installment occurrences.

use duo_domain::{Expense, ProjectionPolicy, YearMonth};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceKind {
    /// Zero-valued marker in the purchase month (following-month anchor only).
    Launch,
    Installment,
}

/// One (expense, month) pairing. Regenerated on every call, never persisted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Occurrence {
    pub expense_id: Uuid,
    pub period: YearMonth,
    pub kind: OccurrenceKind,
    /// 1-based installment number; 0 for the launch marker.
    pub installment_index: u32,
    pub installment_count: u32,
    pub value: f64,
    pub party_a: f64,
    pub party_b: f64,
}

impl Occurrence {
    pub fn is_installment(&self) -> bool {
        self.kind == OccurrenceKind::Installment
    }
}

pub struct ProjectionService;

impl ProjectionService {
    /// Complete schedule for one record in month order; a launch marker sorts ahead
    /// of the installment sharing its month. Deleted or invalid records produce nothing.
    pub fn schedule(expense: &Expense, policy: ProjectionPolicy) -> Vec<Occurrence> {
        let Some(purchase) = usable_purchase_period(expense) else {
            return Vec::new();
        };
        let count = expense.installment_count as i64;
        let first = purchase.offset(policy.anchor.lead_months() - paid_shift(expense, policy));

        let mut occurrences = Vec::with_capacity(count as usize + 1);
        if policy.anchor.emits_launch_marker() {
            occurrences.push(launch(expense, purchase));
        }
        occurrences.extend((0..count).map(|slot| installment(expense, first.offset(slot), slot)));
        occurrences.sort_by_key(|occurrence| occurrence.period);
        occurrences
    }

    /// Occurrences of one record that fall in `period`.
    pub fn project(expense: &Expense, period: YearMonth, policy: ProjectionPolicy) -> Vec<Occurrence> {
        let Some(purchase) = usable_purchase_period(expense) else {
            return Vec::new();
        };
        let months_since_start = period.months_since(purchase);
        let slot = slot_in(expense, purchase, period, policy);

        let mut occurrences = Vec::new();
        if policy.anchor.emits_launch_marker() && months_since_start == 0 {
            occurrences.push(launch(expense, purchase));
        }
        if (0..expense.installment_count as i64).contains(&slot) {
            occurrences.push(installment(expense, period, slot));
        }
        tracing::trace!(
            expense = %expense.id,
            %period,
            months_since_start,
            slot,
            active = occurrences.iter().any(Occurrence::is_installment),
            "projected expense"
        );
        occurrences
    }

    /// Installments of one record billed strictly after `period`, counted
    /// without walking the schedule.
    pub fn installments_after(expense: &Expense, period: YearMonth, policy: ProjectionPolicy) -> u64 {
        let Some(purchase) = usable_purchase_period(expense) else {
            return 0;
        };
        let count = expense.installment_count as i64;
        let slot = slot_in(expense, purchase, period, policy);
        count.saturating_sub(slot.saturating_add(1)).clamp(0, count) as u64
    }

    pub fn project_all(
        records: &[Expense],
        period: YearMonth,
        policy: ProjectionPolicy,
    ) -> Vec<Occurrence> {
        records
            .iter()
            .flat_map(|expense| Self::project(expense, period, policy))
            .collect()
    }
}

fn usable_purchase_period(expense: &Expense) -> Option<YearMonth> {
    if expense.deleted || !expense.is_valid() {
        return None;
    }
    expense.purchase_period()
}

/// Zero-based installment slot that `period` falls on; outside `0..count` when inactive.
fn slot_in(expense: &Expense, purchase: YearMonth, period: YearMonth, policy: ProjectionPolicy) -> i64 {
    period.months_since(purchase) - policy.anchor.lead_months() + paid_shift(expense, policy)
}

fn paid_shift(expense: &Expense, policy: ProjectionPolicy) -> i64 {
    if policy.apply_paid_offset {
        expense.installments_paid as i64
    } else {
        0
    }
}

fn launch(expense: &Expense, purchase: YearMonth) -> Occurrence {
    Occurrence {
        expense_id: expense.id,
        period: purchase,
        kind: OccurrenceKind::Launch,
        installment_index: 0,
        installment_count: expense.installment_count as u32,
        value: 0.0,
        party_a: 0.0,
        party_b: 0.0,
    }
}

fn installment(expense: &Expense, period: YearMonth, slot: i64) -> Occurrence {
    let value = expense.installment_value();
    let (party_a, party_b) = expense.split_policy.apportion(value);
    Occurrence {
        expense_id: expense.id,
        period,
        kind: OccurrenceKind::Installment,
        installment_index: slot as u32 + 1,
        installment_count: expense.installment_count as u32,
        value,
        party_a,
        party_b,
    }
}
