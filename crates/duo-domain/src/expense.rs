use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::period::YearMonth;

/// Rule deciding how each installment divides between the two tracked parties,
/// independent of who physically paid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    #[default]
    EvenSplit,
    PartyAFull,
    PartyBFull,
}

impl SplitPolicy {
    /// Splits `value` into `(party_a, party_b)` shares.
    pub fn apportion(&self, value: f64) -> (f64, f64) {
        match self {
            SplitPolicy::EvenSplit => (value / 2.0, value / 2.0),
            SplitPolicy::PartyAFull => (value, 0.0),
            SplitPolicy::PartyBFull => (0.0, value),
        }
    }

    pub fn parse_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "even" | "even_split" | "split" => Some(SplitPolicy::EvenSplit),
            "a" | "party_a" | "party_a_full" => Some(SplitPolicy::PartyAFull),
            "b" | "party_b" | "party_b_full" => Some(SplitPolicy::PartyBFull),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SplitPolicy::EvenSplit => "even_split",
            SplitPolicy::PartyAFull => "party_a_full",
            SplitPolicy::PartyBFull => "party_b_full",
        }
    }
}

impl fmt::Display for SplitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged purchase, possibly paid in monthly installments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: Uuid,
    /// Raw date text as captured at entry (`YYYY-MM-DD`, `YYYY-MM` or `DD/MM/YYYY`).
    pub purchase_date: String,
    pub establishment: String,
    #[serde(default)]
    pub product: String,
    #[serde(default = "Expense::default_installment_count")]
    pub installment_count: i32,
    #[serde(default)]
    pub installments_paid: u32,
    pub total_amount: f64,
    pub payer: String,
    #[serde(default)]
    pub split_policy: SplitPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

impl Expense {
    pub fn new(
        purchase_date: impl Into<String>,
        establishment: impl Into<String>,
        total_amount: f64,
        installment_count: i32,
        payer: impl Into<String>,
        split_policy: SplitPolicy,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            purchase_date: purchase_date.into(),
            establishment: establishment.into(),
            product: String::new(),
            installment_count,
            installments_paid: 0,
            total_amount,
            payer: payer.into(),
            split_policy,
            category: None,
            deleted: false,
        }
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    pub fn with_installments_paid(mut self, paid: u32) -> Self {
        self.installments_paid = paid;
        self
    }

    pub fn default_installment_count() -> i32 {
        1
    }

    /// Calendar month of the purchase, if the stored date text parses.
    pub fn purchase_period(&self) -> Option<YearMonth> {
        parse_purchase_date(&self.purchase_date).map(|(period, _)| period)
    }

    /// Full purchase date; falls back to the first of the month when the day is
    /// missing or out of range.
    pub fn purchase_day(&self) -> Option<NaiveDate> {
        let (period, day) = parse_purchase_date(&self.purchase_date)?;
        day.and_then(|d| NaiveDate::from_ymd_opt(period.year, period.month, d))
            .or_else(|| period.first_day())
    }

    pub fn is_valid(&self) -> bool {
        !self.establishment.trim().is_empty()
            && self.total_amount.is_finite()
            && self.total_amount >= 0.0
            && self.installment_count >= 1
            && self.purchase_period().is_some()
    }

    /// Valid and not soft-deleted.
    pub fn is_active(&self) -> bool {
        !self.deleted && self.is_valid()
    }

    /// `total_amount / installment_count`, treating a non-positive count as 1.
    pub fn installment_value(&self) -> f64 {
        self.total_amount / self.installment_count.max(1) as f64
    }

    pub fn purchased_in(&self, period: YearMonth) -> bool {
        self.purchase_period() == Some(period)
    }
}

/// Parses the accepted purchase date grammars into a period and optional day.
fn parse_purchase_date(raw: &str) -> Option<(YearMonth, Option<u32>)> {
    let raw = raw.trim();
    if raw.contains('/') {
        let parts: Vec<&str> = raw.split('/').collect();
        if parts.len() != 3 {
            return None;
        }
        let day: u32 = parts[0].parse().ok()?;
        let month: u32 = parts[1].parse().ok()?;
        let year: i32 = parts[2].parse().ok()?;
        return YearMonth::new(year, month).map(|period| (period, Some(day)));
    }
    let mut parts = raw.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let day = match parts.next() {
        Some(text) => Some(text.parse::<u32>().ok()?),
        None => None,
    };
    YearMonth::new(year, month).map(|period| (period, day))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Expense {
        Expense::new(
            "2025-02-07",
            "Store X",
            1000.0,
            10,
            "alex",
            SplitPolicy::EvenSplit,
        )
    }

    #[test]
    fn split_labels_accept_short_and_stored_forms() {
        assert_eq!(SplitPolicy::parse_label(" Even "), Some(SplitPolicy::EvenSplit));
        assert_eq!(SplitPolicy::parse_label("a"), Some(SplitPolicy::PartyAFull));
        assert_eq!(
            SplitPolicy::parse_label(SplitPolicy::PartyBFull.as_str()),
            Some(SplitPolicy::PartyBFull)
        );
        assert_eq!(SplitPolicy::parse_label("half"), None);
    }

    #[test]
    fn purchase_date_grammars() {
        let mut expense = sample();
        assert_eq!(expense.purchase_period(), YearMonth::new(2025, 2));

        expense.purchase_date = "07/03/2025".into();
        assert_eq!(expense.purchase_period(), YearMonth::new(2025, 3));
        assert_eq!(
            expense.purchase_day(),
            NaiveDate::from_ymd_opt(2025, 3, 7)
        );

        expense.purchase_date = "2025-04".into();
        assert_eq!(expense.purchase_day(), NaiveDate::from_ymd_opt(2025, 4, 1));

        expense.purchase_date = "not a date".into();
        assert!(expense.purchase_period().is_none());
        assert!(!expense.is_valid());
    }

    #[test]
    fn validity_rules() {
        assert!(sample().is_valid());

        let mut blank = sample();
        blank.establishment = "   ".into();
        assert!(!blank.is_valid());

        let mut negative = sample();
        negative.total_amount = -1.0;
        assert!(!negative.is_valid());

        let mut zero_count = sample();
        zero_count.installment_count = 0;
        assert!(!zero_count.is_valid());
        assert_eq!(zero_count.installment_value(), 1000.0);

        let mut deleted = sample();
        deleted.deleted = true;
        assert!(deleted.is_valid());
        assert!(!deleted.is_active());
    }

    #[test]
    fn split_policy_apportions_value() {
        assert_eq!(SplitPolicy::EvenSplit.apportion(100.0), (50.0, 50.0));
        assert_eq!(SplitPolicy::PartyAFull.apportion(100.0), (100.0, 0.0));
        assert_eq!(SplitPolicy::PartyBFull.apportion(100.0), (0.0, 100.0));
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{
            "id": "6f1c1f4e-8a43-4d4c-9d0e-2f5c0c1f9a11",
            "purchase_date": "2025-11-15",
            "establishment": "Market",
            "total_amount": 1200.0,
            "payer": "sam"
        }"#;
        let expense: Expense = serde_json::from_str(json).expect("deserialize expense");
        assert_eq!(expense.installment_count, 1);
        assert_eq!(expense.installments_paid, 0);
        assert_eq!(expense.split_policy, SplitPolicy::EvenSplit);
        assert!(!expense.deleted);
        assert!(expense.product.is_empty());
    }
}
