use duo_domain::Expense;
use serde::Serialize;

const TOP_EXPENSES: usize = 5;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PayerTotal {
    pub payer: String,
    pub total: f64,
    /// Share of the ledger total, rounded to a whole percent.
    pub percent: u32,
}

/// Whole-ledger figures, independent of any period.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct LedgerReport {
    pub record_count: usize,
    pub total: f64,
    pub average: f64,
    pub payers: Vec<PayerTotal>,
    pub largest: Option<Expense>,
    pub top_expenses: Vec<Expense>,
}

pub struct ReportService;

impl ReportService {
    pub fn overview(records: &[Expense]) -> LedgerReport {
        let live: Vec<&Expense> = records.iter().filter(|expense| expense.is_active()).collect();
        let total: f64 = live.iter().map(|expense| expense.total_amount).sum();

        let mut payers: Vec<PayerTotal> = Vec::new();
        for expense in &live {
            match payers.iter_mut().find(|entry| entry.payer == expense.payer) {
                Some(entry) => entry.total += expense.total_amount,
                None => payers.push(PayerTotal {
                    payer: expense.payer.clone(),
                    total: expense.total_amount,
                    percent: 0,
                }),
            }
        }
        for entry in &mut payers {
            entry.percent = if total > 0.0 {
                (entry.total / total * 100.0).round() as u32
            } else {
                0
            };
        }
        payers.sort_by(|a, b| b.total.total_cmp(&a.total));

        let mut ranked = live.clone();
        ranked.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount));
        let top_expenses: Vec<Expense> =
            ranked.into_iter().take(TOP_EXPENSES).cloned().collect();

        LedgerReport {
            record_count: live.len(),
            total,
            average: if live.is_empty() {
                0.0
            } else {
                total / live.len() as f64
            },
            payers,
            largest: top_expenses.first().cloned(),
            top_expenses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duo_domain::SplitPolicy;

    #[test]
    fn empty_ledger_reports_zeroes() {
        let report = ReportService::overview(&[]);
        assert_eq!(report.record_count, 0);
        assert_eq!(report.average, 0.0);
        assert!(report.largest.is_none());
    }

    #[test]
    fn invalid_records_do_not_count() {
        let mut no_installments =
            Expense::new("2025-01-02", "Zero", 500.0, 1, "sam", SplitPolicy::EvenSplit);
        no_installments.installment_count = 0;
        let unreadable = Expense::new("someday", "Lost", 700.0, 1, "sam", SplitPolicy::EvenSplit);
        let negative = Expense::new("2025-01-02", "Refund", -40.0, 1, "sam", SplitPolicy::EvenSplit);
        let records = vec![
            no_installments,
            Expense::new("2025-01-03", "Market", 60.0, 1, "alex", SplitPolicy::EvenSplit),
            unreadable,
            negative,
        ];

        let report = ReportService::overview(&records);
        assert_eq!(report.record_count, 1);
        assert_eq!(report.total, 60.0);
        assert_eq!(report.average, 60.0);
        assert_eq!(report.payers.len(), 1);
        assert_eq!(report.payers[0].payer, "alex");
        assert_eq!(report.payers[0].percent, 100);
        assert_eq!(report.top_expenses.len(), 1);
        assert_eq!(
            report.largest.map(|expense| expense.establishment),
            Some("Market".to_string())
        );
    }

    #[test]
    fn payers_and_top_expenses_skip_deleted_records() {
        let mut gone = Expense::new("2025-01-01", "Gone", 900.0, 1, "sam", SplitPolicy::EvenSplit);
        gone.deleted = true;
        let records = vec![
            Expense::new("2025-01-03", "Market", 30.0, 1, "alex", SplitPolicy::EvenSplit),
            Expense::new("2025-01-04", "Garage", 90.0, 3, "sam", SplitPolicy::PartyBFull),
            Expense::new("2025-01-05", "Bakery", 30.0, 1, "alex", SplitPolicy::EvenSplit),
            gone,
        ];
        let report = ReportService::overview(&records);
        assert_eq!(report.record_count, 3);
        assert_eq!(report.total, 150.0);
        assert_eq!(report.average, 50.0);
        assert_eq!(report.payers[0].payer, "sam");
        assert_eq!(report.payers[0].percent, 60);
        assert_eq!(report.payers[1].percent, 40);
        assert_eq!(report.largest.as_ref().map(|e| e.establishment.as_str()), Some("Garage"));
        let order: Vec<&str> = report
            .top_expenses
            .iter()
            .map(|e| e.establishment.as_str())
            .collect();
        assert_eq!(order, vec!["Garage", "Market", "Bakery"]);
    }
}
