use duo_core::{
    aggregate, list_rows, project, ExportOptions, ExportService, ProjectionService, RowFilters,
};
use duo_domain::{Expense, MonthLocale, ProjectionPolicy, SplitPolicy, YearMonth};

const EPSILON: f64 = 1e-9;

fn ym(text: &str) -> YearMonth {
    text.parse().expect("valid period")
}

fn all_policies() -> [ProjectionPolicy; 4] {
    [
        ProjectionPolicy::purchase_month(),
        ProjectionPolicy::following_month(),
        ProjectionPolicy::purchase_month().with_paid_offset(true),
        ProjectionPolicy::following_month().with_paid_offset(true),
    ]
}

fn store_x_february() -> Expense {
    Expense::new("2025-02-07", "Store X", 1000.0, 10, "alex", SplitPolicy::EvenSplit)
}

#[test]
fn ten_installments_bill_from_february_to_november() {
    let records = vec![store_x_february()];
    let policy = ProjectionPolicy::purchase_month();

    let stats = aggregate(&records, ym("2025-02"), policy);
    assert!((stats.current_bill_total - 100.0).abs() < EPSILON);
    assert!((stats.party_a_total - 50.0).abs() < EPSILON);
    assert!((stats.party_b_total - 50.0).abs() < EPSILON);
    assert_eq!(stats.purchased_this_month_total, 1000.0);
    assert!((stats.future_commitments_total - 900.0).abs() < EPSILON);

    let active: Vec<String> = (0..24)
        .map(|offset| ym("2025-01").offset(offset))
        .filter(|period| !project(&records, *period, policy).is_empty())
        .map(|period| period.to_string())
        .collect();
    assert_eq!(active.first().map(String::as_str), Some("2025-02"));
    assert_eq!(active.last().map(String::as_str), Some("2025-11"));
    assert_eq!(active.len(), 10);
}

#[test]
fn a_year_later_the_purchase_is_inactive() {
    let records = vec![store_x_february()];
    let stats = aggregate(&records, ym("2026-02"), ProjectionPolicy::purchase_month());
    assert_eq!(stats.current_bill_total, 0.0);
    assert_eq!(stats.future_commitments_total, 0.0);
    assert!(stats.top_establishments.is_empty());
}

#[test]
fn installments_cross_the_year_boundary() {
    let records = vec![Expense::new(
        "2025-11-15",
        "Appliance Co",
        1200.0,
        12,
        "sam",
        SplitPolicy::PartyAFull,
    )];
    let occurrences = project(&records, ym("2026-01"), ProjectionPolicy::purchase_month());
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].installment_index, 3);
    assert!((occurrences[0].value - 100.0).abs() < EPSILON);
    assert_eq!(occurrences[0].party_b, 0.0);
}

#[test]
fn establishment_totals_combine_records() {
    let records = vec![
        Expense::new("2025-03-03", "Store X", 300.0, 1, "alex", SplitPolicy::EvenSplit),
        Expense::new("2025-03-09", "Other", 50.0, 1, "alex", SplitPolicy::EvenSplit),
        Expense::new("2025-03-21", "Store X", 700.0, 1, "sam", SplitPolicy::PartyBFull),
    ];
    let stats = aggregate(&records, ym("2025-03"), ProjectionPolicy::purchase_month());
    assert_eq!(stats.top_establishments[0].name, "Store X");
    assert!((stats.top_establishments[0].value - 1000.0).abs() < EPSILON);
    assert_eq!(stats.top_establishments[1].name, "Other");
    assert_eq!(
        stats
            .biggest_expense_this_month
            .as_ref()
            .map(|expense| expense.total_amount),
        Some(700.0)
    );
}

#[test]
fn single_installment_lives_only_in_its_purchase_month() {
    let expense = Expense::new("2025-06-30", "Cafe", 42.5, 1, "alex", SplitPolicy::EvenSplit);
    let schedule = ProjectionService::schedule(&expense, ProjectionPolicy::purchase_month());
    assert_eq!(schedule.len(), 1);
    assert_eq!(schedule[0].period, ym("2025-06"));
    assert_eq!(schedule[0].value, 42.5);
}

#[test]
fn every_policy_conserves_the_total() {
    let records = vec![
        store_x_february().with_installments_paid(4),
        Expense::new("2024-12-31", "Garage", 999.99, 7, "sam", SplitPolicy::PartyAFull),
        Expense::new("2025-05", "Gym", 120.0, 12, "alex", SplitPolicy::PartyBFull)
            .with_installments_paid(12),
    ];
    for policy in all_policies() {
        for expense in &records {
            let schedule = ProjectionService::schedule(expense, policy);
            let installments = schedule.iter().filter(|o| o.is_installment()).count();
            let sum: f64 = schedule.iter().map(|o| o.value).sum();
            assert_eq!(installments, expense.installment_count as usize);
            assert!(
                (sum - expense.total_amount).abs() < 1e-6,
                "{} under {policy}",
                expense.establishment
            );
        }
    }
}

#[test]
fn split_totals_add_up_to_the_bill() {
    let records = vec![
        store_x_february(),
        Expense::new("2025-02-11", "Pharmacy", 33.33, 1, "sam", SplitPolicy::EvenSplit),
        Expense::new("2025-02-12", "Books", 80.0, 2, "sam", SplitPolicy::PartyAFull),
        Expense::new("2025-02-13", "Shoes", 90.0, 3, "alex", SplitPolicy::PartyBFull),
    ];
    for policy in all_policies() {
        let stats = aggregate(&records, ym("2025-03"), policy);
        assert!(
            (stats.party_a_total + stats.party_b_total - stats.current_bill_total).abs() < 1e-9
        );
    }
}

#[test]
fn soft_deleted_records_vanish_everywhere() {
    let mut deleted = store_x_february();
    deleted.deleted = true;
    let records = vec![deleted];
    for policy in all_policies() {
        for offset in 0..14 {
            let period = ym("2025-01").offset(offset);
            let stats = aggregate(&records, period, policy);
            assert_eq!(stats.current_bill_total, 0.0);
            assert_eq!(stats.purchased_this_month_total, 0.0);
            assert_eq!(stats.future_commitments_total, 0.0);
            assert!(stats.biggest_expense_this_month.is_none());
            assert!(list_rows(&records, period, &RowFilters::default(), policy).is_empty());
        }
    }
}

#[test]
fn nothing_is_committed_after_the_last_installment() {
    let records = vec![store_x_february()];
    let following = ProjectionPolicy::following_month();
    let stats = aggregate(&records, ym("2025-11"), following);
    assert!((stats.future_commitments_total - 100.0).abs() < EPSILON);
    let stats = aggregate(&records, ym("2025-12"), following);
    assert_eq!(stats.future_commitments_total, 0.0);
    assert!((stats.current_bill_total - 100.0).abs() < EPSILON);
}

#[test]
fn launch_rows_are_listed_but_not_billed() {
    let records = vec![store_x_february()];
    let policy = ProjectionPolicy::following_month();
    let rows = list_rows(&records, ym("2025-02"), &RowFilters::default(), policy);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].installment_index, 0);
    assert_eq!(rows[0].monthly_value, 0.0);

    let stats = aggregate(&records, ym("2025-02"), policy);
    assert_eq!(stats.current_bill_total, 0.0);
    assert_eq!(stats.purchased_this_month_total, 1000.0);
    assert!(stats.top_establishments.is_empty());
}

#[test]
fn engine_is_deterministic() {
    let records = vec![
        store_x_february(),
        Expense::new("2025-02-20", "Store X", 10.0, 1, "sam", SplitPolicy::PartyAFull),
    ];
    let policy = ProjectionPolicy::following_month();
    assert_eq!(
        aggregate(&records, ym("2025-03"), policy),
        aggregate(&records, ym("2025-03"), policy)
    );
    assert_eq!(
        list_rows(&records, ym("2025-03"), &RowFilters::default(), policy),
        list_rows(&records, ym("2025-03"), &RowFilters::default(), policy)
    );
}

#[test]
fn exported_rows_parse_back() {
    let records = vec![
        Expense::new("2025-02-07", "Store, \"X\"", 1000.0, 3, "alex", SplitPolicy::EvenSplit)
            .with_product("Sofa"),
        Expense::new("2025-02-10", "Bakery", 12.34, 1, "sam", SplitPolicy::PartyBFull)
            .with_product("Bread"),
    ];
    let rows = list_rows(
        &records,
        ym("2025-02"),
        &RowFilters::default(),
        ProjectionPolicy::purchase_month(),
    );
    let options = ExportOptions {
        party_a_label: "Alex".into(),
        party_b_label: "Sam".into(),
        locale: MonthLocale::Portuguese,
    };
    let csv_text = ExportService::rows_to_csv(&rows, &options).expect("export rows");
    let body = csv_text.trim_start_matches('\u{feff}');

    let mut reader = csv::ReaderBuilder::new().from_reader(body.as_bytes());
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(headers.len(), 11);
    assert_eq!(&headers[9], "Alex");
    assert_eq!(&headers[10], "Sam");

    let parsed: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("records");
    assert_eq!(parsed.len(), rows.len());
    for (line, row) in parsed.iter().zip(&rows) {
        assert_eq!(&line[0], row.purchase_date);
        assert_eq!(&line[1], "FEV");
        assert_eq!(&line[3], row.establishment);
        assert_eq!(&line[4], row.product);
        let amounts: Vec<f64> = (7..11)
            .map(|column| line[column].parse().expect("amount"))
            .collect();
        assert!((amounts[0] - row.total_amount).abs() < 0.01);
        assert!((amounts[1] - row.monthly_value).abs() < 0.01);
        assert!((amounts[2] - row.party_a_value).abs() < 0.01);
        assert!((amounts[3] - row.party_b_value).abs() < 0.01);
    }
}
