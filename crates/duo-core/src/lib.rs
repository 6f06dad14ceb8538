//! duo-core
//!
//! Installment projection, period aggregation and listing/export services for
//! the two-party expense tracker.
//! Depends on duo-domain. No CLI, no terminal I/O, no direct storage interactions.
//!
//! The three engine entry points ([`project`], [`aggregate`], [`list_rows`]) are
//! pure: they never mutate their input and always return freshly built values.

pub mod error;
pub mod expense_service;
pub mod export_service;
pub mod input;
pub mod projection;
pub mod report_service;
pub mod row_service;
pub mod storage;
pub mod summary_service;

pub use error::CoreError;
pub use expense_service::*;
pub use export_service::*;
pub use input::parse_amount;
pub use projection::*;
pub use report_service::*;
pub use row_service::*;
pub use storage::*;
pub use summary_service::*;

use duo_domain::{Expense, ProjectionPolicy, YearMonth};

/// Installment occurrences of every record that fall in `period`.
pub fn project(records: &[Expense], period: YearMonth, policy: ProjectionPolicy) -> Vec<Occurrence> {
    ProjectionService::project_all(records, period, policy)
}

/// Monetary aggregates and rankings for `period`.
pub fn aggregate(records: &[Expense], period: YearMonth, policy: ProjectionPolicy) -> PeriodStats {
    SummaryService::aggregate(records, period, policy)
}

/// Filtered, date-ordered listing rows for `period`.
pub fn list_rows(
    records: &[Expense],
    period: YearMonth,
    filters: &RowFilters,
    policy: ProjectionPolicy,
) -> Vec<Row> {
    RowService::list(records, period, filters, policy)
}
