//! CSV builders for period rows and for the raw record list.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use duo_domain::{Expense, MonthLocale};

use crate::{row_service::Row, CoreError};

const BYTE_ORDER_MARK: &str = "\u{feff}";

/// Presentation choices for the period export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub party_a_label: String,
    pub party_b_label: String,
    pub locale: MonthLocale,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            party_a_label: "Party A".into(),
            party_b_label: "Party B".into(),
            locale: MonthLocale::default(),
        }
    }
}

pub struct ExportService;

impl ExportService {
    /// Serializes rows with a UTF-8 BOM, one header line and one line per row.
    pub fn rows_to_csv(rows: &[Row], options: &ExportOptions) -> Result<String, CoreError> {
        let mut writer = csv_writer();
        writer.write_record([
            "Purchase Date",
            "Month",
            "Payer",
            "Establishment",
            "Product",
            "Installment",
            "Installments",
            "Total Amount",
            "Installment Value",
            options.party_a_label.as_str(),
            options.party_b_label.as_str(),
        ])?;
        for row in rows {
            writer.write_record([
                row.purchase_date.clone(),
                row.month_label(options.locale).to_uppercase(),
                row.payer.clone(),
                row.establishment.clone(),
                row.product.clone(),
                row.installment_index.to_string(),
                row.installment_count.to_string(),
                money(row.total_amount),
                money(row.monthly_value),
                money(row.party_a_value),
                money(row.party_b_value),
            ])?;
        }
        finish(writer)
    }

    /// Serializes every stored record (including soft-deleted ones) as one line each.
    pub fn records_to_csv(records: &[Expense]) -> Result<String, CoreError> {
        let mut writer = csv_writer();
        writer.write_record([
            "Purchase Date",
            "Establishment",
            "Product",
            "Total Amount",
            "Installments",
            "Payer",
            "Split",
        ])?;
        for expense in records {
            writer.write_record([
                expense.purchase_date.clone(),
                expense.establishment.clone(),
                expense.product.clone(),
                money(expense.total_amount),
                format!("{}/{}", expense.installments_paid, expense.installment_count),
                expense.payer.clone(),
                expense.split_policy.to_string(),
            ])?;
        }
        finish(writer)
    }
}

fn csv_writer() -> csv::Writer<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(BYTE_ORDER_MARK.as_bytes());
    WriterBuilder::new()
        .quote_style(QuoteStyle::NonNumeric)
        .terminator(Terminator::CRLF)
        .from_writer(buffer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, CoreError> {
    let bytes = writer
        .into_inner()
        .map_err(|err| CoreError::Io(err.into_error()))?;
    String::from_utf8(bytes).map_err(|err| CoreError::Validation(err.to_string()))
}

/// Two fraction digits, `.` as decimal separator.
pub fn money(value: f64) -> String {
    format!("{:.2}", value)
}
