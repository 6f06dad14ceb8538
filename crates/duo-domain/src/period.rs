use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A calendar month. Ordering is chronological (year first, then month).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Builds a period, rejecting months outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Zero-based month counter, `year * 12 + (month - 1)`.
    fn index(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    fn from_index(index: i64) -> Self {
        Self {
            year: index.div_euclid(12) as i32,
            month: (index.rem_euclid(12) + 1) as u32,
        }
    }

    /// Signed number of months from `earlier` to `self`.
    pub fn months_since(&self, earlier: YearMonth) -> i64 {
        self.index() - earlier.index()
    }

    pub fn offset(&self, months: i64) -> Self {
        Self::from_index(self.index() + months)
    }

    pub fn next(&self) -> Self {
        self.offset(1)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn label(&self, locale: MonthLocale) -> &'static str {
        locale.abbreviation(self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePeriodError {
    input: String,
}

impl fmt::Display for ParsePeriodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid period `{}` (use YYYY-MM)", self.input)
    }
}

impl std::error::Error for ParsePeriodError {}

impl FromStr for YearMonth {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePeriodError {
            input: s.to_string(),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        YearMonth::new(year, month).ok_or_else(err)
    }
}

/// Language used for three-letter month abbreviations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MonthLocale {
    #[default]
    English,
    Portuguese,
}

const ENGLISH_MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
const PORTUGUESE_MONTHS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

impl MonthLocale {
    /// Lowercase abbreviation for `month` (1-based); empty for out-of-range input.
    pub fn abbreviation(&self, month: u32) -> &'static str {
        let table = match self {
            MonthLocale::English => &ENGLISH_MONTHS,
            MonthLocale::Portuguese => &PORTUGUESE_MONTHS,
        };
        month
            .checked_sub(1)
            .and_then(|idx| table.get(idx as usize))
            .copied()
            .unwrap_or("")
    }

    pub fn parse_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(MonthLocale::English),
            "pt" | "pt-br" | "portuguese" => Some(MonthLocale::Portuguese),
            _ => None,
        }
    }
}

impl fmt::Display for MonthLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MonthLocale::English => "english",
            MonthLocale::Portuguese => "portuguese",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_prints_period() {
        let period: YearMonth = "2025-02".parse().expect("valid period");
        assert_eq!(period, YearMonth { year: 2025, month: 2 });
        assert_eq!(period.to_string(), "2025-02");
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("february".parse::<YearMonth>().is_err());
    }

    #[test]
    fn offset_crosses_year_boundaries() {
        let nov = YearMonth::new(2025, 11).unwrap();
        assert_eq!(nov.offset(2), YearMonth::new(2026, 1).unwrap());
        assert_eq!(nov.offset(-11), YearMonth::new(2024, 12).unwrap());
        assert_eq!(YearMonth::new(2026, 1).unwrap().months_since(nov), 2);
        assert_eq!(nov.months_since(YearMonth::new(2026, 2).unwrap()), -3);
    }

    #[test]
    fn ordering_is_chronological() {
        let a = YearMonth::new(2025, 12).unwrap();
        let b = YearMonth::new(2026, 1).unwrap();
        assert!(a < b);
    }

    #[test]
    fn month_labels_follow_locale() {
        assert_eq!(MonthLocale::English.abbreviation(2), "feb");
        assert_eq!(MonthLocale::Portuguese.abbreviation(2), "fev");
        assert_eq!(MonthLocale::Portuguese.abbreviation(13), "");
        assert_eq!(MonthLocale::parse_label("pt-BR"), Some(MonthLocale::Portuguese));
    }
}
