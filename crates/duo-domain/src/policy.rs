use std::fmt;

use serde::{Deserialize, Serialize};

/// Calendar month that holds installment 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleAnchor {
    /// The purchase month is installment 1.
    #[default]
    PurchaseMonth,
    /// The purchase month only carries a zero-valued launch marker; installment 1
    /// falls in the month after the purchase.
    FollowingMonth,
}

impl ScheduleAnchor {
    /// Months between the purchase month and installment 1.
    pub fn lead_months(&self) -> i64 {
        match self {
            ScheduleAnchor::PurchaseMonth => 0,
            ScheduleAnchor::FollowingMonth => 1,
        }
    }

    pub fn emits_launch_marker(&self) -> bool {
        matches!(self, ScheduleAnchor::FollowingMonth)
    }
}

/// Selects how expense records are spread over calendar months.
///
/// The two anchors disagree on which month holds installment 1, and the
/// `installments_paid` offset can be switched on independently of either. Callers
/// pick the combination explicitly on every engine call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ProjectionPolicy {
    #[serde(default)]
    pub anchor: ScheduleAnchor,
    /// Shift the schedule back by `installments_paid` months before the
    /// active-window test.
    #[serde(default)]
    pub apply_paid_offset: bool,
}

impl ProjectionPolicy {
    pub const fn purchase_month() -> Self {
        Self {
            anchor: ScheduleAnchor::PurchaseMonth,
            apply_paid_offset: false,
        }
    }

    pub const fn following_month() -> Self {
        Self {
            anchor: ScheduleAnchor::FollowingMonth,
            apply_paid_offset: false,
        }
    }

    pub const fn with_paid_offset(mut self, enabled: bool) -> Self {
        self.apply_paid_offset = enabled;
        self
    }
}

impl fmt::Display for ProjectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let anchor = match self.anchor {
            ScheduleAnchor::PurchaseMonth => "purchase-month",
            ScheduleAnchor::FollowingMonth => "following-month",
        };
        if self.apply_paid_offset {
            write!(f, "{anchor} (+paid offset)")
        } else {
            f.write_str(anchor)
        }
    }
}
