use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{shift_month, CategoryKey, Identifiable};

/// Spend percentage at which a budget moves to `Warning`.
pub const WARNING_THRESHOLD: f64 = 80.0;
/// Spend percentage at which a budget is `Exceeded`.
pub const EXCEEDED_THRESHOLD: f64 = 100.0;
/// Spend percentage that raises an `Approaching` alert.
pub const APPROACHING_THRESHOLD: f64 = 70.0;

/// Enumeration of budgeting periods.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    /// End of a window that starts on `start`.
    pub fn advance(self, start: NaiveDate) -> NaiveDate {
        match self {
            BudgetPeriod::Weekly => start + Duration::days(7),
            BudgetPeriod::Monthly => shift_month(start, 1),
            BudgetPeriod::Yearly => shift_month(start, 12),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
        }
    }
}

/// Status tier derived from spend against the limit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    #[default]
    OnTrack,
    Warning,
    Exceeded,
}

impl BudgetStatus {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= EXCEEDED_THRESHOLD {
            BudgetStatus::Exceeded
        } else if percentage >= WARNING_THRESHOLD {
            BudgetStatus::Warning
        } else {
            BudgetStatus::OnTrack
        }
    }
}

/// A spend ceiling for a category over a date window.
///
/// Spent is deliberately absent: it is recomputed from transactions on every
/// refresh and handed back in a [`BudgetSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: Uuid,
    pub category: String,
    pub limit: f64,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub status: BudgetStatus,
    #[serde(default = "Budget::default_notifications")]
    pub notifications: bool,
}

impl Budget {
    pub fn new(
        category: impl Into<String>,
        limit: f64,
        period: BudgetPeriod,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: category.into(),
            limit,
            period,
            start_date,
            end_date: period.advance(start_date),
            status: BudgetStatus::OnTrack,
            notifications: true,
        }
    }

    pub fn category_key(&self) -> CategoryKey {
        CategoryKey::new(&self.category)
    }

    /// Inclusive on both ends.
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Share of the limit consumed by `spent`, guarding a non-positive limit.
    pub fn percentage_for(&self, spent: f64) -> f64 {
        if self.limit > f64::EPSILON {
            (spent / self.limit) * 100.0
        } else if spent > f64::EPSILON {
            100.0
        } else {
            0.0
        }
    }

    fn default_notifications() -> bool {
        true
    }
}

impl Identifiable for Budget {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Result of a status refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetSnapshot {
    pub budget_id: Uuid,
    pub category: String,
    pub limit: f64,
    pub spent: f64,
    pub remaining: f64,
    pub percentage: f64,
    pub status: BudgetStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Approaching,
    Warning,
    Exceeded,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetAlert {
    pub id: String,
    pub budget_id: Uuid,
    pub kind: AlertKind,
    pub message: String,
    pub percentage: f64,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetSuggestion {
    pub category: String,
    pub suggested_limit: f64,
    pub reasoning: String,
}

/// Aggregate view across every tracked budget.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BudgetOverview {
    pub total_limit: f64,
    pub total_spent: f64,
    pub remaining: f64,
    pub on_track: usize,
    pub warning: usize,
    pub exceeded: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tiers_follow_thresholds() {
        assert_eq!(BudgetStatus::from_percentage(79.9), BudgetStatus::OnTrack);
        assert_eq!(BudgetStatus::from_percentage(80.0), BudgetStatus::Warning);
        assert_eq!(BudgetStatus::from_percentage(100.0), BudgetStatus::Exceeded);
    }

    #[test]
    fn periods_advance_calendar_aware() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            BudgetPeriod::Weekly.advance(start),
            NaiveDate::from_ymd_opt(2024, 2, 7).unwrap()
        );
        assert_eq!(
            BudgetPeriod::Monthly.advance(start),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            BudgetPeriod::Yearly.advance(start),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
        );
    }

    #[test]
    fn zero_limit_percentage_is_guarded() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut budget = Budget::new("Food", 100.0, BudgetPeriod::Monthly, start);
        budget.limit = 0.0;
        assert_eq!(budget.percentage_for(0.0), 0.0);
        assert_eq!(budget.percentage_for(5.0), 100.0);
    }
}
