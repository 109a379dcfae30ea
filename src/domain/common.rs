//! Shared traits and key helpers for finance primitives.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exposes a stable identifier for entities owned by the manager.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Index of the entity carrying `id`.
pub fn position_by_id<T: Identifiable>(items: &[T], id: Uuid) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

/// Normalized category identity used for every category comparison.
///
/// Labels are trimmed and lower-cased, so `" Food"` and `"food"` land in the
/// same bucket while the caller keeps its own display label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryKey(String);

impl CategoryKey {
    pub fn new(label: &str) -> Self {
        Self(label.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryKey {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// Calendar bucket key in `YYYY-MM` form.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Shifts a date by whole calendar months, clamping the day to the target month's length.
pub fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 + months;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Whole calendar months from `from` to `to`, ignoring the day of month.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

/// `part / whole * 100`, resolving a non-positive denominator to zero.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        (part / whole) * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn category_key_folds_case_and_whitespace() {
        assert_eq!(CategoryKey::new("  Food "), CategoryKey::new("food"));
        assert_ne!(CategoryKey::new("Food"), CategoryKey::new("Fuel"));
    }

    #[test]
    fn month_key_is_zero_padded() {
        assert_eq!(month_key(date(2024, 3, 9)), "2024-03");
    }

    #[test]
    fn shift_month_clamps_day_and_wraps_years() {
        assert_eq!(shift_month(date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(shift_month(date(2024, 11, 15), 3), date(2025, 2, 15));
        assert_eq!(shift_month(date(2024, 1, 15), -1), date(2023, 12, 15));
    }

    #[test]
    fn months_between_ignores_days() {
        assert_eq!(months_between(date(2024, 1, 31), date(2024, 3, 1)), 2);
        assert_eq!(months_between(date(2024, 5, 1), date(2024, 3, 1)), -2);
    }

    #[test]
    fn percent_of_guards_zero_denominator() {
        assert_eq!(percent_of(5.0, 0.0), 0.0);
        assert_eq!(percent_of(5.0, 20.0), 25.0);
    }
}
