//! Per-category spending statistics.

use chrono::NaiveDate;

use crate::analysis::aggregation::{expense_categories, CategoryAggregate};
use crate::domain::{SpendingPattern, Transaction, Trend};

/// How many of the latest entries form the "recent" window.
pub const RECENT_WINDOW: usize = 3;
/// Categories need at least one entry before the recent window to get a trend.
pub const MIN_TREND_SAMPLES: usize = RECENT_WINDOW + 1;
/// Relative change, in percent, beyond which a trend is reported.
pub const TREND_CHANGE_PERCENT: f64 = 15.0;

/// Derives [`SpendingPattern`]s from a borrowed transaction list.
#[derive(Debug, Clone, Copy)]
pub struct PatternAnalyzer<'a> {
    transactions: &'a [Transaction],
}

impl<'a> PatternAnalyzer<'a> {
    pub fn new(transactions: &'a [Transaction]) -> Self {
        Self { transactions }
    }

    pub fn transactions(&self) -> &'a [Transaction] {
        self.transactions
    }

    /// Expense patterns sorted by share of total spend, largest first.
    ///
    /// With no expenses the result is empty; when every expense is zero the
    /// percentages are all zero.
    pub fn analyze(&self) -> Vec<SpendingPattern> {
        let groups = expense_categories(self.transactions);
        let total: f64 = groups.iter().map(|group| group.total).sum();
        let mut patterns: Vec<SpendingPattern> = groups
            .iter()
            .map(|group| pattern_for(group, total))
            .collect();
        patterns.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
        tracing::debug!(
            categories = patterns.len(),
            total_expense = total,
            "analyzed spending patterns"
        );
        patterns
    }
}

fn pattern_for(group: &CategoryAggregate, total: f64) -> SpendingPattern {
    let percentage = if total > 0.0 {
        (group.total / total) * 100.0
    } else {
        0.0
    };
    SpendingPattern {
        category: group.label.clone(),
        average_amount: group.average(),
        frequency: group.count,
        trend: spending_trend(&group.dated),
        percentage,
    }
}

/// Compares the mean of the last [`RECENT_WINDOW`] entries with the mean of all earlier ones.
///
/// Fewer than [`MIN_TREND_SAMPLES`] entries, or an older mean of zero, yields `Stable`.
pub fn spending_trend(dated: &[(NaiveDate, f64)]) -> Trend {
    if dated.len() < MIN_TREND_SAMPLES {
        return Trend::Stable;
    }
    let split = dated.len() - RECENT_WINDOW;
    let (older, recent) = dated.split_at(split);
    let mean = |slice: &[(NaiveDate, f64)]| {
        slice.iter().map(|(_, amount)| amount).sum::<f64>() / slice.len() as f64
    };
    let older_mean = mean(older);
    if older_mean <= 0.0 {
        return Trend::Stable;
    }
    let change = (mean(recent) - older_mean) / older_mean * 100.0;
    if change > TREND_CHANGE_PERCENT {
        Trend::Increasing
    } else if change < -TREND_CHANGE_PERCENT {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(amounts: &[f64]) -> Vec<(NaiveDate, f64)> {
        amounts
            .iter()
            .enumerate()
            .map(|(idx, amount)| (date(2024, 1, 1) + chrono::Duration::days(idx as i64), *amount))
            .collect()
    }

    #[test]
    fn three_entries_are_always_stable() {
        assert_eq!(spending_trend(&series(&[100.0, 500.0, 1000.0])), Trend::Stable);
    }

    #[test]
    fn trend_uses_fifteen_percent_band() {
        assert_eq!(
            spending_trend(&series(&[100.0, 120.0, 120.0, 120.0])),
            Trend::Increasing
        );
        assert_eq!(
            spending_trend(&series(&[100.0, 110.0, 110.0, 110.0])),
            Trend::Stable
        );
        assert_eq!(
            spending_trend(&series(&[100.0, 80.0, 80.0, 80.0])),
            Trend::Decreasing
        );
    }

    #[test]
    fn zero_older_mean_is_stable() {
        assert_eq!(spending_trend(&series(&[0.0, 50.0, 50.0, 50.0])), Trend::Stable);
    }

    #[test]
    fn analyze_sorts_by_share() {
        let txns = vec![
            Transaction::expense("a", 10.0, "Small", date(2024, 1, 1)),
            Transaction::expense("b", 90.0, "Large", date(2024, 1, 2)),
            Transaction::income("c", 500.0, "Salary", date(2024, 1, 3)),
        ];
        let patterns = PatternAnalyzer::new(&txns).analyze();
        assert_eq!(patterns[0].category, "Large");
        assert!((patterns[0].percentage - 90.0).abs() < 1e-9);
        assert!((patterns[1].percentage - 10.0).abs() < 1e-9);
    }

    #[test]
    fn no_expenses_yields_empty_patterns() {
        let txns = vec![Transaction::income("pay", 100.0, "Salary", date(2024, 1, 1))];
        assert!(PatternAnalyzer::new(&txns).analyze().is_empty());
    }
}
