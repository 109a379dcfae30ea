//! Combined financial insight snapshot plus spending prediction and anomaly checks.

use std::collections::HashMap;

use crate::analysis::patterns::PatternAnalyzer;
use crate::analysis::recommendations::{build_recommendations, SpendingTotals};
use crate::domain::{
    CategoryKey, FinancialInsight, SpendingPattern, SpendingPrediction, Transaction, Trend,
};

/// Multiplier applied to a category average when its trend is rising.
pub const RISING_MULTIPLIER: f64 = 1.1;
/// Multiplier applied to a category average when its trend is falling.
pub const FALLING_MULTIPLIER: f64 = 0.9;
/// An expense larger than this multiple of its category average is unusual.
pub const UNUSUAL_FACTOR: f64 = 2.0;

pub struct InsightService;

impl InsightService {
    pub fn generate(transactions: &[Transaction]) -> FinancialInsight {
        let patterns = PatternAnalyzer::new(transactions).analyze();
        let totals = SpendingTotals::from_patterns(transactions, &patterns);
        FinancialInsight {
            total_spending: totals.monthly_expense,
            average_monthly_spending: totals.monthly_expense,
            spending_trend: overall_trend(&patterns),
            savings_rate: totals.savings_rate(),
            recommendations: build_recommendations(&patterns, totals),
            top_categories: patterns.into_iter().take(5).collect(),
        }
    }

    /// Projects each category's average over `months`, nudged by its trend.
    pub fn predict_future_spending(
        transactions: &[Transaction],
        months: u32,
    ) -> Vec<SpendingPrediction> {
        PatternAnalyzer::new(transactions)
            .analyze()
            .into_iter()
            .map(|pattern| {
                let multiplier = match pattern.trend {
                    Trend::Increasing => RISING_MULTIPLIER,
                    Trend::Decreasing => FALLING_MULTIPLIER,
                    Trend::Stable => 1.0,
                };
                SpendingPrediction {
                    predicted_amount: pattern.average_amount * months as f64 * multiplier,
                    category: pattern.category,
                }
            })
            .collect()
    }

    /// Expenses above twice their category average, largest first.
    pub fn detect_unusual_spending(transactions: &[Transaction]) -> Vec<Transaction> {
        let averages: HashMap<CategoryKey, f64> = PatternAnalyzer::new(transactions)
            .analyze()
            .into_iter()
            .map(|pattern| (CategoryKey::new(&pattern.category), pattern.average_amount))
            .collect();
        let mut unusual: Vec<Transaction> = transactions
            .iter()
            .filter(|txn| txn.is_expense())
            .filter(|txn| {
                averages
                    .get(&txn.category_key())
                    .is_some_and(|average| txn.amount > average * UNUSUAL_FACTOR)
            })
            .cloned()
            .collect();
        unusual.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        unusual
    }
}

/// Majority vote across category trends; ties are `Stable`.
fn overall_trend(patterns: &[SpendingPattern]) -> Trend {
    let rising = patterns
        .iter()
        .filter(|p| p.trend == Trend::Increasing)
        .count();
    let falling = patterns
        .iter()
        .filter(|p| p.trend == Trend::Decreasing)
        .count();
    match rising.cmp(&falling) {
        std::cmp::Ordering::Greater => Trend::Increasing,
        std::cmp::Ordering::Less => Trend::Decreasing,
        std::cmp::Ordering::Equal => Trend::Stable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn history() -> Vec<Transaction> {
        vec![
            Transaction::income("Salary", 3000.0, "Work", date(1, 1)),
            Transaction::expense("a", 50.0, "Food", date(1, 2)),
            Transaction::expense("b", 50.0, "Food", date(1, 9)),
            Transaction::expense("c", 50.0, "Food", date(1, 16)),
            Transaction::expense("d", 250.0, "Food", date(1, 23)),
            Transaction::expense("e", 40.0, "Transport", date(1, 5)),
        ]
    }

    #[test]
    fn insight_collects_top_categories_and_rate() {
        let insight = InsightService::generate(&history());
        assert_eq!(insight.top_categories.len(), 2);
        assert_eq!(insight.total_spending, 100.0 + 40.0);
        assert!((insight.savings_rate - (3000.0 - 140.0) / 3000.0 * 100.0).abs() < 1e-9);
        assert_eq!(insight.spending_trend, Trend::Increasing);
        assert!(!insight.recommendations.is_empty());
    }

    #[test]
    fn predictions_scale_by_trend() {
        let predictions = InsightService::predict_future_spending(&history(), 3);
        let food = predictions.iter().find(|p| p.category == "Food").unwrap();
        assert!((food.predicted_amount - 100.0 * 3.0 * RISING_MULTIPLIER).abs() < 1e-9);
        let transport = predictions
            .iter()
            .find(|p| p.category == "Transport")
            .unwrap();
        assert_eq!(transport.predicted_amount, 120.0);
    }

    #[test]
    fn unusual_spending_flags_outliers() {
        let unusual = InsightService::detect_unusual_spending(&history());
        assert_eq!(unusual.len(), 1);
        assert_eq!(unusual[0].amount, 250.0);
    }
}
