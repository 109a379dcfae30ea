//! Category grouping shared by pattern analysis, reports, budgets, and notifications.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::domain::{month_key, CategoryKey, Direction, MonthAmount, Transaction};

/// Totals for one category under some predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAggregate {
    pub key: CategoryKey,
    /// Display label of the first transaction seen for this key.
    pub label: String,
    pub total: f64,
    pub count: usize,
    /// Dated amounts in chronological order; undated records only count toward `total`.
    pub dated: Vec<(NaiveDate, f64)>,
}

impl CategoryAggregate {
    fn new(key: CategoryKey, label: &str) -> Self {
        Self {
            key,
            label: label.trim().to_string(),
            total: 0.0,
            count: 0,
            dated: Vec::new(),
        }
    }

    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }

    /// Per-month sums in ascending month order.
    pub fn monthly_amounts(&self) -> Vec<MonthAmount> {
        let mut months: BTreeMap<String, f64> = BTreeMap::new();
        for (date, amount) in &self.dated {
            *months.entry(month_key(*date)).or_insert(0.0) += amount;
        }
        months
            .into_iter()
            .map(|(month, amount)| MonthAmount { month, amount })
            .collect()
    }
}

/// Groups the transactions accepted by `predicate` by normalized category.
///
/// Aggregates come back in order of first appearance.
pub fn aggregate_by_category<'a, I, P>(transactions: I, predicate: P) -> Vec<CategoryAggregate>
where
    I: IntoIterator<Item = &'a Transaction>,
    P: Fn(&Transaction) -> bool,
{
    let mut index: HashMap<CategoryKey, usize> = HashMap::new();
    let mut groups: Vec<CategoryAggregate> = Vec::new();

    for txn in transactions.into_iter().filter(|txn| predicate(txn)) {
        let key = txn.category_key();
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(CategoryAggregate::new(key, &txn.category));
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.total += txn.amount;
        group.count += 1;
        if let Some(date) = txn.date {
            group.dated.push((date, txn.amount));
        }
    }

    for group in &mut groups {
        group.dated.sort_by_key(|(date, _)| *date);
    }
    groups
}

/// Expense-only grouping, the most common view.
pub fn expense_categories(transactions: &[Transaction]) -> Vec<CategoryAggregate> {
    aggregate_by_category(transactions, Transaction::is_expense)
}

/// Sum of amounts moving in one direction.
pub fn total_for(transactions: &[Transaction], direction: Direction) -> f64 {
    transactions
        .iter()
        .filter(|txn| txn.direction == direction)
        .map(|txn| txn.amount)
        .sum()
}

/// Distinct `YYYY-MM` keys present in the dated transactions, ascending.
pub fn distinct_months(transactions: &[Transaction]) -> Vec<String> {
    let mut months: Vec<String> = transactions
        .iter()
        .filter_map(Transaction::month_key)
        .collect();
    months.sort();
    months.dedup();
    months
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn groups_by_normalized_key_and_keeps_first_label() {
        let txns = vec![
            Transaction::expense("Lunch", 12.0, "Food", date(2024, 1, 3)),
            Transaction::expense("Dinner", 30.0, " food", date(2024, 1, 1)),
            Transaction::expense("Bus", 2.5, "Transport", date(2024, 1, 2)),
            Transaction::income("Salary", 1000.0, "Food", date(2024, 1, 1)),
        ];
        let groups = expense_categories(&txns);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "Food");
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].total, 42.0);
        assert_eq!(groups[0].dated[0], (date(2024, 1, 1), 30.0));
    }

    #[test]
    fn undated_records_count_but_are_not_in_series() {
        let txns = vec![
            Transaction::expense("Known", 10.0, "Misc", date(2024, 2, 1)),
            Transaction::expense("Unknown", 20.0, "Misc", None),
        ];
        let groups = expense_categories(&txns);
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].total, 30.0);
        assert_eq!(groups[0].dated.len(), 1);
    }

    #[test]
    fn monthly_amounts_are_sorted_by_month() {
        let txns = vec![
            Transaction::expense("b", 5.0, "Fun", date(2024, 3, 1)),
            Transaction::expense("a", 7.0, "Fun", date(2024, 1, 9)),
            Transaction::expense("c", 3.0, "Fun", date(2024, 3, 20)),
        ];
        let months = expense_categories(&txns)[0].monthly_amounts();
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].month, "2024-01");
        assert_eq!(months[1].amount, 8.0);
    }

    #[test]
    fn distinct_months_skips_undated() {
        let txns = vec![
            Transaction::income("x", 1.0, "Work", date(2024, 2, 1)),
            Transaction::income("y", 1.0, "Work", None),
            Transaction::expense("z", 1.0, "Food", date(2024, 1, 1)),
            Transaction::expense("w", 1.0, "Food", date(2024, 2, 8)),
        ];
        assert_eq!(distinct_months(&txns), vec!["2024-01", "2024-02"]);
    }
}
