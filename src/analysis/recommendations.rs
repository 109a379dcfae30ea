//! Rule-based recommendations built on top of spending patterns.

use crate::analysis::aggregation::total_for;
use crate::analysis::patterns::PatternAnalyzer;
use crate::currency::{format_currency, format_percentage};
use crate::domain::{
    Direction, Impact, Recommendation, RecommendationKind, SpendingPattern, Transaction, Trend,
};

/// Share of total spend above which the top category gets a saving tip.
pub const TOP_CATEGORY_SHARE: f64 = 30.0;
/// Fraction of a category average suggested as a cut.
pub const SUGGESTED_CUT: f64 = 0.2;
/// Expense-to-income ratio above which a budget adjustment is suggested.
pub const EXPENSE_INCOME_CEILING: f64 = 0.8;
/// Savings-rate target in percent.
pub const TARGET_SAVINGS_RATE: f64 = 20.0;
/// Months of expenses an emergency fund should cover.
pub const EMERGENCY_FUND_MONTHS: f64 = 6.0;

/// Income totals and spend figures the rules read from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpendingTotals {
    pub income: f64,
    /// Sum of the per-category average amounts.
    pub monthly_expense: f64,
}

impl SpendingTotals {
    pub fn from_patterns(transactions: &[Transaction], patterns: &[SpendingPattern]) -> Self {
        Self {
            income: total_for(transactions, Direction::Income),
            monthly_expense: patterns.iter().map(|p| p.average_amount).sum(),
        }
    }

    /// `(income - expense) / income * 100`, zero when there is no income.
    pub fn savings_rate(&self) -> f64 {
        if self.income > 0.0 {
            (self.income - self.monthly_expense) / self.income * 100.0
        } else {
            0.0
        }
    }

    /// No income and no spending, so there is no rate to improve.
    pub fn is_empty(&self) -> bool {
        self.income == 0.0 && self.monthly_expense == 0.0
    }
}

/// Produces a prioritized recommendation list for a transaction history.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationEngine<'a> {
    analyzer: PatternAnalyzer<'a>,
}

impl<'a> RecommendationEngine<'a> {
    pub fn new(transactions: &'a [Transaction]) -> Self {
        Self {
            analyzer: PatternAnalyzer::new(transactions),
        }
    }

    pub fn generate(&self) -> Vec<Recommendation> {
        let patterns = self.analyzer.analyze();
        let totals = SpendingTotals::from_patterns(self.analyzer.transactions(), &patterns);
        build_recommendations(&patterns, totals)
    }
}

/// Applies every rule independently; the result is ordered by priority with ties
/// kept in rule order.
pub fn build_recommendations(
    patterns: &[SpendingPattern],
    totals: SpendingTotals,
) -> Vec<Recommendation> {
    let mut builder = Builder::default();

    if let Some(top) = patterns.first().filter(|p| p.percentage > TOP_CATEGORY_SHARE) {
        let saving = top.average_amount * SUGGESTED_CUT;
        builder.push(
            RecommendationKind::Saving,
            format!("Optimize your spending on {}", top.category),
            format!(
                "{} of your spending goes to {}. Cutting it by 20% could save you {} a month.",
                format_percentage(top.percentage),
                top.category,
                format_currency(saving)
            ),
            Impact::High,
            Some(top.category.clone()),
            format!(
                "Review your {} expenses and look for cheaper alternatives",
                top.category
            ),
            Some(saving),
            1,
        );
    }

    if let Some(rising) = patterns.iter().find(|p| p.trend == Trend::Increasing) {
        builder.push(
            RecommendationKind::Warning,
            format!("Rising spending: {}", rising.category),
            format!(
                "Your spending on {} has increased recently. Time to review this budget.",
                rising.category
            ),
            Impact::Medium,
            Some(rising.category.clone()),
            "Set a monthly limit for this category".into(),
            None,
            2,
        );
    }

    if totals.monthly_expense > totals.income * EXPENSE_INCOME_CEILING {
        let share = if totals.income > 0.0 {
            format_percentage(totals.monthly_expense / totals.income * 100.0)
        } else {
            "all".into()
        };
        builder.push(
            RecommendationKind::Budget,
            "Adjust your monthly budget".into(),
            format!("You are spending {share} of your income. Staying under 80% is recommended."),
            Impact::High,
            None,
            "Build a detailed budget and cut non-essential expenses".into(),
            None,
            1,
        );
    }

    let savings_rate = totals.savings_rate();
    if !totals.is_empty() && savings_rate < TARGET_SAVINGS_RATE {
        let potential = totals.income * (TARGET_SAVINGS_RATE / 100.0)
            - (totals.income - totals.monthly_expense);
        builder.push(
            RecommendationKind::Opportunity,
            "Increase your savings rate".into(),
            format!(
                "Your current savings rate is {}. Experts recommend saving at least 20% of income.",
                format_percentage(savings_rate)
            ),
            Impact::Medium,
            None,
            "Automate transfers to a savings account".into(),
            Some(potential),
            3,
        );
    }

    let emergency_fund = totals.monthly_expense * EMERGENCY_FUND_MONTHS;
    builder.push(
        RecommendationKind::Goal,
        "Emergency fund".into(),
        format!(
            "Consider building an emergency fund of {} (6 months of expenses).",
            format_currency(emergency_fund)
        ),
        Impact::High,
        None,
        "Save gradually until you cover 6 months of expenses".into(),
        None,
        2,
    );

    let mut recommendations = builder.finish();
    recommendations.sort_by_key(|rec| rec.priority);
    recommendations
}

#[derive(Default)]
struct Builder {
    items: Vec<Recommendation>,
}

impl Builder {
    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        kind: RecommendationKind,
        title: String,
        description: String,
        impact: Impact,
        category: Option<String>,
        suggested_action: String,
        potential_saving: Option<f64>,
        priority: u8,
    ) {
        let id = format!("rec_{}", self.items.len() + 1);
        self.items.push(Recommendation {
            id,
            kind,
            title,
            description,
            impact,
            category,
            suggested_action,
            potential_saving,
            priority,
        });
    }

    fn finish(self) -> Vec<Recommendation> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn kinds(recs: &[Recommendation]) -> Vec<RecommendationKind> {
        recs.iter().map(|rec| rec.kind).collect()
    }

    #[test]
    fn healthy_history_only_gets_goal_advice() {
        let txns = vec![
            Transaction::income("Salary", 5000.0, "Work", date(1, 1)),
            Transaction::expense("Food", 100.0, "Food", date(1, 2)),
            Transaction::expense("Bus", 100.0, "Transport", date(1, 3)),
            Transaction::expense("Gym", 100.0, "Health", date(1, 4)),
            Transaction::expense("Books", 100.0, "Education", date(1, 5)),
        ];
        let recs = RecommendationEngine::new(&txns).generate();
        assert_eq!(kinds(&recs), vec![RecommendationKind::Goal]);
        assert!(recs[0].description.contains("$2,400.00"));
    }

    #[test]
    fn empty_history_only_gets_goal_advice() {
        let recs = RecommendationEngine::new(&[]).generate();
        assert_eq!(kinds(&recs), vec![RecommendationKind::Goal]);
        assert!(recs.iter().all(|rec| rec.potential_saving.is_none()));
    }

    #[test]
    fn stressed_history_fires_every_rule_in_priority_order() {
        let txns = vec![
            Transaction::income("Salary", 1000.0, "Work", date(1, 1)),
            Transaction::expense("a", 100.0, "Food", date(1, 2)),
            Transaction::expense("b", 300.0, "Food", date(2, 2)),
            Transaction::expense("c", 300.0, "Food", date(3, 2)),
            Transaction::expense("d", 300.0, "Food", date(4, 2)),
            Transaction::expense("e", 800.0, "Rent", date(1, 3)),
        ];
        let recs = RecommendationEngine::new(&txns).generate();
        assert_eq!(
            kinds(&recs),
            vec![
                RecommendationKind::Saving,
                RecommendationKind::Budget,
                RecommendationKind::Warning,
                RecommendationKind::Goal,
                RecommendationKind::Opportunity,
            ]
        );
        let priorities: Vec<u8> = recs.iter().map(|rec| rec.priority).collect();
        assert_eq!(priorities, vec![1, 1, 2, 2, 3]);
        let warning = &recs[2];
        assert_eq!(warning.category.as_deref(), Some("Food"));
    }

    #[test]
    fn saving_potential_is_a_fifth_of_the_average() {
        let patterns = vec![SpendingPattern {
            category: "Food".into(),
            average_amount: 250.0,
            frequency: 4,
            trend: Trend::Stable,
            percentage: 100.0,
        }];
        let totals = SpendingTotals {
            income: 10_000.0,
            monthly_expense: 250.0,
        };
        let recs = build_recommendations(&patterns, totals);
        assert_eq!(recs[0].kind, RecommendationKind::Saving);
        assert_eq!(recs[0].potential_saving, Some(50.0));
    }

    #[test]
    fn zero_income_resolves_savings_rate_to_zero() {
        let totals = SpendingTotals {
            income: 0.0,
            monthly_expense: 100.0,
        };
        assert_eq!(totals.savings_rate(), 0.0);
        let recs = build_recommendations(&[], totals);
        let opportunity = recs
            .iter()
            .find(|rec| rec.kind == RecommendationKind::Opportunity)
            .expect("opportunity emitted");
        assert_eq!(opportunity.potential_saving, Some(100.0));
    }
}
