use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::patterns::PatternAnalyzer;
use crate::currency::{format_currency, format_percentage};
use crate::domain::budget::{APPROACHING_THRESHOLD, EXCEEDED_THRESHOLD, WARNING_THRESHOLD};
use crate::domain::common::position_by_id;
use crate::domain::{
    AlertKind, Budget, BudgetAlert, BudgetOverview, BudgetPeriod, BudgetSnapshot, BudgetStatus,
    BudgetSuggestion, Transaction,
};
use crate::time::Clock;

use super::{ensure_positive, ServiceResult};

/// Headroom added on top of the historical average when suggesting limits.
const SUGGESTION_BUFFER: f64 = 1.1;
const MAX_SUGGESTIONS: usize = 5;

/// Owns the budget list. Spent amounts are always recomputed from the
/// transactions handed in, never cached on the budget.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct BudgetTracker {
    budgets: Vec<Budget>,
}

impl BudgetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_budgets(budgets: Vec<Budget>) -> Self {
        Self { budgets }
    }

    pub fn budgets(&self) -> &[Budget] {
        &self.budgets
    }

    pub fn get(&self, budget_id: Uuid) -> Option<&Budget> {
        self.budgets.iter().find(|budget| budget.id == budget_id)
    }

    /// Opens a budget starting today and refreshes its status right away.
    pub fn create_budget(
        &mut self,
        category: &str,
        limit: f64,
        period: BudgetPeriod,
        transactions: &[Transaction],
        clock: &dyn Clock,
    ) -> ServiceResult<Budget> {
        ensure_positive("budget limit", limit)?;
        let budget = Budget::new(category.trim(), limit, period, clock.today());
        let id = budget.id;
        self.budgets.push(budget);
        self.update_status(id, transactions);
        tracing::info!(%id, category, limit, period = period.label(), "created budget");
        Ok(self.budgets[self.budgets.len() - 1].clone())
    }

    /// Recomputes spend for one budget. Returns `None` for an unknown id.
    pub fn update_status(
        &mut self,
        budget_id: Uuid,
        transactions: &[Transaction],
    ) -> Option<BudgetSnapshot> {
        let budget = self.budgets.iter_mut().find(|budget| budget.id == budget_id)?;
        Some(refresh(budget, transactions))
    }

    pub fn refresh_all(&mut self, transactions: &[Transaction]) -> Vec<BudgetSnapshot> {
        self.budgets
            .iter_mut()
            .map(|budget| refresh(budget, transactions))
            .collect()
    }

    /// At most one alert per budget, picking the highest tier reached.
    pub fn generate_alerts(
        &mut self,
        transactions: &[Transaction],
        clock: &dyn Clock,
    ) -> Vec<BudgetAlert> {
        let now = clock.now();
        let mut alerts = Vec::new();
        for budget in &mut self.budgets {
            let snapshot = refresh(budget, transactions);
            if !budget.notifications {
                continue;
            }
            let percentage = snapshot.percentage;
            let (kind, message) = if percentage >= EXCEEDED_THRESHOLD {
                (
                    AlertKind::Exceeded,
                    format!(
                        "You have exceeded your {} budget by {}",
                        budget.category,
                        format_percentage(percentage - 100.0)
                    ),
                )
            } else if percentage >= WARNING_THRESHOLD {
                (
                    AlertKind::Warning,
                    format!(
                        "You have used {} of your {} budget",
                        format_percentage(percentage),
                        budget.category
                    ),
                )
            } else if percentage >= APPROACHING_THRESHOLD {
                (
                    AlertKind::Approaching,
                    format!("You are approaching your {} budget limit", budget.category),
                )
            } else {
                continue;
            };
            alerts.push(BudgetAlert {
                id: format!("alert_{}_{}", now.timestamp_millis(), budget.id),
                budget_id: budget.id,
                kind,
                message,
                percentage,
                date: now,
            });
        }
        if !alerts.is_empty() {
            tracing::info!(count = alerts.len(), "budget alerts raised");
        }
        alerts
    }

    /// Limits for the top spending categories, with a 10% buffer over the average.
    pub fn suggest_budgets(transactions: &[Transaction]) -> Vec<BudgetSuggestion> {
        PatternAnalyzer::new(transactions)
            .analyze()
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|pattern| BudgetSuggestion {
                suggested_limit: (pattern.average_amount * SUGGESTION_BUFFER).ceil(),
                reasoning: format!(
                    "Based on your average of {} in {}",
                    format_currency(pattern.average_amount.round()),
                    pattern.category
                ),
                category: pattern.category,
            })
            .collect()
    }

    pub fn overview(&mut self, transactions: &[Transaction]) -> BudgetOverview {
        let snapshots = self.refresh_all(transactions);
        let mut overview = BudgetOverview::default();
        for snapshot in &snapshots {
            overview.total_limit += snapshot.limit;
            overview.total_spent += snapshot.spent;
            match snapshot.status {
                BudgetStatus::OnTrack => overview.on_track += 1,
                BudgetStatus::Warning => overview.warning += 1,
                BudgetStatus::Exceeded => overview.exceeded += 1,
            }
        }
        overview.remaining = overview.total_limit - overview.total_spent;
        overview
    }

    pub fn remove_budget(&mut self, budget_id: Uuid) -> Option<Budget> {
        let index = position_by_id(&self.budgets, budget_id)?;
        Some(self.budgets.remove(index))
    }
}

/// Dated expenses in the budget's category that fall inside its window.
fn spent_in_window(budget: &Budget, transactions: &[Transaction]) -> f64 {
    let key = budget.category_key();
    transactions
        .iter()
        .filter(|txn| txn.is_expense() && txn.category_key() == key)
        .filter(|txn| txn.date.is_some_and(|date| budget.covers(date)))
        .map(|txn| txn.amount)
        .sum()
}

fn refresh(budget: &mut Budget, transactions: &[Transaction]) -> BudgetSnapshot {
    let spent = spent_in_window(budget, transactions);
    let percentage = budget.percentage_for(spent);
    budget.status = BudgetStatus::from_percentage(percentage);
    tracing::debug!(budget = %budget.id, spent, percentage, "refreshed budget");
    BudgetSnapshot {
        budget_id: budget.id,
        category: budget.category.clone(),
        limit: budget.limit,
        spent,
        remaining: budget.limit - spent,
        percentage,
        status: budget.status,
    }
}
