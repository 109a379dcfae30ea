use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{InsightService, NotificationService, PatternAnalyzer, RecommendationEngine};
use crate::config::Config;
use crate::core::services::{
    AccountBook, BudgetTracker, EntryRequest, EventCalendar, GoalTracker, ReportService,
};
use crate::domain::common::position_by_id;
use crate::domain::{
    Account, AccountEntry, AccountKind, AccountReport, AccountSummary, Budget, BudgetAlert,
    BudgetOverview, BudgetPeriod, BudgetSnapshot, BudgetSuggestion, CalendarCell,
    CashFlowPrediction, ChartData, ChartKind, DaySummary, Direction, EntryKind, EventDraft,
    EventKind, EventOccurrence, FinancialEvent, FinancialInsight, FinancialReport, Goal, GoalDraft,
    GoalProgress, GoalRecommendations, GoalsByPriority, GoalsSummary, MonthlyReport, Notification,
    Recommendation, SpendingPattern, SpendingPrediction, Transaction,
};
use crate::errors::{FinanceError, Result};
use crate::time::{Clock, SystemClock};
use crate::utils::persistence::{load_json, save_json};

/// Snapshot layout version written by [`FinanceManager::save`].
pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Serialized form of everything a [`FinanceManager`] owns.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FinanceSnapshot {
    #[serde(default = "FinanceSnapshot::default_schema")]
    pub schema_version: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub budgets: BudgetTracker,
    #[serde(default)]
    pub goals: GoalTracker,
    #[serde(default)]
    pub accounts: AccountBook,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub events: EventCalendar,
}

impl FinanceSnapshot {
    fn default_schema() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

/// Owns the transaction history and every tracker built on top of it.
///
/// All date-dependent behavior reads the injected [`Clock`].
pub struct FinanceManager {
    transactions: Vec<Transaction>,
    budgets: BudgetTracker,
    goals: GoalTracker,
    accounts: AccountBook,
    notifications: Vec<Notification>,
    events: EventCalendar,
    config: Config,
    clock: Box<dyn Clock>,
}

impl FinanceManager {
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: Config, clock: Box<dyn Clock>) -> Self {
        Self {
            transactions: Vec::new(),
            budgets: BudgetTracker::new(),
            goals: GoalTracker::new(),
            accounts: AccountBook::new(),
            notifications: Vec::new(),
            events: EventCalendar::new(),
            config,
            clock,
        }
    }

    pub fn from_snapshot(
        snapshot: FinanceSnapshot,
        config: Config,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        if snapshot.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(FinanceError::InvalidInput(format!(
                "snapshot schema {} is newer than supported version {}",
                snapshot.schema_version, CURRENT_SCHEMA_VERSION
            )));
        }
        Ok(Self {
            transactions: snapshot.transactions,
            budgets: snapshot.budgets,
            goals: snapshot.goals,
            accounts: snapshot.accounts,
            notifications: snapshot.notifications,
            events: snapshot.events,
            config,
            clock,
        })
    }

    pub fn snapshot(&self) -> FinanceSnapshot {
        FinanceSnapshot {
            schema_version: CURRENT_SCHEMA_VERSION,
            saved_at: Some(self.clock.now()),
            transactions: self.transactions.clone(),
            budgets: self.budgets.clone(),
            goals: self.goals.clone(),
            accounts: self.accounts.clone(),
            notifications: self.notifications.clone(),
            events: self.events.clone(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_json(&self.snapshot(), path)?;
        tracing::info!(
            path = %path.display(),
            transactions = self.transactions.len(),
            "saved finance snapshot"
        );
        Ok(())
    }

    pub fn load(path: &Path, config: Config, clock: Box<dyn Clock>) -> Result<Self> {
        let snapshot: FinanceSnapshot = load_json(path)?;
        tracing::info!(
            path = %path.display(),
            transactions = snapshot.transactions.len(),
            "loaded finance snapshot"
        );
        Self::from_snapshot(snapshot, config, clock)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    // Transactions

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> Uuid {
        let id = transaction.id;
        tracing::debug!(%id, category = %transaction.category, "added transaction");
        self.transactions.push(transaction);
        id
    }

    pub fn add_transactions(&mut self, transactions: impl IntoIterator<Item = Transaction>) {
        self.transactions.extend(transactions);
    }

    pub fn remove_transaction(&mut self, id: Uuid) -> Option<Transaction> {
        let index = position_by_id(&self.transactions, id)?;
        Some(self.transactions.remove(index))
    }

    // Analysis

    pub fn spending_patterns(&self) -> Vec<SpendingPattern> {
        PatternAnalyzer::new(&self.transactions).analyze()
    }

    pub fn recommendations(&self) -> Vec<Recommendation> {
        RecommendationEngine::new(&self.transactions).generate()
    }

    pub fn insights(&self) -> FinancialInsight {
        InsightService::generate(&self.transactions)
    }

    pub fn predict_future_spending(&self, months: u32) -> Vec<SpendingPrediction> {
        InsightService::predict_future_spending(&self.transactions, months)
    }

    pub fn detect_unusual_spending(&self) -> Vec<Transaction> {
        InsightService::detect_unusual_spending(&self.transactions)
    }

    // Budgets

    pub fn budgets(&self) -> &[Budget] {
        self.budgets.budgets()
    }

    /// Falls back to the configured default period when `period` is `None`.
    pub fn create_budget(
        &mut self,
        category: &str,
        limit: f64,
        period: Option<BudgetPeriod>,
    ) -> Result<Budget> {
        let period = period.unwrap_or(self.config.default_budget_period);
        Ok(self.budgets.create_budget(
            category,
            limit,
            period,
            &self.transactions,
            self.clock.as_ref(),
        )?)
    }

    pub fn update_budget_status(&mut self, budget_id: Uuid) -> Option<BudgetSnapshot> {
        self.budgets.update_status(budget_id, &self.transactions)
    }

    pub fn budget_alerts(&mut self) -> Vec<BudgetAlert> {
        self.budgets.generate_alerts(&self.transactions, self.clock.as_ref())
    }

    pub fn suggest_budgets(&self) -> Vec<BudgetSuggestion> {
        BudgetTracker::suggest_budgets(&self.transactions)
    }

    pub fn budget_overview(&mut self) -> BudgetOverview {
        self.budgets.overview(&self.transactions)
    }

    pub fn remove_budget(&mut self, budget_id: Uuid) -> Option<Budget> {
        self.budgets.remove_budget(budget_id)
    }

    // Goals

    pub fn goals(&self) -> &[Goal] {
        self.goals.goals()
    }

    pub fn create_goal(&mut self, draft: GoalDraft) -> Result<Goal> {
        Ok(self.goals.create_goal(draft, self.clock.as_ref())?)
    }

    pub fn update_goal_progress(&mut self, goal_id: Uuid, amount: f64) -> Option<Goal> {
        self.goals.update_progress(goal_id, amount, self.clock.as_ref())
    }

    pub fn goal_progress(&self, goal_id: Uuid) -> Option<GoalProgress> {
        self.goals.calculate_progress(goal_id, self.clock.as_ref())
    }

    pub fn goal_recommendations(
        &mut self,
        monthly_income: f64,
        monthly_expenses: f64,
    ) -> GoalRecommendations {
        self.goals.generate_goal_recommendations(
            monthly_income,
            monthly_expenses,
            self.config.emergency_fund_months,
            self.clock.as_ref(),
        )
    }

    /// Goal recommendations fed by the monthly averages of the recorded history.
    pub fn goal_recommendations_from_history(&mut self) -> GoalRecommendations {
        let summary = ReportService::summary(&self.transactions);
        self.goal_recommendations(summary.average_monthly_income, summary.average_monthly_expenses)
    }

    pub fn pause_goal(&mut self, goal_id: Uuid) -> Option<Goal> {
        self.goals.pause_goal(goal_id)
    }

    pub fn resume_goal(&mut self, goal_id: Uuid) -> Option<Goal> {
        self.goals.resume_goal(goal_id)
    }

    pub fn reopen_goal(&mut self, goal_id: Uuid) -> Option<Goal> {
        self.goals.reopen_goal(goal_id)
    }

    pub fn remove_goal(&mut self, goal_id: Uuid) -> Option<Goal> {
        self.goals.remove_goal(goal_id)
    }

    pub fn goals_by_priority(&self) -> GoalsByPriority {
        self.goals.goals_by_priority()
    }

    pub fn goals_summary(&self) -> GoalsSummary {
        self.goals.summary()
    }

    // Reports

    pub fn generate_report(&self, start: NaiveDate, end: NaiveDate) -> Result<FinancialReport> {
        if start > end {
            return Err(FinanceError::InvalidInput(format!(
                "report start {start} is after end {end}"
            )));
        }
        Ok(ReportService::generate_report(
            &self.transactions,
            start,
            end,
            self.config.forecast_horizon_months,
            self.clock.as_ref(),
        ))
    }

    pub fn monthly_reports(&self) -> Vec<MonthlyReport> {
        ReportService::monthly_reports(&self.transactions)
    }

    pub fn cash_flow_forecast(&self) -> Vec<CashFlowPrediction> {
        ReportService::predict_cash_flow(
            &self.monthly_reports(),
            self.config.forecast_horizon_months,
            self.clock.as_ref(),
        )
    }

    pub fn chart_data(&self, kind: ChartKind) -> ChartData {
        ReportService::chart_data(&self.transactions, kind)
    }

    // Notifications

    /// Replaces the notification list with a fresh evaluation.
    pub fn refresh_notifications(&mut self) -> &[Notification] {
        self.notifications = NotificationService::generate(&self.transactions, self.clock.as_ref());
        &self.notifications
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn dismiss_notification(&mut self, id: &str) -> bool {
        NotificationService::dismiss(&mut self.notifications, id)
    }

    pub fn active_notifications(&self) -> Vec<&Notification> {
        NotificationService::active(&self.notifications)
    }

    // Accounts

    pub fn accounts(&self) -> &[Account] {
        self.accounts.accounts()
    }

    pub fn create_account(
        &mut self,
        name: &str,
        kind: AccountKind,
        initial_balance: f64,
    ) -> Result<Account> {
        Ok(self.accounts.create_account(name, kind, initial_balance, self.clock.as_ref())?)
    }

    /// Posts to an account. Income and expense postings are also recorded in
    /// the transaction history, tagged with the account id.
    pub fn post_account_entry(
        &mut self,
        account_id: Uuid,
        request: EntryRequest,
    ) -> Result<AccountEntry> {
        let entry = self.accounts.add_entry(account_id, request, self.clock.as_ref())?;
        let transaction = match entry.kind {
            EntryKind::Income => Some(Transaction::income(
                entry.description.clone(),
                entry.amount,
                entry.category.clone(),
                entry.date,
            )),
            EntryKind::Expense => Some(Transaction::expense(
                entry.description.clone(),
                entry.amount,
                entry.category.clone(),
                entry.date,
            )),
            EntryKind::Transfer => None,
        };
        if let Some(transaction) = transaction {
            self.add_transaction(transaction.with_account(account_id));
        }
        Ok(entry)
    }

    pub fn account_summary(&self) -> AccountSummary {
        self.accounts.summary(self.clock.as_ref())
    }

    pub fn account_report(&self, account_id: Uuid, months: u32) -> Result<AccountReport> {
        self.accounts
            .account_report(account_id, months, self.clock.as_ref())
            .ok_or_else(|| FinanceError::AccountNotFound(account_id.to_string()))
    }

    pub fn balance_by_kind(&self, kind: AccountKind) -> f64 {
        self.accounts.balance_by_kind(kind)
    }

    pub fn deactivate_account(&mut self, account_id: Uuid) -> Option<Account> {
        self.accounts.deactivate(account_id, self.clock.as_ref())
    }

    // Calendar

    pub fn events(&self) -> &[FinancialEvent] {
        self.events.events()
    }

    /// Schedules an event. Income and expense events are also recorded in the
    /// transaction history on their date, and the event keeps the entry's id.
    pub fn add_event(&mut self, draft: EventDraft) -> Result<FinancialEvent> {
        let event = self.events.add_event(draft, self.clock.as_ref())?;
        let direction = match event.kind {
            EventKind::Income => Direction::Income,
            EventKind::Expense => Direction::Expense,
            EventKind::Reminder | EventKind::Goal => return Ok(event),
        };
        let transaction = Transaction::new(
            event.title.clone(),
            event.amount,
            event.category.clone(),
            event.date,
            direction,
        );
        let transaction_id = self.add_transaction(transaction);
        Ok(self.events.link_transaction(event.id, transaction_id).unwrap_or(event))
    }

    pub fn events_on(&self, date: NaiveDate) -> Vec<FinancialEvent> {
        self.events.events_on(date)
    }

    pub fn day_summary(&self, date: NaiveDate) -> DaySummary {
        self.events.day_summary(date, &self.transactions)
    }

    pub fn upcoming_events(&self) -> Vec<EventOccurrence> {
        self.events.upcoming(self.clock.as_ref())
    }

    pub fn toggle_event_status(&mut self, event_id: Uuid) -> Option<FinancialEvent> {
        self.events.toggle_status(event_id)
    }

    pub fn mark_overdue_events(&mut self) -> usize {
        self.events.mark_overdue(self.clock.as_ref())
    }

    /// Drops the event only; a mirrored transaction stays in the history.
    pub fn remove_event(&mut self, event_id: Uuid) -> Option<FinancialEvent> {
        self.events.remove_event(event_id)
    }

    pub fn calendar_month(&self, year: i32, month: u32) -> Result<Vec<CalendarCell>> {
        Ok(self.events.month_grid(year, month, &self.transactions, self.clock.as_ref())?)
    }
}

impl Default for FinanceManager {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GoalCategory;
    use crate::time::FixedClock;
    use tempfile::tempdir;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn manager() -> FinanceManager {
        FinanceManager::with_clock(Config::default(), Box::new(FixedClock::at_date(date(3, 1))))
    }

    #[test]
    fn budget_uses_configured_default_period() {
        let mut fm = FinanceManager::with_clock(
            Config {
                default_budget_period: BudgetPeriod::Weekly,
                ..Config::default()
            },
            Box::new(FixedClock::at_date(date(3, 1))),
        );
        let budget = fm.create_budget("Food", 100.0, None).unwrap();
        assert_eq!(budget.period, BudgetPeriod::Weekly);
        assert_eq!(budget.end_date, date(3, 8));
        assert!(matches!(
            fm.create_budget("Food", -1.0, None),
            Err(FinanceError::InvalidInput(_))
        ));
    }

    #[test]
    fn account_postings_feed_transaction_history() {
        let mut fm = manager();
        let account = fm.create_account("Checking", AccountKind::Checking, 0.0).unwrap();
        fm.post_account_entry(
            account.id,
            EntryRequest::expense("Groceries", 80.0, "Food", date(3, 1)),
        )
        .unwrap();
        assert_eq!(fm.transactions().len(), 1);
        assert_eq!(fm.transactions()[0].account_id, Some(account.id));
        let missing = Uuid::new_v4();
        let err = fm
            .post_account_entry(missing, EntryRequest::expense("x", 1.0, "Misc", date(3, 1)))
            .unwrap_err();
        assert!(matches!(err, FinanceError::AccountNotFound(_)));
    }

    #[test]
    fn snapshot_round_trip_keeps_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("finance.json");
        let mut fm = manager();
        fm.add_transaction(Transaction::expense("Lunch", 12.0, "Food", date(3, 1)));
        fm.create_budget("Food", 100.0, Some(BudgetPeriod::Monthly)).unwrap();
        fm.create_goal(GoalDraft::new("Trip", 500.0, date(9, 1), GoalCategory::Vacation)).unwrap();
        fm.add_event(EventDraft::new("Rent", 700.0, EventKind::Expense, date(3, 5))).unwrap();
        fm.save(&path).unwrap();

        let loaded = FinanceManager::load(
            &path,
            Config::default(),
            Box::new(FixedClock::at_date(date(3, 1))),
        )
        .unwrap();
        assert_eq!(loaded.transactions(), fm.transactions());
        assert_eq!(loaded.budgets(), fm.budgets());
        assert_eq!(loaded.goals(), fm.goals());
        assert_eq!(loaded.events(), fm.events());
    }

    #[test]
    fn newer_schema_is_rejected() {
        let snapshot = FinanceSnapshot {
            schema_version: CURRENT_SCHEMA_VERSION + 1,
            ..FinanceSnapshot::default()
        };
        let result =
            FinanceManager::from_snapshot(snapshot, Config::default(), Box::new(SystemClock));
        assert!(result.is_err());
    }

    #[test]
    fn income_and_expense_events_are_mirrored_once() {
        let mut fm = manager();
        let rent = fm
            .add_event(EventDraft::new("Rent", 700.0, EventKind::Expense, date(3, 5)))
            .unwrap();
        let reminder = fm
            .add_event(EventDraft::new("Renew card", 1.0, EventKind::Reminder, date(3, 5)))
            .unwrap();
        assert_eq!(fm.transactions().len(), 1);
        assert_eq!(rent.transaction_id, Some(fm.transactions()[0].id));
        assert_eq!(reminder.transaction_id, None);
        assert!((fm.day_summary(date(3, 5)).balance + 700.0).abs() < 1e-9);
    }

    #[test]
    fn report_rejects_inverted_range() {
        let fm = manager();
        assert!(fm.generate_report(date(3, 1), date(1, 1)).is_err());
    }
}
