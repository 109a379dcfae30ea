//! Finance domain models and persistence-friendly types.

pub mod account;
pub mod budget;
pub mod common;
pub mod event;
pub mod goal;
pub mod notification;
pub mod recommendation;
pub mod report;
pub mod transaction;

pub use account::{
    Account, AccountEntry, AccountKind, AccountMonth, AccountReport, AccountSummary, EntryKind,
};
pub use budget::{
    AlertKind, Budget, BudgetAlert, BudgetOverview, BudgetPeriod, BudgetSnapshot, BudgetStatus,
    BudgetSuggestion,
};
pub use common::{month_key, CategoryKey, Identifiable};
pub use event::{
    CalendarCell, DaySummary, DayTone, EventDraft, EventKind, EventOccurrence, EventStatus,
    FinancialEvent, Recurrence,
};
pub use goal::{
    Goal, GoalCategory, GoalDraft, GoalPriority, GoalProgress, GoalRecommendations, GoalStatus,
    GoalsByPriority, GoalsSummary,
};
pub use notification::{Notification, NotificationKind, NotificationPriority, NotificationTopic};
pub use recommendation::{
    FinancialInsight, Impact, Recommendation, RecommendationKind, SpendingPattern,
    SpendingPrediction, Trend,
};
pub use report::{
    CashFlowPrediction, CategoryAmount, CategoryAnalysis, ChartData, ChartKind, FinancialReport,
    GrowthTrends, MonthAmount, MonthlyReport, MonthlyTrend, ReportSummary, TrendPoint,
};
pub use transaction::{Direction, Transaction};
