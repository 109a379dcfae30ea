//! Spending analysis: patterns, recommendations, insights, and notifications.

pub mod aggregation;
pub mod insights;
pub mod notifications;
pub mod patterns;
pub mod recommendations;

pub use aggregation::{aggregate_by_category, distinct_months, expense_categories, total_for};
pub use insights::InsightService;
pub use notifications::NotificationService;
pub use patterns::PatternAnalyzer;
pub use recommendations::{RecommendationEngine, SpendingTotals};
