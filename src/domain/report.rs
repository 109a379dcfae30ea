use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Month-over-month direction of a category's spend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MonthlyTrend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthAmount {
    pub month: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryAnalysis {
    pub category: String,
    pub total_amount: f64,
    pub transaction_count: usize,
    pub average_amount: f64,
    pub percentage: f64,
    pub trend: MonthlyTrend,
    pub monthly_data: Vec<MonthAmount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyReport {
    /// `YYYY-MM`.
    pub month: String,
    pub year: i32,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_income: f64,
    pub savings_rate: f64,
    pub top_categories: Vec<CategoryAnalysis>,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CashFlowPrediction {
    pub month: String,
    pub predicted_income: f64,
    pub predicted_expenses: f64,
    pub predicted_balance: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReportSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_income: f64,
    pub savings_rate: f64,
    pub average_monthly_income: f64,
    pub average_monthly_expenses: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct GrowthTrends {
    pub income_growth: f64,
    pub expense_growth: f64,
    pub savings_growth: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialReport {
    pub period: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub summary: ReportSummary,
    pub category_breakdown: Vec<CategoryAnalysis>,
    pub monthly_reports: Vec<MonthlyReport>,
    pub trends: GrowthTrends,
    pub cash_flow_predictions: Vec<CashFlowPrediction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
    pub savings_rate: f64,
}

/// Plain series handed to a presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "points", rename_all = "snake_case")]
pub enum ChartData {
    Income(Vec<MonthAmount>),
    Expenses(Vec<MonthAmount>),
    Categories(Vec<CategoryAmount>),
    Trends(Vec<TrendPoint>),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Income,
    Expenses,
    Categories,
    Trends,
}
