use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

/// Per-category spending statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpendingPattern {
    pub category: String,
    pub average_amount: f64,
    pub frequency: usize,
    pub trend: Trend,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Saving,
    Budget,
    Warning,
    Opportunity,
    Goal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub id: String,
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub impact: Impact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub suggested_action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential_saving: Option<f64>,
    /// Lower values are shown first.
    pub priority: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialInsight {
    pub total_spending: f64,
    pub average_monthly_spending: f64,
    pub top_categories: Vec<SpendingPattern>,
    pub spending_trend: Trend,
    pub savings_rate: f64,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpendingPrediction {
    pub category: String,
    pub predicted_amount: f64,
}
