use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::Identifiable;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GoalCategory {
    Emergency,
    Vacation,
    Purchase,
    Investment,
    Debt,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalPriority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    #[default]
    Active,
    Completed,
    Paused,
}

/// A savings target with a deadline and tracked contributions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: NaiveDate,
    pub category: GoalCategory,
    #[serde(default)]
    pub priority: GoalPriority,
    #[serde(default)]
    pub status: GoalStatus,
    #[serde(default)]
    pub monthly_contribution: f64,
    #[serde(default)]
    pub auto_save: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Goal {
    pub fn is_active(&self) -> bool {
        self.status == GoalStatus::Active
    }

    pub fn is_completed(&self) -> bool {
        self.status == GoalStatus::Completed
    }

    pub fn remaining_amount(&self) -> f64 {
        self.target_amount - self.current_amount
    }
}

impl Identifiable for Goal {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Caller-supplied fields for a new goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalDraft {
    pub title: String,
    pub description: String,
    pub target_amount: f64,
    pub deadline: NaiveDate,
    pub category: GoalCategory,
    pub priority: GoalPriority,
    pub monthly_contribution: f64,
}

impl GoalDraft {
    pub fn new(
        title: impl Into<String>,
        target_amount: f64,
        deadline: NaiveDate,
        category: GoalCategory,
    ) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            target_amount,
            deadline,
            category,
            priority: GoalPriority::default(),
            monthly_contribution: 0.0,
        }
    }

    pub fn with_priority(mut self, priority: GoalPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_monthly_contribution(mut self, amount: f64) -> Self {
        self.monthly_contribution = amount;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalProgress {
    pub goal_id: Uuid,
    /// Clamped to 100 for display.
    pub percentage: f64,
    /// Unclamped; above 100 once the goal is overfunded.
    pub raw_percentage: f64,
    /// Never negative. An overfunded goal reports zero here, and the surplus
    /// shows up only in `raw_percentage`.
    pub remaining_amount: f64,
    pub months_remaining: u32,
    pub on_track: bool,
    pub suggested_monthly_amount: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GoalsByPriority {
    pub high: Vec<Goal>,
    pub medium: Vec<Goal>,
    pub low: Vec<Goal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GoalsSummary {
    pub total_goals: usize,
    pub active_goals: usize,
    pub completed_goals: usize,
    pub total_target: f64,
    pub total_saved: f64,
    pub total_remaining: f64,
    pub total_monthly_contribution: f64,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GoalRecommendations {
    pub emergency_fund: Option<Goal>,
    pub suggestions: Vec<String>,
}
