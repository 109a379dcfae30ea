use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::format_currency;
use crate::domain::common::{months_between, percent_of, position_by_id};
use crate::domain::{
    Goal, GoalCategory, GoalDraft, GoalPriority, GoalProgress, GoalRecommendations, GoalStatus,
    GoalsByPriority, GoalsSummary,
};
use crate::time::Clock;

use super::{ensure_positive, ServiceResult};

/// A goal is on track while its progress is at least this share of the expected progress.
const ON_TRACK_RATIO: f64 = 0.8;
/// Share of the monthly surplus proposed as an emergency-fund contribution.
const EMERGENCY_SURPLUS_SHARE: f64 = 0.3;
const EMERGENCY_HORIZON_DAYS: i64 = 365;
/// Surplus above this share of income earns an investing suggestion.
const INVESTING_SURPLUS_SHARE: f64 = 0.2;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct GoalTracker {
    goals: Vec<Goal>,
}

impl GoalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_goals(goals: Vec<Goal>) -> Self {
        Self { goals }
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn get(&self, goal_id: Uuid) -> Option<&Goal> {
        self.goals.iter().find(|goal| goal.id == goal_id)
    }

    pub fn create_goal(&mut self, draft: GoalDraft, clock: &dyn Clock) -> ServiceResult<Goal> {
        ensure_positive("goal target", draft.target_amount)?;
        let goal = Goal {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            target_amount: draft.target_amount,
            current_amount: 0.0,
            deadline: draft.deadline,
            category: draft.category,
            priority: draft.priority,
            status: GoalStatus::Active,
            monthly_contribution: draft.monthly_contribution.max(0.0),
            auto_save: false,
            created_at: clock.now(),
            completed_at: None,
        };
        tracing::info!(
            id = %goal.id,
            title = %goal.title,
            target = goal.target_amount,
            "created goal"
        );
        self.goals.push(goal.clone());
        Ok(goal)
    }

    /// Adds `amount` to the saved total. Reaching the target completes the goal,
    /// and a completed goal stays completed until [`GoalTracker::reopen_goal`].
    pub fn update_progress(
        &mut self,
        goal_id: Uuid,
        amount: f64,
        clock: &dyn Clock,
    ) -> Option<Goal> {
        let goal = self.find_mut(goal_id)?;
        if amount.is_finite() {
            goal.current_amount += amount;
        } else {
            tracing::warn!(goal = %goal_id, "ignoring non-finite contribution");
        }
        if goal.current_amount >= goal.target_amount && !goal.is_completed() {
            goal.status = GoalStatus::Completed;
            goal.completed_at = Some(clock.now());
            tracing::info!(goal = %goal_id, "goal completed");
        }
        Some(goal.clone())
    }

    /// Progress toward the target. `remaining_amount` and the suggested monthly
    /// amount floor at zero for overfunded goals.
    pub fn calculate_progress(&self, goal_id: Uuid, clock: &dyn Clock) -> Option<GoalProgress> {
        let goal = self.get(goal_id)?;
        let today = clock.today();
        let raw_percentage = percent_of(goal.current_amount, goal.target_amount);
        let remaining_amount = (goal.target_amount - goal.current_amount).max(0.0);
        let months_remaining = months_between(today, goal.deadline).max(0) as u32;
        let suggested_monthly_amount = if months_remaining > 0 {
            remaining_amount / months_remaining as f64
        } else {
            remaining_amount
        };

        let expected = if months_remaining > 0 {
            let created = goal.created_at.date_naive();
            let total_days = (goal.deadline - created).num_days();
            if total_days <= 0 {
                100.0
            } else {
                let elapsed = (today - created).num_days().max(0);
                elapsed as f64 / total_days as f64 * 100.0
            }
        } else {
            100.0
        };

        Some(GoalProgress {
            goal_id,
            percentage: raw_percentage.clamp(0.0, 100.0),
            raw_percentage,
            remaining_amount,
            months_remaining,
            on_track: raw_percentage >= expected * ON_TRACK_RATIO,
            suggested_monthly_amount,
        })
    }

    /// Proposes an emergency fund when none is active and there is a surplus.
    /// The proposed goal is added to the tracker.
    pub fn generate_goal_recommendations(
        &mut self,
        monthly_income: f64,
        monthly_expenses: f64,
        emergency_fund_months: u32,
        clock: &dyn Clock,
    ) -> GoalRecommendations {
        let available = monthly_income - monthly_expenses;
        let mut recommendations = GoalRecommendations::default();

        let has_emergency_fund = self
            .goals
            .iter()
            .any(|goal| goal.category == GoalCategory::Emergency && goal.is_active());
        let target = monthly_expenses * emergency_fund_months as f64;
        if !has_emergency_fund && available > 0.0 && target > 0.0 {
            let contribution = (available * EMERGENCY_SURPLUS_SHARE).min(target / 12.0);
            let draft = GoalDraft::new(
                "Emergency Fund",
                target,
                clock.today() + Duration::days(EMERGENCY_HORIZON_DAYS),
                GoalCategory::Emergency,
            )
            .with_priority(GoalPriority::High)
            .with_monthly_contribution(contribution)
            .with_description(format!(
                "{emergency_fund_months} months of expenses ({})",
                format_currency(target)
            ));
            if let Ok(goal) = self.create_goal(draft, clock) {
                recommendations.emergency_fund = Some(goal);
                recommendations
                    .suggestions
                    .push("Building an emergency fund is your top priority".into());
            }
        }

        if available > monthly_income * INVESTING_SURPLUS_SHARE {
            recommendations
                .suggestions
                .push("Consider investing in an index fund for the long term".into());
        }

        if !self.goals.iter().any(Goal::is_active) {
            recommendations
                .suggestions
                .push("Set at least one financial goal to stay motivated".into());
        }

        let completed = self.goals.iter().filter(|goal| goal.is_completed()).count();
        if completed > 0 {
            recommendations.suggestions.push(format!(
                "Congratulations! You have completed {completed} goal{}",
                if completed > 1 { "s" } else { "" }
            ));
        }

        recommendations
    }

    pub fn pause_goal(&mut self, goal_id: Uuid) -> Option<Goal> {
        self.transition(goal_id, GoalStatus::Active, GoalStatus::Paused)
    }

    pub fn resume_goal(&mut self, goal_id: Uuid) -> Option<Goal> {
        self.transition(goal_id, GoalStatus::Paused, GoalStatus::Active)
    }

    /// Puts a completed goal back to active and clears its completion time.
    pub fn reopen_goal(&mut self, goal_id: Uuid) -> Option<Goal> {
        let goal = self.find_mut(goal_id)?;
        if goal.is_completed() {
            goal.status = GoalStatus::Active;
            goal.completed_at = None;
            tracing::info!(goal = %goal_id, "goal reopened");
        }
        Some(goal.clone())
    }

    /// Active goals grouped by priority.
    pub fn goals_by_priority(&self) -> GoalsByPriority {
        let mut grouped = GoalsByPriority::default();
        for goal in self.goals.iter().filter(|goal| goal.is_active()) {
            let bucket = match goal.priority {
                GoalPriority::High => &mut grouped.high,
                GoalPriority::Medium => &mut grouped.medium,
                GoalPriority::Low => &mut grouped.low,
            };
            bucket.push(goal.clone());
        }
        grouped
    }

    /// Money totals cover active goals only; counts cover every goal.
    pub fn summary(&self) -> GoalsSummary {
        let active: Vec<&Goal> = self.goals.iter().filter(|goal| goal.is_active()).collect();
        let completed_goals = self.goals.iter().filter(|goal| goal.is_completed()).count();
        let total_target: f64 = active.iter().map(|goal| goal.target_amount).sum();
        let total_saved: f64 = active.iter().map(|goal| goal.current_amount).sum();
        GoalsSummary {
            total_goals: self.goals.len(),
            active_goals: active.len(),
            completed_goals,
            total_target,
            total_saved,
            total_remaining: total_target - total_saved,
            total_monthly_contribution: active.iter().map(|goal| goal.monthly_contribution).sum(),
            completion_rate: percent_of(completed_goals as f64, self.goals.len() as f64),
        }
    }

    pub fn remove_goal(&mut self, goal_id: Uuid) -> Option<Goal> {
        let index = position_by_id(&self.goals, goal_id)?;
        Some(self.goals.remove(index))
    }

    fn find_mut(&mut self, goal_id: Uuid) -> Option<&mut Goal> {
        self.goals.iter_mut().find(|goal| goal.id == goal_id)
    }

    /// Moves a goal between statuses; a goal in any other status is returned unchanged.
    fn transition(&mut self, goal_id: Uuid, from: GoalStatus, to: GoalStatus) -> Option<Goal> {
        let goal = self.find_mut(goal_id)?;
        if goal.status == from {
            goal.status = to;
            tracing::info!(goal = %goal_id, ?from, ?to, "goal status changed");
        }
        Some(goal.clone())
    }
}
