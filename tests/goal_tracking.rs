mod common;

use common::{date, half_year_history, manager_at};
use finance_core::core::services::ReportService;
use finance_core::domain::{GoalCategory, GoalDraft, GoalPriority, GoalStatus};

fn laptop() -> GoalDraft {
    GoalDraft::new("Laptop", 1000.0, date(2024, 12, 31), GoalCategory::Purchase)
        .with_priority(GoalPriority::Medium)
        .with_monthly_contribution(100.0)
}

#[test]
fn completion_is_sticky_until_reopened() {
    let mut fm = manager_at(date(2024, 1, 1));
    let goal = fm.create_goal(laptop()).unwrap();
    assert_eq!(goal.status, GoalStatus::Active);

    let partial = fm.update_goal_progress(goal.id, 600.0).unwrap();
    assert_eq!(partial.status, GoalStatus::Active);
    assert!(partial.completed_at.is_none());

    let done = fm.update_goal_progress(goal.id, 500.0).unwrap();
    assert_eq!(done.status, GoalStatus::Completed);
    let completed_at = done.completed_at.expect("completion time");

    let progress = fm.goal_progress(goal.id).unwrap();
    assert_eq!(progress.percentage, 100.0);
    assert!((progress.raw_percentage - 110.0).abs() < 1e-9);
    assert_eq!(progress.remaining_amount, 0.0);

    // Withdrawing below the target does not undo completion.
    let withdrawn = fm.update_goal_progress(goal.id, -300.0).unwrap();
    assert_eq!(withdrawn.current_amount, 800.0);
    assert_eq!(withdrawn.status, GoalStatus::Completed);
    assert_eq!(withdrawn.completed_at, Some(completed_at));

    let reopened = fm.reopen_goal(goal.id).unwrap();
    assert_eq!(reopened.status, GoalStatus::Active);
    assert!(reopened.completed_at.is_none());
    assert_eq!(fm.goal_progress(goal.id).unwrap().percentage, 80.0);
}

#[test]
fn pause_and_resume_only_move_matching_states() {
    let mut fm = manager_at(date(2024, 1, 1));
    let goal = fm.create_goal(laptop()).unwrap();
    assert_eq!(fm.pause_goal(goal.id).unwrap().status, GoalStatus::Paused);
    assert_eq!(fm.pause_goal(goal.id).unwrap().status, GoalStatus::Paused);
    assert!(fm.goals_by_priority().medium.is_empty());
    assert_eq!(fm.resume_goal(goal.id).unwrap().status, GoalStatus::Active);
    assert_eq!(fm.goals_by_priority().medium.len(), 1);
}

#[test]
fn rejects_non_positive_targets() {
    let mut fm = manager_at(date(2024, 1, 1));
    let draft = GoalDraft::new("Nothing", 0.0, date(2024, 6, 1), GoalCategory::Other);
    assert!(fm.create_goal(draft).is_err());
    assert!(fm.goals().is_empty());
}

#[test]
fn history_backed_recommendations_add_one_emergency_fund() {
    let mut fm = manager_at(date(2024, 7, 1));
    fm.add_transactions(half_year_history());
    let summary = ReportService::summary(fm.transactions());

    let first = fm.goal_recommendations_from_history();
    let fund = first.emergency_fund.expect("emergency fund proposed");
    assert_eq!(fund.category, GoalCategory::Emergency);
    assert_eq!(fund.priority, GoalPriority::High);
    assert!((fund.target_amount - summary.average_monthly_expenses * 6.0).abs() < 1e-6);
    assert_eq!(fm.goals().len(), 1);

    let second = fm.goal_recommendations_from_history();
    assert!(second.emergency_fund.is_none());
    assert_eq!(fm.goals().len(), 1);
}

#[test]
fn summary_counts_every_goal_but_sums_active_ones() {
    let mut fm = manager_at(date(2024, 1, 1));
    let a = fm.create_goal(laptop()).unwrap();
    let b = fm
        .create_goal(GoalDraft::new("Trip", 2000.0, date(2024, 8, 1), GoalCategory::Vacation))
        .unwrap();
    fm.update_goal_progress(a.id, 1000.0);
    fm.update_goal_progress(b.id, 500.0);

    let summary = fm.goals_summary();
    assert_eq!(summary.total_goals, 2);
    assert_eq!(summary.completed_goals, 1);
    assert_eq!(summary.active_goals, 1);
    assert_eq!(summary.total_target, 2000.0);
    assert_eq!(summary.total_saved, 500.0);
    assert_eq!(summary.completion_rate, 50.0);
}
