mod common;

use common::{date, food_scenario, manager_at};
use finance_core::core::services::BudgetTracker;
use finance_core::domain::{AlertKind, Budget, BudgetPeriod, BudgetStatus, Transaction};
use finance_core::time::FixedClock;

#[test]
fn food_budget_over_quarter_is_exceeded() {
    let txns = food_scenario();
    let clock = FixedClock::at_date(date(2024, 1, 1));
    let mut tracker = BudgetTracker::new();
    let budget = tracker
        .create_budget("Food", 900.0, BudgetPeriod::Yearly, &txns, &clock)
        .unwrap();
    assert_eq!(tracker.budgets()[0].status, BudgetStatus::Exceeded);

    let snapshot = tracker.update_status(budget.id, &txns).unwrap();
    assert_eq!(snapshot.spent, 2000.0);
    assert!((snapshot.percentage - 222.22).abs() < 0.01);
    assert_eq!(snapshot.remaining, -1100.0);

    let alerts = tracker.generate_alerts(&txns, &clock);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::Exceeded);
    assert_eq!(alerts[0].budget_id, budget.id);
}

#[test]
fn status_only_climbs_as_spending_grows() {
    let clock = FixedClock::at_date(date(2024, 5, 1));
    let mut tracker = BudgetTracker::new();
    let budget = tracker
        .create_budget("Fun", 100.0, BudgetPeriod::Monthly, &[], &clock)
        .unwrap();
    let mut txns = Vec::new();
    let mut last = BudgetStatus::OnTrack;
    for day in 2..=12u32 {
        txns.push(Transaction::expense("treat", 12.0, "Fun", date(2024, 5, day)));
        let status = tracker.update_status(budget.id, &txns).unwrap().status;
        assert!(status >= last, "status regressed on day {day}");
        last = status;
    }
    assert_eq!(last, BudgetStatus::Exceeded);
}

#[test]
fn zero_limit_budget_reads_full_when_spent() {
    let start = date(2024, 1, 1);
    let mut tracker =
        BudgetTracker::from_budgets(vec![Budget::new("Gifts", 0.0, BudgetPeriod::Monthly, start)]);
    let id = tracker.budgets()[0].id;
    let empty = tracker.update_status(id, &[]).unwrap();
    assert_eq!(empty.percentage, 0.0);
    let txns = vec![Transaction::expense("gift", 5.0, "Gifts", date(2024, 1, 3))];
    let spent = tracker.update_status(id, &txns).unwrap();
    assert_eq!(spent.percentage, 100.0);
    assert_eq!(spent.status, BudgetStatus::Exceeded);
}

#[test]
fn manager_overview_and_suggestions() {
    let mut fm = manager_at(date(2024, 1, 1));
    fm.add_transactions(food_scenario());
    fm.create_budget("food", 900.0, Some(BudgetPeriod::Yearly)).unwrap();
    fm.create_budget("Travel", 300.0, None).unwrap();
    let overview = fm.budget_overview();
    assert_eq!(overview.total_limit, 1200.0);
    assert_eq!(overview.total_spent, 2000.0);
    assert_eq!((overview.on_track, overview.exceeded), (1, 1));

    let suggestions = fm.suggest_budgets();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].suggested_limit, 734.0);
}
