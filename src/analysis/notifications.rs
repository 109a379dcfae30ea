//! Smart notifications derived from the last weeks of activity.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::analysis::aggregation::aggregate_by_category;
use crate::currency::{format_currency, format_percentage};
use crate::domain::common::shift_month;
use crate::domain::{
    Notification, NotificationKind, NotificationPriority, NotificationTopic, Transaction,
};
use crate::time::Clock;

const HIGH_EXPENSE_FACTOR: f64 = 2.0;
const TOP_CATEGORY_FACTOR: f64 = 3.0;
const LOW_SAVINGS_RATE: f64 = 10.0;
const GOOD_SAVINGS_RATE: f64 = 20.0;
const WEEKLY_SWING_PERCENT: f64 = 20.0;

pub struct NotificationService;

impl NotificationService {
    /// Evaluates every notification rule against `transactions` as of the clock's today.
    pub fn generate(transactions: &[Transaction], clock: &dyn Clock) -> Vec<Notification> {
        let now = clock.now();
        let today = clock.today();
        let week_ago = today - Duration::days(7);
        let two_weeks_ago = today - Duration::days(14);
        let month_ago = shift_month(today, -1);

        let this_week: Vec<&Transaction> = expenses_between(transactions, week_ago, None);
        let week_total: f64 = this_week.iter().map(|txn| txn.amount).sum();
        let average = week_total / this_week.len().max(1) as f64;
        let mut out = Emitter::new(now);

        let high = this_week
            .iter()
            .filter(|txn| txn.amount > average * HIGH_EXPENSE_FACTOR)
            .count();
        if high > 0 {
            out.push(
                "high_expense",
                NotificationKind::Warning,
                "Unusual spending detected",
                format!(
                    "You had {high} expense{} above your average this week.",
                    if high > 1 { "s" } else { "" }
                ),
                NotificationTopic::Spending,
                NotificationPriority::High,
            );
        }

        let top = aggregate_by_category(this_week.iter().copied(), |_| true)
            .into_iter()
            .max_by(|a, b| a.total.total_cmp(&b.total));
        if let Some(top) = top.filter(|top| top.total > average * TOP_CATEGORY_FACTOR) {
            out.push(
                "category_alert",
                NotificationKind::Info,
                "Top spending category",
                format!(
                    "You spent {} on {} this week.",
                    format_currency(top.total),
                    top.label
                ),
                NotificationTopic::Analysis,
                NotificationPriority::Medium,
            );
        }

        let month_income: f64 = transactions
            .iter()
            .filter(|txn| txn.is_income() && txn.date.is_some_and(|date| date >= month_ago))
            .map(|txn| txn.amount)
            .sum();
        if month_income > 0.0 {
            out.push(
                "income_summary",
                NotificationKind::Success,
                "Income summary",
                format!(
                    "You received {} in income this month. Nice work!",
                    format_currency(month_income)
                ),
                NotificationTopic::Income,
                NotificationPriority::Low,
            );

            let savings_rate = (month_income - week_total) / month_income * 100.0;
            if savings_rate < LOW_SAVINGS_RATE {
                out.push(
                    "savings_reminder",
                    NotificationKind::Warning,
                    "Low savings rate",
                    format!(
                        "Your savings rate is {}. Consider trimming some expenses.",
                        format_percentage(savings_rate)
                    ),
                    NotificationTopic::Savings,
                    NotificationPriority::High,
                );
            } else if savings_rate >= GOOD_SAVINGS_RATE {
                out.push(
                    "savings_good",
                    NotificationKind::Success,
                    "Great saving!",
                    format!(
                        "Your savings rate is {}. Keep it up!",
                        format_percentage(savings_rate)
                    ),
                    NotificationTopic::Savings,
                    NotificationPriority::Low,
                );
            }
        }

        let last_week_total: f64 = expenses_between(transactions, two_weeks_ago, Some(week_ago))
            .iter()
            .map(|txn| txn.amount)
            .sum();
        if last_week_total > 0.0 {
            let change = (week_total - last_week_total) / last_week_total * 100.0;
            if change > WEEKLY_SWING_PERCENT {
                out.push(
                    "trend_increase",
                    NotificationKind::Warning,
                    "Spending is up",
                    format!(
                        "Your spending rose {} compared with last week.",
                        format_percentage(change)
                    ),
                    NotificationTopic::Trends,
                    NotificationPriority::Medium,
                );
            } else if change < -WEEKLY_SWING_PERCENT {
                out.push(
                    "trend_decrease",
                    NotificationKind::Success,
                    "Spending is down",
                    format!(
                        "You cut your spending by {} this week!",
                        format_percentage(change.abs())
                    ),
                    NotificationTopic::Trends,
                    NotificationPriority::Low,
                );
            }
        }

        let notifications = out.finish();
        tracing::debug!(count = notifications.len(), "generated notifications");
        notifications
    }

    /// Marks a notification dismissed. Unknown ids are ignored.
    pub fn dismiss(notifications: &mut [Notification], id: &str) -> bool {
        match notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.dismissed = true;
                true
            }
            None => false,
        }
    }

    pub fn active(notifications: &[Notification]) -> Vec<&Notification> {
        notifications.iter().filter(|n| !n.dismissed).collect()
    }
}

/// Expenses dated on or after `from` and, when given, strictly before `until`.
fn expenses_between(
    transactions: &[Transaction],
    from: NaiveDate,
    until: Option<NaiveDate>,
) -> Vec<&Transaction> {
    transactions
        .iter()
        .filter(|txn| txn.is_expense())
        .filter(|txn| {
            txn.date
                .is_some_and(|date| date >= from && until.map_or(true, |end| date < end))
        })
        .collect()
}

struct Emitter {
    now: DateTime<Utc>,
    items: Vec<Notification>,
}

impl Emitter {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            items: Vec::new(),
        }
    }

    fn push(
        &mut self,
        slug: &str,
        kind: NotificationKind,
        title: &str,
        message: String,
        topic: NotificationTopic,
        priority: NotificationPriority,
    ) {
        self.items.push(Notification {
            id: format!("{slug}_{}", self.now.timestamp_millis()),
            kind,
            title: title.to_string(),
            message,
            topic,
            priority,
            timestamp: self.now,
            dismissed: false,
        });
    }

    fn finish(self) -> Vec<Notification> {
        self.items
    }
}
