use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{days_in_month, Identifiable};
use super::transaction::Transaction;

/// Category used when a draft leaves it blank.
pub const DEFAULT_EVENT_CATEGORY: &str = "Other";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Income,
    Expense,
    Reminder,
    Goal,
}

impl EventKind {
    /// Only income and expense events move money on the day they fall.
    pub fn affects_balance(self) -> bool {
        matches!(self, EventKind::Income | EventKind::Expense)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Pending,
    Completed,
    Overdue,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Recurrence {
    /// Whether an event anchored on `anchor` falls on `date`.
    ///
    /// Monthly and yearly repeats keep the anchor's day, clamped to shorter months.
    pub fn occurs_on(self, anchor: NaiveDate, date: NaiveDate) -> bool {
        if date < anchor {
            return false;
        }
        let clamped_day = |year, month| anchor.day().min(days_in_month(year, month));
        match self {
            Recurrence::None => date == anchor,
            Recurrence::Daily => true,
            Recurrence::Weekly => (date - anchor).num_days() % 7 == 0,
            Recurrence::Monthly => date.day() == clamped_day(date.year(), date.month()),
            Recurrence::Yearly => {
                date.month() == anchor.month()
                    && date.day() == clamped_day(date.year(), date.month())
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Recurrence::None => "once",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
            Recurrence::Yearly => "yearly",
        }
    }
}

/// A scheduled income, expense, reminder, or goal contribution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialEvent {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    pub kind: EventKind,
    pub date: NaiveDate,
    pub category: String,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default)]
    pub status: EventStatus,
    /// History entry recorded for this event, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<Uuid>,
}

impl FinancialEvent {
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.recurrence.occurs_on(self.date, date)
    }

    /// Signed effect on a day's balance; reminders and goals contribute nothing.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            EventKind::Income => self.amount,
            EventKind::Expense => -self.amount,
            EventKind::Reminder | EventKind::Goal => 0.0,
        }
    }
}

impl Identifiable for FinancialEvent {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub amount: f64,
    pub kind: EventKind,
    pub date: NaiveDate,
    pub category: String,
    pub recurrence: Recurrence,
}

impl EventDraft {
    pub fn new(title: impl Into<String>, amount: f64, kind: EventKind, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            amount,
            kind,
            date,
            category: DEFAULT_EVENT_CATEGORY.into(),
            recurrence: Recurrence::None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn repeating(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }
}

/// One event occurrence on a concrete date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventOccurrence {
    pub date: NaiveDate,
    pub event: FinancialEvent,
}

/// Sign of a day's net movement, `Empty` when nothing happens that day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DayTone {
    Empty,
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub events: Vec<FinancialEvent>,
    pub transactions: Vec<Transaction>,
    pub balance: f64,
    pub tone: DayTone,
}

/// A cell of a six-week month grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarCell {
    pub summary: DaySummary,
    pub in_month: bool,
    pub is_today: bool,
}
