use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::position_by_id;
use crate::domain::event::DEFAULT_EVENT_CATEGORY;
use crate::domain::{
    CalendarCell, DaySummary, DayTone, EventDraft, EventOccurrence, EventStatus, FinancialEvent,
    Recurrence, Transaction,
};
use crate::time::Clock;

use super::{ensure_positive, ServiceError, ServiceResult};

/// Days ahead of today covered by [`EventCalendar::upcoming`], today included.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;
pub const UPCOMING_LIMIT: usize = 5;
/// Six weeks, enough to show any month starting on any weekday.
const GRID_CELLS: i64 = 42;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct EventCalendar {
    events: Vec<FinancialEvent>,
}

impl EventCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<FinancialEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[FinancialEvent] {
        &self.events
    }

    pub fn get(&self, event_id: Uuid) -> Option<&FinancialEvent> {
        self.events.iter().find(|event| event.id == event_id)
    }

    pub fn add_event(
        &mut self,
        draft: EventDraft,
        clock: &dyn Clock,
    ) -> ServiceResult<FinancialEvent> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(ServiceError::Invalid("event title must not be empty".into()));
        }
        ensure_positive("event amount", draft.amount)?;
        let category = match draft.category.trim() {
            "" => DEFAULT_EVENT_CATEGORY.to_string(),
            label => label.to_string(),
        };
        let status = if draft.recurrence == Recurrence::None && draft.date < clock.today() {
            EventStatus::Overdue
        } else {
            EventStatus::Pending
        };
        let event = FinancialEvent {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: draft.description,
            amount: draft.amount,
            kind: draft.kind,
            date: draft.date,
            category,
            recurrence: draft.recurrence,
            status,
            transaction_id: None,
        };
        tracing::info!(
            id = %event.id,
            kind = ?event.kind,
            date = %event.date,
            recurrence = event.recurrence.label(),
            "scheduled event"
        );
        self.events.push(event.clone());
        Ok(event)
    }

    /// Links an event to the history entry recorded for it.
    pub fn link_transaction(
        &mut self,
        event_id: Uuid,
        transaction_id: Uuid,
    ) -> Option<FinancialEvent> {
        let event = self.find_mut(event_id)?;
        event.transaction_id = Some(transaction_id);
        Some(event.clone())
    }

    /// Events falling on `date`, repeating ones included.
    pub fn events_on(&self, date: NaiveDate) -> Vec<FinancialEvent> {
        self.events
            .iter()
            .filter(|event| event.occurs_on(date))
            .cloned()
            .collect()
    }

    /// Net movement of a day.
    ///
    /// Dated transactions count with their sign. Income and expense events are
    /// added on top unless already mirrored into the history on their own date,
    /// so a recorded event is never counted twice.
    pub fn day_summary(&self, date: NaiveDate, transactions: &[Transaction]) -> DaySummary {
        let day_transactions: Vec<Transaction> = transactions
            .iter()
            .filter(|tx| tx.date == Some(date))
            .cloned()
            .collect();
        let events = self.events_on(date);

        let transaction_balance: f64 =
            day_transactions.iter().map(Transaction::signed_amount).sum();
        let event_balance: f64 = events
            .iter()
            .filter(|event| event.kind.affects_balance())
            .filter(|event| !(event.transaction_id.is_some() && event.date == date))
            .map(FinancialEvent::signed_amount)
            .sum();
        let balance = transaction_balance + event_balance;

        let tone = if events.is_empty() && day_transactions.is_empty() {
            DayTone::Empty
        } else if balance > 0.0 {
            DayTone::Positive
        } else if balance < 0.0 {
            DayTone::Negative
        } else {
            DayTone::Neutral
        };

        DaySummary {
            date,
            events,
            transactions: day_transactions,
            balance,
            tone,
        }
    }

    /// Pending occurrences between today and a week from today, soonest first.
    pub fn upcoming(&self, clock: &dyn Clock) -> Vec<EventOccurrence> {
        let today = clock.today();
        let events = &self.events;
        (0..=UPCOMING_WINDOW_DAYS)
            .map(|offset| today + Duration::days(offset))
            .flat_map(move |date| {
                events
                    .iter()
                    .filter(|event| event.status == EventStatus::Pending)
                    .filter(move |event| event.occurs_on(date))
                    .map(move |event| EventOccurrence {
                        date,
                        event: event.clone(),
                    })
            })
            .take(UPCOMING_LIMIT)
            .collect()
    }

    /// Completed events go back to pending; anything else becomes completed.
    pub fn toggle_status(&mut self, event_id: Uuid) -> Option<FinancialEvent> {
        let event = self.find_mut(event_id)?;
        let next = match event.status {
            EventStatus::Completed => EventStatus::Pending,
            EventStatus::Pending | EventStatus::Overdue => EventStatus::Completed,
        };
        tracing::debug!(
            event = %event_id,
            from = ?event.status,
            to = ?next,
            "event status toggled"
        );
        event.status = next;
        Some(event.clone())
    }

    /// Flags pending one-off events dated before today. Returns how many changed.
    pub fn mark_overdue(&mut self, clock: &dyn Clock) -> usize {
        let today = clock.today();
        let mut changed = 0;
        for event in self.events.iter_mut().filter(|event| {
            event.status == EventStatus::Pending
                && event.recurrence == Recurrence::None
                && event.date < today
        }) {
            event.status = EventStatus::Overdue;
            changed += 1;
        }
        if changed > 0 {
            tracing::info!(count = changed, "events marked overdue");
        }
        changed
    }

    pub fn remove_event(&mut self, event_id: Uuid) -> Option<FinancialEvent> {
        let index = position_by_id(&self.events, event_id)?;
        Some(self.events.remove(index))
    }

    /// Six-week grid for a month, starting on the Sunday on or before the 1st.
    pub fn month_grid(
        &self,
        year: i32,
        month: u32,
        transactions: &[Transaction],
        clock: &dyn Clock,
    ) -> ServiceResult<Vec<CalendarCell>> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| ServiceError::Invalid(format!("invalid month {year}-{month}")))?;
        let start = first - Duration::days(first.weekday().num_days_from_sunday() as i64);
        let today = clock.today();
        Ok((0..GRID_CELLS)
            .map(|offset| {
                let date = start + Duration::days(offset);
                CalendarCell {
                    summary: self.day_summary(date, transactions),
                    in_month: date.month() == month && date.year() == year,
                    is_today: date == today,
                }
            })
            .collect())
    }

    fn find_mut(&mut self, event_id: Uuid) -> Option<&mut FinancialEvent> {
        self.events.iter_mut().find(|event| event.id == event_id)
    }
}
