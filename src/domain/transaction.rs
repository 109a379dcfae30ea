use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{month_key, CategoryKey, Identifiable};

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Income,
    Expense,
}

/// A single recorded income or expense event.
///
/// `amount` is always a non-negative magnitude; the sign lives in `direction`.
/// A missing or unparsable date is kept as `None` and the record is left out of
/// every date-dependent calculation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "TransactionRecord")]
pub struct Transaction {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub date: Option<NaiveDate>,
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
}

impl Transaction {
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: impl Into<Option<NaiveDate>>,
        direction: Direction,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            amount: magnitude(amount),
            category: category.into(),
            date: date.into(),
            direction,
            account_id: None,
        }
    }

    pub fn income(
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: impl Into<Option<NaiveDate>>,
    ) -> Self {
        Self::new(description, amount, category, date, Direction::Income)
    }

    pub fn expense(
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: impl Into<Option<NaiveDate>>,
    ) -> Self {
        Self::new(description, amount, category, date, Direction::Expense)
    }

    /// Converts a signed amount (negative means expense) into magnitude plus direction.
    pub fn from_signed(
        description: impl Into<String>,
        signed_amount: f64,
        category: impl Into<String>,
        date: impl Into<Option<NaiveDate>>,
    ) -> Self {
        let direction = if signed_amount < 0.0 {
            Direction::Expense
        } else {
            Direction::Income
        };
        Self::new(description, signed_amount, category, date, direction)
    }

    pub fn with_account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn is_income(&self) -> bool {
        self.direction == Direction::Income
    }

    pub fn is_expense(&self) -> bool {
        self.direction == Direction::Expense
    }

    /// Amount with the conventional sign applied.
    pub fn signed_amount(&self) -> f64 {
        match self.direction {
            Direction::Income => self.amount,
            Direction::Expense => -self.amount,
        }
    }

    pub fn category_key(&self) -> CategoryKey {
        CategoryKey::new(&self.category)
    }

    pub fn month_key(&self) -> Option<String> {
        self.date.map(month_key)
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Loose wire shape accepted on deserialization.
#[derive(Debug, Deserialize)]
struct TransactionRecord {
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    description: String,
    amount: f64,
    #[serde(default)]
    category: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default, alias = "type")]
    direction: Option<Direction>,
    #[serde(default)]
    account_id: Option<Uuid>,
}

impl From<TransactionRecord> for Transaction {
    fn from(record: TransactionRecord) -> Self {
        let direction = record.direction.unwrap_or(if record.amount < 0.0 {
            Direction::Expense
        } else {
            Direction::Income
        });
        let date = record.date.as_deref().and_then(parse_date);
        if date.is_none() {
            tracing::warn!(
                description = %record.description,
                "transaction date missing or malformed; excluded from dated calculations"
            );
        }
        Self {
            id: record.id.unwrap_or_else(Uuid::new_v4),
            description: record.description,
            amount: magnitude(record.amount),
            category: record.category,
            date,
            direction,
            account_id: record.account_id,
        }
    }
}

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps, and naive ISO date-times.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|stamp| stamp.date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|stamp| stamp.date())
        })
}

fn magnitude(amount: f64) -> f64 {
    if amount.is_finite() {
        amount.abs()
    } else {
        0.0
    }
}
