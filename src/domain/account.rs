use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::Identifiable;

/// Supported account types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Checking,
    Savings,
    CreditCard,
    Investment,
    Cash,
}

impl AccountKind {
    pub fn is_liability(self) -> bool {
        matches!(self, AccountKind::CreditCard)
    }
}

/// Represents a financial account holding a running balance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    pub balance: f64,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(default = "Account::default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        name: impl Into<String>,
        kind: AccountKind,
        balance: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            balance,
            currency: "USD".into(),
            bank_name: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn default_active() -> bool {
        true
    }
}

impl Identifiable for Account {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
    Transfer,
}

/// A posting against one account, carrying the balance after it was applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountEntry {
    pub id: Uuid,
    pub account_id: Uuid,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterpart_account_id: Option<Uuid>,
    pub balance: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AccountSummary {
    pub total_balance: f64,
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub net_worth: f64,
    pub active_accounts: usize,
    pub monthly_change: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountMonth {
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub transfers: f64,
    pub net: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountReport {
    pub account: Account,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_income: f64,
    pub total_expenses: f64,
    pub total_transfers: f64,
    pub net_change: f64,
    pub entry_count: usize,
    pub monthly: Vec<AccountMonth>,
    pub recent_entries: Vec<AccountEntry>,
}
