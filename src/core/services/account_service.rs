use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{month_key, position_by_id, shift_month};
use crate::domain::{
    Account, AccountEntry, AccountKind, AccountMonth, AccountReport, AccountSummary, EntryKind,
};
use crate::time::Clock;

use super::{ensure_positive, ServiceError, ServiceResult};

const TRANSFER_CATEGORY: &str = "Transfer";
const RECENT_ENTRY_LIMIT: usize = 10;

/// Caller-supplied posting details.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryRequest {
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    pub kind: EntryKind,
    pub transfer_to: Option<Uuid>,
}

impl EntryRequest {
    pub fn income(
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self::new(description, amount, category, date, EntryKind::Income, None)
    }

    pub fn expense(
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self::new(description, amount, category, date, EntryKind::Expense, None)
    }

    pub fn transfer(
        description: impl Into<String>,
        amount: f64,
        to_account: Uuid,
        date: NaiveDate,
    ) -> Self {
        Self::new(
            description,
            amount,
            TRANSFER_CATEGORY,
            date,
            EntryKind::Transfer,
            Some(to_account),
        )
    }

    fn new(
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: NaiveDate,
        kind: EntryKind,
        transfer_to: Option<Uuid>,
    ) -> Self {
        Self {
            description: description.into(),
            amount,
            category: category.into(),
            date,
            kind,
            transfer_to,
        }
    }
}

/// Accounts plus the postings made against them.
///
/// Income and expense entries store a positive amount. Transfer entries are
/// signed: negative on the sending account, positive on the receiving one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AccountBook {
    #[serde(default)]
    accounts: Vec<Account>,
    #[serde(default)]
    entries: Vec<AccountEntry>,
}

impl AccountBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn entries(&self) -> &[AccountEntry] {
        &self.entries
    }

    pub fn get(&self, account_id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == account_id)
    }

    pub fn active_accounts(&self) -> Vec<&Account> {
        self.accounts.iter().filter(|account| account.is_active).collect()
    }

    pub fn create_account(
        &mut self,
        name: &str,
        kind: AccountKind,
        initial_balance: f64,
        clock: &dyn Clock,
    ) -> ServiceResult<Account> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Invalid("account name must not be empty".into()));
        }
        if !initial_balance.is_finite() {
            return Err(ServiceError::Invalid(format!(
                "initial balance must be finite, got {initial_balance}"
            )));
        }
        let account = Account::new(name, kind, initial_balance, clock.now());
        tracing::info!(id = %account.id, name, ?kind, "created account");
        self.accounts.push(account.clone());
        Ok(account)
    }

    /// Posts an entry and updates balances. Transfers also post a mirrored
    /// entry on the receiving account.
    pub fn add_entry(
        &mut self,
        account_id: Uuid,
        request: EntryRequest,
        clock: &dyn Clock,
    ) -> ServiceResult<AccountEntry> {
        ensure_positive("entry amount", request.amount.abs())?;
        let magnitude = request.amount.abs();
        let source = self
            .position(account_id)
            .ok_or(ServiceError::AccountNotFound(account_id))?;
        let target = match (request.kind, request.transfer_to) {
            (EntryKind::Transfer, Some(to)) if to == account_id => {
                return Err(ServiceError::Invalid(
                    "cannot transfer into the same account".into(),
                ))
            }
            (EntryKind::Transfer, Some(to)) => {
                Some(self.position(to).ok_or(ServiceError::AccountNotFound(to))?)
            }
            (EntryKind::Transfer, None) => {
                return Err(ServiceError::Invalid(
                    "a transfer needs a receiving account".into(),
                ))
            }
            _ => None,
        };

        let now = clock.now();
        let signed = match request.kind {
            EntryKind::Income => magnitude,
            EntryKind::Expense | EntryKind::Transfer => -magnitude,
        };
        let sender = &mut self.accounts[source];
        sender.balance += signed;
        sender.updated_at = now;
        let sender_name = sender.name.clone();
        let entry = AccountEntry {
            id: Uuid::new_v4(),
            account_id,
            description: request.description,
            amount: if request.kind == EntryKind::Transfer {
                signed
            } else {
                magnitude
            },
            category: request.category,
            date: request.date,
            kind: request.kind,
            counterpart_account_id: request.transfer_to,
            balance: sender.balance,
        };
        self.entries.push(entry.clone());

        if let Some(target) = target {
            let receiver = &mut self.accounts[target];
            receiver.balance += magnitude;
            receiver.updated_at = now;
            self.entries.push(AccountEntry {
                id: Uuid::new_v4(),
                account_id: receiver.id,
                description: format!("Transfer from {sender_name}"),
                amount: magnitude,
                category: TRANSFER_CATEGORY.into(),
                date: request.date,
                kind: EntryKind::Transfer,
                counterpart_account_id: Some(account_id),
                balance: receiver.balance,
            });
        }
        tracing::debug!(
            account = %account_id,
            kind = ?entry.kind,
            amount = magnitude,
            "posted account entry"
        );
        Ok(entry)
    }

    /// Totals across active accounts. Monthly change covers the last month of
    /// income and expense entries.
    pub fn summary(&self, clock: &dyn Clock) -> AccountSummary {
        let active = self.active_accounts();
        let total_assets = active
            .iter()
            .filter(|account| !account.kind.is_liability())
            .map(|account| account.balance.max(0.0))
            .sum::<f64>();
        let total_liabilities = active
            .iter()
            .filter(|account| account.kind.is_liability())
            .map(|account| (-account.balance).max(0.0))
            .sum::<f64>();
        let since = shift_month(clock.today(), -1);
        let monthly_change = self
            .entries
            .iter()
            .filter(|entry| entry.date >= since)
            .map(|entry| match entry.kind {
                EntryKind::Income => entry.amount,
                EntryKind::Expense => -entry.amount,
                EntryKind::Transfer => 0.0,
            })
            .sum();
        AccountSummary {
            total_balance: active.iter().map(|account| account.balance).sum(),
            total_assets,
            total_liabilities,
            net_worth: total_assets - total_liabilities,
            active_accounts: active.len(),
            monthly_change,
        }
    }

    pub fn balance_by_kind(&self, kind: AccountKind) -> f64 {
        self.accounts
            .iter()
            .filter(|account| account.is_active && account.kind == kind)
            .map(|account| account.balance)
            .sum()
    }

    pub fn deactivate(&mut self, account_id: Uuid, clock: &dyn Clock) -> Option<Account> {
        let index = self.position(account_id)?;
        let account = &mut self.accounts[index];
        if account.is_active {
            account.is_active = false;
            account.updated_at = clock.now();
            tracing::info!(account = %account_id, "deactivated account");
        }
        Some(account.clone())
    }

    /// Entries for one account, newest first, optionally truncated.
    pub fn account_entries(&self, account_id: Uuid, limit: Option<usize>) -> Vec<&AccountEntry> {
        let mut entries: Vec<&AccountEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.account_id == account_id)
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        entries
    }

    /// Activity for the last `months` months up to today.
    pub fn account_report(
        &self,
        account_id: Uuid,
        months: u32,
        clock: &dyn Clock,
    ) -> Option<AccountReport> {
        let account = self.get(account_id)?.clone();
        let end = clock.today();
        let start = shift_month(end, -(months as i32));
        let entries: Vec<&AccountEntry> = self
            .account_entries(account_id, None)
            .into_iter()
            .filter(|entry| entry.date >= start && entry.date <= end)
            .collect();

        let mut monthly: BTreeMap<String, AccountMonth> = BTreeMap::new();
        let (mut total_income, mut total_expenses, mut total_transfers) = (0.0, 0.0, 0.0);
        for entry in &entries {
            let month = month_key(entry.date);
            let bucket = monthly.entry(month.clone()).or_insert_with(|| AccountMonth {
                month,
                income: 0.0,
                expenses: 0.0,
                transfers: 0.0,
                net: 0.0,
            });
            match entry.kind {
                EntryKind::Income => {
                    total_income += entry.amount;
                    bucket.income += entry.amount;
                }
                EntryKind::Expense => {
                    total_expenses += entry.amount;
                    bucket.expenses += entry.amount;
                }
                EntryKind::Transfer => {
                    total_transfers += entry.amount;
                    bucket.transfers += entry.amount;
                }
            }
            bucket.net = bucket.income - bucket.expenses + bucket.transfers;
        }

        Some(AccountReport {
            account,
            start,
            end,
            total_income,
            total_expenses,
            total_transfers,
            net_change: total_income - total_expenses + total_transfers,
            entry_count: entries.len(),
            monthly: monthly.into_values().collect(),
            recent_entries: entries
                .into_iter()
                .take(RECENT_ENTRY_LIMIT)
                .cloned()
                .collect(),
        })
    }

    fn position(&self, account_id: Uuid) -> Option<usize> {
        position_by_id(&self.accounts, account_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock::at_date(date(3, 31))
    }

    #[test]
    fn expense_and_income_adjust_balance() {
        let mut book = AccountBook::new();
        let checking = book
            .create_account("Checking", AccountKind::Checking, 100.0, &clock())
            .unwrap();
        book.add_entry(
            checking.id,
            EntryRequest::expense("Lunch", -30.0, "Food", date(3, 10)),
            &clock(),
        )
        .unwrap();
        let entry = book
            .add_entry(
                checking.id,
                EntryRequest::income("Pay", 50.0, "Work", date(3, 11)),
                &clock(),
            )
            .unwrap();
        assert_eq!(entry.balance, 120.0);
        assert_eq!(book.get(checking.id).unwrap().balance, 120.0);
    }

    #[test]
    fn transfer_moves_money_and_mirrors_entry() {
        let mut book = AccountBook::new();
        let checking = book
            .create_account("Checking", AccountKind::Checking, 500.0, &clock())
            .unwrap();
        let savings = book
            .create_account("Savings", AccountKind::Savings, 0.0, &clock())
            .unwrap();
        book.add_entry(
            checking.id,
            EntryRequest::transfer("Save", 200.0, savings.id, date(3, 15)),
            &clock(),
        )
        .unwrap();
        assert_eq!(book.get(checking.id).unwrap().balance, 300.0);
        assert_eq!(book.get(savings.id).unwrap().balance, 200.0);
        let mirrored = book.account_entries(savings.id, None);
        assert_eq!(mirrored.len(), 1);
        assert_eq!(mirrored[0].counterpart_account_id, Some(checking.id));
        assert_eq!(mirrored[0].description, "Transfer from Checking");
    }

    #[test]
    fn unknown_accounts_are_errors() {
        let mut book = AccountBook::new();
        let checking = book
            .create_account("Checking", AccountKind::Checking, 10.0, &clock())
            .unwrap();
        let missing = Uuid::new_v4();
        let err = book
            .add_entry(
                missing,
                EntryRequest::expense("x", 1.0, "Misc", date(3, 1)),
                &clock(),
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::AccountNotFound(id) if id == missing));
        let err = book
            .add_entry(
                checking.id,
                EntryRequest::transfer("x", 1.0, missing, date(3, 1)),
                &clock(),
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::AccountNotFound(_)));
        assert_eq!(book.get(checking.id).unwrap().balance, 10.0);
    }

    #[test]
    fn summary_splits_assets_and_liabilities() {
        let mut book = AccountBook::new();
        let checking = book
            .create_account("Checking", AccountKind::Checking, 1000.0, &clock())
            .unwrap();
        book.create_account("Card", AccountKind::CreditCard, -250.0, &clock())
            .unwrap();
        let old = book
            .create_account("Old", AccountKind::Cash, 75.0, &clock())
            .unwrap();
        book.deactivate(old.id, &clock());
        book.add_entry(
            checking.id,
            EntryRequest::expense("Groceries", 100.0, "Food", date(3, 20)),
            &clock(),
        )
        .unwrap();
        book.add_entry(
            checking.id,
            EntryRequest::income("Old pay", 400.0, "Work", date(1, 5)),
            &clock(),
        )
        .unwrap();

        let summary = book.summary(&clock());
        assert_eq!(summary.active_accounts, 2);
        assert_eq!(summary.total_assets, 1300.0);
        assert_eq!(summary.total_liabilities, 250.0);
        assert_eq!(summary.net_worth, 1050.0);
        assert_eq!(summary.total_balance, 1050.0);
        assert_eq!(summary.monthly_change, -100.0);
        assert_eq!(book.balance_by_kind(AccountKind::Cash), 0.0);
    }

    #[test]
    fn report_groups_by_month() {
        let mut book = AccountBook::new();
        let checking = book
            .create_account("Checking", AccountKind::Checking, 0.0, &clock())
            .unwrap();
        book.add_entry(
            checking.id,
            EntryRequest::income("Pay", 1000.0, "Work", date(2, 1)),
            &clock(),
        )
        .unwrap();
        book.add_entry(
            checking.id,
            EntryRequest::expense("Rent", 400.0, "Housing", date(3, 1)),
            &clock(),
        )
        .unwrap();
        let report = book.account_report(checking.id, 6, &clock()).unwrap();
        assert_eq!(report.entry_count, 2);
        assert_eq!(report.net_change, 600.0);
        assert_eq!(report.monthly.len(), 2);
        assert_eq!(report.monthly[0].month, "2024-02");
        assert_eq!(report.recent_entries[0].description, "Rent");
        assert!(book.account_report(Uuid::new_v4(), 6, &clock()).is_none());
    }
}
