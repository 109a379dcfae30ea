#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::NaiveDate;
use finance_core::{config::Config, domain::Transaction, time::FixedClock, FinanceManager};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Returns a fresh directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// A manager pinned to `today` with default configuration.
pub fn manager_at(today: NaiveDate) -> FinanceManager {
    FinanceManager::with_clock(Config::default(), Box::new(FixedClock::at_date(today)))
}

/// One salary payment and three food purchases spread over the first quarter of 2024.
pub fn food_scenario() -> Vec<Transaction> {
    vec![
        Transaction::from_signed("Salary", 3500.0, "Salary", date(2024, 1, 1)),
        Transaction::from_signed("Groceries", -500.0, "food", date(2024, 1, 5)),
        Transaction::from_signed("Groceries", -500.0, "Food", date(2024, 2, 5)),
        Transaction::from_signed("Party", -1000.0, "food ", date(2024, 3, 5)),
    ]
}

/// Six months of salary, rent and varied spending, January through June 2024.
pub fn half_year_history() -> Vec<Transaction> {
    let mut txns = Vec::new();
    for month in 1..=6u32 {
        txns.push(Transaction::income("Salary", 4000.0, "Salary", date(2024, month, 1)));
        txns.push(Transaction::expense("Rent", 1500.0, "Housing", date(2024, month, 2)));
        txns.push(Transaction::expense(
            "Groceries",
            300.0 + month as f64 * 20.0,
            "Food",
            date(2024, month, 10),
        ));
        txns.push(Transaction::expense("Bus pass", 80.0, "Transport", date(2024, month, 15)));
    }
    txns
}
