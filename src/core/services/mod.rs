//! Stateful calculators owned by [`crate::core::FinanceManager`].

pub mod account_service;
pub mod budget_service;
pub mod calendar_service;
pub mod goal_service;
pub mod report_service;

pub use account_service::{AccountBook, EntryRequest};
pub use budget_service::BudgetTracker;
pub use calendar_service::EventCalendar;
pub use goal_service::GoalTracker;
pub use report_service::ReportService;

use uuid::Uuid;

use crate::errors::FinanceError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Invalid(String),
    #[error("account {0} not found")]
    AccountNotFound(Uuid),
}

impl From<ServiceError> for FinanceError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Invalid(message) => FinanceError::InvalidInput(message),
            ServiceError::AccountNotFound(id) => FinanceError::AccountNotFound(id.to_string()),
        }
    }
}

/// Rejects zero, negative, and non-finite amounts.
pub(crate) fn ensure_positive(field: &str, value: f64) -> ServiceResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ServiceError::Invalid(format!(
            "{field} must be a positive amount, got {value}"
        )))
    }
}
