use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

pub mod booking;
pub mod booking_status_history;
pub mod break_interval;
pub mod clinic_service;
pub mod off_day;
pub mod queue_entry;
pub mod working_hours;

#[derive(Error, Debug)]
pub enum DaoError {
    #[error("Database query error: {0}")]
    DatabaseQueryError(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("Concurrent transaction conflict: {0}")]
    TransientConflict(Box<dyn std::error::Error + Send + Sync>),

    #[error("Enum value not found: {0}")]
    EnumValueNotFound(Arc<str>),

    #[error("Invalid stored value: {0}")]
    InvalidStoredValue(Arc<str>),

    #[error("Date time parse error: {0}")]
    DateTimeParseError(#[from] time::error::Parse),

    #[error("Date time format error: {0}")]
    DateTimeFormatError(#[from] time::error::Format),
}

impl From<clinic_utils::ClinicUtilsError> for DaoError {
    fn from(err: clinic_utils::ClinicUtilsError) -> Self {
        DaoError::InvalidStoredValue(err.to_string().into())
    }
}

pub trait Transaction: Clone + Debug + Send + Sync + 'static {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockTransaction;
impl Transaction for MockTransaction {}

#[automock(type Transaction = MockTransaction;)]
#[async_trait]
pub trait TransactionDao {
    type Transaction: Transaction;

    async fn new_transaction(&self) -> Result<Self::Transaction, DaoError>;

    /// Reuse the given transaction or open a new one.
    async fn use_transaction(
        &self,
        tx: Option<Self::Transaction>,
    ) -> Result<Self::Transaction, DaoError>;

    /// Commits only if the given handle is the last one holding the transaction.
    async fn commit(&self, transaction: Self::Transaction) -> Result<(), DaoError>;
}
