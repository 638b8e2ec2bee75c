use std::sync::Arc;

use async_trait::async_trait;
use clinic_utils::TimeOfDay;
use dao::{DaoError, Transaction};
use sqlx::SqlitePool;
use time::{format_description::well_known::Iso8601, Date, PrimitiveDateTime};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

pub mod booking;
pub mod booking_status_history;
pub mod break_interval;
pub mod clinic_service;
pub mod off_day;
pub mod queue_entry;
pub mod working_hours;


const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Lock contention and stale snapshots are reported as
/// [`DaoError::TransientConflict`] so callers may retry the transaction.
fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .map(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
            .unwrap_or(false),
        sqlx::Error::PoolTimedOut => true,
        _ => false,
    }
}

pub trait ResultDbErrorExt<T, E> {
    fn map_db_error(self) -> Result<T, DaoError>;
}
impl<T, E: std::error::Error + Send + Sync + 'static> ResultDbErrorExt<T, E> for Result<T, E> {
    fn map_db_error(self) -> Result<T, DaoError> {
        self.map_err(|err| {
            let err: Box<dyn std::error::Error + Send + Sync> = Box::new(err);
            match err.downcast_ref::<sqlx::Error>() {
                Some(sqlx_err) if is_transient(sqlx_err) => {
                    debug!("Store reported a transient conflict: {}", sqlx_err);
                    DaoError::TransientConflict(err)
                }
                _ => DaoError::DatabaseQueryError(err),
            }
        })
    }
}

pub(crate) fn uuid_from_db(bytes: &[u8]) -> Result<Uuid, DaoError> {
    Uuid::from_slice(bytes).map_err(|err| DaoError::InvalidStoredValue(err.to_string().into()))
}

pub(crate) fn uuid_to_db(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

pub(crate) fn date_from_db(value: &str) -> Result<Date, DaoError> {
    Ok(Date::parse(value, &Iso8601::DATE)?)
}

pub(crate) fn date_to_db(date: Date) -> Result<String, DaoError> {
    Ok(date.format(&Iso8601::DATE)?)
}

pub(crate) fn date_time_from_db(value: &str) -> Result<PrimitiveDateTime, DaoError> {
    Ok(PrimitiveDateTime::parse(value, &Iso8601::DATE_TIME)?)
}

pub(crate) fn date_time_to_db(date_time: PrimitiveDateTime) -> Result<String, DaoError> {
    Ok(date_time.format(&Iso8601::DATE_TIME)?)
}

pub(crate) fn time_of_day_from_db(minutes: i64) -> Result<TimeOfDay, DaoError> {
    let minutes = u32::try_from(minutes)
        .map_err(|_| DaoError::InvalidStoredValue(format!("minute {}", minutes).into()))?;
    Ok(TimeOfDay::from_minutes(minutes)?)
}

pub(crate) fn u32_from_db(value: i64, column: &str) -> Result<u32, DaoError> {
    u32::try_from(value)
        .map_err(|_| DaoError::InvalidStoredValue(format!("{}: {}", column, value).into()))
}

#[derive(Clone, Debug)]
pub struct TransactionImpl {
    tx: Arc<Mutex<sqlx::Transaction<'static, sqlx::Sqlite>>>,
}

impl Transaction for TransactionImpl {}

pub struct TransactionDaoImpl {
    pool: Arc<SqlitePool>,
}
impl TransactionDaoImpl {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}
#[async_trait]
impl dao::TransactionDao for TransactionDaoImpl {
    type Transaction = TransactionImpl;

    async fn new_transaction(&self) -> Result<Self::Transaction, DaoError> {
        let tx = self.pool.begin().await.map_db_error()?;
        Ok(TransactionImpl {
            tx: Arc::new(tx.into()),
        })
    }

    async fn use_transaction(
        &self,
        tx: Option<Self::Transaction>,
    ) -> Result<Self::Transaction, DaoError> {
        match tx {
            Some(tx) => Ok(tx),
            None => self.new_transaction().await,
        }
    }

    async fn commit(&self, transaction: Self::Transaction) -> Result<(), DaoError> {
        if let Some(tx) = Arc::into_inner(transaction.tx) {
            tx.into_inner().commit().await.map_db_error()?;
        }
        Ok(())
    }
}
