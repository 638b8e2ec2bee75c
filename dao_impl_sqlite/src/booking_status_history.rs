use std::sync::Arc;

use crate::{
    date_time_from_db, date_time_to_db, uuid_from_db, uuid_to_db, ResultDbErrorExt,
    TransactionImpl,
};
use async_trait::async_trait;
use dao::{
    booking::BookingStatusEntity,
    booking_status_history::{BookingStatusHistoryDao, BookingStatusHistoryEntity},
    DaoError,
};
use sqlx::{query, query_as, FromRow};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct BookingStatusHistoryDb {
    id: Vec<u8>,
    booking_id: Vec<u8>,
    old_status: Option<String>,
    new_status: String,
    changed_by: String,
    reason: Option<String>,
    created: String,
}
impl TryFrom<&BookingStatusHistoryDb> for BookingStatusHistoryEntity {
    type Error = DaoError;
    fn try_from(row: &BookingStatusHistoryDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: uuid_from_db(&row.id)?,
            booking_id: uuid_from_db(&row.booking_id)?,
            old_status: row
                .old_status
                .as_deref()
                .map(BookingStatusEntity::parse)
                .transpose()?,
            new_status: BookingStatusEntity::parse(&row.new_status)?,
            changed_by: row.changed_by.as_str().into(),
            reason: row.reason.as_deref().map(Arc::from),
            created: date_time_from_db(&row.created)?,
        })
    }
}

pub struct BookingStatusHistoryDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl BookingStatusHistoryDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl BookingStatusHistoryDao for BookingStatusHistoryDaoImpl {
    type Transaction = TransactionImpl;

    async fn create(
        &self,
        entity: &BookingStatusHistoryEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let old_status = entity.old_status.map(BookingStatusEntity::as_str);
        let reason = entity.reason.as_deref();
        query("INSERT INTO booking_status_history (id, booking_id, old_status, new_status, changed_by, reason, created, update_process) VALUES (?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(uuid_to_db(entity.id))
            .bind(uuid_to_db(entity.booking_id))
            .bind(old_status)
            .bind(entity.new_status.as_str())
            .bind(entity.changed_by.as_ref())
            .bind(reason)
            .bind(date_time_to_db(entity.created)?)
            .bind(process)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }

    async fn find_by_booking_id(
        &self,
        booking_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[BookingStatusHistoryEntity]>, DaoError> {
        query_as::<_, BookingStatusHistoryDb>(
            "SELECT id, booking_id, old_status, new_status, changed_by, reason, created FROM booking_status_history WHERE booking_id = ? ORDER BY rowid",
        )
        .bind(uuid_to_db(booking_id))
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(BookingStatusHistoryEntity::try_from)
        .collect::<Result<Arc<[BookingStatusHistoryEntity]>, DaoError>>()
    }
}
