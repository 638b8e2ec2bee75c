use std::sync::Arc;

use crate::{
    date_from_db, date_time_from_db, date_time_to_db, date_to_db, time_of_day_from_db,
    u32_from_db, uuid_from_db, uuid_to_db, ResultDbErrorExt, TransactionImpl,
};
use async_trait::async_trait;
use clinic_utils::TimeOfDay;
use dao::{
    queue_entry::{QueueEntryDao, QueueEntryEntity},
    DaoError,
};
use sqlx::{query, query_as, FromRow};
use time::Date;
use uuid::Uuid;

const QUEUE_ENTRY_COLUMNS: &str = "id, booking_id, doctor_id, date, start_time, queue_position, estimated_wait_minutes, created, update_version";

#[derive(Debug, FromRow)]
struct QueueEntryDb {
    id: Vec<u8>,
    booking_id: Vec<u8>,
    doctor_id: Vec<u8>,
    date: String,
    start_time: i64,
    queue_position: i64,
    estimated_wait_minutes: i64,
    created: String,
    update_version: Vec<u8>,
}
impl TryFrom<&QueueEntryDb> for QueueEntryEntity {
    type Error = DaoError;
    fn try_from(row: &QueueEntryDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: uuid_from_db(&row.id)?,
            booking_id: uuid_from_db(&row.booking_id)?,
            doctor_id: uuid_from_db(&row.doctor_id)?,
            date: date_from_db(&row.date)?,
            start: time_of_day_from_db(row.start_time)?,
            queue_position: u32_from_db(row.queue_position, "queue_position")?,
            estimated_wait_minutes: u32_from_db(
                row.estimated_wait_minutes,
                "estimated_wait_minutes",
            )?,
            created: date_time_from_db(&row.created)?,
            version: uuid_from_db(&row.update_version)?,
        })
    }
}

pub struct QueueEntryDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl QueueEntryDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl QueueEntryDao for QueueEntryDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_by_booking_id(
        &self,
        booking_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<QueueEntryEntity>, DaoError> {
        query_as::<_, QueueEntryDb>(&format!(
            "SELECT {} FROM queue_entry WHERE booking_id = ?",
            QUEUE_ENTRY_COLUMNS
        ))
        .bind(uuid_to_db(booking_id))
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(QueueEntryEntity::try_from)
        .transpose()
    }

    async fn find_by_group(
        &self,
        doctor_id: Uuid,
        date: Date,
        start: TimeOfDay,
        tx: Self::Transaction,
    ) -> Result<Arc<[QueueEntryEntity]>, DaoError> {
        query_as::<_, QueueEntryDb>(&format!(
            "SELECT {} FROM queue_entry WHERE doctor_id = ? AND date = ? AND start_time = ? ORDER BY queue_position",
            QUEUE_ENTRY_COLUMNS
        ))
        .bind(uuid_to_db(doctor_id))
        .bind(date_to_db(date)?)
        .bind(start.minutes() as i64)
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(QueueEntryEntity::try_from)
        .collect::<Result<Arc<[QueueEntryEntity]>, DaoError>>()
    }

    async fn create(
        &self,
        entity: &QueueEntryEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        query("INSERT INTO queue_entry (id, booking_id, doctor_id, date, start_time, queue_position, estimated_wait_minutes, created, update_version, update_process) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(uuid_to_db(entity.id))
            .bind(uuid_to_db(entity.booking_id))
            .bind(uuid_to_db(entity.doctor_id))
            .bind(date_to_db(entity.date)?)
            .bind(entity.start.minutes() as i64)
            .bind(entity.queue_position as i64)
            .bind(entity.estimated_wait_minutes as i64)
            .bind(date_time_to_db(entity.created)?)
            .bind(uuid_to_db(entity.version))
            .bind(process)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }

    async fn update(
        &self,
        entity: &QueueEntryEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        query("UPDATE queue_entry SET queue_position = ?, estimated_wait_minutes = ?, update_version = ?, update_process = ? WHERE id = ?")
            .bind(entity.queue_position as i64)
            .bind(entity.estimated_wait_minutes as i64)
            .bind(uuid_to_db(entity.version))
            .bind(process)
            .bind(uuid_to_db(entity.id))
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }

    async fn delete_by_booking_id(
        &self,
        booking_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        query("DELETE FROM queue_entry WHERE booking_id = ?")
            .bind(uuid_to_db(booking_id))
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }
}
