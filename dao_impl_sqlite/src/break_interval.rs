use std::sync::Arc;

use crate::{
    date_from_db, date_time_from_db, date_time_to_db, date_to_db, time_of_day_from_db,
    uuid_from_db, uuid_to_db, ResultDbErrorExt, TransactionImpl,
};
use async_trait::async_trait;
use dao::{
    break_interval::{BreakIntervalDao, BreakIntervalEntity},
    DaoError,
};
use sqlx::{query, query_as, FromRow};
use time::Date;
use uuid::Uuid;

const BREAK_INTERVAL_COLUMNS: &str =
    "id, doctor_id, date, start_time, end_time, reason, created, deleted, update_version";

#[derive(Debug, FromRow)]
struct BreakIntervalDb {
    id: Vec<u8>,
    doctor_id: Vec<u8>,
    date: String,
    start_time: i64,
    end_time: i64,
    reason: Option<String>,
    created: String,
    deleted: Option<String>,
    update_version: Vec<u8>,
}
impl TryFrom<&BreakIntervalDb> for BreakIntervalEntity {
    type Error = DaoError;
    fn try_from(row: &BreakIntervalDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: uuid_from_db(&row.id)?,
            doctor_id: uuid_from_db(&row.doctor_id)?,
            date: date_from_db(&row.date)?,
            start: time_of_day_from_db(row.start_time)?,
            end: time_of_day_from_db(row.end_time)?,
            reason: row.reason.as_deref().map(Arc::from),
            created: date_time_from_db(&row.created)?,
            deleted: row.deleted.as_deref().map(date_time_from_db).transpose()?,
            version: uuid_from_db(&row.update_version)?,
        })
    }
}

pub struct BreakIntervalDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl BreakIntervalDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl BreakIntervalDao for BreakIntervalDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<BreakIntervalEntity>, DaoError> {
        query_as::<_, BreakIntervalDb>(&format!(
            "SELECT {} FROM break_interval WHERE id = ?",
            BREAK_INTERVAL_COLUMNS
        ))
        .bind(uuid_to_db(id))
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(BreakIntervalEntity::try_from)
        .transpose()
    }

    async fn find_by_doctor_and_date(
        &self,
        doctor_id: Uuid,
        date: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[BreakIntervalEntity]>, DaoError> {
        query_as::<_, BreakIntervalDb>(&format!(
            "SELECT {} FROM break_interval WHERE doctor_id = ? AND date = ? AND deleted IS NULL ORDER BY start_time",
            BREAK_INTERVAL_COLUMNS
        ))
        .bind(uuid_to_db(doctor_id))
        .bind(date_to_db(date)?)
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(BreakIntervalEntity::try_from)
        .collect::<Result<Arc<[BreakIntervalEntity]>, DaoError>>()
    }

    async fn create(
        &self,
        entity: &BreakIntervalEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let reason = entity.reason.as_deref();
        let deleted = entity.deleted.map(date_time_to_db).transpose()?;
        query("INSERT INTO break_interval (id, doctor_id, date, start_time, end_time, reason, created, deleted, update_version, update_process) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(uuid_to_db(entity.id))
            .bind(uuid_to_db(entity.doctor_id))
            .bind(date_to_db(entity.date)?)
            .bind(entity.start.minutes() as i64)
            .bind(entity.end.minutes() as i64)
            .bind(reason)
            .bind(date_time_to_db(entity.created)?)
            .bind(deleted)
            .bind(uuid_to_db(entity.version))
            .bind(process)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }

    async fn update(
        &self,
        entity: &BreakIntervalEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let deleted = entity.deleted.map(date_time_to_db).transpose()?;
        query("UPDATE break_interval SET deleted = ?, update_version = ?, update_process = ? WHERE id = ?")
            .bind(deleted)
            .bind(uuid_to_db(entity.version))
            .bind(process)
            .bind(uuid_to_db(entity.id))
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }
}
