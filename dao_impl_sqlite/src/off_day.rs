use std::sync::Arc;

use crate::{
    date_from_db, date_time_from_db, date_time_to_db, date_to_db, uuid_from_db, uuid_to_db,
    ResultDbErrorExt, TransactionImpl,
};
use async_trait::async_trait;
use dao::{
    off_day::{OffDayDao, OffDayEntity},
    DaoError,
};
use sqlx::{query, query_as, FromRow};
use time::Date;
use uuid::Uuid;

const OFF_DAY_COLUMNS: &str = "id, doctor_id, date, reason, created, deleted, update_version";

#[derive(Debug, FromRow)]
struct OffDayDb {
    id: Vec<u8>,
    doctor_id: Vec<u8>,
    date: String,
    reason: Option<String>,
    created: String,
    deleted: Option<String>,
    update_version: Vec<u8>,
}
impl TryFrom<&OffDayDb> for OffDayEntity {
    type Error = DaoError;
    fn try_from(row: &OffDayDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: uuid_from_db(&row.id)?,
            doctor_id: uuid_from_db(&row.doctor_id)?,
            date: date_from_db(&row.date)?,
            reason: row.reason.as_deref().map(Arc::from),
            created: date_time_from_db(&row.created)?,
            deleted: row.deleted.as_deref().map(date_time_from_db).transpose()?,
            version: uuid_from_db(&row.update_version)?,
        })
    }
}

pub struct OffDayDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl OffDayDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl OffDayDao for OffDayDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<OffDayEntity>, DaoError> {
        query_as::<_, OffDayDb>(&format!(
            "SELECT {} FROM off_day WHERE id = ?",
            OFF_DAY_COLUMNS
        ))
        .bind(uuid_to_db(id))
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(OffDayEntity::try_from)
        .transpose()
    }

    async fn find_by_doctor_and_date(
        &self,
        doctor_id: Uuid,
        date: Date,
        tx: Self::Transaction,
    ) -> Result<Option<OffDayEntity>, DaoError> {
        query_as::<_, OffDayDb>(&format!(
            "SELECT {} FROM off_day WHERE doctor_id = ? AND date = ? AND deleted IS NULL",
            OFF_DAY_COLUMNS
        ))
        .bind(uuid_to_db(doctor_id))
        .bind(date_to_db(date)?)
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(OffDayEntity::try_from)
        .transpose()
    }

    async fn find_by_doctor_in_range(
        &self,
        doctor_id: Uuid,
        from: Date,
        to: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[OffDayEntity]>, DaoError> {
        query_as::<_, OffDayDb>(&format!(
            "SELECT {} FROM off_day WHERE doctor_id = ? AND date >= ? AND date <= ? AND deleted IS NULL ORDER BY date",
            OFF_DAY_COLUMNS
        ))
        .bind(uuid_to_db(doctor_id))
        .bind(date_to_db(from)?)
        .bind(date_to_db(to)?)
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(OffDayEntity::try_from)
        .collect::<Result<Arc<[OffDayEntity]>, DaoError>>()
    }

    async fn create(
        &self,
        entity: &OffDayEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let reason = entity.reason.as_deref();
        let deleted = entity.deleted.map(date_time_to_db).transpose()?;
        query("INSERT INTO off_day (id, doctor_id, date, reason, created, deleted, update_version, update_process) VALUES (?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(uuid_to_db(entity.id))
            .bind(uuid_to_db(entity.doctor_id))
            .bind(date_to_db(entity.date)?)
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
        entity: &OffDayEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let reason = entity.reason.as_deref();
        let deleted = entity.deleted.map(date_time_to_db).transpose()?;
        query("UPDATE off_day SET reason = ?, deleted = ?, update_version = ?, update_process = ? WHERE id = ?")
            .bind(reason)
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
