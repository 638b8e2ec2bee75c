use std::sync::Arc;

use crate::{
    date_time_from_db, date_time_to_db, time_of_day_from_db, uuid_from_db, uuid_to_db,
    ResultDbErrorExt, TransactionImpl,
};
use async_trait::async_trait;
use clinic_utils::DayOfWeek;
use dao::{
    working_hours::{WorkingHoursDao, WorkingHoursEntity},
    DaoError,
};
use sqlx::{query, query_as, FromRow};
use uuid::Uuid;

const WORKING_HOURS_COLUMNS: &str =
    "id, doctor_id, day_of_week, start_time, end_time, created, deleted, update_version";

#[derive(Debug, FromRow)]
struct WorkingHoursDb {
    id: Vec<u8>,
    doctor_id: Vec<u8>,
    day_of_week: i64,
    start_time: i64,
    end_time: i64,
    created: String,
    deleted: Option<String>,
    update_version: Vec<u8>,
}
impl TryFrom<&WorkingHoursDb> for WorkingHoursEntity {
    type Error = DaoError;
    fn try_from(row: &WorkingHoursDb) -> Result<Self, Self::Error> {
        let day_of_week = u8::try_from(row.day_of_week).map_err(|_| {
            DaoError::InvalidStoredValue(format!("day_of_week: {}", row.day_of_week).into())
        })?;
        Ok(Self {
            id: uuid_from_db(&row.id)?,
            doctor_id: uuid_from_db(&row.doctor_id)?,
            day_of_week: DayOfWeek::from_number(day_of_week)?,
            start: time_of_day_from_db(row.start_time)?,
            end: time_of_day_from_db(row.end_time)?,
            created: date_time_from_db(&row.created)?,
            deleted: row.deleted.as_deref().map(date_time_from_db).transpose()?,
            version: uuid_from_db(&row.update_version)?,
        })
    }
}

pub struct WorkingHoursDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl WorkingHoursDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl WorkingHoursDao for WorkingHoursDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_by_doctor_and_day(
        &self,
        doctor_id: Uuid,
        day_of_week: DayOfWeek,
        tx: Self::Transaction,
    ) -> Result<Option<WorkingHoursEntity>, DaoError> {
        query_as::<_, WorkingHoursDb>(&format!(
            "SELECT {} FROM working_hours WHERE doctor_id = ? AND day_of_week = ? AND deleted IS NULL",
            WORKING_HOURS_COLUMNS
        ))
        .bind(uuid_to_db(doctor_id))
        .bind(day_of_week.to_number() as i64)
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(WorkingHoursEntity::try_from)
        .transpose()
    }

    async fn find_by_doctor(
        &self,
        doctor_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[WorkingHoursEntity]>, DaoError> {
        query_as::<_, WorkingHoursDb>(&format!(
            "SELECT {} FROM working_hours WHERE doctor_id = ? AND deleted IS NULL ORDER BY day_of_week",
            WORKING_HOURS_COLUMNS
        ))
        .bind(uuid_to_db(doctor_id))
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(WorkingHoursEntity::try_from)
        .collect::<Result<Arc<[WorkingHoursEntity]>, DaoError>>()
    }

    async fn create(
        &self,
        entity: &WorkingHoursEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let deleted = entity.deleted.map(date_time_to_db).transpose()?;
        query("INSERT INTO working_hours (id, doctor_id, day_of_week, start_time, end_time, created, deleted, update_version, update_process) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(uuid_to_db(entity.id))
            .bind(uuid_to_db(entity.doctor_id))
            .bind(entity.day_of_week.to_number() as i64)
            .bind(entity.start.minutes() as i64)
            .bind(entity.end.minutes() as i64)
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
        entity: &WorkingHoursEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let deleted = entity.deleted.map(date_time_to_db).transpose()?;
        query("UPDATE working_hours SET start_time = ?, end_time = ?, deleted = ?, update_version = ?, update_process = ? WHERE id = ?")
            .bind(entity.start.minutes() as i64)
            .bind(entity.end.minutes() as i64)
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
