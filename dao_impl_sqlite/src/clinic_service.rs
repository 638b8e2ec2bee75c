use std::sync::Arc;

use crate::{
    date_time_from_db, date_time_to_db, u32_from_db, uuid_from_db, uuid_to_db, ResultDbErrorExt,
    TransactionImpl,
};
use async_trait::async_trait;
use dao::{
    clinic_service::{ClinicServiceDao, ClinicServiceEntity},
    DaoError,
};
use sqlx::{query, query_as, FromRow};
use uuid::Uuid;

const CLINIC_SERVICE_COLUMNS: &str =
    "id, name, duration_minutes, max_slots_per_hour, created, deleted, update_version";

#[derive(Debug, FromRow)]
struct ClinicServiceDb {
    id: Vec<u8>,
    name: String,
    duration_minutes: i64,
    max_slots_per_hour: i64,
    created: String,
    deleted: Option<String>,
    update_version: Vec<u8>,
}
impl TryFrom<&ClinicServiceDb> for ClinicServiceEntity {
    type Error = DaoError;
    fn try_from(row: &ClinicServiceDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: uuid_from_db(&row.id)?,
            name: row.name.as_str().into(),
            duration_minutes: u32_from_db(row.duration_minutes, "duration_minutes")?,
            max_slots_per_hour: u32_from_db(row.max_slots_per_hour, "max_slots_per_hour")?,
            created: date_time_from_db(&row.created)?,
            deleted: row.deleted.as_deref().map(date_time_from_db).transpose()?,
            version: uuid_from_db(&row.update_version)?,
        })
    }
}

pub struct ClinicServiceDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl ClinicServiceDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl ClinicServiceDao for ClinicServiceDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<ClinicServiceEntity>, DaoError> {
        query_as::<_, ClinicServiceDb>(&format!(
            "SELECT {} FROM clinic_service WHERE id = ?",
            CLINIC_SERVICE_COLUMNS
        ))
        .bind(uuid_to_db(id))
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(ClinicServiceEntity::try_from)
        .transpose()
    }

    async fn create(
        &self,
        entity: &ClinicServiceEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let deleted = entity.deleted.map(date_time_to_db).transpose()?;
        query("INSERT INTO clinic_service (id, name, duration_minutes, max_slots_per_hour, created, deleted, update_version, update_process) VALUES (?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(uuid_to_db(entity.id))
            .bind(entity.name.as_ref())
            .bind(entity.duration_minutes as i64)
            .bind(entity.max_slots_per_hour as i64)
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
        entity: &ClinicServiceEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let deleted = entity.deleted.map(date_time_to_db).transpose()?;
        query("UPDATE clinic_service SET name = ?, duration_minutes = ?, max_slots_per_hour = ?, deleted = ?, update_version = ?, update_process = ? WHERE id = ?")
            .bind(entity.name.as_ref())
            .bind(entity.duration_minutes as i64)
            .bind(entity.max_slots_per_hour as i64)
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
