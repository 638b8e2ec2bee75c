use std::sync::Arc;

use crate::{
    date_from_db, date_time_from_db, date_time_to_db, date_to_db, time_of_day_from_db,
    uuid_from_db, uuid_to_db, ResultDbErrorExt, TransactionImpl,
};
use async_trait::async_trait;
use clinic_utils::TimeOfDay;
use dao::{
    booking::{BookingDao, BookingEntity, BookingStatusEntity},
    DaoError,
};
use sqlx::{query, query_as, FromRow};
use time::Date;
use tracing::debug;
use uuid::Uuid;

const BOOKING_COLUMNS: &str = "id, patient_id, doctor_id, service_id, date, start_time, end_time, status, notes, created, updated, update_version";

#[derive(Debug, FromRow)]
struct BookingDb {
    id: Vec<u8>,
    patient_id: Vec<u8>,
    doctor_id: Vec<u8>,
    service_id: Vec<u8>,
    date: String,
    start_time: i64,
    end_time: i64,
    status: String,
    notes: Option<String>,
    created: String,
    updated: String,
    update_version: Vec<u8>,
}
impl TryFrom<&BookingDb> for BookingEntity {
    type Error = DaoError;
    fn try_from(booking: &BookingDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: uuid_from_db(&booking.id)?,
            patient_id: uuid_from_db(&booking.patient_id)?,
            doctor_id: uuid_from_db(&booking.doctor_id)?,
            service_id: uuid_from_db(&booking.service_id)?,
            date: date_from_db(&booking.date)?,
            start: time_of_day_from_db(booking.start_time)?,
            end: time_of_day_from_db(booking.end_time)?,
            status: BookingStatusEntity::parse(&booking.status)?,
            notes: booking.notes.as_deref().map(Arc::from),
            created: date_time_from_db(&booking.created)?,
            updated: date_time_from_db(&booking.updated)?,
            version: uuid_from_db(&booking.update_version)?,
        })
    }
}

fn to_entities(rows: &[BookingDb]) -> Result<Arc<[BookingEntity]>, DaoError> {
    rows.iter()
        .map(BookingEntity::try_from)
        .collect::<Result<Arc<[BookingEntity]>, DaoError>>()
}

pub struct BookingDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl BookingDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl BookingDao for BookingDaoImpl {
    type Transaction = TransactionImpl;

    async fn lock_slot(
        &self,
        doctor_id: Uuid,
        date: Date,
        start: TimeOfDay,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        debug!("Locking slot {} {} of doctor {}", date, start, doctor_id);
        query(
            "INSERT INTO slot_lock (doctor_id, date, start_time, touched) VALUES (?, ?, ?, 1) \
             ON CONFLICT (doctor_id, date, start_time) DO UPDATE SET touched = touched + 1",
        )
        .bind(uuid_to_db(doctor_id))
        .bind(date_to_db(date)?)
        .bind(start.minutes() as i64)
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<BookingEntity>, DaoError> {
        query_as::<_, BookingDb>(&format!(
            "SELECT {} FROM booking WHERE id = ?",
            BOOKING_COLUMNS
        ))
        .bind(uuid_to_db(id))
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(BookingEntity::try_from)
        .transpose()
    }

    async fn find_by_slot(
        &self,
        doctor_id: Uuid,
        date: Date,
        start: TimeOfDay,
        tx: Self::Transaction,
    ) -> Result<Arc<[BookingEntity]>, DaoError> {
        let rows = query_as::<_, BookingDb>(&format!(
            "SELECT {} FROM booking WHERE doctor_id = ? AND date = ? AND start_time = ? ORDER BY created, rowid",
            BOOKING_COLUMNS
        ))
        .bind(uuid_to_db(doctor_id))
        .bind(date_to_db(date)?)
        .bind(start.minutes() as i64)
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        to_entities(&rows)
    }

    async fn find_by_doctor_and_date(
        &self,
        doctor_id: Uuid,
        date: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[BookingEntity]>, DaoError> {
        let rows = query_as::<_, BookingDb>(&format!(
            "SELECT {} FROM booking WHERE doctor_id = ? AND date = ? ORDER BY start_time, created, rowid",
            BOOKING_COLUMNS
        ))
        .bind(uuid_to_db(doctor_id))
        .bind(date_to_db(date)?)
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        to_entities(&rows)
    }

    async fn find_by_patient_doctor_and_date(
        &self,
        patient_id: Uuid,
        doctor_id: Uuid,
        date: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[BookingEntity]>, DaoError> {
        let rows = query_as::<_, BookingDb>(&format!(
            "SELECT {} FROM booking WHERE patient_id = ? AND doctor_id = ? AND date = ? ORDER BY start_time, rowid",
            BOOKING_COLUMNS
        ))
        .bind(uuid_to_db(patient_id))
        .bind(uuid_to_db(doctor_id))
        .bind(date_to_db(date)?)
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        to_entities(&rows)
    }

    async fn create(
        &self,
        entity: &BookingEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let notes = entity.notes.as_deref();
        query("INSERT INTO booking (id, patient_id, doctor_id, service_id, date, start_time, end_time, status, notes, created, updated, update_version, update_process) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(uuid_to_db(entity.id))
            .bind(uuid_to_db(entity.patient_id))
            .bind(uuid_to_db(entity.doctor_id))
            .bind(uuid_to_db(entity.service_id))
            .bind(date_to_db(entity.date)?)
            .bind(entity.start.minutes() as i64)
            .bind(entity.end.minutes() as i64)
            .bind(entity.status.as_str())
            .bind(notes)
            .bind(date_time_to_db(entity.created)?)
            .bind(date_time_to_db(entity.updated)?)
            .bind(uuid_to_db(entity.version))
            .bind(process)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }

    async fn update(
        &self,
        entity: &BookingEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        query(
            "UPDATE booking SET status = ?, updated = ?, update_version = ?, update_process = ? WHERE id = ?",
        )
        .bind(entity.status.as_str())
        .bind(date_time_to_db(entity.updated)?)
        .bind(uuid_to_db(entity.version))
        .bind(process)
        .bind(uuid_to_db(entity.id))
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }
}
