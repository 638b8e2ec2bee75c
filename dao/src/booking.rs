use std::sync::Arc;

use async_trait::async_trait;
use clinic_utils::TimeOfDay;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BookingStatusEntity {
    Pending,
    Confirmed,
    CheckedIn,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
    Queued,
}

impl BookingStatusEntity {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatusEntity::Pending => "PENDING",
            BookingStatusEntity::Confirmed => "CONFIRMED",
            BookingStatusEntity::CheckedIn => "CHECKED_IN",
            BookingStatusEntity::InProgress => "IN_PROGRESS",
            BookingStatusEntity::Completed => "COMPLETED",
            BookingStatusEntity::Cancelled => "CANCELLED",
            BookingStatusEntity::NoShow => "NO_SHOW",
            BookingStatusEntity::Queued => "QUEUED",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DaoError> {
        Ok(match value {
            "PENDING" => BookingStatusEntity::Pending,
            "CONFIRMED" => BookingStatusEntity::Confirmed,
            "CHECKED_IN" => BookingStatusEntity::CheckedIn,
            "IN_PROGRESS" => BookingStatusEntity::InProgress,
            "COMPLETED" => BookingStatusEntity::Completed,
            "CANCELLED" => BookingStatusEntity::Cancelled,
            "NO_SHOW" => BookingStatusEntity::NoShow,
            "QUEUED" => BookingStatusEntity::Queued,
            _ => return Err(DaoError::EnumValueNotFound(value.into())),
        })
    }
}

/// A booking row. `end` is fixed at creation; only `status`, `updated`
/// and `version` change afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingEntity {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub service_id: Uuid,
    pub date: Date,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub status: BookingStatusEntity,
    pub notes: Option<Arc<str>>,
    pub created: PrimitiveDateTime,
    pub updated: PrimitiveDateTime,
    pub version: Uuid,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait BookingDao {
    type Transaction: crate::Transaction;

    /// Touches the marker row of the slot. Must be the first statement of a
    /// transaction which may add occupancy to the slot so that concurrent
    /// writers on the store serialize before reading the occupancy.
    async fn lock_slot(
        &self,
        doctor_id: Uuid,
        date: Date,
        start: TimeOfDay,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<BookingEntity>, DaoError>;
    async fn find_by_slot(
        &self,
        doctor_id: Uuid,
        date: Date,
        start: TimeOfDay,
        tx: Self::Transaction,
    ) -> Result<Arc<[BookingEntity]>, DaoError>;
    async fn find_by_doctor_and_date(
        &self,
        doctor_id: Uuid,
        date: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[BookingEntity]>, DaoError>;
    async fn find_by_patient_doctor_and_date(
        &self,
        patient_id: Uuid,
        doctor_id: Uuid,
        date: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[BookingEntity]>, DaoError>;
    async fn create(
        &self,
        entity: &BookingEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn update(
        &self,
        entity: &BookingEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}
