use std::sync::Arc;

use async_trait::async_trait;
use clinic_utils::TimeOfDay;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::DaoError;

/// The group key `(doctor_id, date, start)` is copied from the booking,
/// which never changes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueEntryEntity {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub doctor_id: Uuid,
    pub date: Date,
    pub start: TimeOfDay,
    pub queue_position: u32,
    pub estimated_wait_minutes: u32,
    pub created: PrimitiveDateTime,
    pub version: Uuid,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait QueueEntryDao {
    type Transaction: crate::Transaction;

    async fn find_by_booking_id(
        &self,
        booking_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<QueueEntryEntity>, DaoError>;
    /// Entries of the group ordered by ascending queue position.
    async fn find_by_group(
        &self,
        doctor_id: Uuid,
        date: Date,
        start: TimeOfDay,
        tx: Self::Transaction,
    ) -> Result<Arc<[QueueEntryEntity]>, DaoError>;
    async fn create(
        &self,
        entity: &QueueEntryEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn update(
        &self,
        entity: &QueueEntryEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn delete_by_booking_id(
        &self,
        booking_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}
