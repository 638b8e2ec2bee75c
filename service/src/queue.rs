use std::sync::Arc;

use async_trait::async_trait;
use clinic_utils::TimeOfDay;
use dao::queue_entry::QueueEntryEntity;
use mockall::automock;
use serde::Serialize;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::booking::Booking;
use crate::ServiceError;

/// Estimated wait removed from every later entry when one entry leaves the
/// queue. It is independent of the service duration.
pub const QUEUE_WAIT_DECREMENT_MINUTES: u32 = 30;

/// Actor recorded for promotions without a human trigger.
pub const SYSTEM_ACTOR: &str = "system";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueueEntry {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub doctor_id: Uuid,
    pub date: Date,
    pub start: TimeOfDay,
    pub queue_position: u32,
    pub estimated_wait_minutes: u32,
    pub created: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

impl From<&QueueEntryEntity> for QueueEntry {
    fn from(entity: &QueueEntryEntity) -> Self {
        Self {
            id: entity.id,
            booking_id: entity.booking_id,
            doctor_id: entity.doctor_id,
            date: entity.date,
            start: entity.start,
            queue_position: entity.queue_position,
            estimated_wait_minutes: entity.estimated_wait_minutes,
            created: Some(entity.created),
            version: entity.version,
        }
    }
}

impl TryFrom<&QueueEntry> for QueueEntryEntity {
    type Error = ServiceError;
    fn try_from(entry: &QueueEntry) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entry.id,
            booking_id: entry.booking_id,
            doctor_id: entry.doctor_id,
            date: entry.date,
            start: entry.start,
            queue_position: entry.queue_position,
            estimated_wait_minutes: entry.estimated_wait_minutes,
            created: entry.created.ok_or(ServiceError::InternalError)?,
            version: entry.version,
        })
    }
}

/// FIFO of queued bookings per `(doctor_id, date, start)`.
///
/// Positions of a group are always `1..=N` in enqueue order.
#[automock(type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait QueueService {
    type Transaction: dao::Transaction;

    /// Appends the queued booking to the end of its slot's queue.
    async fn enqueue(
        &self,
        booking: &Booking,
        duration_minutes: u32,
        tx: Option<Self::Transaction>,
    ) -> Result<QueueEntry, ServiceError>;

    /// Confirms a queued booking if its slot has capacity and closes the gap
    /// it leaves in the queue.
    async fn promote(
        &self,
        booking_id: Uuid,
        actor: Arc<str>,
        reason: Option<Arc<str>>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError>;

    /// Promotes the head of the queue if there is capacity. Returns whether
    /// a booking was promoted.
    async fn auto_promote(
        &self,
        doctor_id: Uuid,
        date: Date,
        start: TimeOfDay,
        tx: Option<Self::Transaction>,
    ) -> Result<bool, ServiceError>;

    /// Drops the entry of the booking and closes the gap. The booking status
    /// is left alone.
    async fn remove_from_queue(
        &self,
        booking_id: Uuid,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError>;

    async fn get_queue(
        &self,
        doctor_id: Uuid,
        date: Date,
        start: TimeOfDay,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[QueueEntry]>, ServiceError>;

    async fn get_entry(
        &self,
        booking_id: Uuid,
        tx: Option<Self::Transaction>,
    ) -> Result<Option<QueueEntry>, ServiceError>;
}
