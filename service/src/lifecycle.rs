use std::sync::Arc;

use async_trait::async_trait;
use dao::booking_status_history::BookingStatusHistoryEntity;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::availability::Availability;
use crate::booking::{Booking, BookingStatus};
use crate::ServiceError;

/// Status a new booking starts in.
pub fn initial_status(availability: &Availability) -> BookingStatus {
    if availability.available {
        BookingStatus::Pending
    } else {
        BookingStatus::Queued
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingStatusChange {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub old_status: Option<BookingStatus>,
    pub new_status: BookingStatus,
    pub changed_by: Arc<str>,
    pub reason: Option<Arc<str>>,
    pub created: PrimitiveDateTime,
}

impl From<&BookingStatusHistoryEntity> for BookingStatusChange {
    fn from(entity: &BookingStatusHistoryEntity) -> Self {
        Self {
            id: entity.id,
            booking_id: entity.booking_id,
            old_status: entity.old_status.map(BookingStatus::from),
            new_status: entity.new_status.into(),
            changed_by: entity.changed_by.clone(),
            reason: entity.reason.clone(),
            created: entity.created,
        }
    }
}

#[automock(type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait BookingLifecycleService {
    type Transaction: dao::Transaction;

    /// Writes the `None -> status` history row of a freshly created booking.
    async fn record_initial(
        &self,
        booking: &Booking,
        actor: Arc<str>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError>;

    /// Moves the booking to `new_status` and appends a history row. Fails
    /// with [`ServiceError::InvalidTransition`] if the table does not allow it.
    async fn apply_transition(
        &self,
        booking_id: Uuid,
        new_status: BookingStatus,
        actor: Arc<str>,
        reason: Option<Arc<str>>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError>;

    async fn history(
        &self,
        booking_id: Uuid,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[BookingStatusChange]>, ServiceError>;
}
