use std::fmt::{Display, Formatter};
use std::sync::Arc;

use async_trait::async_trait;
use clinic_utils::{derive_from_reference, TimeOfDay};
use dao::booking::{BookingEntity, BookingStatusEntity};
use mockall::automock;
use serde::Serialize;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::lifecycle::BookingStatusChange;
use crate::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
    Queued,
}

impl BookingStatus {
    /// Statuses reachable from `self` in one transition.
    pub fn allowed_transitions(self) -> &'static [BookingStatus] {
        use BookingStatus::*;
        match self {
            Pending => &[Confirmed, Cancelled],
            Confirmed => &[CheckedIn, Cancelled, NoShow],
            CheckedIn => &[InProgress, Cancelled],
            InProgress => &[Completed],
            Queued => &[Confirmed, Cancelled],
            Completed | Cancelled | NoShow => &[],
        }
    }

    pub fn can_transition_to(self, target: BookingStatus) -> bool {
        self.allowed_transitions().contains(&target)
    }

    /// Whether a booking in this status takes one unit of slot capacity.
    pub fn is_occupying(self) -> bool {
        matches!(
            self,
            BookingStatus::Pending
                | BookingStatus::Confirmed
                | BookingStatus::CheckedIn
                | BookingStatus::InProgress
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::NoShow
        )
    }
}

impl From<BookingStatusEntity> for BookingStatus {
    fn from(status: BookingStatusEntity) -> Self {
        match status {
            BookingStatusEntity::Pending => Self::Pending,
            BookingStatusEntity::Confirmed => Self::Confirmed,
            BookingStatusEntity::CheckedIn => Self::CheckedIn,
            BookingStatusEntity::InProgress => Self::InProgress,
            BookingStatusEntity::Completed => Self::Completed,
            BookingStatusEntity::Cancelled => Self::Cancelled,
            BookingStatusEntity::NoShow => Self::NoShow,
            BookingStatusEntity::Queued => Self::Queued,
        }
    }
}
impl From<BookingStatus> for BookingStatusEntity {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Pending => Self::Pending,
            BookingStatus::Confirmed => Self::Confirmed,
            BookingStatus::CheckedIn => Self::CheckedIn,
            BookingStatus::InProgress => Self::InProgress,
            BookingStatus::Completed => Self::Completed,
            BookingStatus::Cancelled => Self::Cancelled,
            BookingStatus::NoShow => Self::NoShow,
            BookingStatus::Queued => Self::Queued,
        }
    }
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", BookingStatusEntity::from(*self).as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Booking {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub service_id: Uuid,
    pub date: Date,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub status: BookingStatus,
    pub notes: Option<Arc<str>>,
    pub created: Option<PrimitiveDateTime>,
    pub updated: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

impl From<&BookingEntity> for Booking {
    fn from(booking: &BookingEntity) -> Self {
        Self {
            id: booking.id,
            patient_id: booking.patient_id,
            doctor_id: booking.doctor_id,
            service_id: booking.service_id,
            date: booking.date,
            start: booking.start,
            end: booking.end,
            status: booking.status.into(),
            notes: booking.notes.clone(),
            created: Some(booking.created),
            updated: Some(booking.updated),
            version: booking.version,
        }
    }
}
derive_from_reference!(BookingEntity, Booking);

/// Input of [`BookingService::create_booking`]. The end time and the
/// initial status are derived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub service_id: Uuid,
    pub date: Date,
    pub start: TimeOfDay,
    pub notes: Option<Arc<str>>,
}

#[automock(type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait BookingService {
    type Transaction: dao::Transaction;

    /// Creates a booking as PENDING if the slot has capacity, otherwise as
    /// QUEUED with a queue entry at the end of the slot's queue.
    async fn create_booking(
        &self,
        request: &BookingRequest,
        actor: Arc<str>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError>;

    /// Moves the booking along the lifecycle. Cancelling or completing frees
    /// capacity which goes to the head of the slot's queue after commit.
    /// Within a caller supplied transaction no promotion happens.
    async fn transition_status(
        &self,
        booking_id: Uuid,
        new_status: BookingStatus,
        actor: Arc<str>,
        reason: Option<Arc<str>>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError>;

    async fn promote_queue_entry(
        &self,
        booking_id: Uuid,
        actor: Arc<str>,
        reason: Option<Arc<str>>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError>;

    async fn get(&self, id: Uuid, tx: Option<Self::Transaction>) -> Result<Booking, ServiceError>;

    async fn get_for_doctor_and_date(
        &self,
        doctor_id: Uuid,
        date: Date,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[Booking]>, ServiceError>;

    async fn get_status_history(
        &self,
        booking_id: Uuid,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[BookingStatusChange]>, ServiceError>;
}
