use async_trait::async_trait;
use clinic_utils::TimeOfDay;
use mockall::automock;
use serde::Serialize;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::booking::{Booking, BookingStatus};
use crate::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
    BookingCreated,
    BookingQueued,
    BookingConfirmed,
    BookingPromoted,
    BookingCancelled,
    BookingCompleted,
    BookingStatusChanged,
}

impl NotificationEvent {
    /// Event announcing that a booking reached `status` through a
    /// regular transition.
    pub fn for_status(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Confirmed => Self::BookingConfirmed,
            BookingStatus::Cancelled => Self::BookingCancelled,
            BookingStatus::Completed => Self::BookingCompleted,
            BookingStatus::Pending
            | BookingStatus::CheckedIn
            | BookingStatus::InProgress
            | BookingStatus::NoShow
            | BookingStatus::Queued => Self::BookingStatusChanged,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub event: NotificationEvent,
    pub booking_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: Date,
    pub start: TimeOfDay,
    pub status: BookingStatus,
    pub queue_position: Option<u32>,
    pub created: PrimitiveDateTime,
}

impl Notification {
    pub fn for_booking(
        event: NotificationEvent,
        booking: &Booking,
        queue_position: Option<u32>,
        created: PrimitiveDateTime,
    ) -> Self {
        Self {
            event,
            booking_id: booking.id,
            patient_id: booking.patient_id,
            doctor_id: booking.doctor_id,
            date: booking.date,
            start: booking.start,
            status: booking.status,
            queue_position,
            created,
        }
    }
}

/// Fire and forget entry point. Never blocks and never fails the caller.
#[automock]
pub trait NotificationService {
    fn notify(&self, notification: Notification);
}

/// The external sink notifications are delivered to.
#[automock]
#[async_trait]
pub trait NotificationDispatcher {
    async fn dispatch(&self, notification: &Notification) -> Result<(), ServiceError>;
}
