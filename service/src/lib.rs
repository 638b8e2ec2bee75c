use std::sync::Arc;

use clinic_utils::TimeOfDay;
use thiserror::Error;
use time::Date;
use uuid::Uuid;

pub mod availability;
pub mod booking;
pub mod clock;
pub mod config;
pub mod lifecycle;
pub mod notification;
pub mod queue;
pub mod schedule;
pub mod suggestion;
pub mod time_grid;
pub mod uuid_service;

pub use booking::BookingStatus;
pub use time_grid::ScheduleConflict;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ValidationFailureItem {
    InvalidValue(Arc<str>),
    MissingValue(Arc<str>),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database query error: {0}")]
    DatabaseQueryError(dao::DaoError),

    #[error("Transient conflict in the record store: {0}")]
    TransientConflict(dao::DaoError),

    #[error("Entity {0} not found")]
    EntityNotFound(Uuid),

    #[error("Entity {0} already exists")]
    EntityAlreadyExists(Uuid),

    #[error("Validation error: {0:?}")]
    ValidationError(Arc<[ValidationFailureItem]>),

    #[error("Status transition from {from} to {to} is not allowed")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Slot {start} on {date} of doctor {doctor_id} is full")]
    SlotFull {
        doctor_id: Uuid,
        date: Date,
        start: TimeOfDay,
    },

    #[error("Schedule conflict: {0}")]
    ScheduleConflict(ScheduleConflict),

    #[error("Patient {patient_id} already has a booking with doctor {doctor_id} on {date}")]
    DuplicateBooking {
        patient_id: Uuid,
        doctor_id: Uuid,
        date: Date,
    },

    #[error("Booking {0} is not queued")]
    NotQueued(Uuid),

    #[error("Time order wrong. {0} must not be after {1}")]
    TimeOrderWrong(TimeOfDay, TimeOfDay),

    #[error("Date order wrong. {0} must not be after {1}")]
    DateOrderWrong(Date, Date),

    #[error("Internal error")]
    InternalError,
}

impl From<dao::DaoError> for ServiceError {
    fn from(err: dao::DaoError) -> Self {
        match err {
            dao::DaoError::TransientConflict(_) => ServiceError::TransientConflict(err),
            _ => ServiceError::DatabaseQueryError(err),
        }
    }
}

impl ServiceError {
    /// Whether repeating the whole operation in a fresh transaction may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ServiceError::TransientConflict(_))
    }
}
