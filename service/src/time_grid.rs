use std::sync::Arc;

use async_trait::async_trait;
use clinic_utils::{DayOfWeek, TimeOfDay};
use mockall::automock;
use thiserror::Error;
use time::Date;
use uuid::Uuid;

use crate::ServiceError;

/// Distance between two candidate slot starts.
pub const SLOT_STRIDE_MINUTES: u32 = 30;

/// Reason why a requested start is not a bookable slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ScheduleConflict {
    #[error("the doctor is off on {0}")]
    OffDay(Date),

    #[error("the doctor does not work on {0}")]
    NotWorkingDay(DayOfWeek),

    #[error("the slot is outside the working hours {start}-{end}")]
    OutsideWorkingHours { start: TimeOfDay, end: TimeOfDay },

    #[error("the slot overlaps the break {start}-{end}")]
    Break { start: TimeOfDay, end: TimeOfDay },

    #[error("{0} is not a slot start")]
    NotOnGrid(TimeOfDay),
}

#[automock(type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait TimeGridService {
    type Transaction: dao::Transaction;

    /// Candidate slot starts of the doctor on `date`, ascending.
    ///
    /// `earliest` and `latest` narrow the working hour window. An off day or
    /// a missing working hour template yields no slots.
    async fn compute_slots(
        &self,
        doctor_id: Uuid,
        date: Date,
        duration_minutes: u32,
        earliest: Option<TimeOfDay>,
        latest: Option<TimeOfDay>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[TimeOfDay]>, ServiceError>;

    /// Accepts exactly the starts [`compute_slots`](Self::compute_slots)
    /// yields without bounds and fails with
    /// [`ServiceError::ScheduleConflict`] otherwise.
    async fn validate_slot(
        &self,
        doctor_id: Uuid,
        date: Date,
        start: TimeOfDay,
        duration_minutes: u32,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError>;
}
