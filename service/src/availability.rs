use async_trait::async_trait;
use clinic_utils::TimeOfDay;
use mockall::automock;
use time::Date;
use uuid::Uuid;

use crate::ServiceError;

/// Occupancy of one exact slot start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Availability {
    pub available: bool,
    pub remaining: u32,
    pub occupied: u32,
}

impl Availability {
    pub fn from_occupancy(occupied: u32, max_per_slot: u32) -> Self {
        Self {
            available: occupied < max_per_slot,
            remaining: max_per_slot.saturating_sub(occupied),
            occupied,
        }
    }
}

#[automock(type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait AvailabilityService {
    type Transaction: dao::Transaction;

    /// Counts PENDING, CONFIRMED, CHECKED_IN and IN_PROGRESS bookings
    /// starting exactly at `start` against `max_per_slot`.
    async fn check_availability(
        &self,
        doctor_id: Uuid,
        date: Date,
        start: TimeOfDay,
        max_per_slot: u32,
        tx: Option<Self::Transaction>,
    ) -> Result<Availability, ServiceError>;
}
