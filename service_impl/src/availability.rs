use async_trait::async_trait;
use clinic_utils::TimeOfDay;
use dao::{booking::BookingDao, TransactionDao};
use service::{
    availability::{Availability, AvailabilityService},
    BookingStatus, ServiceError,
};
use time::Date;
use tracing::debug;
use uuid::Uuid;

use crate::gen_service_impl;

gen_service_impl! {
    struct AvailabilityServiceImpl: service::availability::AvailabilityService = AvailabilityServiceDeps {
        BookingDao: dao::booking::BookingDao<Transaction = Self::Transaction> = booking_dao,
        TransactionDao: dao::TransactionDao<Transaction = Self::Transaction> = transaction_dao
    }
}

#[async_trait]
impl<Deps: AvailabilityServiceDeps> AvailabilityService for AvailabilityServiceImpl<Deps> {
    type Transaction = Deps::Transaction;

    async fn check_availability(
        &self,
        doctor_id: Uuid,
        date: Date,
        start: TimeOfDay,
        max_per_slot: u32,
        tx: Option<Self::Transaction>,
    ) -> Result<Availability, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let occupied = self
            .booking_dao
            .find_by_slot(doctor_id, date, start, tx.clone())
            .await?
            .iter()
            .filter(|booking| BookingStatus::from(booking.status).is_occupying())
            .count() as u32;
        let availability = Availability::from_occupancy(occupied, max_per_slot);
        debug!(
            "Slot {} {} of doctor {}: {}/{} occupied",
            date, start, doctor_id, occupied, max_per_slot
        );

        self.transaction_dao.commit(tx).await?;
        Ok(availability)
    }
}
