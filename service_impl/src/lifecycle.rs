use std::sync::Arc;

use async_trait::async_trait;
use dao::{
    booking::BookingDao,
    booking_status_history::{BookingStatusHistoryDao, BookingStatusHistoryEntity},
    TransactionDao,
};
use service::{
    booking::{Booking, BookingStatus},
    clock::ClockService,
    lifecycle::{BookingLifecycleService, BookingStatusChange},
    uuid_service::UuidService,
    ServiceError,
};
use tracing::info;
use uuid::Uuid;

use crate::gen_service_impl;

const LIFECYCLE_SERVICE_PROCESS: &str = "booking-lifecycle-service";

gen_service_impl! {
    struct BookingLifecycleServiceImpl: service::lifecycle::BookingLifecycleService = BookingLifecycleServiceDeps {
        BookingDao: dao::booking::BookingDao<Transaction = Self::Transaction> = booking_dao,
        BookingStatusHistoryDao: dao::booking_status_history::BookingStatusHistoryDao<Transaction = Self::Transaction> = booking_status_history_dao,
        ClockService: service::clock::ClockService = clock_service,
        UuidService: service::uuid_service::UuidService = uuid_service,
        TransactionDao: dao::TransactionDao<Transaction = Self::Transaction> = transaction_dao
    }
}

#[async_trait]
impl<Deps: BookingLifecycleServiceDeps> BookingLifecycleService
    for BookingLifecycleServiceImpl<Deps>
{
    type Transaction = Deps::Transaction;

    async fn record_initial(
        &self,
        booking: &Booking,
        actor: Arc<str>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let history = BookingStatusHistoryEntity {
            id: self
                .uuid_service
                .new_uuid("booking-lifecycle-service::record_initial id"),
            booking_id: booking.id,
            old_status: None,
            new_status: booking.status.into(),
            changed_by: actor,
            reason: None,
            created: self.clock_service.date_time_now(),
        };
        self.booking_status_history_dao
            .create(&history, LIFECYCLE_SERVICE_PROCESS, tx.clone())
            .await?;

        self.transaction_dao.commit(tx).await?;
        Ok(())
    }

    async fn apply_transition(
        &self,
        booking_id: Uuid,
        new_status: BookingStatus,
        actor: Arc<str>,
        reason: Option<Arc<str>>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let mut entity = self
            .booking_dao
            .find_by_id(booking_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(booking_id))?;
        let old_status = BookingStatus::from(entity.status);
        if !old_status.can_transition_to(new_status) {
            return Err(ServiceError::InvalidTransition {
                from: old_status,
                to: new_status,
            });
        }

        let now = self.clock_service.date_time_now();
        entity.status = new_status.into();
        entity.updated = now;
        entity.version = self
            .uuid_service
            .new_uuid("booking-lifecycle-service::apply_transition version");
        self.booking_dao
            .update(&entity, LIFECYCLE_SERVICE_PROCESS, tx.clone())
            .await?;

        let history = BookingStatusHistoryEntity {
            id: self
                .uuid_service
                .new_uuid("booking-lifecycle-service::apply_transition history id"),
            booking_id,
            old_status: Some(old_status.into()),
            new_status: new_status.into(),
            changed_by: actor.clone(),
            reason,
            created: now,
        };
        self.booking_status_history_dao
            .create(&history, LIFECYCLE_SERVICE_PROCESS, tx.clone())
            .await?;

        self.transaction_dao.commit(tx).await?;
        info!(
            "Booking {} moved from {} to {} by {}",
            booking_id, old_status, new_status, actor
        );
        Ok(Booking::from(&entity))
    }

    async fn history(
        &self,
        booking_id: Uuid,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[BookingStatusChange]>, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let history = self
            .booking_status_history_dao
            .find_by_booking_id(booking_id, tx.clone())
            .await?
            .iter()
            .map(BookingStatusChange::from)
            .collect();

        self.transaction_dao.commit(tx).await?;
        Ok(history)
    }
}
