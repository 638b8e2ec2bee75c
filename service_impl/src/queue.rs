use std::sync::Arc;

use async_trait::async_trait;
use clinic_utils::TimeOfDay;
use dao::{
    booking::BookingDao,
    clinic_service::ClinicServiceDao,
    queue_entry::{QueueEntryDao, QueueEntryEntity},
    TransactionDao,
};
use service::{
    availability::AvailabilityService,
    booking::{Booking, BookingStatus},
    clock::ClockService,
    lifecycle::BookingLifecycleService,
    notification::{Notification, NotificationEvent, NotificationService},
    queue::{QueueEntry, QueueService, QUEUE_WAIT_DECREMENT_MINUTES, SYSTEM_ACTOR},
    uuid_service::UuidService,
    ServiceError,
};
use time::Date;
use tracing::{debug, info};
use uuid::Uuid;

use crate::gen_service_impl;

const QUEUE_SERVICE_PROCESS: &str = "queue-service";

/// Entries behind `removed_position`, each moved one position up with the
/// estimated wait reduced by the flat decrement. Ascending by position.
pub fn shift_positions(entries: &[QueueEntryEntity], removed_position: u32) -> Vec<QueueEntryEntity> {
    let mut shifted: Vec<QueueEntryEntity> = entries
        .iter()
        .filter(|entry| entry.queue_position > removed_position)
        .map(|entry| QueueEntryEntity {
            queue_position: entry.queue_position - 1,
            estimated_wait_minutes: entry
                .estimated_wait_minutes
                .saturating_sub(QUEUE_WAIT_DECREMENT_MINUTES),
            ..entry.clone()
        })
        .collect();
    shifted.sort_by_key(|entry| entry.queue_position);
    shifted
}

gen_service_impl! {
    struct QueueServiceImpl: service::queue::QueueService = QueueServiceDeps {
        BookingDao: dao::booking::BookingDao<Transaction = Self::Transaction> = booking_dao,
        QueueEntryDao: dao::queue_entry::QueueEntryDao<Transaction = Self::Transaction> = queue_entry_dao,
        ClinicServiceDao: dao::clinic_service::ClinicServiceDao<Transaction = Self::Transaction> = clinic_service_dao,
        AvailabilityService: service::availability::AvailabilityService<Transaction = Self::Transaction> = availability_service,
        BookingLifecycleService: service::lifecycle::BookingLifecycleService<Transaction = Self::Transaction> = booking_lifecycle_service,
        NotificationService: service::notification::NotificationService = notification_service,
        ClockService: service::clock::ClockService = clock_service,
        UuidService: service::uuid_service::UuidService = uuid_service,
        TransactionDao: dao::TransactionDao<Transaction = Self::Transaction> = transaction_dao
    }
}

impl<Deps: QueueServiceDeps> QueueServiceImpl<Deps> {
    /// Deletes the entry and moves everybody behind it one position up.
    async fn delete_and_close_gap(
        &self,
        entry: &QueueEntryEntity,
        tx: Deps::Transaction,
    ) -> Result<(), ServiceError> {
        self.queue_entry_dao
            .delete_by_booking_id(entry.booking_id, tx.clone())
            .await?;
        let group = self
            .queue_entry_dao
            .find_by_group(entry.doctor_id, entry.date, entry.start, tx.clone())
            .await?;
        for mut shifted in shift_positions(&group, entry.queue_position) {
            shifted.version = self
                .uuid_service
                .new_uuid("queue-service::close_gap version");
            self.queue_entry_dao
                .update(&shifted, QUEUE_SERVICE_PROCESS, tx.clone())
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl<Deps: QueueServiceDeps> QueueService for QueueServiceImpl<Deps> {
    type Transaction = Deps::Transaction;

    async fn enqueue(
        &self,
        booking: &Booking,
        duration_minutes: u32,
        tx: Option<Self::Transaction>,
    ) -> Result<QueueEntry, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let group = self
            .queue_entry_dao
            .find_by_group(booking.doctor_id, booking.date, booking.start, tx.clone())
            .await?;
        let queue_position = group.len() as u32 + 1;
        let entity = QueueEntryEntity {
            id: self.uuid_service.new_uuid("queue-service::enqueue id"),
            booking_id: booking.id,
            doctor_id: booking.doctor_id,
            date: booking.date,
            start: booking.start,
            queue_position,
            estimated_wait_minutes: queue_position.saturating_mul(duration_minutes),
            created: self.clock_service.date_time_now(),
            version: self.uuid_service.new_uuid("queue-service::enqueue version"),
        };
        self.queue_entry_dao
            .create(&entity, QUEUE_SERVICE_PROCESS, tx.clone())
            .await?;

        self.transaction_dao.commit(tx).await?;
        info!(
            "Booking {} queued at position {} for {} {}",
            booking.id, queue_position, booking.date, booking.start
        );
        Ok(QueueEntry::from(&entity))
    }

    async fn promote(
        &self,
        booking_id: Uuid,
        actor: Arc<str>,
        reason: Option<Arc<str>>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let booking = self
            .booking_dao
            .find_by_id(booking_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(booking_id))?;
        if BookingStatus::from(booking.status) != BookingStatus::Queued {
            return Err(ServiceError::NotQueued(booking_id));
        }
        self.booking_dao
            .lock_slot(booking.doctor_id, booking.date, booking.start, tx.clone())
            .await?;

        let clinic_service = self
            .clinic_service_dao
            .find_by_id(booking.service_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(booking.service_id))?;
        let availability = self
            .availability_service
            .check_availability(
                booking.doctor_id,
                booking.date,
                booking.start,
                clinic_service.max_slots_per_hour,
                Some(tx.clone()),
            )
            .await?;
        if !availability.available {
            return Err(ServiceError::SlotFull {
                doctor_id: booking.doctor_id,
                date: booking.date,
                start: booking.start,
            });
        }

        let entry = self
            .queue_entry_dao
            .find_by_booking_id(booking_id, tx.clone())
            .await?;
        let promoted = self
            .booking_lifecycle_service
            .apply_transition(
                booking_id,
                BookingStatus::Confirmed,
                actor.clone(),
                reason,
                Some(tx.clone()),
            )
            .await?;
        if let Some(entry) = entry {
            self.delete_and_close_gap(&entry, tx.clone()).await?;
        }

        self.transaction_dao.commit(tx).await?;
        info!("Booking {} promoted from queue by {}", booking_id, actor);
        self.notification_service.notify(Notification::for_booking(
            NotificationEvent::BookingPromoted,
            &promoted,
            None,
            self.clock_service.date_time_now(),
        ));
        Ok(promoted)
    }

    async fn auto_promote(
        &self,
        doctor_id: Uuid,
        date: Date,
        start: TimeOfDay,
        tx: Option<Self::Transaction>,
    ) -> Result<bool, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        self.booking_dao
            .lock_slot(doctor_id, date, start, tx.clone())
            .await?;

        let group = self
            .queue_entry_dao
            .find_by_group(doctor_id, date, start, tx.clone())
            .await?;
        let Some(head) = group.first() else {
            self.transaction_dao.commit(tx).await?;
            debug!("No queue for {} {} of doctor {}", date, start, doctor_id);
            return Ok(false);
        };
        let booking = self
            .booking_dao
            .find_by_id(head.booking_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(head.booking_id))?;
        let clinic_service = self
            .clinic_service_dao
            .find_by_id(booking.service_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(booking.service_id))?;
        let availability = self
            .availability_service
            .check_availability(
                doctor_id,
                date,
                start,
                clinic_service.max_slots_per_hour,
                Some(tx.clone()),
            )
            .await?;
        if !availability.available {
            self.transaction_dao.commit(tx).await?;
            debug!("Slot {} {} of doctor {} still full", date, start, doctor_id);
            return Ok(false);
        }

        self.promote(
            head.booking_id,
            SYSTEM_ACTOR.into(),
            Some("Automatically promoted from queue".into()),
            Some(tx.clone()),
        )
        .await?;

        self.transaction_dao.commit(tx).await?;
        Ok(true)
    }

    async fn remove_from_queue(
        &self,
        booking_id: Uuid,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        match self
            .queue_entry_dao
            .find_by_booking_id(booking_id, tx.clone())
            .await?
        {
            Some(entry) => {
                self.delete_and_close_gap(&entry, tx.clone()).await?;
                info!(
                    "Booking {} left the queue at position {}",
                    booking_id, entry.queue_position
                );
            }
            None => debug!("Booking {} has no queue entry", booking_id),
        }

        self.transaction_dao.commit(tx).await?;
        Ok(())
    }

    async fn get_queue(
        &self,
        doctor_id: Uuid,
        date: Date,
        start: TimeOfDay,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[QueueEntry]>, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let queue = self
            .queue_entry_dao
            .find_by_group(doctor_id, date, start, tx.clone())
            .await?
            .iter()
            .map(QueueEntry::from)
            .collect();

        self.transaction_dao.commit(tx).await?;
        Ok(queue)
    }

    async fn get_entry(
        &self,
        booking_id: Uuid,
        tx: Option<Self::Transaction>,
    ) -> Result<Option<QueueEntry>, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entry = self
            .queue_entry_dao
            .find_by_booking_id(booking_id, tx.clone())
            .await?
            .as_ref()
            .map(QueueEntry::from);

        self.transaction_dao.commit(tx).await?;
        Ok(entry)
    }
}
