use std::sync::Arc;

use async_trait::async_trait;
use dao::{
    booking::{BookingDao, BookingEntity},
    clinic_service::ClinicServiceDao,
    TransactionDao,
};
use service::{
    availability::AvailabilityService,
    booking::{Booking, BookingRequest, BookingService, BookingStatus},
    clock::ClockService,
    config::ConfigService,
    lifecycle::{initial_status, BookingLifecycleService, BookingStatusChange},
    notification::{Notification, NotificationEvent, NotificationService},
    queue::QueueService,
    time_grid::TimeGridService,
    uuid_service::UuidService,
    ServiceError, ValidationFailureItem,
};
use time::Date;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::gen_service_impl;
use crate::retry::retry_on_transient;

const BOOKING_SERVICE_PROCESS: &str = "booking-service";

gen_service_impl! {
    struct BookingServiceImpl: service::booking::BookingService = BookingServiceDeps {
        BookingDao: dao::booking::BookingDao<Transaction = Self::Transaction> = booking_dao,
        ClinicServiceDao: dao::clinic_service::ClinicServiceDao<Transaction = Self::Transaction> = clinic_service_dao,
        TimeGridService: service::time_grid::TimeGridService<Transaction = Self::Transaction> = time_grid_service,
        AvailabilityService: service::availability::AvailabilityService<Transaction = Self::Transaction> = availability_service,
        BookingLifecycleService: service::lifecycle::BookingLifecycleService<Transaction = Self::Transaction> = booking_lifecycle_service,
        QueueService: service::queue::QueueService<Transaction = Self::Transaction> = queue_service,
        NotificationService: service::notification::NotificationService = notification_service,
        ConfigService: service::config::ConfigService = config_service,
        ClockService: service::clock::ClockService = clock_service,
        UuidService: service::uuid_service::UuidService = uuid_service,
        TransactionDao: dao::TransactionDao<Transaction = Self::Transaction> = transaction_dao
    }
}

impl<Deps: BookingServiceDeps> BookingServiceImpl<Deps> {
    async fn retry_attempts(&self) -> Result<u32, ServiceError> {
        Ok(self.config_service.get_config().await?.transient_retry_attempts)
    }

    async fn create_booking_once(
        &self,
        request: &BookingRequest,
        actor: Arc<str>,
        tx: Option<Deps::Transaction>,
    ) -> Result<Booking, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        self.booking_dao
            .lock_slot(request.doctor_id, request.date, request.start, tx.clone())
            .await?;

        let clinic_service = self
            .clinic_service_dao
            .find_by_id(request.service_id, tx.clone())
            .await?
            .filter(|clinic_service| clinic_service.deleted.is_none())
            .ok_or(ServiceError::EntityNotFound(request.service_id))?;
        if request.date < self.clock_service.date_now() {
            return Err(ServiceError::ValidationError(
                [ValidationFailureItem::InvalidValue("date".into())].into(),
            ));
        }

        let has_open_booking = self
            .booking_dao
            .find_by_patient_doctor_and_date(
                request.patient_id,
                request.doctor_id,
                request.date,
                tx.clone(),
            )
            .await?
            .iter()
            .any(|booking| !BookingStatus::from(booking.status).is_terminal());
        if has_open_booking {
            return Err(ServiceError::DuplicateBooking {
                patient_id: request.patient_id,
                doctor_id: request.doctor_id,
                date: request.date,
            });
        }

        self.time_grid_service
            .validate_slot(
                request.doctor_id,
                request.date,
                request.start,
                clinic_service.duration_minutes,
                Some(tx.clone()),
            )
            .await?;
        let availability = self
            .availability_service
            .check_availability(
                request.doctor_id,
                request.date,
                request.start,
                clinic_service.max_slots_per_hour,
                Some(tx.clone()),
            )
            .await?;
        let status = initial_status(&availability);
        let end = request
            .start
            .add_minutes(clinic_service.duration_minutes)
            .map_err(|_| ServiceError::InternalError)?;

        let now = self.clock_service.date_time_now();
        let entity = BookingEntity {
            id: self
                .uuid_service
                .new_uuid("booking-service::create_booking id"),
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            service_id: request.service_id,
            date: request.date,
            start: request.start,
            end,
            status: status.into(),
            notes: request.notes.clone(),
            created: now,
            updated: now,
            version: self
                .uuid_service
                .new_uuid("booking-service::create_booking version"),
        };
        self.booking_dao
            .create(&entity, BOOKING_SERVICE_PROCESS, tx.clone())
            .await?;
        let booking = Booking::from(&entity);
        self.booking_lifecycle_service
            .record_initial(&booking, actor, Some(tx.clone()))
            .await?;
        let queue_position = if status == BookingStatus::Queued {
            let entry = self
                .queue_service
                .enqueue(&booking, clinic_service.duration_minutes, Some(tx.clone()))
                .await?;
            Some(entry.queue_position)
        } else {
            None
        };

        self.transaction_dao.commit(tx).await?;
        info!(
            "Created booking {} for {} {} as {}",
            booking.id, booking.date, booking.start, booking.status
        );
        let event = if queue_position.is_some() {
            NotificationEvent::BookingQueued
        } else {
            NotificationEvent::BookingCreated
        };
        self.notification_service.notify(Notification::for_booking(
            event,
            &booking,
            queue_position,
            now,
        ));
        Ok(booking)
    }

    async fn transition_status_once(
        &self,
        booking_id: Uuid,
        new_status: BookingStatus,
        actor: Arc<str>,
        reason: Option<Arc<str>>,
        tx: Option<Deps::Transaction>,
    ) -> Result<Booking, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let current = self
            .booking_dao
            .find_by_id(booking_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(booking_id))?;
        let old_status = BookingStatus::from(current.status);

        if old_status == BookingStatus::Queued && new_status == BookingStatus::Confirmed {
            let booking = self
                .queue_service
                .promote(booking_id, actor, reason, Some(tx.clone()))
                .await?;
            self.transaction_dao.commit(tx).await?;
            return Ok(booking);
        }

        let booking = self
            .booking_lifecycle_service
            .apply_transition(booking_id, new_status, actor, reason, Some(tx.clone()))
            .await?;
        if old_status == BookingStatus::Queued && new_status == BookingStatus::Cancelled {
            self.queue_service
                .remove_from_queue(booking_id, Some(tx.clone()))
                .await?;
        }

        self.transaction_dao.commit(tx).await?;
        self.notification_service.notify(Notification::for_booking(
            NotificationEvent::for_status(new_status),
            &booking,
            None,
            self.clock_service.date_time_now(),
        ));
        Ok(booking)
    }
}

#[async_trait]
impl<Deps: BookingServiceDeps> BookingService for BookingServiceImpl<Deps> {
    type Transaction = Deps::Transaction;

    async fn create_booking(
        &self,
        request: &BookingRequest,
        actor: Arc<str>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError> {
        if tx.is_some() {
            return self.create_booking_once(request, actor, tx).await;
        }
        let attempts = self.retry_attempts().await?;
        retry_on_transient(attempts, "create_booking", || {
            self.create_booking_once(request, actor.clone(), None)
        })
        .await
    }

    async fn transition_status(
        &self,
        booking_id: Uuid,
        new_status: BookingStatus,
        actor: Arc<str>,
        reason: Option<Arc<str>>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError> {
        if tx.is_some() {
            let booking = self
                .transition_status_once(booking_id, new_status, actor, reason, tx)
                .await?;
            debug!(
                "Booking {} became {} inside a caller transaction, skipping auto promotion",
                booking.id, booking.status
            );
            return Ok(booking);
        }
        let attempts = self.retry_attempts().await?;
        let booking = retry_on_transient(attempts, "transition_status", || {
            self.transition_status_once(
                booking_id,
                new_status,
                actor.clone(),
                reason.clone(),
                None,
            )
        })
        .await?;

        if matches!(
            booking.status,
            BookingStatus::Cancelled | BookingStatus::Completed
        ) {
            match self
                .queue_service
                .auto_promote(booking.doctor_id, booking.date, booking.start, None)
                .await
            {
                Ok(true) => info!(
                    "Freed capacity of booking {} went to the queue head",
                    booking.id
                ),
                Ok(false) => {}
                Err(err) => warn!(
                    "Auto promotion after booking {} became {} failed: {}",
                    booking.id, booking.status, err
                ),
            }
        }
        Ok(booking)
    }

    async fn promote_queue_entry(
        &self,
        booking_id: Uuid,
        actor: Arc<str>,
        reason: Option<Arc<str>>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError> {
        if tx.is_some() {
            return self
                .queue_service
                .promote(booking_id, actor, reason, tx)
                .await;
        }
        let attempts = self.retry_attempts().await?;
        retry_on_transient(attempts, "promote_queue_entry", || {
            self.queue_service
                .promote(booking_id, actor.clone(), reason.clone(), None)
        })
        .await
    }

    async fn get(&self, id: Uuid, tx: Option<Self::Transaction>) -> Result<Booking, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let booking = self
            .booking_dao
            .find_by_id(id, tx.clone())
            .await?
            .map(Booking::from)
            .ok_or(ServiceError::EntityNotFound(id))?;

        self.transaction_dao.commit(tx).await?;
        Ok(booking)
    }

    async fn get_for_doctor_and_date(
        &self,
        doctor_id: Uuid,
        date: Date,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[Booking]>, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let bookings = self
            .booking_dao
            .find_by_doctor_and_date(doctor_id, date, tx.clone())
            .await?
            .iter()
            .map(Booking::from)
            .collect();

        self.transaction_dao.commit(tx).await?;
        Ok(bookings)
    }

    async fn get_status_history(
        &self,
        booking_id: Uuid,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[BookingStatusChange]>, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        if self
            .booking_dao
            .find_by_id(booking_id, tx.clone())
            .await?
            .is_none()
        {
            return Err(ServiceError::EntityNotFound(booking_id));
        }
        let history = self
            .booking_lifecycle_service
            .history(booking_id, Some(tx.clone()))
            .await?;

        self.transaction_dao.commit(tx).await?;
        Ok(history)
    }
}
