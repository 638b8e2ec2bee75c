mod booking_flow;
mod concurrency;
mod schedule;

use std::sync::Arc;
use std::time::Duration;

use clinic_utils::{DayOfWeek, TimeOfDay};
use dao::{
    clinic_service::{ClinicServiceDao, ClinicServiceEntity},
    TransactionDao,
};
use dao_impl_sqlite::TransactionDaoImpl;
use service::{
    booking::{Booking, BookingRequest, BookingService},
    notification::{Notification, NotificationEvent},
    schedule::ScheduleService,
    ServiceError,
};
use service_impl::notification::ChannelNotificationService;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tempfile::TempDir;
use time::{macros::date, Date};
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use crate::ClinicState;

/// A Monday far enough in the future to never be in the past.
pub const MONDAY: Date = date!(2099 - 03 - 02);
pub const SATURDAY: Date = date!(2099 - 03 - 07);

pub fn hm(hour: u8, minute: u8) -> TimeOfDay {
    TimeOfDay::from_hm(hour, minute).unwrap()
}

pub struct TestSetup {
    pub clinic_state: ClinicState,
    pub notifications: UnboundedReceiver<Notification>,
    pub doctor_id: Uuid,
    transaction_dao: TransactionDaoImpl,
    _database_dir: TempDir,
}

impl TestSetup {
    /// Fresh file database with a doctor working 08:00-17:00 on Mondays.
    pub async fn new() -> Self {
        let database_dir = tempfile::tempdir().unwrap();
        let options = SqliteConnectOptions::new()
            .filename(database_dir.path().join("clinic.sqlite3"))
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10))
            .foreign_keys(true);
        let pool = Arc::new(
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await
                .unwrap(),
        );
        sqlx::migrate!("../migrations/sqlite")
            .run(pool.as_ref())
            .await
            .unwrap();

        let (notification_service, notifications) = ChannelNotificationService::channel();
        let clinic_state = ClinicState::new(pool.clone(), Arc::new(notification_service));
        let doctor_id = Uuid::new_v4();
        clinic_state
            .schedule_service
            .set_working_hours(doctor_id, DayOfWeek::Monday, hm(8, 0), hm(17, 0), None)
            .await
            .unwrap();

        Self {
            clinic_state,
            notifications,
            doctor_id,
            transaction_dao: TransactionDaoImpl::new(pool),
            _database_dir: database_dir,
        }
    }

    pub async fn create_clinic_service(&self, duration_minutes: u32, max_slots_per_hour: u32) -> Uuid {
        let entity = ClinicServiceEntity {
            id: Uuid::new_v4(),
            name: "Consultation".into(),
            duration_minutes,
            max_slots_per_hour,
            created: time::macros::datetime!(2099-01-01 00:00:00),
            deleted: None,
            version: Uuid::new_v4(),
        };
        let tx = self.transaction_dao.new_transaction().await.unwrap();
        self.clinic_state
            .clinic_service_dao
            .create(&entity, "integration-test", tx.clone())
            .await
            .unwrap();
        self.transaction_dao.commit(tx).await.unwrap();
        entity.id
    }

    pub async fn change_service_duration(&self, service_id: Uuid, duration_minutes: u32) {
        let tx = self.transaction_dao.new_transaction().await.unwrap();
        let clinic_service_dao = &self.clinic_state.clinic_service_dao;
        let entity = clinic_service_dao
            .find_by_id(service_id, tx.clone())
            .await
            .unwrap()
            .unwrap();
        let entity = ClinicServiceEntity {
            duration_minutes,
            version: Uuid::new_v4(),
            ..entity
        };
        clinic_service_dao
            .update(&entity, "integration-test", tx.clone())
            .await
            .unwrap();
        self.transaction_dao.commit(tx).await.unwrap();
    }

    pub fn request(&self, patient_id: Uuid, service_id: Uuid, start: TimeOfDay) -> BookingRequest {
        BookingRequest {
            patient_id,
            doctor_id: self.doctor_id,
            service_id,
            date: MONDAY,
            start,
            notes: None,
        }
    }

    pub async fn book(&self, service_id: Uuid, start: TimeOfDay) -> Result<Booking, ServiceError> {
        self.clinic_state
            .booking_service
            .create_booking(
                &self.request(Uuid::new_v4(), service_id, start),
                "patient-portal".into(),
                None,
            )
            .await
    }

    /// Events sent so far, in order.
    pub fn drain_events(&mut self) -> Vec<(NotificationEvent, Uuid)> {
        let mut events = Vec::new();
        while let Ok(notification) = self.notifications.try_recv() {
            events.push((notification.event, notification.booking_id));
        }
        events
    }
}
