#[cfg(test)]
mod integration_test;

use std::sync::Arc;

use dao_impl_sqlite::{
    booking::BookingDaoImpl, booking_status_history::BookingStatusHistoryDaoImpl,
    break_interval::BreakIntervalDaoImpl, clinic_service::ClinicServiceDaoImpl,
    off_day::OffDayDaoImpl, queue_entry::QueueEntryDaoImpl, working_hours::WorkingHoursDaoImpl,
    TransactionDaoImpl, TransactionImpl,
};
use service_impl::{
    availability::{AvailabilityServiceDeps, AvailabilityServiceImpl},
    booking::{BookingServiceDeps, BookingServiceImpl},
    lifecycle::{BookingLifecycleServiceDeps, BookingLifecycleServiceImpl},
    notification::ChannelNotificationService,
    queue::{QueueServiceDeps, QueueServiceImpl},
    schedule::{ScheduleServiceDeps, ScheduleServiceImpl},
    suggestion::{SuggestionServiceDeps, SuggestionServiceImpl},
    time_grid::{TimeGridServiceDeps, TimeGridServiceImpl},
};
use sqlx::SqlitePool;

type Transaction = TransactionImpl;
type TransactionDao = TransactionDaoImpl;
type BookingDao = BookingDaoImpl;
type BookingStatusHistoryDao = BookingStatusHistoryDaoImpl;
type QueueEntryDao = QueueEntryDaoImpl;
pub type ClinicServiceDao = ClinicServiceDaoImpl;
type WorkingHoursDao = WorkingHoursDaoImpl;
type BreakIntervalDao = BreakIntervalDaoImpl;
type OffDayDao = OffDayDaoImpl;

type ClockService = service_impl::clock::ClockServiceImpl;
type UuidService = service_impl::uuid_service::UuidServiceImpl;
type ConfigService = service_impl::config::ConfigServiceImpl;
type NotificationService = ChannelNotificationService;

pub struct TimeGridServiceDependencies;
impl TimeGridServiceDeps for TimeGridServiceDependencies {
    type Transaction = Transaction;
    type WorkingHoursDao = WorkingHoursDao;
    type BreakIntervalDao = BreakIntervalDao;
    type OffDayDao = OffDayDao;
    type TransactionDao = TransactionDao;
}
pub type TimeGridService = TimeGridServiceImpl<TimeGridServiceDependencies>;

pub struct AvailabilityServiceDependencies;
impl AvailabilityServiceDeps for AvailabilityServiceDependencies {
    type Transaction = Transaction;
    type BookingDao = BookingDao;
    type TransactionDao = TransactionDao;
}
pub type AvailabilityService = AvailabilityServiceImpl<AvailabilityServiceDependencies>;

pub struct BookingLifecycleServiceDependencies;
impl BookingLifecycleServiceDeps for BookingLifecycleServiceDependencies {
    type Transaction = Transaction;
    type BookingDao = BookingDao;
    type BookingStatusHistoryDao = BookingStatusHistoryDao;
    type ClockService = ClockService;
    type UuidService = UuidService;
    type TransactionDao = TransactionDao;
}
type BookingLifecycleService = BookingLifecycleServiceImpl<BookingLifecycleServiceDependencies>;

pub struct QueueServiceDependencies;
impl QueueServiceDeps for QueueServiceDependencies {
    type Transaction = Transaction;
    type BookingDao = BookingDao;
    type QueueEntryDao = QueueEntryDao;
    type ClinicServiceDao = ClinicServiceDao;
    type AvailabilityService = AvailabilityService;
    type BookingLifecycleService = BookingLifecycleService;
    type NotificationService = NotificationService;
    type ClockService = ClockService;
    type UuidService = UuidService;
    type TransactionDao = TransactionDao;
}
pub type QueueService = QueueServiceImpl<QueueServiceDependencies>;

pub struct BookingServiceDependencies;
impl BookingServiceDeps for BookingServiceDependencies {
    type Transaction = Transaction;
    type BookingDao = BookingDao;
    type ClinicServiceDao = ClinicServiceDao;
    type TimeGridService = TimeGridService;
    type AvailabilityService = AvailabilityService;
    type BookingLifecycleService = BookingLifecycleService;
    type QueueService = QueueService;
    type NotificationService = NotificationService;
    type ConfigService = ConfigService;
    type ClockService = ClockService;
    type UuidService = UuidService;
    type TransactionDao = TransactionDao;
}
pub type BookingService = BookingServiceImpl<BookingServiceDependencies>;

pub struct SuggestionServiceDependencies;
impl SuggestionServiceDeps for SuggestionServiceDependencies {
    type Transaction = Transaction;
    type ClinicServiceDao = ClinicServiceDao;
    type TimeGridService = TimeGridService;
    type AvailabilityService = AvailabilityService;
    type ConfigService = ConfigService;
    type ClockService = ClockService;
    type TransactionDao = TransactionDao;
}
pub type SuggestionService = SuggestionServiceImpl<SuggestionServiceDependencies>;

pub struct ScheduleServiceDependencies;
impl ScheduleServiceDeps for ScheduleServiceDependencies {
    type Transaction = Transaction;
    type WorkingHoursDao = WorkingHoursDao;
    type BreakIntervalDao = BreakIntervalDao;
    type OffDayDao = OffDayDao;
    type ClockService = ClockService;
    type UuidService = UuidService;
    type TransactionDao = TransactionDao;
}
pub type ScheduleService = ScheduleServiceImpl<ScheduleServiceDependencies>;

/// The wired service graph on top of one SQLite pool.
pub struct ClinicState {
    pub booking_service: Arc<BookingService>,
    pub queue_service: Arc<QueueService>,
    pub availability_service: Arc<AvailabilityService>,
    pub time_grid_service: Arc<TimeGridService>,
    pub suggestion_service: Arc<SuggestionService>,
    pub schedule_service: Arc<ScheduleService>,
    pub clinic_service_dao: Arc<ClinicServiceDao>,
}

impl ClinicState {
    pub fn new(pool: Arc<SqlitePool>, notification_service: Arc<NotificationService>) -> Self {
        let transaction_dao = Arc::new(TransactionDao::new(pool.clone()));
        let booking_dao = Arc::new(BookingDao::new(pool.clone()));
        let booking_status_history_dao = Arc::new(BookingStatusHistoryDao::new(pool.clone()));
        let queue_entry_dao = Arc::new(QueueEntryDao::new(pool.clone()));
        let clinic_service_dao = Arc::new(ClinicServiceDao::new(pool.clone()));
        let working_hours_dao = Arc::new(WorkingHoursDao::new(pool.clone()));
        let break_interval_dao = Arc::new(BreakIntervalDao::new(pool.clone()));
        let off_day_dao = Arc::new(OffDayDao::new(pool.clone()));

        let clock_service = Arc::new(service_impl::clock::ClockServiceImpl);
        let uuid_service = Arc::new(service_impl::uuid_service::UuidServiceImpl);
        let config_service = Arc::new(service_impl::config::ConfigServiceImpl);

        let time_grid_service = Arc::new(TimeGridService {
            working_hours_dao: working_hours_dao.clone(),
            break_interval_dao: break_interval_dao.clone(),
            off_day_dao: off_day_dao.clone(),
            transaction_dao: transaction_dao.clone(),
        });
        let availability_service = Arc::new(AvailabilityService {
            booking_dao: booking_dao.clone(),
            transaction_dao: transaction_dao.clone(),
        });
        let booking_lifecycle_service = Arc::new(BookingLifecycleService {
            booking_dao: booking_dao.clone(),
            booking_status_history_dao,
            clock_service: clock_service.clone(),
            uuid_service: uuid_service.clone(),
            transaction_dao: transaction_dao.clone(),
        });
        let queue_service = Arc::new(QueueService {
            booking_dao: booking_dao.clone(),
            queue_entry_dao,
            clinic_service_dao: clinic_service_dao.clone(),
            availability_service: availability_service.clone(),
            booking_lifecycle_service: booking_lifecycle_service.clone(),
            notification_service: notification_service.clone(),
            clock_service: clock_service.clone(),
            uuid_service: uuid_service.clone(),
            transaction_dao: transaction_dao.clone(),
        });
        let booking_service = Arc::new(BookingService {
            booking_dao,
            clinic_service_dao: clinic_service_dao.clone(),
            time_grid_service: time_grid_service.clone(),
            availability_service: availability_service.clone(),
            booking_lifecycle_service,
            queue_service: queue_service.clone(),
            notification_service,
            config_service: config_service.clone(),
            clock_service: clock_service.clone(),
            uuid_service: uuid_service.clone(),
            transaction_dao: transaction_dao.clone(),
        });
        let suggestion_service = Arc::new(SuggestionService {
            clinic_service_dao: clinic_service_dao.clone(),
            time_grid_service: time_grid_service.clone(),
            availability_service: availability_service.clone(),
            config_service,
            clock_service: clock_service.clone(),
            transaction_dao: transaction_dao.clone(),
        });
        let schedule_service = Arc::new(ScheduleService {
            working_hours_dao,
            break_interval_dao,
            off_day_dao,
            clock_service,
            uuid_service,
            transaction_dao,
        });

        Self {
            booking_service,
            queue_service,
            availability_service,
            time_grid_service,
            suggestion_service,
            schedule_service,
            clinic_service_dao,
        }
    }
}
