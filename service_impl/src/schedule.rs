use std::sync::Arc;

use async_trait::async_trait;
use clinic_utils::{DayOfWeek, TimeOfDay};
use dao::{
    break_interval::{BreakIntervalDao, BreakIntervalEntity},
    off_day::{OffDayDao, OffDayEntity},
    working_hours::{WorkingHoursDao, WorkingHoursEntity},
    TransactionDao,
};
use service::{
    clock::ClockService,
    schedule::{BreakInterval, OffDay, ScheduleService, WorkingHours},
    uuid_service::UuidService,
    ServiceError,
};
use time::Date;
use tracing::info;
use uuid::Uuid;

use crate::gen_service_impl;

const SCHEDULE_SERVICE_PROCESS: &str = "schedule-service";

gen_service_impl! {
    struct ScheduleServiceImpl: service::schedule::ScheduleService = ScheduleServiceDeps {
        WorkingHoursDao: dao::working_hours::WorkingHoursDao<Transaction = Self::Transaction> = working_hours_dao,
        BreakIntervalDao: dao::break_interval::BreakIntervalDao<Transaction = Self::Transaction> = break_interval_dao,
        OffDayDao: dao::off_day::OffDayDao<Transaction = Self::Transaction> = off_day_dao,
        ClockService: service::clock::ClockService = clock_service,
        UuidService: service::uuid_service::UuidService = uuid_service,
        TransactionDao: dao::TransactionDao<Transaction = Self::Transaction> = transaction_dao
    }
}

#[async_trait]
impl<Deps: ScheduleServiceDeps> ScheduleService for ScheduleServiceImpl<Deps> {
    type Transaction = Deps::Transaction;

    async fn set_working_hours(
        &self,
        doctor_id: Uuid,
        day_of_week: DayOfWeek,
        start: TimeOfDay,
        end: TimeOfDay,
        tx: Option<Self::Transaction>,
    ) -> Result<WorkingHours, ServiceError> {
        if start > end {
            return Err(ServiceError::TimeOrderWrong(start, end));
        }
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = match self
            .working_hours_dao
            .find_by_doctor_and_day(doctor_id, day_of_week, tx.clone())
            .await?
        {
            Some(existing) => {
                let entity = WorkingHoursEntity {
                    start,
                    end,
                    version: self
                        .uuid_service
                        .new_uuid("schedule-service::set_working_hours version"),
                    ..existing
                };
                self.working_hours_dao
                    .update(&entity, SCHEDULE_SERVICE_PROCESS, tx.clone())
                    .await?;
                entity
            }
            None => {
                let entity = WorkingHoursEntity {
                    id: self
                        .uuid_service
                        .new_uuid("schedule-service::set_working_hours id"),
                    doctor_id,
                    day_of_week,
                    start,
                    end,
                    created: self.clock_service.date_time_now(),
                    deleted: None,
                    version: self
                        .uuid_service
                        .new_uuid("schedule-service::set_working_hours version"),
                };
                self.working_hours_dao
                    .create(&entity, SCHEDULE_SERVICE_PROCESS, tx.clone())
                    .await?;
                entity
            }
        };

        self.transaction_dao.commit(tx).await?;
        info!(
            "Doctor {} works {}-{} on {}",
            doctor_id, start, end, day_of_week
        );
        Ok(WorkingHours::from(&entity))
    }

    async fn get_working_hours(
        &self,
        doctor_id: Uuid,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[WorkingHours]>, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let working_hours = self
            .working_hours_dao
            .find_by_doctor(doctor_id, tx.clone())
            .await?
            .iter()
            .map(WorkingHours::from)
            .collect();

        self.transaction_dao.commit(tx).await?;
        Ok(working_hours)
    }

    async fn remove_working_hours(
        &self,
        doctor_id: Uuid,
        day_of_week: DayOfWeek,
        tx: Option<Self::Transaction>,
    ) -> Result<WorkingHours, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let mut entity = self
            .working_hours_dao
            .find_by_doctor_and_day(doctor_id, day_of_week, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(doctor_id))?;
        entity.deleted = Some(self.clock_service.date_time_now());
        entity.version = self
            .uuid_service
            .new_uuid("schedule-service::remove_working_hours version");
        self.working_hours_dao
            .update(&entity, SCHEDULE_SERVICE_PROCESS, tx.clone())
            .await?;

        self.transaction_dao.commit(tx).await?;
        info!("Doctor {} no longer works on {}", doctor_id, day_of_week);
        Ok(WorkingHours::from(&entity))
    }

    async fn add_break(
        &self,
        doctor_id: Uuid,
        date: Date,
        start: TimeOfDay,
        end: TimeOfDay,
        reason: Option<Arc<str>>,
        tx: Option<Self::Transaction>,
    ) -> Result<BreakInterval, ServiceError> {
        if start >= end {
            return Err(ServiceError::TimeOrderWrong(start, end));
        }
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = BreakIntervalEntity {
            id: self.uuid_service.new_uuid("schedule-service::add_break id"),
            doctor_id,
            date,
            start,
            end,
            reason,
            created: self.clock_service.date_time_now(),
            deleted: None,
            version: self
                .uuid_service
                .new_uuid("schedule-service::add_break version"),
        };
        self.break_interval_dao
            .create(&entity, SCHEDULE_SERVICE_PROCESS, tx.clone())
            .await?;

        self.transaction_dao.commit(tx).await?;
        info!("Break {}-{} added for doctor {} on {}", start, end, doctor_id, date);
        Ok(BreakInterval::from(&entity))
    }

    async fn remove_break(
        &self,
        id: Uuid,
        tx: Option<Self::Transaction>,
    ) -> Result<BreakInterval, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let mut entity = self
            .break_interval_dao
            .find_by_id(id, tx.clone())
            .await?
            .filter(|entity| entity.deleted.is_none())
            .ok_or(ServiceError::EntityNotFound(id))?;
        entity.deleted = Some(self.clock_service.date_time_now());
        entity.version = self
            .uuid_service
            .new_uuid("schedule-service::remove_break version");
        self.break_interval_dao
            .update(&entity, SCHEDULE_SERVICE_PROCESS, tx.clone())
            .await?;

        self.transaction_dao.commit(tx).await?;
        Ok(BreakInterval::from(&entity))
    }

    async fn get_breaks(
        &self,
        doctor_id: Uuid,
        date: Date,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[BreakInterval]>, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let breaks = self
            .break_interval_dao
            .find_by_doctor_and_date(doctor_id, date, tx.clone())
            .await?
            .iter()
            .map(BreakInterval::from)
            .collect();

        self.transaction_dao.commit(tx).await?;
        Ok(breaks)
    }

    async fn add_off_day(
        &self,
        doctor_id: Uuid,
        date: Date,
        reason: Option<Arc<str>>,
        tx: Option<Self::Transaction>,
    ) -> Result<OffDay, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        if let Some(existing) = self
            .off_day_dao
            .find_by_doctor_and_date(doctor_id, date, tx.clone())
            .await?
        {
            return Err(ServiceError::EntityAlreadyExists(existing.id));
        }
        let entity = OffDayEntity {
            id: self.uuid_service.new_uuid("schedule-service::add_off_day id"),
            doctor_id,
            date,
            reason,
            created: self.clock_service.date_time_now(),
            deleted: None,
            version: self
                .uuid_service
                .new_uuid("schedule-service::add_off_day version"),
        };
        self.off_day_dao
            .create(&entity, SCHEDULE_SERVICE_PROCESS, tx.clone())
            .await?;

        self.transaction_dao.commit(tx).await?;
        info!("Doctor {} is off on {}", doctor_id, date);
        Ok(OffDay::from(&entity))
    }

    async fn remove_off_day(
        &self,
        id: Uuid,
        tx: Option<Self::Transaction>,
    ) -> Result<OffDay, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let mut entity = self
            .off_day_dao
            .find_by_id(id, tx.clone())
            .await?
            .filter(|entity| entity.deleted.is_none())
            .ok_or(ServiceError::EntityNotFound(id))?;
        entity.deleted = Some(self.clock_service.date_time_now());
        entity.version = self
            .uuid_service
            .new_uuid("schedule-service::remove_off_day version");
        self.off_day_dao
            .update(&entity, SCHEDULE_SERVICE_PROCESS, tx.clone())
            .await?;

        self.transaction_dao.commit(tx).await?;
        Ok(OffDay::from(&entity))
    }

    async fn get_off_days(
        &self,
        doctor_id: Uuid,
        from: Date,
        to: Date,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[OffDay]>, ServiceError> {
        if from > to {
            return Err(ServiceError::DateOrderWrong(from, to));
        }
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let off_days = self
            .off_day_dao
            .find_by_doctor_in_range(doctor_id, from, to, tx.clone())
            .await?
            .iter()
            .map(OffDay::from)
            .collect();

        self.transaction_dao.commit(tx).await?;
        Ok(off_days)
    }
}
