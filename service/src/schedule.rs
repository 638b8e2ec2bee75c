use std::sync::Arc;

use async_trait::async_trait;
use clinic_utils::{DayOfWeek, TimeOfDay};
use dao::{
    break_interval::BreakIntervalEntity, off_day::OffDayEntity,
    working_hours::WorkingHoursEntity,
};
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::ServiceError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkingHours {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub created: Option<PrimitiveDateTime>,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}
impl From<&WorkingHoursEntity> for WorkingHours {
    fn from(entity: &WorkingHoursEntity) -> Self {
        Self {
            id: entity.id,
            doctor_id: entity.doctor_id,
            day_of_week: entity.day_of_week,
            start: entity.start,
            end: entity.end,
            created: Some(entity.created),
            deleted: entity.deleted,
            version: entity.version,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreakInterval {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub date: Date,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub reason: Option<Arc<str>>,
    pub created: Option<PrimitiveDateTime>,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}
impl From<&BreakIntervalEntity> for BreakInterval {
    fn from(entity: &BreakIntervalEntity) -> Self {
        Self {
            id: entity.id,
            doctor_id: entity.doctor_id,
            date: entity.date,
            start: entity.start,
            end: entity.end,
            reason: entity.reason.clone(),
            created: Some(entity.created),
            deleted: entity.deleted,
            version: entity.version,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffDay {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub date: Date,
    pub reason: Option<Arc<str>>,
    pub created: Option<PrimitiveDateTime>,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}
impl From<&OffDayEntity> for OffDay {
    fn from(entity: &OffDayEntity) -> Self {
        Self {
            id: entity.id,
            doctor_id: entity.doctor_id,
            date: entity.date,
            reason: entity.reason.clone(),
            created: Some(entity.created),
            deleted: entity.deleted,
            version: entity.version,
        }
    }
}

/// Maintains the weekly working hours, breaks and off days a doctor's slot
/// grid is computed from.
#[automock(type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait ScheduleService {
    type Transaction: dao::Transaction;

    /// Creates or replaces the working hours of the weekday.
    async fn set_working_hours(
        &self,
        doctor_id: Uuid,
        day_of_week: DayOfWeek,
        start: TimeOfDay,
        end: TimeOfDay,
        tx: Option<Self::Transaction>,
    ) -> Result<WorkingHours, ServiceError>;
    async fn get_working_hours(
        &self,
        doctor_id: Uuid,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[WorkingHours]>, ServiceError>;
    async fn remove_working_hours(
        &self,
        doctor_id: Uuid,
        day_of_week: DayOfWeek,
        tx: Option<Self::Transaction>,
    ) -> Result<WorkingHours, ServiceError>;

    async fn add_break(
        &self,
        doctor_id: Uuid,
        date: Date,
        start: TimeOfDay,
        end: TimeOfDay,
        reason: Option<Arc<str>>,
        tx: Option<Self::Transaction>,
    ) -> Result<BreakInterval, ServiceError>;
    async fn remove_break(
        &self,
        id: Uuid,
        tx: Option<Self::Transaction>,
    ) -> Result<BreakInterval, ServiceError>;
    async fn get_breaks(
        &self,
        doctor_id: Uuid,
        date: Date,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[BreakInterval]>, ServiceError>;

    async fn add_off_day(
        &self,
        doctor_id: Uuid,
        date: Date,
        reason: Option<Arc<str>>,
        tx: Option<Self::Transaction>,
    ) -> Result<OffDay, ServiceError>;
    async fn remove_off_day(
        &self,
        id: Uuid,
        tx: Option<Self::Transaction>,
    ) -> Result<OffDay, ServiceError>;
    async fn get_off_days(
        &self,
        doctor_id: Uuid,
        from: Date,
        to: Date,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[OffDay]>, ServiceError>;
}
