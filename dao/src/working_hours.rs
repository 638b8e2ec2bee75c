use std::sync::Arc;

use async_trait::async_trait;
use clinic_utils::{DayOfWeek, TimeOfDay};
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkingHoursEntity {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub created: PrimitiveDateTime,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait WorkingHoursDao {
    type Transaction: crate::Transaction;

    async fn find_by_doctor_and_day(
        &self,
        doctor_id: Uuid,
        day_of_week: DayOfWeek,
        tx: Self::Transaction,
    ) -> Result<Option<WorkingHoursEntity>, DaoError>;
    async fn find_by_doctor(
        &self,
        doctor_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[WorkingHoursEntity]>, DaoError>;
    async fn create(
        &self,
        entity: &WorkingHoursEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn update(
        &self,
        entity: &WorkingHoursEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}
