use std::sync::Arc;

use async_trait::async_trait;
use clinic_utils::TimeOfDay;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreakIntervalEntity {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub date: Date,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub reason: Option<Arc<str>>,
    pub created: PrimitiveDateTime,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait BreakIntervalDao {
    type Transaction: crate::Transaction;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<BreakIntervalEntity>, DaoError>;
    async fn find_by_doctor_and_date(
        &self,
        doctor_id: Uuid,
        date: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[BreakIntervalEntity]>, DaoError>;
    async fn create(
        &self,
        entity: &BreakIntervalEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn update(
        &self,
        entity: &BreakIntervalEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}
