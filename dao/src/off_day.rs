use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffDayEntity {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub date: Date,
    pub reason: Option<Arc<str>>,
    pub created: PrimitiveDateTime,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait OffDayDao {
    type Transaction: crate::Transaction;

    async fn find_by_id(&self, id: Uuid, tx: Self::Transaction)
        -> Result<Option<OffDayEntity>, DaoError>;
    async fn find_by_doctor_and_date(
        &self,
        doctor_id: Uuid,
        date: Date,
        tx: Self::Transaction,
    ) -> Result<Option<OffDayEntity>, DaoError>;
    /// Live off days with `from <= date <= to`.
    async fn find_by_doctor_in_range(
        &self,
        doctor_id: Uuid,
        from: Date,
        to: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[OffDayEntity]>, DaoError>;
    async fn create(
        &self,
        entity: &OffDayEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn update(
        &self,
        entity: &OffDayEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}
