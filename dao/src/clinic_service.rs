use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::DaoError;

/// A bookable medical service of the clinic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClinicServiceEntity {
    pub id: Uuid,
    pub name: Arc<str>,
    pub duration_minutes: u32,
    /// Concurrent bookings allowed per distinct slot start.
    pub max_slots_per_hour: u32,
    pub created: PrimitiveDateTime,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait ClinicServiceDao {
    type Transaction: crate::Transaction;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<ClinicServiceEntity>, DaoError>;
    async fn create(
        &self,
        entity: &ClinicServiceEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn update(
        &self,
        entity: &ClinicServiceEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}
