use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::booking::BookingStatusEntity;
use crate::DaoError;

/// Append only. There is no update or delete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingStatusHistoryEntity {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub old_status: Option<BookingStatusEntity>,
    pub new_status: BookingStatusEntity,
    pub changed_by: Arc<str>,
    pub reason: Option<Arc<str>>,
    pub created: PrimitiveDateTime,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait BookingStatusHistoryDao {
    type Transaction: crate::Transaction;

    async fn create(
        &self,
        entity: &BookingStatusHistoryEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn find_by_booking_id(
        &self,
        booking_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[BookingStatusHistoryEntity]>, DaoError>;
}
