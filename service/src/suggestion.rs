use std::sync::Arc;

use async_trait::async_trait;
use clinic_utils::TimeOfDay;
use mockall::automock;
use serde::Serialize;
use time::Date;
use uuid::Uuid;

use crate::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
pub enum TimePreference {
    Morning,
    Afternoon,
    #[default]
    Any,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub doctor_id: Uuid,
    pub service_id: Uuid,
    pub from: Date,
    pub to: Date,
    pub preference: TimePreference,
    pub earliest: Option<TimeOfDay>,
    pub latest: Option<TimeOfDay>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScoredSlot {
    pub date: Date,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub remaining: u32,
    pub score: i32,
}

#[automock(type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait SuggestionService {
    type Transaction: dao::Transaction;

    /// Open slots in `request.from..=request.to`, best first, at most `limit`.
    async fn suggest_slots(
        &self,
        request: &SuggestionRequest,
        limit: usize,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[ScoredSlot]>, ServiceError>;
}
