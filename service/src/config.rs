use crate::ServiceError;
use async_trait::async_trait;
use mockall::automock;

pub struct Config {
    /// Attempts of an operation owning its transaction when the store
    /// reports a transient conflict.
    pub transient_retry_attempts: u32,
    /// Longest date range accepted by slot suggestion, in days.
    pub max_suggestion_days: u32,
}

#[automock]
#[async_trait]
pub trait ConfigService {
    async fn get_config(&self) -> Result<Config, ServiceError>;
}
