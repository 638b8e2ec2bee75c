use std::env;

use async_trait::async_trait;
use service::{
    config::{Config, ConfigService},
    ServiceError,
};
use tracing::warn;

pub const DEFAULT_TRANSIENT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_MAX_SUGGESTION_DAYS: u32 = 31;

fn u32_from_env(name: &str, default: u32) -> u32 {
    match env::var(name) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid value '{}' of {}, using {}", value, name, default);
            default
        }),
        Err(_) => default,
    }
}

pub struct ConfigServiceImpl;

#[async_trait]
impl ConfigService for ConfigServiceImpl {
    async fn get_config(&self) -> Result<Config, ServiceError> {
        let transient_retry_attempts = u32_from_env(
            "CLINIC_TRANSIENT_RETRY_ATTEMPTS",
            DEFAULT_TRANSIENT_RETRY_ATTEMPTS,
        );
        let max_suggestion_days =
            u32_from_env("CLINIC_MAX_SUGGESTION_DAYS", DEFAULT_MAX_SUGGESTION_DAYS);

        Ok(Config {
            transient_retry_attempts,
            max_suggestion_days,
        })
    }
}
