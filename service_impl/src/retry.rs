use std::future::Future;
use std::time::Duration;

use service::ServiceError;
use tracing::warn;

const RETRY_BACKOFF_MILLIS: u64 = 25;

/// Runs `operation` up to `attempts` times while it fails with a transient
/// store conflict, sleeping a little longer before each new attempt.
///
/// Every attempt must open its own transaction.
pub async fn retry_on_transient<T, F, Fut>(
    attempts: u32,
    operation_name: &str,
    mut operation: F,
) -> Result<T, ServiceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation().await {
            Err(err) if err.is_transient() && attempt < attempts => {
                warn!(
                    "{} hit a transient conflict (attempt {}/{}): {}",
                    operation_name, attempt, attempts, err
                );
                tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MILLIS * attempt as u64))
                    .await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
