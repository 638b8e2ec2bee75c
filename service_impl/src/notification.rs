use std::sync::Arc;

use async_trait::async_trait;
use service::{
    notification::{Notification, NotificationDispatcher, NotificationService},
    ServiceError,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Hands notifications to a background worker over an unbounded channel so
/// that callers never wait for delivery.
pub struct ChannelNotificationService {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotificationService {
    /// Returns the service and the receiving end for
    /// [`run_notification_worker`].
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl NotificationService for ChannelNotificationService {
    fn notify(&self, notification: Notification) {
        if let Err(err) = self.sender.send(notification) {
            warn!(
                "Notification worker is gone, dropping {:?} of booking {}",
                err.0.event, err.0.booking_id
            );
        }
    }
}

/// Delivers notifications until every sender is dropped. Delivery failures
/// are logged and skipped.
pub async fn run_notification_worker<Dispatcher: NotificationDispatcher + Send + Sync>(
    mut receiver: mpsc::UnboundedReceiver<Notification>,
    dispatcher: Arc<Dispatcher>,
) {
    info!("Notification worker started");
    while let Some(notification) = receiver.recv().await {
        if let Err(err) = dispatcher.dispatch(&notification).await {
            error!(
                "Dispatching {:?} of booking {} failed: {}",
                notification.event, notification.booking_id, err
            );
        }
    }
    debug!("Notification channel closed");
}

/// Writes every notification as a JSON log line.
pub struct LogNotificationDispatcher;

#[async_trait]
impl NotificationDispatcher for LogNotificationDispatcher {
    async fn dispatch(&self, notification: &Notification) -> Result<(), ServiceError> {
        let payload = serde_json::to_string(notification).map_err(|err| {
            error!("Could not serialize notification: {}", err);
            ServiceError::InternalError
        })?;
        info!(target: "notification", "{}", payload);
        Ok(())
    }
}
