use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};

use crate::errors::Result;
use crate::notifications::notifications_errors::NotificationError;
use crate::notifications::notifications_model::EmailMessage;
use crate::notifications::notifications_traits::NotifierTrait;

/// Sends mail by POSTing the message to an HTTP mail relay endpoint.
pub struct HttpMailRelay {
    client: reqwest::Client,
    relay_url: String,
}

impl HttpMailRelay {
    pub fn new(relay_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        HttpMailRelay { client, relay_url }
    }
}

#[async_trait]
impl NotifierTrait for HttpMailRelay {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        let response = self
            .client
            .post(&self.relay_url)
            .json(&message)
            .send()
            .await
            .map_err(NotificationError::from)?;

        if !response.status().is_success() {
            return Err(NotificationError::RelayRejected(response.status().as_u16()).into());
        }
        Ok(())
    }
}

/// Logs instead of sending. Used when no mail relay is configured.
pub struct NoopNotifier;

#[async_trait]
impl NotifierTrait for NoopNotifier {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        info!(
            "Mail relay not configured; dropping mail to {} ({})",
            message.recipient_email, message.subject
        );
        Ok(())
    }
}

/// Dispatches notifications as detached tasks after the originating write
/// committed. Failures are logged, never propagated to the request.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn NotifierTrait>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn NotifierTrait>) -> Self {
        NotificationDispatcher { notifier }
    }

    pub fn dispatch_detached(&self, message: EmailMessage) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.send(message.clone()).await {
                warn!(
                    "Failed to notify {} about '{}': {}",
                    message.recipient_email, message.subject, e
                );
            }
        });
    }
}
