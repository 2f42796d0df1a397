use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("delivery failed: {0}")]
    Delivery(#[from] reqwest::Error),
    #[error("no recipients configured")]
    NoRecipients,
}

/// Outbound notification boundary. Delivery is fire-and-forget from the
/// caller's perspective; the event processor logs failures and moves on.
#[async_trait]
pub trait NotificationDispatch: Send + Sync {
    /// Announces a newly submitted (non-draft) order.
    async fn notify_new_order(
        &self,
        to_emails: &[String],
        order_number: i64,
        vin: &str,
        creator_name: &str,
        order_type: &str,
    ) -> Result<(), NotificationError>;
}

/// Posts notification payloads to a configured webhook, which owns the
/// actual email fan-out.
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl WebhookNotifier {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl NotificationDispatch for WebhookNotifier {
    #[instrument(skip(self, to_emails), fields(order_number, vin))]
    async fn notify_new_order(
        &self,
        to_emails: &[String],
        order_number: i64,
        vin: &str,
        creator_name: &str,
        order_type: &str,
    ) -> Result<(), NotificationError> {
        if to_emails.is_empty() {
            return Err(NotificationError::NoRecipients);
        }

        let payload = json!({
            "kind": "new_order",
            "to": to_emails,
            "order_number": order_number,
            "vin": vin,
            "creator_name": creator_name,
            "order_type": order_type,
        });

        self.client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Fallback dispatcher when no webhook is configured: the notification is
/// only recorded in the log stream.
pub struct TracingNotifier;

#[async_trait]
impl NotificationDispatch for TracingNotifier {
    async fn notify_new_order(
        &self,
        to_emails: &[String],
        order_number: i64,
        vin: &str,
        creator_name: &str,
        order_type: &str,
    ) -> Result<(), NotificationError> {
        info!(
            recipients = to_emails.len(),
            order_number,
            %vin,
            %creator_name,
            %order_type,
            "new-order notification (log only)"
        );
        Ok(())
    }
}
