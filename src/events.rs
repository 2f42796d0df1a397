use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::notifications::NotificationDispatch;

/// Events emitted by the service layer after a successful commit.
///
/// Delivery is best-effort: a full channel or a failed dispatch is logged
/// and never surfaced to the request that produced the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// A non-draft order was created, converted from draft, or resubmitted.
    /// Draft saves never emit this.
    OrderSubmitted {
        order_id: Uuid,
        order_number: i64,
        vin: String,
        creator_name: String,
        order_type: String,
    },
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    InternalStatusChanged {
        order_id: Uuid,
        new_internal_status: String,
    },
    WarrantyActivated {
        warranty_id: Uuid,
        vin: String,
    },
    WarrantyAnnulled {
        warranty_id: Uuid,
        vin: String,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {e}"))
    }
}

/// Drains the event channel and triggers outbound notifications.
///
/// Runs until every sender is dropped. Spawned once from `main`.
pub async fn process_events(
    mut receiver: mpsc::Receiver<Event>,
    dispatcher: Arc<dyn NotificationDispatch>,
    notify_emails: Vec<String>,
) {
    while let Some(event) = receiver.recv().await {
        match event {
            Event::OrderSubmitted {
                order_id,
                order_number,
                ref vin,
                ref creator_name,
                ref order_type,
            } => {
                info!(%order_id, order_number, %vin, %order_type, "order submitted");
                if let Err(e) = dispatcher
                    .notify_new_order(&notify_emails, order_number, vin, creator_name, order_type)
                    .await
                {
                    warn!(%order_id, error = %e, "new-order notification failed");
                }
            }
            Event::OrderStatusChanged {
                order_id,
                ref old_status,
                ref new_status,
            } => {
                info!(%order_id, %old_status, %new_status, "order status changed");
            }
            Event::InternalStatusChanged {
                order_id,
                ref new_internal_status,
            } => {
                info!(%order_id, %new_internal_status, "internal status changed");
            }
            Event::WarrantyActivated { warranty_id, ref vin } => {
                info!(%warranty_id, %vin, "warranty activated");
            }
            Event::WarrantyAnnulled { warranty_id, ref vin } => {
                info!(%warranty_id, %vin, "warranty annulled");
            }
        }
    }
    info!("event channel closed; processor exiting");
}
