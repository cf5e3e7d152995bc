use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Domain events emitted by the service layer after state changes commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    EmployeeCreated {
        employee_id: Uuid,
        role: String,
    },
    EmployeeStatusChanged {
        employee_id: Uuid,
        status: String,
    },
    BranchAssigned {
        employee_id: Uuid,
        branch_id: Uuid,
    },
    ProductSubmitted {
        product_id: Uuid,
        company_id: Uuid,
    },
    ProductReviewed {
        product_id: Uuid,
        approval_status: String,
    },
    OrderPlaced {
        order_id: Uuid,
        branch_id: Uuid,
        quantity: i32,
    },
    OrderStatusChanged {
        order_id: Uuid,
        status: String,
    },
    OrderDelivered {
        order_id: Uuid,
        branch_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    },
    StockAdjusted {
        branch_id: Uuid,
        product_id: Uuid,
        old_quantity: i32,
        new_quantity: i32,
    },
    SaleRecorded {
        sale_id: Uuid,
        branch_id: Uuid,
        amount: Decimal,
        profit_or_loss: Decimal,
    },
    InstallationCompleted {
        sale_id: Uuid,
    },
    MessagePosted {
        message_id: Uuid,
        audience: String,
    },
}

/// Sends events into the processing channel without blocking request handlers.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Background loop that drains the event channel. Runs until the
/// channel closes when the last sender is dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::StockAdjusted {
                branch_id,
                product_id,
                new_quantity,
                ..
            } if *new_quantity <= 5 => {
                warn!(
                    branch_id = %branch_id,
                    product_id = %product_id,
                    quantity = new_quantity,
                    "Stock running low"
                );
            }
            Event::SaleRecorded {
                sale_id,
                branch_id,
                amount,
                ..
            } => {
                info!(sale_id = %sale_id, branch_id = %branch_id, amount = %amount, "Sale recorded");
            }
            Event::OrderDelivered {
                order_id, quantity, ..
            } => {
                info!(order_id = %order_id, quantity = quantity, "Order delivered, stock replenished");
            }
            _ => {
                debug!(event = ?event, "Processing event");
            }
        }
    }
    info!("Event processor stopped");
}

/// Payload pushed to connected websocket clients when a message is posted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageNotice {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub sender_role: String,
    pub audience: String,
    pub recipient_id: Option<Uuid>,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// Broadcast fan-out for live message notifications.
#[derive(Debug, Clone)]
pub struct MessageHub {
    sender: broadcast::Sender<MessageNotice>,
}

impl MessageHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a notice to all connected subscribers. Returns the
    /// number of receivers that got it; zero subscribers is not an error.
    pub fn publish(&self, notice: MessageNotice) -> usize {
        self.sender.send(notice).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MessageNotice> {
        self.sender.subscribe()
    }
}

impl Default for MessageHub {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_sender_delivers_to_channel() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);
        sender
            .send(Event::InstallationCompleted {
                sale_id: Uuid::new_v4(),
            })
            .await
            .unwrap();

        let received = rx.recv().await.unwrap();
        assert!(matches!(received, Event::InstallationCompleted { .. }));
    }

    #[tokio::test]
    async fn hub_broadcasts_to_all_subscribers() {
        let hub = MessageHub::new(8);
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        let delivered = hub.publish(MessageNotice {
            id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            sender_name: "Owner".into(),
            sender_role: "owner".into(),
            audience: "all_staff".into(),
            recipient_id: None,
            body: "hello".into(),
            sent_at: Utc::now(),
        });
        assert_eq!(delivered, 2);

        assert_eq!(a.recv().await.unwrap().body, "hello");
        assert_eq!(b.recv().await.unwrap().body, "hello");
    }

    #[test]
    fn publish_without_subscribers_is_not_an_error() {
        let hub = MessageHub::new(8);
        let delivered = hub.publish(MessageNotice {
            id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            sender_name: "Owner".into(),
            sender_role: "owner".into(),
            audience: "all_staff".into(),
            recipient_id: None,
            body: "nobody listening".into(),
            sent_at: Utc::now(),
        });
        assert_eq!(delivered, 0);
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let event = Event::StockAdjusted {
            branch_id: Uuid::nil(),
            product_id: Uuid::nil(),
            old_quantity: 10,
            new_quantity: 4,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "stock_adjusted");
        assert_eq!(json["new_quantity"], 4);
    }
}
