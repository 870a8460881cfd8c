//! In-process broadcast bus for domain notifications.

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::broadcast;

use cartlist_core::errors::Result;
use cartlist_core::lists::{Item, PurchaseNotifierTrait};

/// Event name published when an item is marked purchased.
pub const ITEM_PURCHASED: &str = "item:purchased";

#[derive(Clone, Debug)]
pub struct ServerEvent {
    pub name: &'static str,
    pub payload: Option<Value>,
}

/// Lightweight broadcast bus that fans events out to any connected
/// listeners.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ServerEvent) {
        // Lagging or absent listeners must never block publishers.
        let _ = self.sender.send(event);
    }
}

/// Purchase notifier that publishes onto the broadcast bus.
pub struct BusPurchaseNotifier {
    bus: EventBus,
}

impl BusPurchaseNotifier {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl PurchaseNotifierTrait for BusPurchaseNotifier {
    async fn item_purchased(&self, user_id: &str, item: &Item) -> Result<()> {
        self.bus.publish(ServerEvent {
            name: ITEM_PURCHASED,
            payload: Some(json!({
                "userId": user_id,
                "itemId": item.id,
                "listId": item.list_id,
                "productId": item.product_id,
                "marketId": item.market_id,
                "unitPrice": item.unit_price,
            })),
        });
        Ok(())
    }
}
