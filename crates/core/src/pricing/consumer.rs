//! Price synchronization consumer.
//!
//! Drains the pricing feed strictly in arrival order and applies each
//! price change through the list service. One event is applied fully,
//! including totals recomputation, before the next is pulled, so a slow
//! store throttles intake on its own. Undecodable events and apply
//! failures are logged and dropped; there is no retry. The loop stops
//! when the feed channel closes.

use std::sync::Arc;

use log::{error, info, warn};
use tokio::sync::mpsc;

use super::model::PriceChangedEvent;
use crate::lists::ListServiceTrait;

pub struct PriceSyncConsumer {
    lists: Arc<dyn ListServiceTrait>,
}

impl PriceSyncConsumer {
    pub fn new(lists: Arc<dyn ListServiceTrait>) -> Self {
        Self { lists }
    }

    /// Runs until the sending side of the feed channel is dropped.
    pub async fn run(self, mut rx: mpsc::Receiver<String>) {
        info!("Price sync consumer started");
        while let Some(payload) = rx.recv().await {
            self.process(&payload).await;
        }
        info!("Price sync consumer stopped: feed channel closed");
    }

    async fn process(&self, payload: &str) {
        let event: PriceChangedEvent = match serde_json::from_str(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!("Discarding undecodable price event: {}", e);
                return;
            }
        };

        let product = &event.market_product;
        match self
            .lists
            .apply_price_change(product.product_id, product.market_id, product.unit_price)
            .await
        {
            Ok(updated) => {
                info!(
                    "Applied price {} for product {} at market {} to {} item(s)",
                    product.unit_price, product.product_id, product.market_id, updated
                );
            }
            Err(e) => {
                error!(
                    "Dropping price event for product {} at market {}: {}",
                    product.product_id, product.market_id, e
                );
            }
        }
    }
}
