//! Price synchronization: feed payloads and the bulk-apply consumer.

mod consumer;
mod model;

#[cfg(test)]
mod consumer_tests;

pub use consumer::PriceSyncConsumer;
pub use model::{MarketProduct, PriceChangedEvent};
