//! Price-change event payloads.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product/market price record carried by a price-change event.
///
/// Only `product_id`, `market_id` and `unit_price` are interpreted here;
/// the provenance fields are tolerated so feed payloads decode whole, but
/// nothing downstream reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketProduct {
    #[serde(default)]
    pub id: i64,
    pub product_id: i64,
    pub market_id: i64,
    pub unit_price: Decimal,
    #[serde(default)]
    pub confidence_level: Option<i32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Envelope published by the pricing feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceChangedEvent {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub user_id: String,
    pub market_product: MarketProduct,
}
