//! Traits for list storage, the aggregate service, and outbound ports.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::Result;
use crate::lists::lists_model::{Item, List, ListStatus, NewItem, NewList};

/// Outcome of a bulk price update: how many items changed and which lists
/// they belonged to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceUpdateOutcome {
    pub items_updated: usize,
    pub affected_lists: Vec<i64>,
}

/// Trait for list storage operations.
///
/// Reads are owner-scoped wherever an owner is given, and soft-deleted
/// rows are never returned. Implementations must apply each write
/// atomically with respect to every other write, including
/// `bulk_update_price`.
#[async_trait]
pub trait ListRepositoryTrait: Send + Sync {
    fn has_open_list(&self, user_id: &str) -> Result<bool>;

    /// Inserts a new list in the open status with zero totals. A second
    /// open list for the same owner is rejected with a unique-violation
    /// database error.
    async fn create_list(&self, new_list: NewList) -> Result<List>;

    fn get_list(&self, list_id: i64, user_id: &str) -> Result<Option<List>>;

    /// All non-deleted lists of an owner, most recently created first.
    fn get_lists(&self, user_id: &str) -> Result<Vec<List>>;

    /// Conditionally moves an open list into a terminal status. Returns
    /// the number of rows updated: zero when the list is absent, foreign,
    /// or no longer open.
    async fn set_list_status(
        &self,
        list_id: i64,
        user_id: &str,
        status: ListStatus,
    ) -> Result<usize>;

    async fn add_item(&self, new_item: NewItem) -> Result<Item>;

    /// Soft-deletes an item. Deleting an absent or already-deleted item
    /// affects zero rows.
    async fn remove_item(&self, item_id: i64) -> Result<usize>;

    /// Updates the purchased flag and nothing else; quantity and unit
    /// price are left untouched. Returns the refreshed item, or `None`
    /// when the item is absent or deleted.
    async fn set_item_purchased(&self, item_id: i64, purchased: bool) -> Result<Option<Item>>;

    fn get_item(&self, item_id: i64) -> Result<Option<Item>>;

    /// Applies a new unit price to every unpurchased, non-deleted item
    /// matching the product and market across all open lists, as one
    /// atomic statement.
    async fn bulk_update_price(
        &self,
        product_id: i64,
        market_id: i64,
        new_price: Decimal,
    ) -> Result<PriceUpdateOutcome>;

    /// Recomputes and persists both totals from a single consistent
    /// snapshot of the list's active items. Returns the refreshed list.
    async fn recompute_totals(&self, list_id: i64) -> Result<List>;
}

/// Trait for list aggregate operations, consumed by the request gateway
/// and by the price synchronization consumer.
#[async_trait]
pub trait ListServiceTrait: Send + Sync {
    async fn create_list(&self, user_id: &str, name: &str) -> Result<List>;
    fn get_list(&self, user_id: &str, list_id: i64) -> Result<List>;
    fn get_lists(&self, user_id: &str) -> Result<Vec<List>>;
    async fn finalize_list(&self, user_id: &str, list_id: i64) -> Result<List>;
    async fn cancel_list(&self, user_id: &str, list_id: i64) -> Result<List>;
    async fn add_item(&self, user_id: &str, new_item: NewItem) -> Result<Item>;
    async fn remove_item(&self, user_id: &str, item_id: i64) -> Result<()>;
    async fn set_item_purchased(
        &self,
        user_id: &str,
        item_id: i64,
        purchased: bool,
    ) -> Result<Item>;

    /// Applies an externally-sourced price change in bulk and refreshes
    /// the totals of every affected list. Returns the number of items
    /// whose price changed.
    async fn apply_price_change(
        &self,
        product_id: i64,
        market_id: i64,
        new_price: Decimal,
    ) -> Result<usize>;
}

/// Outbound port notified after an item transitions to purchased.
///
/// Implementations are observers, not participants: the caller logs their
/// failures and never rolls the purchase back.
#[async_trait]
pub trait PurchaseNotifierTrait: Send + Sync {
    async fn item_purchased(&self, user_id: &str, item: &Item) -> Result<()>;
}

/// No-op notifier for contexts without a downstream consumer.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPurchaseNotifier;

#[async_trait]
impl PurchaseNotifierTrait for NoopPurchaseNotifier {
    async fn item_purchased(&self, _user_id: &str, _item: &Item) -> Result<()> {
        Ok(())
    }
}
