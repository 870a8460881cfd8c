//! List aggregate service.
//!
//! Owns every list and item state transition: creation, item mutation,
//! finalization, and the bulk price path invoked by the price
//! synchronization consumer. Every operation validates ownership before
//! touching anything, and totals are recomputed after every item mutation
//! from a snapshot held by the storage layer.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use rust_decimal::Decimal;

use super::lists_errors::ListError;
use super::lists_model::{Item, List, ListStatus, NewItem, NewList};
use super::lists_traits::{ListRepositoryTrait, ListServiceTrait, PurchaseNotifierTrait};
use crate::errors::{DatabaseError, Error, Result, ValidationError};

pub struct ListService {
    repository: Arc<dyn ListRepositoryTrait>,
    notifier: Arc<dyn PurchaseNotifierTrait>,
}

impl ListService {
    pub fn new(
        repository: Arc<dyn ListRepositoryTrait>,
        notifier: Arc<dyn PurchaseNotifierTrait>,
    ) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// Loads a list owned by `user_id` and verifies it still accepts item
    /// mutations.
    fn get_open_list(&self, user_id: &str, list_id: i64) -> Result<List> {
        let list = self
            .repository
            .get_list(list_id, user_id)?
            .ok_or(ListError::ListNotFound)?;
        if list.status != ListStatus::Open {
            return Err(ListError::NotOpen(list.id).into());
        }
        Ok(list)
    }

    /// Moves an open list into a terminal status. Totals are left at
    /// their last computed value.
    async fn close_list(&self, user_id: &str, list_id: i64, target: ListStatus) -> Result<List> {
        let list = self
            .repository
            .get_list(list_id, user_id)?
            .ok_or(ListError::ListNotFound)?;
        if list.status != ListStatus::Open {
            return Err(ListError::NotOpen(list.id).into());
        }

        let updated = self
            .repository
            .set_list_status(list_id, user_id, target)
            .await?;
        if updated == 0 {
            // Lost the race against another finalizer.
            return Err(ListError::NotOpen(list_id).into());
        }

        self.repository
            .get_list(list_id, user_id)?
            .ok_or_else(|| ListError::ListNotFound.into())
    }
}

#[async_trait]
impl ListServiceTrait for ListService {
    async fn create_list(&self, user_id: &str, name: &str) -> Result<List> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        if self.repository.has_open_list(user_id)? {
            return Err(ListError::OpenListExists.into());
        }

        debug!("Creating list '{}' for user {}", name, user_id);
        let new_list = NewList {
            user_id: user_id.to_string(),
            name: name.to_string(),
        };
        match self.repository.create_list(new_list).await {
            Ok(list) => Ok(list),
            // Two concurrent creates can both pass the check above; the
            // store's uniqueness guard rejects the second insert.
            Err(Error::Database(DatabaseError::UniqueViolation(_))) => {
                Err(ListError::OpenListExists.into())
            }
            Err(e) => Err(e),
        }
    }

    fn get_list(&self, user_id: &str, list_id: i64) -> Result<List> {
        self.repository
            .get_list(list_id, user_id)?
            .ok_or_else(|| ListError::ListNotFound.into())
    }

    fn get_lists(&self, user_id: &str) -> Result<Vec<List>> {
        self.repository.get_lists(user_id)
    }

    async fn finalize_list(&self, user_id: &str, list_id: i64) -> Result<List> {
        self.close_list(user_id, list_id, ListStatus::Closed).await
    }

    async fn cancel_list(&self, user_id: &str, list_id: i64) -> Result<List> {
        self.close_list(user_id, list_id, ListStatus::Cancelled)
            .await
    }

    async fn add_item(&self, user_id: &str, new_item: NewItem) -> Result<Item> {
        if new_item.quantity <= Decimal::ZERO {
            return Err(
                ValidationError::InvalidInput("quantity must be positive".to_string()).into(),
            );
        }
        if new_item.unit_price < Decimal::ZERO {
            return Err(
                ValidationError::InvalidInput("unit price must not be negative".to_string())
                    .into(),
            );
        }

        self.get_open_list(user_id, new_item.list_id)?;
        let item = self.repository.add_item(new_item).await?;
        self.repository.recompute_totals(item.list_id).await?;
        Ok(item)
    }

    async fn remove_item(&self, user_id: &str, item_id: i64) -> Result<()> {
        let item = match self.repository.get_item(item_id)? {
            Some(item) => item,
            // Absent or already removed: nothing to do.
            None => return Ok(()),
        };

        self.get_open_list(user_id, item.list_id)?;
        self.repository.remove_item(item.id).await?;
        self.repository.recompute_totals(item.list_id).await?;
        Ok(())
    }

    async fn set_item_purchased(
        &self,
        user_id: &str,
        item_id: i64,
        purchased: bool,
    ) -> Result<Item> {
        let item = self
            .repository
            .get_item(item_id)?
            .ok_or(ListError::ItemNotFound)?;
        self.get_open_list(user_id, item.list_id)?;

        let was_purchased = item.purchased;
        let item = self
            .repository
            .set_item_purchased(item_id, purchased)
            .await?
            .ok_or(ListError::ItemNotFound)?;
        self.repository.recompute_totals(item.list_id).await?;

        if purchased && !was_purchased {
            if let Err(e) = self.notifier.item_purchased(user_id, &item).await {
                warn!("Purchase notification for item {} failed: {}", item.id, e);
            }
        }
        Ok(item)
    }

    async fn apply_price_change(
        &self,
        product_id: i64,
        market_id: i64,
        new_price: Decimal,
    ) -> Result<usize> {
        if new_price < Decimal::ZERO {
            return Err(
                ValidationError::InvalidInput("unit price must not be negative".to_string())
                    .into(),
            );
        }

        let outcome = self
            .repository
            .bulk_update_price(product_id, market_id, new_price)
            .await?;
        if outcome.items_updated == 0 {
            debug!(
                "Price change for product {} at market {} matched no open items",
                product_id, market_id
            );
            return Ok(0);
        }

        debug!(
            "Updated price of {} item(s) across {} list(s), recomputing totals",
            outcome.items_updated,
            outcome.affected_lists.len()
        );
        for list_id in &outcome.affected_lists {
            self.repository.recompute_totals(*list_id).await?;
        }
        Ok(outcome.items_updated)
    }
}
