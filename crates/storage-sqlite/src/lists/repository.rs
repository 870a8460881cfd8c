//! SQLite repository for lists and their items.
//!
//! Reads run on pooled connections; every mutation is a job on the
//! single-writer task, so each one executes alone inside an immediate
//! transaction. All read paths funnel through `active_lists` /
//! `active_items`, which apply the soft-delete filter in one place.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use log::debug;
use rust_decimal::Decimal;

use cartlist_core::errors::{DatabaseError, Result};
use cartlist_core::lists::{
    compute_totals, Item, List, ListRepositoryTrait, ListStatus, NewItem, NewList,
    PriceUpdateOutcome,
};

use super::model::{ItemDB, ListDB, NewItemDB, NewListDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{list_items, lists};

/// Base query for lists that still exist.
fn active_lists() -> lists::BoxedQuery<'static, Sqlite> {
    lists::table.filter(lists::deleted_at.is_null()).into_boxed()
}

/// Base query for items that still exist.
fn active_items() -> list_items::BoxedQuery<'static, Sqlite> {
    list_items::table
        .filter(list_items::deleted_at.is_null())
        .into_boxed()
}

fn load_active_items(
    conn: &mut SqliteConnection,
    list_id: i64,
) -> std::result::Result<Vec<Item>, StorageError> {
    let rows = active_items()
        .filter(list_items::list_id.eq(list_id))
        .order(list_items::id.asc())
        .load::<ItemDB>(conn)?;
    rows.into_iter().map(ItemDB::into_domain).collect()
}

pub struct ListRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ListRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        ListRepository { pool, writer }
    }
}

#[async_trait]
impl ListRepositoryTrait for ListRepository {
    fn has_open_list(&self, user_id: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let open = active_lists()
            .filter(lists::user_id.eq(user_id.to_string()))
            .filter(lists::status.eq(ListStatus::Open.as_str()))
            .first::<ListDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(open.is_some())
    }

    async fn create_list(&self, new_list: NewList) -> Result<List> {
        let now = Utc::now().naive_utc();
        let row = NewListDB {
            user_id: new_list.user_id,
            name: new_list.name,
            status: ListStatus::Open.as_str().to_string(),
            projected_total: Decimal::ZERO.to_string(),
            settled_total: Decimal::ZERO.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<List> {
                let created = diesel::insert_into(lists::table)
                    .values(&row)
                    .returning(ListDB::as_returning())
                    .get_result::<ListDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(created.into_domain(Vec::new())?)
            })
            .await
    }

    fn get_list(&self, list_id: i64, user_id: &str) -> Result<Option<List>> {
        let mut conn = get_connection(&self.pool)?;
        let row = active_lists()
            .filter(lists::id.eq(list_id))
            .filter(lists::user_id.eq(user_id.to_string()))
            .first::<ListDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };
        let items = load_active_items(&mut conn, row.id)?;
        Ok(Some(row.into_domain(items)?))
    }

    fn get_lists(&self, user_id: &str) -> Result<Vec<List>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = active_lists()
            .filter(lists::user_id.eq(user_id.to_string()))
            .order(lists::created_at.desc())
            .then_order_by(lists::id.desc())
            .load::<ListDB>(&mut conn)
            .map_err(StorageError::from)?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let items = load_active_items(&mut conn, row.id)?;
            result.push(row.into_domain(items)?);
        }
        Ok(result)
    }

    async fn set_list_status(
        &self,
        list_id: i64,
        user_id: &str,
        status: ListStatus,
    ) -> Result<usize> {
        let user_id = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let updated = diesel::update(
                    lists::table
                        .filter(lists::id.eq(list_id))
                        .filter(lists::user_id.eq(user_id))
                        .filter(lists::status.eq(ListStatus::Open.as_str()))
                        .filter(lists::deleted_at.is_null()),
                )
                .set((
                    lists::status.eq(status.as_str()),
                    lists::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(updated)
            })
            .await
    }

    async fn add_item(&self, new_item: NewItem) -> Result<Item> {
        let row = NewItemDB::from_domain(&new_item, Utc::now().naive_utc());
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Item> {
                let created = diesel::insert_into(list_items::table)
                    .values(&row)
                    .returning(ItemDB::as_returning())
                    .get_result::<ItemDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(created.into_domain()?)
            })
            .await
    }

    async fn remove_item(&self, item_id: i64) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let removed = diesel::update(
                    list_items::table
                        .filter(list_items::id.eq(item_id))
                        .filter(list_items::deleted_at.is_null()),
                )
                .set(list_items::deleted_at.eq(Utc::now().naive_utc()))
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(removed)
            })
            .await
    }

    async fn set_item_purchased(&self, item_id: i64, purchased: bool) -> Result<Option<Item>> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Option<Item>> {
                let updated = diesel::update(
                    list_items::table
                        .filter(list_items::id.eq(item_id))
                        .filter(list_items::deleted_at.is_null()),
                )
                .set(list_items::purchased.eq(purchased))
                .execute(conn)
                .map_err(StorageError::from)?;
                if updated == 0 {
                    return Ok(None);
                }

                let row = active_items()
                    .filter(list_items::id.eq(item_id))
                    .first::<ItemDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(Some(row.into_domain()?))
            })
            .await
    }

    fn get_item(&self, item_id: i64) -> Result<Option<Item>> {
        let mut conn = get_connection(&self.pool)?;
        let row = active_items()
            .filter(list_items::id.eq(item_id))
            .first::<ItemDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        match row {
            Some(row) => Ok(Some(row.into_domain()?)),
            None => Ok(None),
        }
    }

    async fn bulk_update_price(
        &self,
        product_id: i64,
        market_id: i64,
        new_price: Decimal,
    ) -> Result<PriceUpdateOutcome> {
        let price = new_price.to_string();
        self.writer
            .exec(
                move |conn: &mut SqliteConnection| -> Result<PriceUpdateOutcome> {
                    let open_list_ids = lists::table
                        .filter(lists::status.eq(ListStatus::Open.as_str()))
                        .filter(lists::deleted_at.is_null())
                        .select(lists::id);

                    let affected_lists = list_items::table
                        .filter(list_items::product_id.eq(product_id))
                        .filter(list_items::market_id.eq(market_id))
                        .filter(list_items::purchased.eq(false))
                        .filter(list_items::deleted_at.is_null())
                        .filter(list_items::list_id.eq_any(open_list_ids))
                        .select(list_items::list_id)
                        .distinct()
                        .load::<i64>(conn)
                        .map_err(StorageError::from)?;

                    if affected_lists.is_empty() {
                        return Ok(PriceUpdateOutcome::default());
                    }

                    let items_updated = diesel::update(
                        list_items::table
                            .filter(list_items::product_id.eq(product_id))
                            .filter(list_items::market_id.eq(market_id))
                            .filter(list_items::purchased.eq(false))
                            .filter(list_items::deleted_at.is_null())
                            .filter(list_items::list_id.eq_any(affected_lists.clone())),
                    )
                    .set(list_items::unit_price.eq(price))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                    debug!(
                        "Bulk price update touched {} item(s) in {} list(s)",
                        items_updated,
                        affected_lists.len()
                    );
                    Ok(PriceUpdateOutcome {
                        items_updated,
                        affected_lists,
                    })
                },
            )
            .await
    }

    async fn recompute_totals(&self, list_id: i64) -> Result<List> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<List> {
                let row = lists::table
                    .filter(lists::id.eq(list_id))
                    .filter(lists::deleted_at.is_null())
                    .first::<ListDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .ok_or_else(|| DatabaseError::NotFound(format!("list {list_id}")))?;

                // Items and totals are read and written inside the same
                // transaction, so the totals always describe exactly this
                // item snapshot.
                let items = load_active_items(conn, list_id)?;
                let totals = compute_totals(&items);
                let now = Utc::now().naive_utc();

                diesel::update(lists::table.filter(lists::id.eq(list_id)))
                    .set((
                        lists::projected_total.eq(totals.projected.to_string()),
                        lists::settled_total.eq(totals.settled.to_string()),
                        lists::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let refreshed = ListDB {
                    projected_total: totals.projected.to_string(),
                    settled_total: totals.settled.to_string(),
                    updated_at: now,
                    ..row
                };
                Ok(refreshed.into_domain(items)?)
            })
            .await
    }
}
