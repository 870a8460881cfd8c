//! Database models for lists and their items.
//!
//! Monetary and quantity columns are stored as TEXT and parsed into
//! `Decimal` on the way out, so no precision is lost to floating point.

use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;

use cartlist_core::lists::{Item, List, ListStatus, NewItem};

use crate::errors::StorageError;

#[derive(Queryable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::lists)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ListDB {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub status: String,
    pub projected_total: String,
    pub settled_total: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::lists)]
pub struct NewListDB {
    pub user_id: String,
    pub name: String,
    pub status: String,
    pub projected_total: String,
    pub settled_total: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Selectable, Associations, Debug, Clone)]
#[diesel(belongs_to(ListDB, foreign_key = list_id))]
#[diesel(table_name = crate::schema::list_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ItemDB {
    pub id: i64,
    pub list_id: i64,
    pub product_id: i64,
    pub market_id: Option<i64>,
    pub quantity: String,
    pub unit_price: String,
    pub purchased: bool,
    pub created_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::list_items)]
pub struct NewItemDB {
    pub list_id: i64,
    pub product_id: i64,
    pub market_id: Option<i64>,
    pub quantity: String,
    pub unit_price: String,
    pub purchased: bool,
    pub created_at: NaiveDateTime,
}

fn parse_decimal(column: &str, raw: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(raw)
        .map_err(|e| StorageError::SerializationError(format!("column {column}: {e}")))
}

impl ListDB {
    /// Converts into the domain model, attaching the given active items.
    pub fn into_domain(self, items: Vec<Item>) -> Result<List, StorageError> {
        let status =
            ListStatus::from_str(&self.status).map_err(StorageError::SerializationError)?;
        Ok(List {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            status,
            projected_total: parse_decimal("projected_total", &self.projected_total)?,
            settled_total: parse_decimal("settled_total", &self.settled_total)?,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ItemDB {
    pub fn into_domain(self) -> Result<Item, StorageError> {
        Ok(Item {
            id: self.id,
            list_id: self.list_id,
            product_id: self.product_id,
            market_id: self.market_id,
            quantity: parse_decimal("quantity", &self.quantity)?,
            unit_price: parse_decimal("unit_price", &self.unit_price)?,
            purchased: self.purchased,
        })
    }
}

impl NewItemDB {
    /// Items always enter unpurchased; the price given at insert is the
    /// initial value the bulk path may later overwrite.
    pub fn from_domain(new_item: &NewItem, now: NaiveDateTime) -> Self {
        NewItemDB {
            list_id: new_item.list_id,
            product_id: new_item.product_id,
            market_id: new_item.market_id,
            quantity: new_item.quantity.to_string(),
            unit_price: new_item.unit_price.to_string(),
            purchased: false,
            created_at: now,
        }
    }
}
