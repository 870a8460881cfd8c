//! List domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a list.
///
/// Transitions only move forward: `Open` may become `Closed` or
/// `Cancelled`; a terminal status never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListStatus {
    Open,
    Closed,
    Cancelled,
}

impl ListStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListStatus::Open => "OPEN",
            ListStatus::Closed => "CLOSED",
            ListStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ListStatus::Open)
    }
}

impl FromStr for ListStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(ListStatus::Open),
            "CLOSED" => Ok(ListStatus::Closed),
            "CANCELLED" => Ok(ListStatus::Cancelled),
            other => Err(format!("Unknown list status: {other}")),
        }
    }
}

impl fmt::Display for ListStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's shopping list with its active items and derived totals.
///
/// `projected_total` is the expected cost over every active item;
/// `settled_total` is the amount actually spent, covering the purchased
/// subset. Both are caches of [`compute_totals`] over `items` and are
/// refreshed after every item mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub status: ListStatus,
    pub projected_total: Decimal,
    pub settled_total: Decimal,
    pub items: Vec<Item>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A priced, quantified line entry belonging to exactly one list.
///
/// Once `purchased` is set the unit price is frozen: nothing but an
/// explicit uncheck makes it writable again, and the bulk price path
/// skips purchased items entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub list_id: i64,
    pub product_id: i64,
    pub market_id: Option<i64>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub purchased: bool,
}

/// Input model for creating a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewList {
    pub user_id: String,
    pub name: String,
}

/// Input model for adding an item to a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub list_id: i64,
    pub product_id: i64,
    pub market_id: Option<i64>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

/// Derived totals of a list.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ListTotals {
    pub projected: Decimal,
    pub settled: Decimal,
}

/// Recomputes both totals from a snapshot of a list's active items.
///
/// Callers must pass the complete active item set read in one go; totals
/// derived from a partially-updated read are meaningless.
pub fn compute_totals(items: &[Item]) -> ListTotals {
    let mut totals = ListTotals::default();
    for item in items {
        let line = item.quantity * item.unit_price;
        totals.projected += line;
        if item.purchased {
            totals.settled += line;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn item(id: i64, quantity: Decimal, unit_price: Decimal, purchased: bool) -> Item {
        Item {
            id,
            list_id: 1,
            product_id: 42,
            market_id: Some(7),
            quantity,
            unit_price,
            purchased,
        }
    }

    #[test]
    fn totals_of_empty_item_set_are_zero() {
        let totals = compute_totals(&[]);
        assert_eq!(totals.projected, Decimal::ZERO);
        assert_eq!(totals.settled, Decimal::ZERO);
    }

    #[test]
    fn projected_covers_all_items_settled_only_purchased() {
        let items = vec![
            item(1, dec!(2), dec!(3.50), true),
            item(2, dec!(1), dec!(4.00), false),
        ];
        let totals = compute_totals(&items);
        assert_eq!(totals.projected, dec!(11.00));
        assert_eq!(totals.settled, dec!(7.00));
    }

    #[test]
    fn fractional_quantities_are_supported() {
        let items = vec![item(1, dec!(0.5), dec!(9.90), false)];
        let totals = compute_totals(&items);
        assert_eq!(totals.projected, dec!(4.950));
        assert_eq!(totals.settled, Decimal::ZERO);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [ListStatus::Open, ListStatus::Closed, ListStatus::Cancelled] {
            assert_eq!(status.as_str().parse::<ListStatus>(), Ok(status));
        }
        assert!("ARCHIVED".parse::<ListStatus>().is_err());
    }
}
