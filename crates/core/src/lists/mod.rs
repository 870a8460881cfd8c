//! Shopping lists: domain models, the aggregate service, and the storage
//! traits it is built against.

mod lists_errors;
mod lists_model;
mod lists_service;
mod lists_traits;


pub use lists_errors::ListError;
pub use lists_model::{compute_totals, Item, List, ListStatus, ListTotals, NewItem, NewList};
pub use lists_service::ListService;
pub use lists_traits::{
    ListRepositoryTrait, ListServiceTrait, NoopPurchaseNotifier, PriceUpdateOutcome,
    PurchaseNotifierTrait,
};
