//! SQLite storage for lists and their items.

mod model;
mod repository;

pub use repository::ListRepository;
