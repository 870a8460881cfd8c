//! SQLite storage layer for cartlist.
//!
//! Implements the repository traits defined in `cartlist-core` on top of
//! diesel + SQLite. Reads go through an r2d2 pool; every write is
//! executed by a single writer task inside an immediate transaction,
//! which is what makes check-then-write cycles and the bulk price update
//! atomic with respect to each other.

pub mod db;
pub mod errors;
pub mod lists;
pub mod schema;

pub use lists::ListRepository;
