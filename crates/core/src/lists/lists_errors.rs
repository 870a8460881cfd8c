//! List-related error types.

use thiserror::Error;

/// Errors raised by list aggregate operations.
///
/// Absence and foreign ownership are deliberately collapsed into the same
/// not-found variants so callers cannot probe for other users' lists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListError {
    #[error("User already has an open list")]
    OpenListExists,

    #[error("List {0} is not open")]
    NotOpen(i64),

    #[error("List not found")]
    ListNotFound,

    #[error("Item not found")]
    ItemNotFound,
}
