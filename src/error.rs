//! Error types for the lending library core.
//!
//! Domain refusals (duplicate CPF, book already out, book not held) are
//! ordinary return values. The variants here only cover ids that were not
//! handed out by the library they are used with.

use thiserror::Error;

use crate::models::{BookId, PersonId};

/// Result type alias using the library's error.
pub type Result<T> = std::result::Result<T, LibraryError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("{0} is not in the catalog.")]
    UnknownBook(BookId),

    #[error("{0} is not in the registry.")]
    UnknownPerson(PersonId),
}
