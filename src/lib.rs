//! Core of a small lending library: a catalog of books, a registry of people
//! keyed by CPF, and the borrow/return rules that keep a book and its borrower
//! pointing at each other. The `ui` module wraps the core in a terminal menu.
pub mod config;
pub mod error;
pub mod library;
pub mod logging;
pub mod models;
pub mod ui;

pub use config::Config;
pub use error::{LibraryError, Result};

/// The aggregate root and the outcomes its operations report.
pub use library::{BookAdded, BorrowOutcome, Library, ReturnOutcome};

/// Entities and the ids used to refer to them.
pub use models::{Book, BookId, Borrower, Person, PersonId};

/// The interactive shell entry point and state container.
pub use ui::{run_app, App};
