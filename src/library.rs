//! The library aggregate: sole owner of every book and person. All mutation
//! goes through here so the book-to-borrower link and the person's borrowed
//! list can never disagree.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, warn};

use crate::error::{LibraryError, Result};
use crate::models::{Book, BookId, Borrower, Person, PersonId};

/// Confirmation returned by [`Library::add_book`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookAdded {
    /// Handle of the new catalog entry.
    pub id: BookId,
    /// Title as stored.
    pub title: String,
    /// Author as stored.
    pub author: String,
    /// Publication year as stored.
    pub year: i32,
}

impl fmt::Display for BookAdded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Book \"{}\" ({}) by {} added to the library.",
            self.title, self.year, self.author
        )
    }
}

/// Result of a borrow attempt. Both variants are normal outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorrowOutcome {
    /// The book is now linked to `person`.
    Borrowed {
        /// Name of the new borrower.
        person: String,
        /// Title of the book taken.
        title: String,
    },
    /// The book was already out; nothing changed.
    AlreadyBorrowed {
        /// Title of the requested book.
        title: String,
        /// Name of whoever holds it, possibly the requester.
        holder: String,
    },
}

impl BorrowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BorrowOutcome::Borrowed { .. })
    }
}

impl fmt::Display for BorrowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BorrowOutcome::Borrowed { person, title } => {
                write!(f, "{person} borrowed \"{title}\".")
            }
            BorrowOutcome::AlreadyBorrowed { title, holder } => {
                write!(f, "\"{title}\" is already borrowed by {holder}.")
            }
        }
    }
}

/// Result of a return attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnOutcome {
    /// The link was cleared and the book is back on the shelf.
    Returned {
        /// Name of the person returning the book.
        person: String,
        /// Title of the returned book.
        title: String,
    },
    /// `person` does not hold the book; nothing changed.
    NotHeld {
        /// Name of the person who tried to return it.
        person: String,
        /// Title of the book they tried to return.
        title: String,
    },
}

impl ReturnOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ReturnOutcome::Returned { .. })
    }
}

impl fmt::Display for ReturnOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnOutcome::Returned { person, title } => {
                write!(f, "{person} returned \"{title}\".")
            }
            ReturnOutcome::NotHeld { person, title } => {
                write!(f, "{person} does not hold \"{title}\".")
            }
        }
    }
}

/// Source of per-instance tags stamped into every id a library hands out.
static NEXT_LIBRARY_TAG: AtomicU64 = AtomicU64::new(1);

/// Catalog and registry for one session. Both collections keep insertion
/// order, which the shell relies on to number its listings.
#[derive(Debug)]
pub struct Library {
    /// Distinguishes this instance's ids from those of any other library.
    tag: u64,
    /// Every book ever added, in insertion order.
    books: Vec<Book>,
    /// Every registered person, in registration order.
    people: Vec<Person>,
}

impl Default for Library {
    fn default() -> Self {
        Self {
            tag: NEXT_LIBRARY_TAG.fetch_add(1, Ordering::Relaxed),
            books: Vec::new(),
            people: Vec::new(),
        }
    }
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new, available title to the catalog.
    pub fn add_book(
        &mut self,
        title: impl Into<String>,
        author: impl Into<String>,
        year: i32,
    ) -> BookAdded {
        let id = BookId::new(self.tag, self.books.len());
        let book = Book::new(id, title.into(), author.into(), year);
        let added = BookAdded {
            id,
            title: book.title.clone(),
            author: book.author.clone(),
            year,
        };
        info!(%id, title = %book.title, "book added");
        self.books.push(book);
        added
    }

    /// Register a borrower. Returns `None` without touching the registry when
    /// the CPF is already taken.
    pub fn register_person(
        &mut self,
        name: impl Into<String>,
        cpf: impl Into<String>,
        phone: impl Into<String>,
    ) -> Option<&Person> {
        let cpf = cpf.into();
        if self.find_person(&cpf).is_some() {
            debug!(%cpf, "registration rejected, CPF already registered");
            return None;
        }

        let id = PersonId::new(self.tag, self.people.len());
        self.people
            .push(Person::new(id, name.into(), cpf, phone.into()));
        info!(%id, "person registered");
        self.people.last()
    }

    pub fn find_person(&self, cpf: &str) -> Option<&Person> {
        self.people.iter().find(|person| person.cpf() == cpf)
    }

    pub fn list_available_books(&self) -> Vec<&Book> {
        self.books.iter().filter(|book| book.is_available()).collect()
    }

    pub fn list_borrowed_books(&self) -> Vec<&Book> {
        self.books.iter().filter(|book| !book.is_available()).collect()
    }

    /// The whole catalog, in insertion order.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// The whole registry, in registration order.
    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn book(&self, id: BookId) -> Result<&Book> {
        self.books
            .get(id.index)
            .filter(|_| id.library == self.tag)
            .ok_or(LibraryError::UnknownBook(id))
    }

    pub fn person(&self, id: PersonId) -> Result<&Person> {
        self.people
            .get(id.index)
            .filter(|_| id.library == self.tag)
            .ok_or(LibraryError::UnknownPerson(id))
    }

    /// Who holds `book`, if anyone.
    pub fn holder(&self, book: BookId) -> Result<Option<&Person>> {
        match self.book(book)?.borrower() {
            Borrower::Unborrowed => Ok(None),
            Borrower::BorrowedBy(person) => self.person(person).map(Some),
        }
    }

    /// Books held by `person`, in the order they were borrowed.
    pub fn borrowed_by(&self, person: PersonId) -> Result<Vec<&Book>> {
        self.person(person)?
            .borrowed()
            .iter()
            .map(|id| self.book(*id))
            .collect()
    }

    /// `"Title" (year) by Author - Available` or `... - Borrowed by Name`.
    pub fn describe_book(&self, book: BookId) -> Result<String> {
        let holder = self.holder(book)?;
        Ok(self.book(book)?.describe(holder))
    }

    /// Lend `book` to `person`. Refusal when someone else (or the same
    /// person) already has it is reported through the outcome.
    pub fn borrow(&mut self, person: PersonId, book: BookId) -> Result<BorrowOutcome> {
        self.person(person)?;
        self.book(book)?;

        let (borrower, volume) = self.entry_pair(person, book);
        let outcome = match borrower.borrow(volume) {
            Ok(()) => BorrowOutcome::Borrowed {
                person: borrower.name.clone(),
                title: volume.title.clone(),
            },
            Err(holder) => {
                let title = volume.title.clone();
                let holder = self.person(holder)?.name.clone();
                warn!(%person, %book, "borrow refused, book already out");
                return Ok(BorrowOutcome::AlreadyBorrowed { title, holder });
            }
        };
        info!(%person, %book, "book borrowed");
        Ok(outcome)
    }

    /// Take `book` back from `person`. A person can only return what they
    /// currently hold.
    pub fn return_book(&mut self, person: PersonId, book: BookId) -> Result<ReturnOutcome> {
        self.person(person)?;
        self.book(book)?;

        let (borrower, volume) = self.entry_pair(person, book);
        let name = borrower.name.clone();
        let title = volume.title.clone();
        if borrower.return_book(volume) {
            info!(%person, %book, "book returned");
            Ok(ReturnOutcome::Returned {
                person: name,
                title,
            })
        } else {
            warn!(%person, %book, "return refused, book not held");
            Ok(ReturnOutcome::NotHeld {
                person: name,
                title,
            })
        }
    }

    /// Split mutable access to one person and one book. Callers check both
    /// ids first.
    fn entry_pair(&mut self, person: PersonId, book: BookId) -> (&mut Person, &mut Book) {
        (&mut self.people[person.index], &mut self.books[book.index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stocked() -> (Library, PersonId, PersonId, BookId) {
        let mut library = Library::new();
        let ana = library.register_person("Ana", "111", "999").unwrap().id();
        let bruno = library.register_person("Bruno", "222", "888").unwrap().id();
        let dune = library.add_book("Dune", "Herbert", 1965).id;
        (library, ana, bruno, dune)
    }

    #[test]
    fn add_book_confirms_and_starts_available() {
        let mut library = Library::new();
        let added = library.add_book("Dune", "Herbert", 1965);

        assert_eq!(
            added.to_string(),
            "Book \"Dune\" (1965) by Herbert added to the library."
        );
        assert_eq!(library.books().len(), 1);
        assert!(library.book(added.id).unwrap().is_available());
    }

    #[test]
    fn duplicate_cpf_leaves_registry_alone() {
        let mut library = Library::new();
        assert!(library.register_person("Ana", "111", "999").is_some());
        assert!(library.register_person("Bruno", "111", "888").is_none());

        assert_eq!(library.people().len(), 1);
        assert_eq!(library.find_person("111").unwrap().name, "Ana");
    }

    #[test]
    fn cpf_is_not_format_checked() {
        let mut library = Library::new();
        assert!(library.register_person("Ana", "", "").is_some());
        assert!(library.register_person("Bruno", "not a cpf", "").is_some());
        assert!(library.register_person("Carla", "", "").is_none());
    }

    #[test]
    fn borrow_then_return_restores_state() {
        let (mut library, ana, _, dune) = stocked();

        let borrowed = library.borrow(ana, dune).unwrap();
        assert_eq!(borrowed.to_string(), "Ana borrowed \"Dune\".");
        assert!(!library.book(dune).unwrap().is_available());
        assert_eq!(library.holder(dune).unwrap().unwrap().id(), ana);
        assert_eq!(
            library.describe_book(dune).unwrap(),
            "\"Dune\" (1965) by Herbert - Borrowed by Ana"
        );

        let returned = library.return_book(ana, dune).unwrap();
        assert_eq!(returned.to_string(), "Ana returned \"Dune\".");
        assert!(library.book(dune).unwrap().is_available());
        assert!(library.borrowed_by(ana).unwrap().is_empty());
        assert_eq!(
            library.describe_book(dune).unwrap(),
            "\"Dune\" (1965) by Herbert - Available"
        );
    }

    #[test]
    fn already_borrowed_names_the_holder() {
        let (mut library, ana, bruno, dune) = stocked();
        library.borrow(ana, dune).unwrap();

        let refused = library.borrow(bruno, dune).unwrap();
        assert!(!refused.is_success());
        assert_eq!(refused.to_string(), "\"Dune\" is already borrowed by Ana.");
        assert_eq!(library.holder(dune).unwrap().unwrap().id(), ana);
        assert!(library.borrowed_by(bruno).unwrap().is_empty());
    }

    #[test]
    fn borrowing_own_book_twice_is_refused() {
        let (mut library, ana, _, dune) = stocked();
        library.borrow(ana, dune).unwrap();

        let again = library.borrow(ana, dune).unwrap();
        assert!(!again.is_success());
        assert_eq!(library.person(ana).unwrap().borrowed().len(), 1);
    }

    #[test]
    fn returning_unheld_book_is_a_no_op() {
        let (mut library, ana, bruno, dune) = stocked();
        library.borrow(ana, dune).unwrap();

        let refused = library.return_book(bruno, dune).unwrap();
        assert!(!refused.is_success());
        assert_eq!(refused.to_string(), "Bruno does not hold \"Dune\".");
        assert_eq!(library.holder(dune).unwrap().unwrap().id(), ana);
    }

    #[test]
    fn out_of_range_ids_are_errors() {
        let (mut library, ana, _, dune) = stocked();
        let ghost = PersonId::new(library.tag, 9);
        let missing = BookId::new(library.tag, 4);

        assert_eq!(
            library.borrow(ghost, dune),
            Err(LibraryError::UnknownPerson(ghost))
        );
        assert_eq!(
            library.return_book(ana, missing),
            Err(LibraryError::UnknownBook(missing))
        );
        assert!(library.book(dune).unwrap().is_available());
    }

    #[test]
    fn ids_from_another_library_are_rejected() {
        let (mut first, ana, _, _) = stocked();
        let (mut second, _, bruno, dune) = stocked();

        assert_eq!(ana.index, 0);
        assert!(second.person(ana).is_err());
        assert_eq!(
            second.borrow(ana, dune),
            Err(LibraryError::UnknownPerson(ana))
        );
        assert!(second.holder(dune).unwrap().is_none());
        assert_eq!(
            first.borrow(bruno, dune),
            Err(LibraryError::UnknownPerson(bruno))
        );
        assert!(first.describe_book(dune).is_err());
        assert!(first.borrowed_by(ana).unwrap().is_empty());
    }

    #[test]
    fn borrowed_by_keeps_borrow_order() {
        let (mut library, ana, _, dune) = stocked();
        let neuromancer = library.add_book("Neuromancer", "Gibson", 1984).id;
        let solaris = library.add_book("Solaris", "Lem", 1961).id;

        library.borrow(ana, solaris).unwrap();
        library.borrow(ana, dune).unwrap();
        library.borrow(ana, neuromancer).unwrap();

        let titles: Vec<&str> = library
            .borrowed_by(ana)
            .unwrap()
            .into_iter()
            .map(|book| book.title.as_str())
            .collect();
        assert_eq!(titles, ["Solaris", "Dune", "Neuromancer"]);
    }
}
