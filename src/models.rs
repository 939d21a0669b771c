//! Domain entities owned by the [`Library`](crate::Library). Books and people
//! never hold each other directly: the borrower of a book and the books held by
//! a person are stored as ids that only mean something when resolved through
//! the library that handed them out.

use std::fmt;

/// Handle to a book in one library's catalog: the owning library's tag plus
/// the catalog position. Books are never removed, so the position stays valid
/// for the lifetime of the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BookId {
    /// Tag of the library that handed the id out.
    pub(crate) library: u64,
    /// Index into that library's catalog.
    pub(crate) index: usize,
}

/// Handle to a person in one library's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PersonId {
    /// Tag of the library that handed the id out.
    pub(crate) library: u64,
    /// Index into that library's registry.
    pub(crate) index: usize,
}

impl BookId {
    pub(crate) fn new(library: u64, index: usize) -> Self {
        Self { library, index }
    }
}

impl PersonId {
    pub(crate) fn new(library: u64, index: usize) -> Self {
        Self { library, index }
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "book #{}", self.index + 1)
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "person #{}", self.index + 1)
    }
}

/// Who currently has a book. A borrowed book always names its holder, so
/// there is no state in which the book is out but nobody has it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Borrower {
    #[default]
    Unborrowed,
    BorrowedBy(PersonId),
}

#[derive(Debug, Clone)]
/// A single catalog entry. Each title is one physical unit.
pub struct Book {
    /// Handle the library uses to resolve this entry.
    id: BookId,
    /// Title shown in listings and messages.
    pub title: String,
    /// Author as typed by the librarian; may be blank.
    pub author: String,
    /// Year of publication as typed by the librarian.
    pub year: i32,
    /// Current holder. Only `Person::borrow`/`Person::return_book` change it.
    borrower: Borrower,
}

impl Book {
    pub(crate) fn new(id: BookId, title: String, author: String, year: i32) -> Self {
        Self {
            id,
            title,
            author,
            year,
            borrower: Borrower::Unborrowed,
        }
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn borrower(&self) -> Borrower {
        self.borrower
    }

    /// True when nobody holds the book.
    pub fn is_available(&self) -> bool {
        self.borrower == Borrower::Unborrowed
    }

    /// Render `"Title" (year) by Author - status`. The holder is resolved by
    /// the library, since the book only knows the holder's id.
    pub(crate) fn describe(&self, holder: Option<&Person>) -> String {
        let status = match self.borrower {
            Borrower::Unborrowed => "Available".to_string(),
            Borrower::BorrowedBy(_) => match holder {
                Some(person) => format!("Borrowed by {}", person.name),
                None => "Borrowed".to_string(),
            },
        };
        format!(
            "\"{}\" ({}) by {} - {}",
            self.title, self.year, self.author, status
        )
    }
}

#[derive(Debug, Clone)]
/// A registered borrower. The CPF is treated as an opaque key; the registry
/// only guarantees that no two people share one.
pub struct Person {
    /// Handle the library uses to resolve this person.
    id: PersonId,
    /// Display name used in status messages and book descriptions.
    pub name: String,
    /// Unique registry key; never changes after registration.
    cpf: String,
    /// Contact number, stored as typed.
    pub phone: String,
    /// Books currently held, in borrow order. Mirrors each book's borrower.
    borrowed: Vec<BookId>,
}

impl Person {
    pub(crate) fn new(id: PersonId, name: String, cpf: String, phone: String) -> Self {
        Self {
            id,
            name,
            cpf,
            phone,
            borrowed: Vec::new(),
        }
    }

    pub fn id(&self) -> PersonId {
        self.id
    }

    /// Registry key. Read-only so a registered CPF can never collide later.
    pub fn cpf(&self) -> &str {
        &self.cpf
    }

    /// Books currently held, in the order they were borrowed.
    pub fn borrowed(&self) -> &[BookId] {
        &self.borrowed
    }

    pub fn holds(&self, book: BookId) -> bool {
        self.borrowed.contains(&book)
    }

    /// Link `book` to this person if it is on the shelf. Both sides change
    /// together; on failure the current holder is returned and nothing moves.
    pub(crate) fn borrow(&mut self, book: &mut Book) -> Result<(), PersonId> {
        match book.borrower {
            Borrower::Unborrowed => {
                book.borrower = Borrower::BorrowedBy(self.id);
                self.borrowed.push(book.id);
                Ok(())
            }
            Borrower::BorrowedBy(holder) => Err(holder),
        }
    }

    /// Undo a loan held by this person. Returns false (and changes nothing)
    /// when the book is not in this person's hands.
    pub(crate) fn return_book(&mut self, book: &mut Book) -> bool {
        let Some(position) = self.borrowed.iter().position(|id| *id == book.id) else {
            return false;
        };
        self.borrowed.remove(position);
        book.borrower = Borrower::Unborrowed;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> Book {
        Book::new(BookId::new(0, 0), "Dune".into(), "Herbert".into(), 1965)
    }

    fn ana() -> Person {
        Person::new(PersonId::new(0, 0), "Ana".into(), "111".into(), "999".into())
    }

    #[test]
    fn new_book_is_available() {
        let book = dune();
        assert!(book.is_available());
        assert_eq!(book.borrower(), Borrower::Unborrowed);
        assert_eq!(book.describe(None), "\"Dune\" (1965) by Herbert - Available");
    }

    #[test]
    fn borrow_links_both_sides() {
        let mut book = dune();
        let mut person = ana();

        assert_eq!(person.borrow(&mut book), Ok(()));
        assert_eq!(book.borrower(), Borrower::BorrowedBy(person.id()));
        assert_eq!(person.borrowed(), &[book.id()]);
        assert_eq!(
            book.describe(Some(&person)),
            "\"Dune\" (1965) by Herbert - Borrowed by Ana"
        );
    }

    #[test]
    fn borrowed_book_never_reads_as_available() {
        let mut book = dune();
        let mut person = ana();
        person.borrow(&mut book).unwrap();

        let description = book.describe(None);
        assert!(!description.contains("Available"));
        assert_eq!(description, "\"Dune\" (1965) by Herbert - Borrowed");
    }

    #[test]
    fn second_borrower_is_turned_away() {
        let mut book = dune();
        let mut first = ana();
        let mut second = Person::new(PersonId::new(0, 1), "Bruno".into(), "222".into(), "888".into());

        first.borrow(&mut book).unwrap();
        assert_eq!(second.borrow(&mut book), Err(first.id()));
        assert!(second.borrowed().is_empty());
        assert_eq!(book.borrower(), Borrower::BorrowedBy(first.id()));
    }

    #[test]
    fn return_requires_holding_the_book() {
        let mut book = dune();
        let mut holder = ana();
        let mut stranger = Person::new(PersonId::new(0, 1), "Bruno".into(), "222".into(), "888".into());

        holder.borrow(&mut book).unwrap();
        assert!(!stranger.return_book(&mut book));
        assert!(!book.is_available());

        assert!(holder.return_book(&mut book));
        assert!(book.is_available());
        assert!(!holder.holds(book.id()));
        assert!(!holder.return_book(&mut book));
    }
}
