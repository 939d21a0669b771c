//! Full-screen views and the book picker. Screens hold ids and rendered
//! labels only; the library stays the single owner of books and people.

use anyhow::{anyhow, Result};

use crate::library::Library;
use crate::models::{BookId, PersonId};

use super::helpers::parse_choice;

/// Entries of the main menu, in the order their digit shortcuts select them.
pub(crate) const MENU_ENTRIES: [MenuEntry; 8] = [
    MenuEntry::AddBook,
    MenuEntry::RegisterPerson,
    MenuEntry::BorrowBook,
    MenuEntry::ReturnBook,
    MenuEntry::ListAvailable,
    MenuEntry::ListBorrowed,
    MenuEntry::FindPerson,
    MenuEntry::Quit,
];

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum MenuEntry {
    AddBook,
    RegisterPerson,
    BorrowBook,
    ReturnBook,
    ListAvailable,
    ListBorrowed,
    FindPerson,
    Quit,
}

impl MenuEntry {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            MenuEntry::AddBook => "Add book",
            MenuEntry::RegisterPerson => "Register person",
            MenuEntry::BorrowBook => "Borrow book",
            MenuEntry::ReturnBook => "Return book",
            MenuEntry::ListAvailable => "List available books",
            MenuEntry::ListBorrowed => "List borrowed books",
            MenuEntry::FindPerson => "Find registered person",
            MenuEntry::Quit => "Quit",
        }
    }
}

/// Cursor over the main menu.
#[derive(Default)]
pub(crate) struct MenuScreen {
    /// Index into [`MENU_ENTRIES`].
    pub(crate) selected: usize,
}

impl MenuScreen {
    pub(crate) fn move_selection(&mut self, offset: isize) {
        let len = MENU_ENTRIES.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn current(&self) -> MenuEntry {
        MENU_ENTRIES[self.selected.min(MENU_ENTRIES.len() - 1)]
    }

    /// Jump to the entry matching a digit shortcut (`'1'..='8'`).
    pub(crate) fn select_digit(&mut self, ch: char) -> Option<MenuEntry> {
        let index = parse_choice(&ch.to_string(), MENU_ENTRIES.len())?;
        self.selected = index;
        Some(MENU_ENTRIES[index])
    }

    pub(crate) fn labels(&self) -> Vec<String> {
        MENU_ENTRIES
            .iter()
            .map(|entry| entry.label().to_string())
            .collect()
    }
}

/// Which half of the catalog a listing shows.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum ListKind {
    Available,
    Borrowed,
}

impl ListKind {
    pub(crate) fn title(&self) -> &'static str {
        match self {
            ListKind::Available => "Available Books",
            ListKind::Borrowed => "Borrowed Books",
        }
    }

    pub(crate) fn empty_message(&self) -> &'static str {
        match self {
            ListKind::Available => "No books available.",
            ListKind::Borrowed => "No books borrowed.",
        }
    }

    pub(crate) fn toggled(&self) -> Self {
        match self {
            ListKind::Available => ListKind::Borrowed,
            ListKind::Borrowed => ListKind::Available,
        }
    }
}

/// Snapshot of one catalog listing.
pub(crate) struct BookListScreen {
    /// Which listing is shown.
    pub(crate) kind: ListKind,
    /// One description per book, in catalog order.
    pub(crate) lines: Vec<String>,
    /// Highlighted row; always 0 when `lines` is empty.
    pub(crate) selected: usize,
}

impl BookListScreen {
    pub(crate) fn load(library: &Library, kind: ListKind) -> Result<Self> {
        let mut screen = Self {
            kind,
            lines: Vec::new(),
            selected: 0,
        };
        screen.refresh(library)?;
        Ok(screen)
    }

    pub(crate) fn refresh(&mut self, library: &Library) -> Result<()> {
        let books = match self.kind {
            ListKind::Available => library.list_available_books(),
            ListKind::Borrowed => library.list_borrowed_books(),
        };
        self.lines = books
            .iter()
            .map(|book| library.describe_book(book.id()))
            .collect::<Result<Vec<_>, _>>()?;
        if self.selected >= self.lines.len() {
            self.selected = self.lines.len().saturating_sub(1);
        }
        Ok(())
    }

    pub(crate) fn toggle_kind(&mut self, library: &Library) -> Result<()> {
        self.kind = self.kind.toggled();
        self.selected = 0;
        self.refresh(library)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.lines.is_empty() {
            return;
        }
        let len = self.lines.len() as isize;
        self.selected = (self.selected as isize + offset).clamp(0, len - 1) as usize;
    }
}

/// Detail view of a single registered person.
pub(crate) struct PersonScreen {
    /// Person being shown.
    pub(crate) person: PersonId,
}

impl PersonScreen {
    /// Lines shown for the person: contact details followed by held books.
    pub(crate) fn detail_lines(&self, library: &Library) -> Result<Vec<String>> {
        let person = library.person(self.person)?;
        let mut lines = vec![
            format!("Name: {}", person.name),
            format!("CPF: {}", person.cpf()),
            format!("Phone: {}", person.phone),
            String::new(),
        ];
        let books = library.borrowed_by(self.person)?;
        if books.is_empty() {
            lines.push("No books borrowed by this person.".to_string());
        } else {
            lines.push("Borrowed books:".to_string());
            for book in books {
                lines.push(format!("- {}", library.describe_book(book.id())?));
            }
        }
        Ok(lines)
    }
}

/// Whether a book picker lends or takes back the chosen book.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum PickPurpose {
    Borrow,
    Return,
}

/// Numbered list of candidate books for a borrow or return. The user either
/// moves the cursor or types the number shown next to a book.
pub(crate) struct BookPicker {
    /// Person borrowing or returning.
    pub(crate) person: PersonId,
    /// Whether the pick ends in a borrow or a return.
    pub(crate) purpose: PickPurpose,
    /// Candidate books, parallel to `labels`.
    pub(crate) books: Vec<BookId>,
    /// Rendered descriptions, one per candidate.
    pub(crate) labels: Vec<String>,
    /// Highlighted row.
    pub(crate) selected: usize,
    /// Digits typed so far; takes precedence over `selected` when non-empty.
    pub(crate) typed: String,
}

impl BookPicker {
    /// Offer the books currently on the shelf.
    pub(crate) fn for_borrow(library: &Library, person: PersonId) -> Result<Self> {
        let books = library
            .list_available_books()
            .iter()
            .map(|book| book.id())
            .collect();
        Self::build(library, person, PickPurpose::Borrow, books)
    }

    /// Offer the books this person currently holds.
    pub(crate) fn for_return(library: &Library, person: PersonId) -> Result<Self> {
        let books = library.person(person)?.borrowed().to_vec();
        Self::build(library, person, PickPurpose::Return, books)
    }

    fn build(
        library: &Library,
        person: PersonId,
        purpose: PickPurpose,
        books: Vec<BookId>,
    ) -> Result<Self> {
        let labels = books
            .iter()
            .map(|id| library.describe_book(*id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            person,
            purpose,
            books,
            labels,
            selected: 0,
            typed: String::new(),
        })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub(crate) fn title(&self) -> &'static str {
        match self.purpose {
            PickPurpose::Borrow => "Available Books",
            PickPurpose::Return => "Books Borrowed by This Person",
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.typed.clear();
        if self.books.is_empty() {
            return;
        }
        let len = self.books.len() as isize;
        self.selected = (self.selected as isize + offset).clamp(0, len - 1) as usize;
    }

    /// Accumulate a typed choice. Only digits are accepted.
    pub(crate) fn push_digit(&mut self, ch: char) -> bool {
        if !ch.is_ascii_digit() {
            return false;
        }
        self.typed.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.typed.pop();
    }

    /// The book to act on: the typed number when one was entered, otherwise
    /// the highlighted row.
    pub(crate) fn resolve_choice(&self) -> Result<BookId> {
        let index = if self.typed.is_empty() {
            Some(self.selected).filter(|idx| *idx < self.books.len())
        } else {
            parse_choice(&self.typed, self.books.len())
        };
        index
            .map(|idx| self.books[idx])
            .ok_or_else(|| anyhow!("Invalid choice."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library_with_loans() -> (Library, PersonId) {
        let mut library = Library::new();
        let ana = library.register_person("Ana", "111", "999").unwrap().id();
        library.add_book("Dune", "Herbert", 1965);
        let solaris = library.add_book("Solaris", "Lem", 1961).id;
        library.add_book("Neuromancer", "Gibson", 1984);
        library.borrow(ana, solaris).unwrap();
        (library, ana)
    }

    #[test]
    fn menu_digits_map_to_entries() {
        let mut menu = MenuScreen::default();
        assert_eq!(menu.select_digit('3'), Some(MenuEntry::BorrowBook));
        assert_eq!(menu.current(), MenuEntry::BorrowBook);
        assert_eq!(menu.select_digit('8'), Some(MenuEntry::Quit));
        assert_eq!(menu.select_digit('9'), None);
        assert_eq!(menu.select_digit('0'), None);
        assert_eq!(menu.current(), MenuEntry::Quit);
    }

    #[test]
    fn menu_selection_is_clamped() {
        let mut menu = MenuScreen::default();
        menu.move_selection(-3);
        assert_eq!(menu.current(), MenuEntry::AddBook);
        menu.move_selection(20);
        assert_eq!(menu.current(), MenuEntry::Quit);
    }

    #[test]
    fn listings_split_the_catalog() {
        let (library, _) = library_with_loans();

        let mut list = BookListScreen::load(&library, ListKind::Available).unwrap();
        assert_eq!(
            list.lines,
            [
                "\"Dune\" (1965) by Herbert - Available",
                "\"Neuromancer\" (1984) by Gibson - Available",
            ]
        );

        list.toggle_kind(&library).unwrap();
        assert_eq!(list.kind, ListKind::Borrowed);
        assert_eq!(list.lines, ["\"Solaris\" (1961) by Lem - Borrowed by Ana"]);
    }

    #[test]
    fn person_detail_lists_held_books() {
        let (mut library, ana) = library_with_loans();
        let screen = PersonScreen { person: ana };

        let lines = screen.detail_lines(&library).unwrap();
        assert_eq!(lines[0], "Name: Ana");
        assert_eq!(lines[1], "CPF: 111");
        assert_eq!(lines[4], "Borrowed books:");
        assert_eq!(lines[5], "- \"Solaris\" (1961) by Lem - Borrowed by Ana");

        let solaris = library.person(ana).unwrap().borrowed()[0];
        library.return_book(ana, solaris).unwrap();
        let lines = screen.detail_lines(&library).unwrap();
        assert_eq!(lines.last().unwrap(), "No books borrowed by this person.");
    }

    #[test]
    fn picker_resolves_typed_and_highlighted_choices() {
        let (library, ana) = library_with_loans();
        let mut picker = BookPicker::for_borrow(&library, ana).unwrap();
        assert_eq!(picker.labels.len(), 2);

        picker.move_selection(1);
        let highlighted = picker.resolve_choice().unwrap();
        assert_eq!(library.book(highlighted).unwrap().title, "Neuromancer");

        picker.push_digit('1');
        let typed = picker.resolve_choice().unwrap();
        assert_eq!(library.book(typed).unwrap().title, "Dune");

        picker.backspace();
        picker.push_digit('3');
        assert_eq!(picker.resolve_choice().unwrap_err().to_string(), "Invalid choice.");
        assert!(!picker.push_digit('x'));
    }

    #[test]
    fn return_picker_offers_only_held_books() {
        let (library, ana) = library_with_loans();
        let picker = BookPicker::for_return(&library, ana).unwrap();
        assert_eq!(picker.labels, ["\"Solaris\" (1961) by Lem - Borrowed by Ana"]);
        assert_eq!(picker.purpose, PickPurpose::Return);
    }

    #[test]
    fn empty_picker_has_no_choice() {
        let mut library = Library::new();
        let ana = library.register_person("Ana", "111", "999").unwrap().id();
        let picker = BookPicker::for_borrow(&library, ana).unwrap();
        assert!(picker.is_empty());
        assert!(picker.resolve_choice().is_err());
    }
}
