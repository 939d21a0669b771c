//! Session state machine. `Screen` is what fills the main area and `Mode` is
//! the popup on top of it; key handling swaps the mode out with
//! `mem::replace`, acts on it, and puts back whatever should stay open.

use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::debug;

use crate::library::Library;

use super::forms::{BookField, BookForm, CpfPrompt, CpfPurpose, PersonField, PersonForm};
use super::helpers::{centered_rect, cursor_column, numbered_lines, surface_error};
use super::screens::{
    BookListScreen, BookPicker, ListKind, MenuEntry, MenuScreen, PersonScreen, PickPurpose,
};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// High-level navigation states.
enum Screen {
    Menu,
    Books(BookListScreen),
    Person(PersonScreen),
}

/// Modal interactions layered over the current screen.
enum Mode {
    Normal,
    AddingBook(BookForm),
    RegisteringPerson(PersonForm),
    PromptingCpf(CpfPrompt),
    PickingBook(BookPicker),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    /// Message shown in the footer.
    text: String,
    /// Colour of the message.
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }

    fn from_success(success: bool) -> Self {
        if success {
            StatusKind::Info
        } else {
            StatusKind::Error
        }
    }
}

/// Session state for the terminal shell. The library is owned here for the
/// duration of the session and handed back by [`App::into_library`].
pub struct App {
    /// Catalog and registry for this session.
    library: Library,
    /// Main menu cursor, kept while other screens are open.
    menu: MenuScreen,
    /// What fills the main area.
    screen: Screen,
    /// Popup drawn over the screen, if any.
    mode: Mode,
    /// Footer message from the last action.
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(library: Library) -> Self {
        Self {
            library,
            menu: MenuScreen::default(),
            screen: Screen::Menu,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn into_library(self) -> Library {
        self.library
    }

    /// Route one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        let mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingBook(form) => self.handle_add_book(code, form)?,
            Mode::RegisteringPerson(form) => self.handle_register_person(code, form)?,
            Mode::PromptingCpf(prompt) => self.handle_cpf_prompt(code, prompt)?,
            Mode::PickingBook(picker) => self.handle_pick_book(code, picker)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Menu => match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    *exit = true;
                    Ok(Mode::Normal)
                }
                KeyCode::Up => {
                    self.menu.move_selection(-1);
                    Ok(Mode::Normal)
                }
                KeyCode::Down => {
                    self.menu.move_selection(1);
                    Ok(Mode::Normal)
                }
                KeyCode::Enter => self.activate(self.menu.current(), exit),
                KeyCode::Char(ch) if ch.is_ascii_digit() => match self.menu.select_digit(ch) {
                    Some(entry) => self.activate(entry, exit),
                    None => {
                        self.set_status("Invalid option. Try again.", StatusKind::Error);
                        Ok(Mode::Normal)
                    }
                },
                _ => Ok(Mode::Normal),
            },
            Screen::Books(ref mut list) => {
                let mut back_to_menu = false;
                match code {
                    KeyCode::Char('q') => *exit = true,
                    KeyCode::Esc => back_to_menu = true,
                    KeyCode::Up => list.move_selection(-1),
                    KeyCode::Down => list.move_selection(1),
                    KeyCode::PageUp => list.move_selection(-5),
                    KeyCode::PageDown => list.move_selection(5),
                    KeyCode::Tab | KeyCode::BackTab => list.toggle_kind(&self.library)?,
                    _ => {}
                }
                if back_to_menu {
                    self.screen = Screen::Menu;
                }
                Ok(Mode::Normal)
            }
            Screen::Person(_) => {
                match code {
                    KeyCode::Char('q') => *exit = true,
                    KeyCode::Esc | KeyCode::Enter => self.screen = Screen::Menu,
                    _ => {}
                }
                Ok(Mode::Normal)
            }
        }
    }

    /// Run the action behind a menu entry.
    fn activate(&mut self, entry: MenuEntry, exit: &mut bool) -> Result<Mode> {
        debug!(?entry, "menu entry selected");
        self.clear_status();
        let mode = match entry {
            MenuEntry::AddBook => Mode::AddingBook(BookForm::default()),
            MenuEntry::RegisterPerson => Mode::RegisteringPerson(PersonForm::default()),
            MenuEntry::BorrowBook => Mode::PromptingCpf(CpfPrompt::new(CpfPurpose::Borrow)),
            MenuEntry::ReturnBook => Mode::PromptingCpf(CpfPrompt::new(CpfPurpose::Return)),
            MenuEntry::FindPerson => Mode::PromptingCpf(CpfPrompt::new(CpfPurpose::Find)),
            MenuEntry::ListAvailable => {
                self.open_book_list(ListKind::Available)?;
                Mode::Normal
            }
            MenuEntry::ListBorrowed => {
                self.open_book_list(ListKind::Borrowed)?;
                Mode::Normal
            }
            MenuEntry::Quit => {
                *exit = true;
                Mode::Normal
            }
        };
        Ok(mode)
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.parse_inputs() {
                Ok((title, author, year)) => {
                    let added = self.library.add_book(title, author, year);
                    self.set_status(added.to_string(), StatusKind::Info);
                    self.refresh_screen()?;
                    return Ok(Mode::Normal);
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                } else if form.active == BookField::Year {
                    form.error = Some("Invalid year. Use numbers only.".to_string());
                }
            }
            _ => {}
        }
        Ok(Mode::AddingBook(form))
    }

    fn handle_register_person(&mut self, code: KeyCode, mut form: PersonForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Registration cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.parse_inputs() {
                Ok((name, cpf, phone)) => {
                    let registered = self
                        .library
                        .register_person(name, cpf, phone)
                        .map(|person| {
                            format!(
                                "Person \"{}\" registered with CPF {} and phone {}.",
                                person.name,
                                person.cpf(),
                                person.phone
                            )
                        });
                    match registered {
                        Some(text) => self.set_status(text, StatusKind::Info),
                        None => self.set_status(
                            "CPF already registered. Registration not performed.",
                            StatusKind::Error,
                        ),
                    }
                    return Ok(Mode::Normal);
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::RegisteringPerson(form))
    }

    fn handle_cpf_prompt(&mut self, code: KeyCode, mut prompt: CpfPrompt) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Backspace => prompt.backspace(),
            KeyCode::Enter => return self.submit_cpf(&prompt),
            KeyCode::Char(ch) => {
                prompt.push_char(ch);
            }
            _ => {}
        }
        Ok(Mode::PromptingCpf(prompt))
    }

    /// Look the person up and move on to whatever the prompt was opened for.
    fn submit_cpf(&mut self, prompt: &CpfPrompt) -> Result<Mode> {
        let Some(person) = self.library.find_person(prompt.query()).map(|p| p.id()) else {
            self.set_status("Person not found.", StatusKind::Error);
            return Ok(Mode::Normal);
        };

        match prompt.purpose {
            CpfPurpose::Borrow => {
                let picker = BookPicker::for_borrow(&self.library, person)?;
                if picker.is_empty() {
                    self.set_status("No books available.", StatusKind::Error);
                    return Ok(Mode::Normal);
                }
                Ok(Mode::PickingBook(picker))
            }
            CpfPurpose::Return => {
                let picker = BookPicker::for_return(&self.library, person)?;
                if picker.is_empty() {
                    self.set_status("This person has no borrowed books.", StatusKind::Error);
                    return Ok(Mode::Normal);
                }
                Ok(Mode::PickingBook(picker))
            }
            CpfPurpose::Find => {
                self.screen = Screen::Person(PersonScreen { person });
                Ok(Mode::Normal)
            }
        }
    }

    fn handle_pick_book(&mut self, code: KeyCode, mut picker: BookPicker) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Up => picker.move_selection(-1),
            KeyCode::Down => picker.move_selection(1),
            KeyCode::Home => picker.move_selection(-(picker.books.len() as isize)),
            KeyCode::End => picker.move_selection(picker.books.len() as isize),
            KeyCode::Backspace => picker.backspace(),
            KeyCode::Char(ch) => {
                picker.push_digit(ch);
            }
            KeyCode::Enter => {
                match picker.resolve_choice() {
                    Ok(book) => {
                        let (text, success) = match picker.purpose {
                            PickPurpose::Borrow => {
                                let outcome = self.library.borrow(picker.person, book)?;
                                (outcome.to_string(), outcome.is_success())
                            }
                            PickPurpose::Return => {
                                let outcome = self.library.return_book(picker.person, book)?;
                                (outcome.to_string(), outcome.is_success())
                            }
                        };
                        self.set_status(text, StatusKind::from_success(success));
                        self.refresh_screen()?;
                    }
                    Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                }
                return Ok(Mode::Normal);
            }
            _ => {}
        }
        Ok(Mode::PickingBook(picker))
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Menu => self.draw_menu(frame, content_area),
            Screen::Books(list) => self.draw_book_list(frame, content_area, list),
            Screen::Person(person) => self.draw_person(frame, content_area, person),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, form),
            Mode::RegisteringPerson(form) => self.draw_person_form(frame, area, form),
            Mode::PromptingCpf(prompt) => self.draw_cpf_prompt(frame, area, prompt),
            Mode::PickingBook(picker) => self.draw_picker(frame, area, picker),
            Mode::Normal => {}
        }
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Library Menu ")
            .borders(Borders::ALL);

        let available = self.library.list_available_books().len();
        let mut lines = numbered_lines(&self.menu.labels(), self.menu.selected);
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(
                "{} books in the catalog, {} available, {} people registered.",
                self.library.books().len(),
                available,
                self.library.people().len()
            ),
            Style::default().fg(Color::DarkGray),
        )));

        let paragraph = Paragraph::new(lines).block(block);
        frame.render_widget(paragraph, area);
    }

    fn draw_book_list(&self, frame: &mut Frame, area: Rect, list: &BookListScreen) {
        let block = Block::default()
            .title(format!(" {} ", list.kind.title()))
            .borders(Borders::ALL);

        if list.lines.is_empty() {
            let message = Paragraph::new(list.kind.empty_message())
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = list
            .lines
            .iter()
            .map(|line| ListItem::new(format!("- {line}")))
            .collect();

        let widget = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut state = ListState::default();
        state.select(Some(list.selected));
        frame.render_stateful_widget(widget, area, &mut state);
    }

    fn draw_person(&self, frame: &mut Frame, area: Rect, screen: &PersonScreen) {
        let block = Block::default().title(" Person ").borders(Borders::ALL);
        let lines: Vec<Line> = match screen.detail_lines(&self.library) {
            Ok(lines) => lines.into_iter().map(Line::from).collect(),
            Err(err) => vec![Line::from(Span::styled(
                surface_error(&err),
                Style::default().fg(Color::Red),
            ))],
        };
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match (&self.screen, &self.mode) {
            (_, Mode::AddingBook(_)) | (_, Mode::RegisteringPerson(_)) => Line::from(vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Next Field   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Save   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (_, Mode::PromptingCpf(_)) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Look Up   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (_, Mode::PickingBook(_)) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Navigate   "),
                Span::styled("[0-9]", key_style),
                Span::raw(" Type Number   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Confirm   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (Screen::Menu, Mode::Normal) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Navigate   "),
                Span::styled("[1-8]", key_style),
                Span::raw(" Choose   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Open   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
            (Screen::Books(_), Mode::Normal) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Scroll   "),
                Span::styled("[Tab]", key_style),
                Span::raw(" Available/Borrowed   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Menu   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
            (Screen::Person(_), Mode::Normal) => Line::from(vec![
                Span::styled("[Esc]", key_style),
                Span::raw(" Menu   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("Title", BookField::Title),
            form.build_line("Author", BookField::Author),
            form.build_line("Year", BookField::Year),
            Line::from(""),
        ];
        lines.push(form_hint(form.error.as_deref()));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (prefix, row) = match form.active {
            BookField::Title => ("Title: ", 0),
            BookField::Author => ("Author: ", 1),
            BookField::Year => ("Year: ", 2),
        };
        frame.set_cursor_position((
            cursor_column(inner, prefix.len(), form.value_len(form.active)),
            inner.y.saturating_add(row),
        ));
    }

    fn draw_person_form(&self, frame: &mut Frame, area: Rect, form: &PersonForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Register Person")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("Name", PersonField::Name),
            form.build_line("CPF", PersonField::Cpf),
            form.build_line("Phone", PersonField::Phone),
            Line::from(""),
        ];
        lines.push(form_hint(form.error.as_deref()));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (prefix, row) = match form.active {
            PersonField::Name => ("Name: ", 0),
            PersonField::Cpf => ("CPF: ", 1),
            PersonField::Phone => ("Phone: ", 2),
        };
        frame.set_cursor_position((
            cursor_column(inner, prefix.len(), form.value_len(form.active)),
            inner.y.saturating_add(row),
        ));
    }

    fn draw_cpf_prompt(&self, frame: &mut Frame, area: Rect, prompt: &CpfPrompt) {
        let popup_area = centered_rect(50, 20, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(prompt.purpose.title())
            .borders(Borders::ALL);
        let paragraph = Paragraph::new(prompt.build_line())
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = cursor_column(inner, "CPF: ".len(), prompt.cpf.chars().count());
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_picker(&self, frame: &mut Frame, area: Rect, picker: &BookPicker) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(picker.title())
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);

        let paragraph = Paragraph::new(numbered_lines(&picker.labels, picker.selected))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, chunks[0]);

        let prompt = format!("Book number: {}", picker.typed);
        frame.render_widget(Paragraph::new(prompt.clone()), chunks[1]);
        frame.set_cursor_position((
            cursor_column(chunks[1], 0, prompt.chars().count()),
            chunks[1].y,
        ));
    }

    fn open_book_list(&mut self, kind: ListKind) -> Result<()> {
        self.screen = Screen::Books(BookListScreen::load(&self.library, kind)?);
        Ok(())
    }

    /// Rebuild snapshot screens after the library changed.
    fn refresh_screen(&mut self) -> Result<()> {
        if let Screen::Books(list) = &mut self.screen {
            list.refresh(&self.library)?;
        }
        Ok(())
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

/// Either the validation error or the key hint shown at the bottom of a form.
fn form_hint(error: Option<&str>) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(
            "Enter to save • Tab to switch • Esc to cancel",
            Style::default().fg(Color::Gray),
        )),
    }
}
