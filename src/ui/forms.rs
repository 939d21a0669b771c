//! Modal input forms. Each form only collects and validates text; the
//! library call happens in the app once the form submits.

use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// Style a `label: value` line, dimming empty values and highlighting the
/// focused field.
fn field_line(field_name: &str, value: &str, placeholder: &str, is_active: bool) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, style),
    ])
}

/// Internal representation of the "add book" form fields.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    /// Typed title.
    pub(crate) title: String,
    /// Typed author.
    pub(crate) author: String,
    /// Typed year; only digits are accepted.
    pub(crate) year: String,
    /// Field receiving keystrokes.
    pub(crate) active: BookField,
    /// Validation message from the last failed submit.
    pub(crate) error: Option<String>,
}

/// Fields available within the book form.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
    Year,
}

impl BookForm {
    /// Cycle focus across title, author and year.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Year,
            BookField::Year => BookField::Title,
        };
    }

    /// Append a character to the active field. The year only takes digits.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BookField::Title => self.title.push(ch),
            BookField::Author => self.author.push(ch),
            BookField::Year => {
                if !ch.is_ascii_digit() {
                    return false;
                }
                self.year.push(ch);
            }
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Title => {
                self.title.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
            BookField::Year => {
                self.year.pop();
            }
        }
    }

    /// Validate the inputs and return typed values for `Library::add_book`.
    pub(crate) fn parse_inputs(&self) -> Result<(String, String, i32)> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("Book title is required."));
        }
        let year_raw = self.year.trim();
        if year_raw.is_empty() {
            return Err(anyhow!("Publication year is required."));
        }
        let year = year_raw
            .parse::<i32>()
            .map_err(|_| anyhow!("Invalid year. Use numbers only."))?;
        Ok((title.to_string(), self.author.trim().to_string(), year))
    }

    pub(crate) fn build_line(&self, field_name: &str, field: BookField) -> Line<'static> {
        let (value, placeholder) = match field {
            BookField::Title => (&self.title, "<required>"),
            BookField::Author => (&self.author, "<optional>"),
            BookField::Year => (&self.year, "<required>"),
        };
        field_line(field_name, value, placeholder, self.active == field)
    }

    pub(crate) fn value_len(&self, field: BookField) -> usize {
        match field {
            BookField::Title => self.title.chars().count(),
            BookField::Author => self.author.chars().count(),
            BookField::Year => self.year.chars().count(),
        }
    }
}

/// Form state for registering a new borrower.
#[derive(Default, Clone)]
pub(crate) struct PersonForm {
    /// Typed name.
    pub(crate) name: String,
    /// Typed CPF, the registry key.
    pub(crate) cpf: String,
    /// Typed phone; may stay empty.
    pub(crate) phone: String,
    /// Field receiving keystrokes.
    pub(crate) active: PersonField,
    /// Validation message from the last failed submit.
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub(crate) enum PersonField {
    #[default]
    Name,
    Cpf,
    Phone,
}

impl PersonForm {
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            PersonField::Name => PersonField::Cpf,
            PersonField::Cpf => PersonField::Phone,
            PersonField::Phone => PersonField::Name,
        };
    }

    /// Insert a character into the active field. The CPF is an opaque key, so
    /// no format is imposed on it.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            PersonField::Name => self.name.push(ch),
            PersonField::Cpf => self.cpf.push(ch),
            PersonField::Phone => self.phone.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            PersonField::Name => {
                self.name.pop();
            }
            PersonField::Cpf => {
                self.cpf.pop();
            }
            PersonField::Phone => {
                self.phone.pop();
            }
        }
    }

    pub(crate) fn parse_inputs(&self) -> Result<(String, String, String)> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Name is required."));
        }
        let cpf = self.cpf.trim();
        if cpf.is_empty() {
            return Err(anyhow!("CPF is required."));
        }
        Ok((
            name.to_string(),
            cpf.to_string(),
            self.phone.trim().to_string(),
        ))
    }

    pub(crate) fn build_line(&self, field_name: &str, field: PersonField) -> Line<'static> {
        let (value, placeholder) = match field {
            PersonField::Name => (&self.name, "<required>"),
            PersonField::Cpf => (&self.cpf, "<required>"),
            PersonField::Phone => (&self.phone, "<optional>"),
        };
        field_line(field_name, value, placeholder, self.active == field)
    }

    pub(crate) fn value_len(&self, field: PersonField) -> usize {
        match field {
            PersonField::Name => self.name.chars().count(),
            PersonField::Cpf => self.cpf.chars().count(),
            PersonField::Phone => self.phone.chars().count(),
        }
    }
}

/// What a CPF prompt leads to once the person is found.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum CpfPurpose {
    Borrow,
    Return,
    Find,
}

impl CpfPurpose {
    pub(crate) fn title(&self) -> &'static str {
        match self {
            CpfPurpose::Borrow => "Borrow Book",
            CpfPurpose::Return => "Return Book",
            CpfPurpose::Find => "Find Person",
        }
    }
}

/// Single-field prompt asking for a CPF.
#[derive(Clone)]
pub(crate) struct CpfPrompt {
    /// What happens once the person is found.
    pub(crate) purpose: CpfPurpose,
    /// Typed CPF.
    pub(crate) cpf: String,
}

impl CpfPrompt {
    pub(crate) fn new(purpose: CpfPurpose) -> Self {
        Self {
            purpose,
            cpf: String::new(),
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.cpf.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.cpf.pop();
    }

    /// The CPF as it should be looked up.
    pub(crate) fn query(&self) -> &str {
        self.cpf.trim()
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        field_line("CPF", &self.cpf, "<required>", true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(form: &mut BookForm, text: &str) {
        for ch in text.chars() {
            form.push_char(ch);
        }
    }

    #[test]
    fn book_form_parses_valid_input() {
        let mut form = BookForm::default();
        type_str(&mut form, " Dune ");
        form.toggle_field();
        type_str(&mut form, "Herbert");
        form.toggle_field();
        type_str(&mut form, "1965");

        let (title, author, year) = form.parse_inputs().unwrap();
        assert_eq!(title, "Dune");
        assert_eq!(author, "Herbert");
        assert_eq!(year, 1965);
    }

    #[test]
    fn year_field_only_takes_digits() {
        let mut form = BookForm {
            active: BookField::Year,
            ..BookForm::default()
        };
        assert!(!form.push_char('x'));
        assert!(!form.push_char('-'));
        assert!(form.push_char('7'));
        assert_eq!(form.year, "7");
        assert_eq!(form.value_len(BookField::Year), 1);
    }

    #[test]
    fn non_numeric_year_is_rejected() {
        let form = BookForm {
            title: "Dune".into(),
            year: "19x5".into(),
            ..BookForm::default()
        };
        let err = form.parse_inputs().unwrap_err();
        assert_eq!(err.to_string(), "Invalid year. Use numbers only.");
    }

    #[test]
    fn missing_title_or_year_is_rejected() {
        let form = BookForm {
            year: "1965".into(),
            ..BookForm::default()
        };
        assert!(form.parse_inputs().is_err());

        let form = BookForm {
            title: "Dune".into(),
            ..BookForm::default()
        };
        assert!(form.parse_inputs().is_err());
    }

    #[test]
    fn person_form_requires_name_and_cpf() {
        let mut form = PersonForm::default();
        assert!(form.parse_inputs().is_err());

        form.name = "Ana".into();
        assert!(form.parse_inputs().is_err());

        form.cpf = " 111 ".into();
        let (name, cpf, phone) = form.parse_inputs().unwrap();
        assert_eq!((name.as_str(), cpf.as_str(), phone.as_str()), ("Ana", "111", ""));
    }

    #[test]
    fn person_form_cycles_fields() {
        let mut form = PersonForm::default();
        form.toggle_field();
        assert_eq!(form.active, PersonField::Cpf);
        form.push_char('1');
        form.toggle_field();
        form.push_char('9');
        form.backspace();
        form.toggle_field();
        assert_eq!(form.active, PersonField::Name);
        assert_eq!(form.cpf, "1");
        assert!(form.phone.is_empty());
    }

    #[test]
    fn cpf_prompt_trims_query() {
        let mut prompt = CpfPrompt::new(CpfPurpose::Find);
        for ch in " 111 ".chars() {
            prompt.push_char(ch);
        }
        assert_eq!(prompt.query(), "111");
        prompt.backspace();
        assert_eq!(prompt.cpf, " 111");
    }
}
