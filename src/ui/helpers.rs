//! Small layout and input helpers shared by the screens and popups.

use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Translate a typed 1-based choice into a 0-based index. Anything that is not
/// a plain digit string inside `1..=len` is rejected, surrounding spaces
/// included.
pub(crate) fn parse_choice(input: &str, len: usize) -> Option<usize> {
    if input.is_empty() || !input.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    let choice = input.parse::<usize>().ok()?;
    if choice == 0 || choice > len {
        return None;
    }
    Some(choice - 1)
}

/// Column for a text cursor sitting after `prefix_len + value_len` characters
/// in `area`, pinned to the last column of `area` for very long input.
pub(crate) fn cursor_column(area: Rect, prefix_len: usize, value_len: usize) -> u16 {
    let offset = u16::try_from(prefix_len.saturating_add(value_len)).unwrap_or(u16::MAX);
    let last = area.right().saturating_sub(1).max(area.x);
    area.x.saturating_add(offset).min(last)
}

/// Number each entry from 1 and highlight the selected row.
pub(crate) fn numbered_lines(entries: &[String], selected: usize) -> Vec<Line<'static>> {
    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let marker = if idx == selected { "▶ " } else { "  " };
            let text = format!("{marker}{}. {entry}", idx + 1);
            if idx == selected {
                Line::from(vec![Span::styled(
                    text,
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )])
            } else {
                Line::from(text)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_must_be_in_range() {
        assert_eq!(parse_choice("1", 3), Some(0));
        assert_eq!(parse_choice("3", 3), Some(2));
        assert_eq!(parse_choice("0", 3), None);
        assert_eq!(parse_choice("4", 3), None);
        assert_eq!(parse_choice("1", 0), None);
    }

    #[test]
    fn choice_must_be_digits() {
        assert_eq!(parse_choice("", 3), None);
        assert_eq!(parse_choice(" 3 ", 3), None);
        assert_eq!(parse_choice("2 ", 3), None);
        assert_eq!(parse_choice("-1", 3), None);
        assert_eq!(parse_choice("+2", 3), None);
        assert_eq!(parse_choice("two", 3), None);
        assert_eq!(parse_choice("99999999999999999999999", 3), None);
    }

    #[test]
    fn cursor_stays_inside_the_area() {
        let area = Rect::new(10, 4, 30, 1);
        assert_eq!(cursor_column(area, 5, 3), 18);
        assert_eq!(cursor_column(area, 5, 100), 39);
        assert_eq!(cursor_column(area, 5, 70_000), 39);
        assert_eq!(cursor_column(area, usize::MAX, usize::MAX), 39);

        let edge = Rect::new(u16::MAX - 2, 0, 2, 1);
        assert_eq!(cursor_column(edge, 0, 70_000), u16::MAX - 1);

        let empty = Rect::new(7, 0, 0, 1);
        assert_eq!(cursor_column(empty, 5, 5), 7);
    }

    #[test]
    fn numbering_starts_at_one() {
        let lines = numbered_lines(&["Dune".to_string(), "Solaris".to_string()], 1);
        assert_eq!(lines[0].to_string(), "  1. Dune");
        assert_eq!(lines[1].to_string(), "▶ 2. Solaris");
    }
}
