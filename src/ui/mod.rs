//! Terminal front-end driving the library: a numbered main menu, modal forms
//! for new books and people, CPF prompts, and book pickers.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
