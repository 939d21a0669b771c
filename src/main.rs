//! Binary entry point: resolve settings, start file logging, and hand a fresh
//! library to the terminal menu until the user quits.
use lending_library::{logging, run_app, App, Config, Library};

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    logging::init(&config)?;

    let mut app = App::new(Library::new());
    run_app(&mut app)
}
