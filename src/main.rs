//! BPWIZ - Terminal Business Permit Wizard
//!
//! A terminal-based, multi-step application wizard for municipal business
//! permits. Walks the applicant through business details, document upload,
//! simulated AI verification, the fee summary and consent, then issues an
//! application number.

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::io;
use std::time::{Duration, Instant};

mod domain;
mod application;
mod infrastructure;
mod presentation;

use application::App;
use presentation::{InputHandler, render_ui};

/// How often the event loop wakes up to advance verification timers.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Entry point for the terminal permit wizard.
///
/// Sets up the terminal interface, initializes the application state,
/// and runs the main event loop until the user quits.
///
/// # Errors
///
/// Returns an error if terminal setup fails or if there are issues
/// with the terminal interface during runtime.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::default();
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Main application event loop.
///
/// Renders the wizard, dispatches keyboard input, and ticks the
/// verification timer queue. The poll timeout keeps scheduled lane
/// transitions firing even when no key is pressed. Continues until the
/// user presses 'q' in normal mode.
///
/// # Errors
///
/// Returns an IO error if terminal operations fail.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        if event::poll(TICK_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q')
                            if matches!(app.mode, application::AppMode::Normal) =>
                        {
                            return Ok(());
                        }
                        _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
                    }
                }
            }
        }

        app.tick(Instant::now());
    }
}
