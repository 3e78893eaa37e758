//! Terminal UI for Prime Lock Lab.

mod app;
mod input;
mod ui;

pub use app::App;

use crate::session::LabSession;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::path::Path;
use tokio::sync::oneshot;
use tokio::time::Duration;
use tracing::{error, info, instrument};

/// Runs the terminal game until the player quits.
///
/// Logs go to `log_path` so they do not draw over the game.
pub async fn run_tui(session: LabSession, log_path: &Path) -> Result<()> {
    let log_file = std::fs::File::create(log_path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,prime_lock=debug")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init(); // Don't panic if already initialized

    info!("Starting Prime Lock Lab TUI");

    // Prefetch the teacher's code notes in the background
    let (notes_tx, notes_rx) = oneshot::channel();
    let notes_session = session.clone();
    tokio::spawn(async move {
        let notes = notes_session.code_notes().await;
        let _ = notes_tx.send(notes);
    });

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_loop(&mut terminal, App::new(session, notes_rx)).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "Game loop error");
    }
    res
}

#[instrument(skip_all)]
async fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| ui::draw(f, &app))?;

        // Poll briefly so async completions (scan, teacher) show up promptly
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key.code);
        }

        if app.should_quit() {
            info!("User quit");
            return Ok(());
        }

        tokio::task::yield_now().await;
    }
}
