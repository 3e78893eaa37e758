//! Application state for the terminal renderer.

use super::input::{Action, move_cursor};
use crate::session::{GuessRejected, LabSession, LabSnapshot, RoundId};
use crossterm::event::KeyCode;
use tokio::sync::oneshot;
use tokio::time::{Duration, Instant};
use tracing::debug;

/// How long a feedback message stays on screen.
const FLASH_TTL: Duration = Duration::from_secs(1);

enum Notes {
    Pending(oneshot::Receiver<String>),
    Ready(String),
}

/// Renderer state layered over a [`LabSession`].
///
/// Holds only presentation concerns: cursor, panels, transient feedback.
pub struct App {
    session: LabSession,
    cursor: usize,
    cursor_round: RoundId,
    show_notes: bool,
    notes: Notes,
    flash: Option<(String, Instant)>,
    should_quit: bool,
}

impl App {
    /// Creates the app; `notes` delivers the prefetched code notes.
    pub fn new(session: LabSession, notes: oneshot::Receiver<String>) -> Self {
        let cursor_round = session.round_id();
        Self {
            session,
            cursor: 0,
            cursor_round,
            show_notes: false,
            notes: Notes::Pending(notes),
            flash: None,
            should_quit: false,
        }
    }

    /// Current session view.
    pub fn snapshot(&self) -> LabSnapshot {
        self.session.snapshot()
    }

    /// Index of the highlighted candidate.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the notes panel is visible.
    pub fn show_notes(&self) -> bool {
        self.show_notes
    }

    /// Code notes, if they have arrived.
    pub fn notes(&self) -> Option<&str> {
        match &self.notes {
            Notes::Ready(text) => Some(text),
            Notes::Pending(_) => None,
        }
    }

    /// Transient feedback message.
    pub fn flash(&self) -> Option<&str> {
        self.flash.as_ref().map(|(text, _)| text.as_str())
    }

    /// Whether the user asked to quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Applies one key press.
    pub fn handle_key(&mut self, key: KeyCode) {
        let Some(action) = super::input::action_for(key) else {
            return;
        };
        debug!(?action, "Handling key action");

        match action {
            Action::SelectMode(mode) => {
                self.session.start_round(mode);
                self.reset_cursor();
            }
            Action::Move(key) => {
                let len = self.session.round().guess_space().len();
                self.cursor = move_cursor(self.cursor, len, key);
            }
            Action::Guess => self.guess(),
            Action::Restart => {
                if self.session.round().is_solved() {
                    self.session.restart();
                    self.reset_cursor();
                }
            }
            Action::ToggleNotes => self.show_notes = !self.show_notes,
            Action::Quit => self.should_quit = true,
        }
    }

    /// Housekeeping between frames: collect notes, expire feedback.
    pub fn tick(&mut self) {
        if let Notes::Pending(rx) = &mut self.notes {
            match rx.try_recv() {
                Ok(text) => self.notes = Notes::Ready(text),
                Err(oneshot::error::TryRecvError::Closed) => self.notes = Notes::Ready(String::new()),
                Err(oneshot::error::TryRecvError::Empty) => {}
            }
        }

        if self.flash.as_ref().is_some_and(|(_, at)| at.elapsed() >= FLASH_TTL) {
            self.flash = None;
        }

        if self.session.round_id() != self.cursor_round {
            self.reset_cursor();
        }
    }

    fn guess(&mut self) {
        let Some(value) = self.session.round().guess_space().get(self.cursor) else {
            return;
        };
        let message = match self.session.guess(value) {
            Ok(outcome) if outcome.is_hit() => "Password cracked!".to_string(),
            Ok(_) => format!("{} is the wrong password", value),
            Err(GuessRejected::Scanning) => "Still analysing the public key...".to_string(),
            Err(GuessRejected::AlreadySolved) => return,
        };
        self.flash = Some((message, Instant::now()));
    }

    fn reset_cursor(&mut self) {
        self.cursor = 0;
        self.cursor_round = self.session.round_id();
        self.flash = None;
    }
}
