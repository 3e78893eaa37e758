//! Key bindings and cursor movement over the guess grid.

use crossterm::event::KeyCode;
use prime_lock_core::LockMode;

/// Candidates per grid row.
pub const GRID_COLUMNS: usize = 10;

/// What a key press asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start a round of the given mode.
    SelectMode(LockMode),
    /// Move the grid cursor.
    Move(KeyCode),
    /// Guess the candidate under the cursor.
    Guess,
    /// Start a new round with the current mode.
    Restart,
    /// Show or hide the code notes panel.
    ToggleNotes,
    /// Leave the game.
    Quit,
}

/// Maps a key to an action.
pub fn action_for(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Char('c') => Some(Action::SelectMode(LockMode::Composite)),
        KeyCode::Char('p') => Some(Action::SelectMode(LockMode::Prime)),
        KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down => Some(Action::Move(key)),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Guess),
        KeyCode::Char('r') => Some(Action::Restart),
        KeyCode::Char('n') => Some(Action::ToggleNotes),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

/// Moves `cursor` within a grid of `len` cells laid out [`GRID_COLUMNS`] wide.
///
/// Movement stops at the edges; it never wraps.
pub fn move_cursor(cursor: usize, len: usize, key: KeyCode) -> usize {
    if len == 0 {
        return 0;
    }
    let cursor = cursor.min(len - 1);
    let col = cursor % GRID_COLUMNS;

    match key {
        KeyCode::Left if col > 0 => cursor - 1,
        KeyCode::Right if col + 1 < GRID_COLUMNS && cursor + 1 < len => cursor + 1,
        KeyCode::Up if cursor >= GRID_COLUMNS => cursor - GRID_COLUMNS,
        KeyCode::Down if cursor + GRID_COLUMNS < len => cursor + GRID_COLUMNS,
        _ => cursor,
    }
}
