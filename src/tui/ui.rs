//! Stateless rendering of the lock lab.

use super::app::App;
use super::input::GRID_COLUMNS;
use crate::session::{LabSnapshot, RoundPhase, TipState};
use prime_lock_core::LockMode;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Renders one frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let snapshot = app.snapshot();
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Mode selection
            Constraint::Min(12),   // Board
            Constraint::Length(5), // Teacher tip
            Constraint::Length(3), // Status
        ])
        .split(area);

    let title = Paragraph::new("Prime Lock Lab  -  N = P x Q")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(title, chunks[0]);

    draw_modes(frame, chunks[1], snapshot.mode);

    let board = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[2]);
    draw_analysis(frame, board[0], &snapshot);
    draw_grid(frame, board[1], &snapshot, app.cursor());

    draw_tip(frame, chunks[3], &snapshot.tip);
    draw_status(frame, chunks[4], app, &snapshot);

    if app.show_notes() {
        draw_notes(frame, area, app.notes());
    }
}

fn draw_modes(frame: &mut Frame, area: Rect, current: LockMode) {
    let spans: Vec<Span> = [(LockMode::Composite, 'c', Color::Blue), (LockMode::Prime, 'p', Color::Red)]
        .into_iter()
        .flat_map(|(mode, key, color)| {
            let style = if mode == current {
                Style::default().fg(Color::Black).bg(color).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            [
                Span::styled(format!(" [{}] {} ", key, mode.label()), style),
                Span::raw("   "),
            ]
        })
        .collect();

    let modes = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(modes, area);
}

fn draw_analysis(frame: &mut Frame, area: Rect, snapshot: &LabSnapshot) {
    let solved = snapshot.phase == RoundPhase::Solved;
    let lock_style = if solved {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };

    let secret = snapshot
        .secret
        .map(|n| n.to_string())
        .unwrap_or_else(|| "???".to_string());
    let factor = snapshot
        .public_factor
        .map(|p| p.to_string())
        .unwrap_or_else(|| "...".to_string());

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} Password N = {}", if solved { "[open]" } else { "[locked]" }, secret),
            lock_style,
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Public key stolen by the hacker: P = {}", factor),
            Style::default().fg(Color::Magenta),
        )),
        Line::from(""),
    ];

    match (&snapshot.guess_space, snapshot.public_factor) {
        (Some(space), Some(p)) => {
            lines.push(Line::from("Hacker analysis:"));
            lines.push(Line::from("Since N = P x Q,"));
            lines.push(Line::from(format!("N must be a multiple of {}!", p)));
            lines.push(Line::from(""));
            lines.push(Line::from(match snapshot.mode {
                LockMode::Composite => format!(
                    "Great! P={} is big, we only need to check {} numbers.",
                    p,
                    space.len()
                ),
                LockMode::Prime => format!("Oh no! P={} is too small, we must check every number!", p),
            }));
        }
        _ => lines.push(Line::from(Span::styled(
            "Analysing the public key...",
            Style::default().fg(Color::Yellow),
        ))),
    }

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Lock").borders(Borders::ALL));
    frame.render_widget(panel, area);
}

fn draw_grid(frame: &mut Frame, area: Rect, snapshot: &LabSnapshot, cursor: usize) {
    let block = Block::default().title("Candidates").borders(Borders::ALL);

    let Some(space) = &snapshot.guess_space else {
        let scanning = Paragraph::new("Filtering possible passwords...")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(scanning, area);
        return;
    };

    let lines: Vec<Line> = space
        .chunks(GRID_COLUMNS)
        .enumerate()
        .map(|(row, values)| {
            let spans: Vec<Span> = values
                .iter()
                .enumerate()
                .map(|(col, &value)| {
                    let index = row * GRID_COLUMNS + col;
                    Span::styled(format!("{:>4} ", value), cell_style(snapshot, value, index == cursor))
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn cell_style(snapshot: &LabSnapshot, value: u32, under_cursor: bool) -> Style {
    if snapshot.secret == Some(value) {
        return Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD);
    }
    if under_cursor && snapshot.phase == RoundPhase::Ready {
        return Style::default().fg(Color::Black).bg(Color::White);
    }
    match snapshot.last_guess {
        Some(last) if last.value == value && !last.hit => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::Gray),
    }
}

fn draw_tip(frame: &mut Frame, area: Rect, tip: &TipState) {
    let text = match tip {
        TipState::Idle => return,
        TipState::Loading => "The teacher is sorting out the lab results...",
        TipState::Ready(text) => text.as_str(),
    };

    let panel = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Teacher's corner").borders(Borders::ALL));
    frame.render_widget(panel, area);
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App, snapshot: &LabSnapshot) {
    let help = match snapshot.phase {
        RoundPhase::Solved => "r: try again  c/p: switch lock  n: notes  q: quit",
        _ => "arrows: move  enter: guess  c/p: switch lock  n: notes  q: quit",
    };
    let status = match app.flash() {
        Some(flash) => format!("{}  |  {}", flash, help),
        None => format!("Guesses: {}  |  {}", snapshot.guesses, help),
    };

    let paragraph = Paragraph::new(status)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn draw_notes(frame: &mut Frame, area: Rect, notes: Option<&str>) {
    let popup = Rect {
        x: area.x + area.width / 2,
        y: area.y + area.height / 4,
        width: area.width / 2,
        height: area.height / 2,
    };
    let text = match notes {
        Some(text) if !text.is_empty() => text,
        Some(_) => "// The teacher's notes are unavailable.",
        None => "// Connecting to the lab computer...",
    };

    frame.render_widget(Clear, popup);
    let panel = Paragraph::new(text)
        .style(Style::default().fg(Color::Green))
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Teacher's code notes").borders(Borders::ALL));
    frame.render_widget(panel, popup);
}
