//! Root layout widget - header, screen content and status line

use crate::app::state::{AppState, Screen, ToastKind};
use crate::config::Config;
use crate::tui::theme::{get_theme, Theme};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{help, reproducer, song_list};

/// Main layout structure:
/// ┌─────────────────────────────────────────┐
/// │ coro  Library                   ? help  │
/// ├─────────────────────────────────────────┤
/// │             Screen content              │
/// ├─────────────────────────────────────────┤
/// │ status / toast                          │
/// └─────────────────────────────────────────┘
pub fn render(frame: &mut Frame, _cfg: &Config, state: &mut AppState) {
    let theme = get_theme();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, state, rows[0], &theme);

    match state.screen {
        Screen::Library => {
            let inner = framed(frame, format!(" {} Library ", theme.icons.library), rows[1], &theme);
            song_list::render(frame, state, inner);
        }
        // The lyrics block draws its own frame.
        Screen::Reproducer => reproducer::render(frame, state, rows[1]),
        Screen::Help => {
            let inner = framed(frame, format!(" {} Keybinds ", theme.icons.help), rows[1], &theme);
            help::render(frame, inner);
        }
    }

    render_status(frame, state, rows[2], &theme);
}

fn framed(frame: &mut Frame, title: String, area: Rect, theme: &Theme) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(title)
        .title_style(Style::default().fg(theme.palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

fn render_header(frame: &mut Frame, state: &AppState, area: Rect, theme: &Theme) {
    let screen = match state.screen {
        Screen::Library => "Library".to_string(),
        Screen::Reproducer => match &state.reproducer {
            Some(rep) => format!("Reproducer {} {}", theme.icons.bullet, rep.song.title),
            None => "Reproducer".to_string(),
        },
        Screen::Help => "Help".to_string(),
    };

    let left = Line::from(vec![
        Span::styled(
            " coro ",
            Style::default()
                .fg(theme.palette.bg_primary)
                .bg(theme.palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {screen}"), Style::default().fg(theme.palette.fg_primary)),
    ]);
    frame.render_widget(Paragraph::new(left), area);

    let hint = Paragraph::new(Span::styled(
        "? help  q quit ",
        Style::default().fg(theme.palette.fg_secondary),
    ))
    .alignment(Alignment::Right);
    frame.render_widget(hint, area);
}

fn render_status(frame: &mut Frame, state: &AppState, area: Rect, theme: &Theme) {
    let line = match &state.toast {
        Some(toast) => {
            let (icon, color) = match toast.kind {
                ToastKind::Success => (theme.icons.success, theme.palette.playing),
                ToastKind::Error => (theme.icons.error, theme.palette.error),
            };
            Line::from(Span::styled(
                format!(" {icon} {}", toast.message),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
        }
        None => Line::from(Span::styled(
            format!(" {}", state.status),
            Style::default().fg(theme.palette.fg_secondary),
        )),
    };
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(theme.palette.bg_highlight)), area);
}
