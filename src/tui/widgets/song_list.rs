//! Library screen - saved songs with a voice legend and lyric preview

use crate::app::state::AppState;
use crate::compositor::compose_colored_lines;
use crate::song::Song;
use crate::tui::theme::{get_theme, voice_color, LoadingSpinner, Theme};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::reproducer::colored_line;

pub fn render(frame: &mut Frame, state: &mut AppState, area: Rect) {
    let theme = get_theme();

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    render_list(frame, state, cols[0], &theme);
    render_details(frame, state, cols[1], &theme);
}

fn render_list(frame: &mut Frame, state: &mut AppState, area: Rect, theme: &Theme) {
    let library = &mut state.library;

    if library.loading && !library.loaded {
        let spinner = LoadingSpinner::frame(state.tick);
        let loading = Paragraph::new(Line::from(format!("{} Loading songs...", spinner)))
            .style(Style::default().fg(theme.palette.fg_secondary));
        frame.render_widget(loading, area);
        return;
    }

    if library.songs.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from("No songs yet."),
            Line::from("Add one with `coro new` or `coro import`."),
        ])
        .style(Style::default().fg(theme.palette.fg_secondary));
        frame.render_widget(empty, area);
        return;
    }

    let visible_height = area.height as usize;
    library.update_scroll(visible_height);
    let scroll_offset = library.scroll_offset;

    let items: Vec<ListItem> = library
        .songs
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_height)
        .map(|(i, song)| {
            let style = if i == library.selected {
                Style::default()
                    .fg(theme.palette.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.palette.fg_primary)
            };
            let voices = Span::styled(
                format!(
                    "  {} lines {} {} voices",
                    song.line_count(),
                    theme.icons.bullet,
                    song.voices.len()
                ),
                Style::default().fg(theme.palette.fg_secondary),
            );
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} {}", theme.icons.music, song.title), style),
                voices,
            ]))
        })
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(library.selected.saturating_sub(scroll_offset)));

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .fg(theme.palette.bg_primary)
                .bg(theme.palette.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("\u{f054} ");
    frame.render_stateful_widget(list, area, &mut list_state);

    if library.songs.len() > visible_height {
        let pos_text = format!("{}/{}", library.selected + 1, library.songs.len());
        let pos_len = pos_text.len() as u16;
        let pos_x = area.x + area.width.saturating_sub(pos_len);
        if pos_x > area.x {
            frame.render_widget(
                Paragraph::new(pos_text).style(Style::default().fg(theme.palette.fg_secondary)),
                Rect::new(pos_x, area.y, pos_len, 1),
            );
        }
    }
}

fn render_details(frame: &mut Frame, state: &AppState, area: Rect, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::LEFT)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(song) = state.library.selected_song() else {
        return;
    };

    let mut lines = voice_legend(song, theme);
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("{} segments", song.segments.len()),
        Style::default().fg(theme.palette.fg_secondary),
    )));
    let issues = song.issues().len();
    if issues > 0 {
        lines.push(Line::from(Span::styled(
            format!("{} {issues} segment issues", theme.icons.warning),
            Style::default().fg(theme.palette.error),
        )));
    }
    lines.push(Line::default());

    let room = (inner.height as usize).saturating_sub(lines.len());
    let preview = compose_colored_lines(&song.lyrics, &song.voices, &song.segments);
    lines.extend(preview.iter().take(room).map(colored_line));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn voice_legend(song: &Song, theme: &Theme) -> Vec<Line<'static>> {
    song.voices
        .iter()
        .map(|voice| {
            Line::from(vec![
                Span::styled(
                    format!("{} ", theme.icons.voice_swatch),
                    Style::default().fg(voice_color(&voice.color)),
                ),
                Span::styled(voice.name.clone(), Style::default().fg(theme.palette.fg_primary)),
                Span::styled(
                    format!("  {}", voice.color),
                    Style::default().fg(theme.palette.fg_secondary),
                ),
            ])
        })
        .collect()
}
