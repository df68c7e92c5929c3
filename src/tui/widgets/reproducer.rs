//! Reproducer screen - the auto-scrolling colored lyrics

use crate::app::state::{AppState, ReproducerState};
use crate::compositor::ColoredLine;
use crate::playback::SpeedTier;
use crate::tui::theme::{get_theme, voice_color, Theme};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// One lyric row: each run keeps its voice color.
pub fn colored_line(line: &ColoredLine) -> Line<'static> {
    let spans: Vec<Span<'static>> = line
        .iter()
        .map(|run| {
            Span::styled(
                run.text.clone(),
                Style::default().fg(voice_color(&run.color)),
            )
        })
        .collect();
    Line::from(spans)
}

/// Layout:
/// ┌ ♪ Title ──────────────────────────────┐
/// │          (blank viewport)             │
/// │            colored lyrics             │
/// │          (blank viewport)             │
/// └───────────────────────────────────────┘
///  ▶ Playing   Slow [Normal] Fast Very fast   ━━━━●────
pub fn render(frame: &mut Frame, state: &mut AppState, area: Rect) {
    let theme = get_theme();
    let playing = state.playing;
    let speed = state.speed;

    let Some(rep) = state.reproducer.as_mut() else {
        let empty = Paragraph::new(Line::from("No song loaded"))
            .style(Style::default().fg(theme.palette.fg_secondary));
        frame.render_widget(empty, area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    render_lyrics(frame, rep, rows[0], &theme);
    render_controls(frame, rep, playing, speed, rows[1], &theme);
}

fn render_lyrics(frame: &mut Frame, rep: &mut ReproducerState, area: Rect, theme: &Theme) {
    let title = if rep.issue_count > 0 {
        format!(
            " {} {}  {} {} segment issues ",
            theme.icons.microphone, rep.song.title, theme.icons.warning, rep.issue_count
        )
    } else {
        format!(" {} {} ", theme.icons.microphone, rep.song.title)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(title)
        .title_style(Style::default().fg(theme.palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // The padding and the scroll range follow the visible height.
    rep.viewport.viewport_rows = inner.height as usize;
    let padding = rep.viewport.padding_rows();

    let mut lines: Vec<Line<'static>> = Vec::with_capacity(rep.viewport.content_rows());
    lines.extend(std::iter::repeat_n(Line::default(), padding));
    lines.extend(rep.lines.iter().map(colored_line));
    lines.extend(std::iter::repeat_n(Line::default(), padding));

    let top = u16::try_from(rep.viewport.top_row()).unwrap_or(u16::MAX);
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .scroll((top, 0));
    frame.render_widget(paragraph, inner);
}

fn render_controls(
    frame: &mut Frame,
    rep: &ReproducerState,
    playing: bool,
    speed: SpeedTier,
    area: Rect,
    theme: &Theme,
) {
    let icons = &theme.icons;
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12),
            Constraint::Length(34),
            Constraint::Min(10),
        ])
        .split(area);

    let badge = if playing {
        Span::styled(
            format!(" {} Playing", icons.play),
            Style::default()
                .fg(theme.palette.playing)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            format!(" {} Paused", icons.pause),
            Style::default().fg(theme.palette.fg_secondary),
        )
    };
    frame.render_widget(Paragraph::new(Line::from(badge)), cols[0]);

    let mut tiers = vec![Span::styled(
        format!("{} ", icons.speed),
        Style::default().fg(theme.palette.fg_secondary),
    )];
    for tier in SpeedTier::ALL {
        let style = if tier == speed {
            Style::default()
                .fg(theme.palette.bg_primary)
                .bg(theme.palette.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.palette.fg_secondary)
        };
        tiers.push(Span::styled(format!(" {} ", tier.label()), style));
    }
    frame.render_widget(Paragraph::new(Line::from(tiers)), cols[1]);

    let bar = progress_bar(rep.viewport.progress(), cols[2].width as usize, theme);
    frame.render_widget(Paragraph::new(bar), cols[2]);
}

fn progress_bar(progress: f64, width: usize, theme: &Theme) -> Line<'static> {
    let icons = &theme.icons;
    let width = width.saturating_sub(1);
    if width == 0 {
        return Line::default();
    }
    let filled = ((progress.clamp(0.0, 1.0) * width as f64) as usize).min(width - 1);
    let empty = width - filled - 1;
    Line::from(vec![
        Span::styled(
            icons.progress_full.repeat(filled),
            Style::default().fg(theme.palette.accent),
        ),
        Span::styled(icons.progress_head, Style::default().fg(theme.palette.accent)),
        Span::styled(
            icons.progress_empty.repeat(empty),
            Style::default().fg(theme.palette.border),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::compose_colored_lines;
    use crate::song::Song;
    use ratatui::style::Color;

    #[test]
    fn test_colored_line_keeps_voice_colors() {
        let mut song = Song::new("t", "Hello");
        let v = song.add_voice("Lead", "#ff0000").unwrap();
        song.assign(&v, 0, 2).unwrap();
        let lines = compose_colored_lines(&song.lyrics, &song.voices, &song.segments);

        let line = colored_line(&lines[0]);
        assert_eq!(line.spans.len(), 2);
        assert_eq!(line.spans[0].content, "He");
        assert_eq!(line.spans[0].style.fg, Some(Color::Rgb(255, 0, 0)));
        assert_eq!(line.spans[1].style.fg, Some(Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_progress_bar_width() {
        let theme = get_theme();
        let width = |l: &Line| l.spans.iter().map(|s| s.content.chars().count()).sum::<usize>();

        assert_eq!(width(&progress_bar(0.0, 11, &theme)), 10);
        assert_eq!(width(&progress_bar(1.0, 11, &theme)), 10);
        assert_eq!(progress_bar(0.5, 11, &theme).spans[0].content.chars().count(), 5);
        assert!(progress_bar(0.5, 1, &theme).spans.is_empty());
    }
}
