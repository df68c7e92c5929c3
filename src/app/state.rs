use crate::compositor::{compose_colored_lines, ColoredLine};
use crate::playback::{ScrollSurface, SpeedTier};
use crate::song::{Song, SongId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Library,
    Reproducer,
    Help,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub created_at: std::time::Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
            created_at: std::time::Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
            created_at: std::time::Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > std::time::Duration::from_secs(3)
    }
}

/// The song list and its selection
#[derive(Debug, Clone, Default)]
pub struct LibraryState {
    pub songs: Vec<Song>,
    pub selected: usize,
    pub scroll_offset: usize,
    pub loading: bool,
    pub loaded: bool,
}

impl LibraryState {
    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if !self.songs.is_empty() {
            self.selected = (self.selected + 1).min(self.songs.len() - 1);
        }
    }

    pub fn select_last(&mut self) {
        self.selected = self.songs.len().saturating_sub(1);
    }

    pub fn selected_song(&self) -> Option<&Song> {
        self.songs.get(self.selected)
    }

    pub fn select_id(&mut self, id: SongId) -> bool {
        match self.songs.iter().position(|s| s.id == Some(id)) {
            Some(idx) => {
                self.selected = idx;
                true
            }
            None => false,
        }
    }

    /// Replace the list, keeping the selection on the same song if it survived.
    pub fn set_songs(&mut self, songs: Vec<Song>) {
        let keep = self.selected_song().and_then(|s| s.id);
        self.songs = songs;
        self.loading = false;
        self.loaded = true;
        if !keep.is_some_and(|id| self.select_id(id)) {
            self.selected = self.selected.min(self.songs.len().saturating_sub(1));
        }
    }

    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected - visible_height + 1;
        }
    }
}

/// Scroll geometry of the lyrics view, in pixels.
///
/// The lyrics are padded with one viewport of blank rows above and below,
/// so they enter from the bottom edge and leave through the top.
#[derive(Debug, Clone, PartialEq)]
pub struct LyricsViewport {
    pub scroll_top_px: f64,
    pub line_count: usize,
    pub viewport_rows: usize,
    pub row_height_px: f64,
}

impl LyricsViewport {
    pub fn new(line_count: usize, row_height_px: f64) -> Self {
        Self {
            scroll_top_px: 0.0,
            line_count,
            viewport_rows: 0,
            row_height_px: row_height_px.max(1.0),
        }
    }

    /// Blank rows before (and after) the lyrics.
    pub fn padding_rows(&self) -> usize {
        self.viewport_rows
    }

    pub fn content_rows(&self) -> usize {
        self.line_count + 2 * self.padding_rows()
    }

    /// First content row visible at the current offset.
    pub fn top_row(&self) -> usize {
        (self.scroll_top_px / self.row_height_px).floor() as usize
    }

    /// Fraction of the scrollable distance covered, `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        let max = self.scroll_height() - self.client_height();
        if max <= 0.0 {
            0.0
        } else {
            (self.scroll_top_px / max).clamp(0.0, 1.0)
        }
    }

    pub fn scroll_by_rows(&mut self, rows: f64) {
        let max = (self.scroll_height() - self.client_height()).max(0.0);
        self.scroll_top_px = (self.scroll_top_px + rows * self.row_height_px).clamp(0.0, max);
    }
}

impl ScrollSurface for LyricsViewport {
    fn scroll_top(&self) -> f64 {
        self.scroll_top_px
    }

    fn scroll_height(&self) -> f64 {
        self.content_rows() as f64 * self.row_height_px
    }

    fn client_height(&self) -> f64 {
        self.viewport_rows as f64 * self.row_height_px
    }

    fn set_scroll_top(&mut self, px: f64) {
        self.scroll_top_px = px.max(0.0);
    }
}

/// The song being performed
#[derive(Debug, Clone)]
pub struct ReproducerState {
    pub song: Song,
    pub lines: Vec<ColoredLine>,
    pub viewport: LyricsViewport,
    pub issue_count: usize,
}

impl ReproducerState {
    pub fn new(song: Song, row_height_px: f64) -> Self {
        let lines = compose_colored_lines(&song.lyrics, &song.voices, &song.segments);
        let viewport = LyricsViewport::new(lines.len(), row_height_px);
        let issue_count = song.issues().len();
        Self {
            song,
            lines,
            viewport,
            issue_count,
        }
    }
}

pub struct AppState {
    pub should_quit: bool,
    pub tick: u64,

    pub screen: Screen,
    /// Where `Back` returns to from Help
    pub previous_screen: Screen,

    pub library: LibraryState,
    pub reproducer: Option<ReproducerState>,

    // Mirrors of the scroll controller, for rendering
    pub playing: bool,
    pub speed: SpeedTier,

    pub toast: Option<Toast>,
    pub status: String,
}

impl AppState {
    pub fn new(speed: SpeedTier) -> Self {
        Self {
            should_quit: false,
            tick: 0,
            screen: Screen::Library,
            previous_screen: Screen::Library,
            library: LibraryState::default(),
            reproducer: None,
            playing: false,
            speed,
            toast: None,
            status: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved(id: i64, title: &str) -> Song {
        let mut song = Song::new(title, "la");
        song.id = Some(SongId(id));
        song
    }

    #[test]
    fn test_set_songs_keeps_selection() {
        let mut lib = LibraryState::default();
        lib.set_songs(vec![saved(3, "c"), saved(2, "b"), saved(1, "a")]);
        lib.select_next();
        assert_eq!(lib.selected_song().unwrap().title, "b");

        lib.set_songs(vec![saved(4, "d"), saved(3, "c"), saved(2, "b"), saved(1, "a")]);
        assert_eq!(lib.selected_song().unwrap().title, "b");

        lib.set_songs(vec![saved(1, "a")]);
        assert_eq!(lib.selected, 0);

        lib.set_songs(Vec::new());
        assert!(lib.selected_song().is_none());
    }

    #[test]
    fn test_selection_bounds() {
        let mut lib = LibraryState::default();
        lib.select_next();
        lib.select_prev();
        assert_eq!(lib.selected, 0);

        lib.set_songs(vec![saved(2, "b"), saved(1, "a")]);
        lib.select_next();
        lib.select_next();
        assert_eq!(lib.selected, 1);
        lib.update_scroll(1);
        assert_eq!(lib.scroll_offset, 1);
    }

    #[test]
    fn test_viewport_geometry() {
        let mut vp = LyricsViewport::new(10, 20.0);
        vp.viewport_rows = 5;
        assert_eq!(vp.content_rows(), 20);
        assert_eq!(vp.scroll_height(), 400.0);
        assert_eq!(vp.client_height(), 100.0);

        vp.set_scroll_top(150.0);
        assert_eq!(vp.top_row(), 7);
        assert_eq!(vp.progress(), 0.5);

        vp.scroll_by_rows(100.0);
        assert_eq!(vp.scroll_top_px, 300.0);
        vp.scroll_by_rows(-100.0);
        assert_eq!(vp.scroll_top_px, 0.0);
    }

    #[test]
    fn test_reproducer_composes_song() {
        let mut song = Song::new("t", "Hello\nWorld");
        let v = song.add_voice("Lead", "#ff0000").unwrap();
        song.assign(&v, 0, 5).unwrap();
        song.assign(&crate::song::VoiceId::new("gone"), 0, 1).unwrap_err();

        let rep = ReproducerState::new(song, 24.0);
        assert_eq!(rep.lines.len(), 2);
        assert_eq!(rep.lines[0][0].color, "#ff0000");
        assert_eq!(rep.viewport.line_count, 2);
        assert_eq!(rep.issue_count, 0);
    }
}
