use crate::song::{Song, SongId};

#[derive(Debug, Clone)]
pub enum Event {
    Input(InputEvent),
    /// One display frame, stamped in ms since the app's frame clock epoch.
    Frame { now_ms: f64 },
    Store(StoreEvent),
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(crossterm::event::KeyEvent),
    Mouse(crossterm::event::MouseEvent),
    Resize,
}

#[derive(Debug, Clone)]
pub enum StoreEvent {
    Error(String),
    SongsLoaded { songs: Vec<Song> },
    SongDeleted { id: SongId, title: String },
}
