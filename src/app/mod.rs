pub mod actions;
pub mod events;
pub mod state;

use crate::config::Config;
use crate::input;
use crate::playback::{FrameClock, FrameTicker, ScrollController};
use crate::song::{Song, SongId};
use crate::storage::Storage;
use crate::tui::{self, TuiTerminal};
use actions::Action;
use anyhow::Context;
use events::{Event, StoreEvent};
use state::{AppState, ReproducerState, Screen, Toast};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub struct App {
    cfg: Config,
    config_path: std::path::PathBuf,
    state: AppState,
    clock: FrameClock,
    player: ScrollController<FrameTicker>,
    tx: mpsc::Sender<Event>,
    rx: Option<mpsc::Receiver<Event>>,
}

impl App {
    pub fn new(cfg: Config, config_path: std::path::PathBuf) -> anyhow::Result<Self> {
        // Fail early if the store is unusable.
        let _ = Storage::open(&cfg.songs_db_path())?;

        let (tx, rx) = mpsc::channel::<Event>(256);
        let clock = FrameClock::new();
        let ticker = FrameTicker::new(
            tx.clone(),
            clock,
            Duration::from_millis(cfg.playback.frame_interval_ms),
        );
        let player = ScrollController::new(ticker, cfg.playback.speed)
            .with_wrap_epsilon(cfg.playback.wrap_epsilon_px);
        let state = AppState::new(cfg.playback.speed);

        Ok(Self {
            cfg,
            config_path,
            state,
            clock,
            player,
            tx,
            rx: Some(rx),
        })
    }

    pub async fn run(&mut self, terminal: &mut TuiTerminal) -> anyhow::Result<()> {
        let mut rx = self.rx.take().context("app is already running")?;

        input::spawn_input_task(self.tx.clone(), self.cfg.input.mouse);

        tui::draw(terminal, &self.cfg, &mut self.state)?;
        self.spawn_load_songs();

        while let Some(ev) = rx.recv().await {
            self.state.tick = self.state.tick.wrapping_add(1);
            match ev {
                Event::Input(input_ev) => {
                    if let Some(action) = input::map_input_to_action(&self.state, input_ev) {
                        self.handle_action(action);
                        self.sync_from_player();
                    }
                }
                Event::Frame { now_ms } => {
                    // Nothing moved, nothing to redraw.
                    if !self.on_frame(now_ms) {
                        continue;
                    }
                }
                Event::Store(se) => self.handle_store(se),
            }

            if self.state.should_quit {
                break;
            }

            tui::draw(terminal, &self.cfg, &mut self.state)?;
        }

        self.player.reset();
        self.save_state_on_quit();
        Ok(())
    }

    fn sync_from_player(&mut self) {
        let ps = self.player.state();
        self.state.playing = ps.is_playing;
        self.state.speed = ps.speed_tier;
    }

    fn on_frame(&mut self, now_ms: f64) -> bool {
        match self.state.reproducer.as_mut() {
            Some(rep) => self.player.tick(now_ms, &mut rep.viewport),
            None => false,
        }
    }

    fn save_state_on_quit(&mut self) {
        self.cfg.playback.speed = self.player.speed_tier();
        self.cfg.ui.last_song = self
            .state
            .library
            .selected_song()
            .and_then(|s| s.id)
            .map(|id| id.0);

        if let Err(e) = crate::config::save(&self.cfg, Some(&self.config_path)) {
            warn!("save config on quit: {e:#}");
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.state.should_quit = true,
            Action::Resize => {}
            Action::ShowHelp => {
                if self.state.screen != Screen::Help {
                    self.state.previous_screen = self.state.screen;
                    self.state.screen = Screen::Help;
                }
            }
            Action::Back => match self.state.screen {
                Screen::Help => self.state.screen = self.state.previous_screen,
                Screen::Reproducer => self.close_reproducer(),
                Screen::Library => {}
            },

            Action::ListUp => self.state.library.select_prev(),
            Action::ListDown => self.state.library.select_next(),
            Action::GoTop => self.state.library.selected = 0,
            Action::GoBottom => self.state.library.select_last(),
            Action::Refresh => self.spawn_load_songs(),
            Action::OpenSelected => self.open_selected(),
            Action::DeleteSelected => self.spawn_delete_selected(),

            Action::TogglePlay => self.toggle_play(),
            Action::SetSpeed(tier) => self.set_speed(tier),
            Action::SpeedUp => self.set_speed(self.player.speed_tier().next()),
            Action::SpeedDown => self.set_speed(self.player.speed_tier().prev()),
            Action::Rewind => {
                let now = self.clock.now_ms();
                if let Some(rep) = self.state.reproducer.as_mut() {
                    self.player.rewind(now, &mut rep.viewport);
                }
            }
            Action::ScrollUp => self.scroll_manually(-1.0),
            Action::ScrollDown => self.scroll_manually(1.0),
        }
    }

    fn open_selected(&mut self) {
        let Some(song) = self.state.library.selected_song().cloned() else {
            self.state.status = "No song selected".into();
            return;
        };

        for issue in song.issues() {
            warn!(song = %song.title, "{issue}");
        }

        self.player.reset();
        self.state.status = format!("Loaded: {}", song.title);
        self.state.reproducer = Some(ReproducerState::new(song, self.cfg.playback.row_height_px));
        self.state.screen = Screen::Reproducer;
    }

    /// Leaving the reproducer stops playback and forgets the position.
    fn close_reproducer(&mut self) {
        self.player.reset();
        self.state.reproducer = None;
        self.state.screen = Screen::Library;
    }

    fn toggle_play(&mut self) {
        if self.state.reproducer.is_none() {
            return;
        }
        let was_playing = self.player.is_playing();
        let playing = self.player.toggle(self.clock.now_ms());
        if !was_playing && !playing {
            self.state.toast = Some(Toast::error("Auto-scroll unavailable"));
        }
    }

    fn set_speed(&mut self, tier: crate::playback::SpeedTier) {
        self.player.set_speed_tier(tier);
        self.state.status = format!("Speed: {}", tier.label());
    }

    fn scroll_manually(&mut self, rows: f64) {
        if let Some(rep) = self.state.reproducer.as_mut() {
            rep.viewport.scroll_by_rows(rows);
        }
    }

    fn handle_store(&mut self, ev: StoreEvent) {
        match ev {
            StoreEvent::Error(e) => {
                self.state.library.loading = false;
                self.state.toast = Some(Toast::error(e));
            }
            StoreEvent::SongsLoaded { songs } => {
                let first_load = !self.state.library.loaded;
                self.state.library.set_songs(songs);
                if first_load && let Some(id) = self.cfg.ui.last_song {
                    self.state.library.select_id(SongId(id));
                }
                self.state.status = format!("{} songs", self.state.library.songs.len());
            }
            StoreEvent::SongDeleted { id, title } => {
                info!(song = %id, "removed from library");
                self.state.toast = Some(Toast::success(format!("Deleted \"{title}\"")));
                self.spawn_load_songs();
            }
        }
    }

    fn spawn_load_songs(&mut self) {
        if self.state.library.loading {
            return;
        }
        self.state.library.loading = true;
        self.state.status = "Loading songs...".into();

        let storage = self.storage_handle();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let ev = match tokio::task::spawn_blocking(move || storage.list_songs()).await {
                Ok(Ok(songs)) => StoreEvent::SongsLoaded { songs },
                Ok(Err(e)) => StoreEvent::Error(format!("{e:#}")),
                Err(e) => StoreEvent::Error(format!("spawn error: {e:#}")),
            };
            let _ = tx.send(Event::Store(ev)).await;
        });
    }

    fn spawn_delete_selected(&mut self) {
        let Some((id, title)) = self
            .state
            .library
            .selected_song()
            .and_then(|s| Some((s.id?, s.title.clone())))
        else {
            return;
        };

        let storage = self.storage_handle();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let ev = match tokio::task::spawn_blocking(move || storage.delete_song(id)).await {
                Ok(Ok(true)) => StoreEvent::SongDeleted { id, title },
                Ok(Ok(false)) => StoreEvent::Error(format!("Song {id} no longer exists")),
                Ok(Err(e)) => StoreEvent::Error(format!("{e:#}")),
                Err(e) => StoreEvent::Error(format!("spawn error: {e:#}")),
            };
            let _ = tx.send(Event::Store(ev)).await;
        });
    }

    fn storage_handle(&self) -> StorageHandle {
        StorageHandle {
            path: self.cfg.songs_db_path(),
        }
    }
}

/// Opens a fresh connection per call so store work can move to blocking threads.
#[derive(Clone)]
struct StorageHandle {
    path: std::path::PathBuf,
}

impl StorageHandle {
    fn open(&self) -> anyhow::Result<Storage> {
        Storage::open(&self.path)
    }

    fn list_songs(&self) -> anyhow::Result<Vec<Song>> {
        self.open()?.list_songs()
    }

    fn delete_song(&self, id: SongId) -> anyhow::Result<bool> {
        self.open()?.delete_song(id)
    }
}
