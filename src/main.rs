mod app;
mod compositor;
mod config;
mod input;
mod playback;
mod song;
mod storage;
mod tui;

use anyhow::Context;
use clap::{Parser, Subcommand};
use crossterm::style::{Color, Stylize};
use playback::SpeedTier;
use song::{SegmentId, Song, SongId, VoiceId};
use storage::Storage;

#[derive(Debug, Parser)]
#[command(name = "coro", version, about = "Karaoke lyrics with colored voices and auto-scroll")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the interactive TUI (default).
    Tui,
    /// Print saved songs, newest first.
    List,
    /// Print a song's lyrics in its voice colors.
    Show {
        id: i64,
        /// Print without colors.
        #[arg(long)]
        plain: bool,
    },
    /// Save a song from a JSON file.
    Import {
        path: std::path::PathBuf,
        /// Offsets in the file count UTF-16 code units (browser selections).
        #[arg(long)]
        utf16_offsets: bool,
    },
    /// Print a song as JSON.
    Export { id: i64 },
    /// Create a song with only the main voice.
    New {
        #[arg(long)]
        title: String,
        /// Plain text file with the lyrics.
        #[arg(long)]
        lyrics_file: std::path::PathBuf,
    },
    /// Add a voice to a song.
    Voice {
        id: i64,
        name: String,
        /// Hex color such as #ff8800.
        color: String,
    },
    /// Assign the characters `[start, end)` of a song's lyrics to a voice.
    Assign {
        id: i64,
        voice: String,
        start: i64,
        end: i64,
    },
    /// Remove a voice. Its segments stay and print uncolored.
    RemoveVoice { id: i64, voice: String },
    /// Remove a segment.
    Unassign { id: i64, segment: String },
    /// Delete a song.
    Delete { id: i64 },
    /// Set the speed tier playback starts with.
    Speed {
        #[arg(value_enum)]
        tier: SpeedTier,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref()).context("load config")?;
    let cfg_path = match cli.config.clone() {
        Some(p) => p,
        None => config::default_config_path().context("default config path")?,
    };

    let command = cli.command.unwrap_or(Command::Tui);
    init_logging(&cfg, matches!(command, Command::Tui))?;

    match command {
        Command::Tui => {
            let mut app = app::App::new(cfg.clone(), cfg_path)?;
            let mut terminal = tui::TerminalGuard::enter(cfg.input.mouse).context("init terminal")?;
            app.run(terminal.terminal_mut()).await?;
        }
        Command::List => {
            let store = Storage::open(&cfg.songs_db_path())?;
            for song in store.list_songs()? {
                let id = song.id.map(|id| id.to_string()).unwrap_or_default();
                println!(
                    "{:>4}. {}  ({} lines, {} voices)",
                    id,
                    song.title,
                    song.line_count(),
                    song.voices.len()
                );
            }
        }
        Command::Show { id, plain } => {
            let song = load_song(&cfg, id)?;
            for issue in song.issues() {
                tracing::warn!("{issue}");
            }
            let lines = compositor::compose_colored_lines(&song.lyrics, &song.voices, &song.segments);
            if plain {
                println!("{}", compositor::lines_to_text(&lines));
                return Ok(());
            }
            for line in &lines {
                let mut out = String::new();
                for run in line {
                    let (r, g, b) = song::parse_hex_color(&run.color).unwrap_or((255, 255, 255));
                    out.push_str(&run.text.as_str().with(Color::Rgb { r, g, b }).to_string());
                }
                println!("{out}");
            }
        }
        Command::Import {
            path,
            utf16_offsets,
        } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("read {}", path.display()))?;
            let song = if utf16_offsets {
                Song::from_json_utf16(&raw)
            } else {
                Song::from_json(&raw)
            }
            .with_context(|| format!("parse {}", path.display()))?;
            let mut store = Storage::open(&cfg.songs_db_path())?;
            let id = store.save_song(&song)?;
            println!("Imported \"{}\" as song {id}.", song.title);
        }
        Command::Export { id } => {
            let song = load_song(&cfg, id)?;
            println!("{}", song.to_json()?);
        }
        Command::New { title, lyrics_file } => {
            let lyrics = std::fs::read_to_string(&lyrics_file)
                .with_context(|| format!("read {}", lyrics_file.display()))?;
            let song = Song::new(title, lyrics);
            let mut store = Storage::open(&cfg.songs_db_path())?;
            let id = store.save_song(&song)?;
            println!("Created song {id}.");
        }
        Command::Voice { id, name, color } => {
            let mut song = load_song(&cfg, id)?;
            let voice = song.add_voice(&name, &color)?;
            Storage::open(&cfg.songs_db_path())?.update_song(&song)?;
            println!("Added voice {voice}.");
        }
        Command::Assign {
            id,
            voice,
            start,
            end,
        } => {
            let mut song = load_song(&cfg, id)?;
            let segment = song.assign(&VoiceId::new(voice), start, end)?;
            Storage::open(&cfg.songs_db_path())?.update_song(&song)?;
            println!("Added segment {segment}.");
        }
        Command::RemoveVoice { id, voice } => {
            let mut song = load_song(&cfg, id)?;
            let removed = song.remove_voice(&VoiceId::new(voice))?;
            Storage::open(&cfg.songs_db_path())?.update_song(&song)?;
            println!("Removed voice {} ({}).", removed.id, removed.name);
        }
        Command::Unassign { id, segment } => {
            let mut song = load_song(&cfg, id)?;
            let removed = song
                .unassign(&SegmentId::new(segment))
                .with_context(|| format!("song {id} has no such segment"))?;
            Storage::open(&cfg.songs_db_path())?.update_song(&song)?;
            println!("Removed segment {}.", removed.id);
        }
        Command::Delete { id } => {
            let mut store = Storage::open(&cfg.songs_db_path())?;
            if !store.delete_song(SongId(id))? {
                anyhow::bail!("no song {id}");
            }
            println!("Deleted song {id}.");
        }
        Command::Speed { tier } => {
            let mut cfg = cfg;
            cfg.playback.speed = tier;
            config::save(&cfg, cli.config.as_deref()).context("save config")?;
            println!("Default speed set to {}.", tier.label());
        }
    }

    Ok(())
}

/// The TUI owns the terminal, so its log goes to a file.
fn init_logging(cfg: &config::Config, to_file: bool) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if to_file {
        let path = cfg.log_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open {}", path.display()))?;
        builder
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
    Ok(())
}

fn load_song(cfg: &config::Config, id: i64) -> anyhow::Result<Song> {
    Storage::open(&cfg.songs_db_path())?
        .get_song(SongId(id))?
        .with_context(|| format!("no song {id}"))
}
