use crate::playback::SpeedTier;
use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub mod defaults;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Config {
    pub paths: PathsConfig,
    pub playback: PlaybackConfig,
    pub input: InputConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Holds the song database and the TUI log.
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Speed tier playback starts with.
    pub speed: SpeedTier,
    /// Period of the frame ticker.
    pub frame_interval_ms: u64,
    /// Pixels one terminal row stands for.
    pub row_height_px: f64,
    /// Wrap to the top once this close to the bottom.
    pub wrap_epsilon_px: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct InputConfig {
    pub mouse: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct UiConfig {
    /// Song selected when the app last quit (restored on startup)
    pub last_song: Option<i64>,
}

impl Config {
    pub fn songs_db_path(&self) -> PathBuf {
        self.paths.data_dir.join("songs.sqlite3")
    }

    pub fn log_path(&self) -> PathBuf {
        self.paths.data_dir.join("coro.log")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed: SpeedTier::Normal,
            frame_interval_ms: defaults::FRAME_INTERVAL_MS,
            row_height_px: defaults::ROW_HEIGHT_PX,
            wrap_epsilon_px: crate::playback::controller::WRAP_EPSILON_PX,
        }
    }
}

pub fn save(cfg: &Config, override_path: Option<&Path>) -> anyhow::Result<()> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    write_config(cfg, &path)
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let proj = ProjectDirs::from("dev", "coro", "coro").context("ProjectDirs unavailable")?;
    Ok(proj.config_dir().join("config.toml"))
}

pub fn load(override_path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        let cfg = defaults::defaults();
        write_config(&cfg, &path)?;
        return Ok(cfg);
    }

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg = toml::from_str::<Config>(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

fn write_config(cfg: &Config, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, raw).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");

        let cfg = load(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.playback.speed, SpeedTier::Normal);
        assert_eq!(cfg.playback.frame_interval_ms, defaults::FRAME_INTERVAL_MS);
        assert_eq!(load(Some(&path)).unwrap(), cfg);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[playback]\nspeed = \"fast\"\n").unwrap();

        let cfg = load(Some(&path)).unwrap();
        assert_eq!(cfg.playback.speed, SpeedTier::Fast);
        assert_eq!(cfg.playback.row_height_px, defaults::ROW_HEIGHT_PX);
        assert_eq!(cfg.ui.last_song, None);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.playback.speed = SpeedTier::VeryFast;
        cfg.ui.last_song = Some(7);
        save(&cfg, Some(&path)).unwrap();

        assert_eq!(load(Some(&path)).unwrap(), cfg);
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[playback]\nspeed = \"warp\"\n").unwrap();
        assert!(load(Some(&path)).is_err());
    }
}
