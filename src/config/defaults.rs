use super::Config;
use directories::ProjectDirs;
use std::path::PathBuf;

/// ~60 frames per second.
pub const FRAME_INTERVAL_MS: u64 = 16;

pub const ROW_HEIGHT_PX: f64 = 24.0;

pub fn data_dir() -> PathBuf {
    ProjectDirs::from("dev", "coro", "coro")
        .map(|p| p.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("coro"))
}

/// The config written on first run.
pub fn defaults() -> Config {
    Config::default()
}
