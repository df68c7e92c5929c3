//! Timed auto-scroll playback
//!
//! - [`ScrollController`]: the play/pause state machine advancing a scroll
//!   offset by wall-clock time
//! - [`FrameScheduler`]: the "call me every frame" primitive it starts and
//!   cancels; [`FrameTicker`] is the tokio implementation
//! - [`ScrollSurface`]: the scrollable viewport being driven

pub mod controller;
pub mod ticker;

use serde::{Deserialize, Serialize};

pub use controller::{ScrollController, ScrollSurface};
pub use ticker::{FrameClock, FrameTicker};

/// Something that can deliver a callback per display frame until cancelled.
pub trait FrameScheduler {
    /// Begin delivering frames. Starting an already started scheduler is a no-op.
    fn start(&mut self) -> anyhow::Result<()>;

    /// Stop delivering frames. Idempotent.
    fn cancel(&mut self);
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum SpeedTier {
    Slow,
    #[default]
    Normal,
    Fast,
    VeryFast,
}

impl SpeedTier {
    pub const ALL: [SpeedTier; 4] = [
        SpeedTier::Slow,
        SpeedTier::Normal,
        SpeedTier::Fast,
        SpeedTier::VeryFast,
    ];

    pub fn px_per_second(self) -> f64 {
        match self {
            SpeedTier::Slow => 30.0,
            SpeedTier::Normal => 60.0,
            SpeedTier::Fast => 120.0,
            SpeedTier::VeryFast => 180.0,
        }
    }

    pub fn next(self) -> Self {
        match self {
            SpeedTier::Slow => SpeedTier::Normal,
            SpeedTier::Normal => SpeedTier::Fast,
            SpeedTier::Fast => SpeedTier::VeryFast,
            SpeedTier::VeryFast => SpeedTier::Slow,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            SpeedTier::Slow => SpeedTier::VeryFast,
            SpeedTier::Normal => SpeedTier::Slow,
            SpeedTier::Fast => SpeedTier::Normal,
            SpeedTier::VeryFast => SpeedTier::Fast,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpeedTier::Slow => "Slow",
            SpeedTier::Normal => "Normal",
            SpeedTier::Fast => "Fast",
            SpeedTier::VeryFast => "Very fast",
        }
    }
}

/// Transient playback state; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub speed_tier: SpeedTier,
    pub scroll_offset_px: f64,
    /// Timestamp (ms) of the last frame, the reference for the next delta.
    pub last_frame_timestamp: f64,
}

impl PlaybackState {
    pub fn new(speed_tier: SpeedTier) -> Self {
        Self {
            is_playing: false,
            speed_tier,
            scroll_offset_px: 0.0,
            last_frame_timestamp: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_mapping() {
        assert_eq!(SpeedTier::Slow.px_per_second(), 30.0);
        assert_eq!(SpeedTier::Normal.px_per_second(), 60.0);
        assert_eq!(SpeedTier::Fast.px_per_second(), 120.0);
        assert_eq!(SpeedTier::VeryFast.px_per_second(), 180.0);
    }

    #[test]
    fn test_speed_cycle() {
        for tier in SpeedTier::ALL {
            assert_eq!(tier.next().prev(), tier);
        }
        assert_eq!(SpeedTier::VeryFast.next(), SpeedTier::Slow);
    }

    #[test]
    fn test_speed_serde_names() {
        #[derive(Serialize, Deserialize)]
        struct Wrap {
            speed: SpeedTier,
        }
        let raw = toml::to_string(&Wrap { speed: SpeedTier::VeryFast }).unwrap();
        assert_eq!(raw.trim(), r#"speed = "very-fast""#);
        let back: Wrap = toml::from_str(r#"speed = "slow""#).unwrap();
        assert_eq!(back.speed, SpeedTier::Slow);
    }
}
