//! Scroll controller state machine
//!
//! `Stopped --start--> Running --stop--> Stopped`. While running, every
//! frame moves the offset by `px_per_second * elapsed_ms / 1000` and wraps
//! to the top once the bottom is reached. Frames are driven from outside
//! through [`ScrollController::tick`] with the frame's timestamp, so the
//! loop can be stepped by hand with synthetic times.

use super::{FrameScheduler, PlaybackState, SpeedTier};
use tracing::{debug, info, warn};

/// Default distance from the bottom at which the offset wraps.
pub const WRAP_EPSILON_PX: f64 = 1.0;

/// A scrollable viewport, seen as three readable numbers and one writable one.
pub trait ScrollSurface {
    fn scroll_top(&self) -> f64;
    fn scroll_height(&self) -> f64;
    fn client_height(&self) -> f64;
    fn set_scroll_top(&mut self, px: f64);
}

pub struct ScrollController<S: FrameScheduler> {
    state: PlaybackState,
    scheduler: S,
    wrap_epsilon_px: f64,
}

impl<S: FrameScheduler> ScrollController<S> {
    pub fn new(scheduler: S, speed_tier: SpeedTier) -> Self {
        Self {
            state: PlaybackState::new(speed_tier),
            scheduler,
            wrap_epsilon_px: WRAP_EPSILON_PX,
        }
    }

    pub fn with_wrap_epsilon(mut self, px: f64) -> Self {
        self.wrap_epsilon_px = px.max(0.0);
        self
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn speed_tier(&self) -> SpeedTier {
        self.state.speed_tier
    }

    /// Start playback at `now_ms`. Returns whether the controller is running
    /// afterwards: if frames cannot be scheduled it stays stopped.
    pub fn start(&mut self, now_ms: f64) -> bool {
        if self.state.is_playing {
            return true;
        }

        if let Err(e) = self.scheduler.start() {
            warn!("playback unavailable: {e:#}");
            return false;
        }

        self.state.is_playing = true;
        self.state.last_frame_timestamp = now_ms;
        info!(speed = ?self.state.speed_tier, offset = self.state.scroll_offset_px, "playback started");
        true
    }

    /// Stop playback. No frame mutates the offset after this returns.
    pub fn stop(&mut self) {
        if !self.state.is_playing {
            return;
        }
        self.scheduler.cancel();
        self.state.is_playing = false;
        info!(offset = self.state.scroll_offset_px, "playback stopped");
    }

    pub fn toggle(&mut self, now_ms: f64) -> bool {
        if self.state.is_playing {
            self.stop();
            false
        } else {
            self.start(now_ms)
        }
    }

    /// Takes effect on the next frame; offset and time reference are kept.
    pub fn set_speed_tier(&mut self, tier: SpeedTier) {
        self.state.speed_tier = tier;
    }

    /// Jump back to the top without changing the play state.
    pub fn rewind(&mut self, now_ms: f64, surface: &mut impl ScrollSurface) {
        self.state.scroll_offset_px = 0.0;
        self.state.last_frame_timestamp = now_ms;
        surface.set_scroll_top(0.0);
    }

    /// Stop and forget the position, as when leaving the playback view.
    pub fn reset(&mut self) {
        self.stop();
        self.state.scroll_offset_px = 0.0;
        self.state.last_frame_timestamp = 0.0;
    }

    /// Advance one frame. Returns whether the surface was written.
    pub fn tick(&mut self, now_ms: f64, surface: &mut impl ScrollSurface) -> bool {
        if !self.state.is_playing {
            return false;
        }

        let elapsed_ms = (now_ms - self.state.last_frame_timestamp).max(0.0);
        let moved = self.state.speed_tier.px_per_second() * elapsed_ms / 1000.0;
        let max_scroll = (surface.scroll_height() - surface.client_height()).max(0.0);

        let mut offset = surface.scroll_top() + moved;
        if offset >= max_scroll - self.wrap_epsilon_px {
            debug!(max_scroll, "playback wrapped to top");
            offset = 0.0;
        }

        self.state.scroll_offset_px = offset;
        self.state.last_frame_timestamp = now_ms;
        surface.set_scroll_top(offset);
        true
    }
}

impl<S: FrameScheduler> Drop for ScrollController<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
