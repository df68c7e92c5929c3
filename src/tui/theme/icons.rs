//! Nerd Font icons for TUI display
//! Requires a Nerd Font to be installed (https://www.nerdfonts.com)

#[derive(Debug, Clone)]
pub struct Icons {
    // Playback
    pub play: &'static str,
    pub pause: &'static str,
    pub speed: &'static str,

    // Navigation
    pub library: &'static str,
    pub help: &'static str,

    // Status
    pub success: &'static str,
    pub error: &'static str,
    pub warning: &'static str,

    // Songs
    pub music: &'static str,
    pub microphone: &'static str,
    pub voice_swatch: &'static str,

    // Progress bar
    pub progress_full: &'static str,
    pub progress_empty: &'static str,
    pub progress_head: &'static str,

    pub bullet: &'static str,
}

impl Icons {
    pub const fn nerd() -> Self {
        Self {
            play: "\u{f04b}",         // nf-fa-play
            pause: "\u{f04c}",        // nf-fa-pause
            speed: "\u{f0e4}",        // nf-fa-tachometer

            library: "\u{f02d}",      // nf-fa-book
            help: "\u{f059}",         // nf-fa-question_circle

            success: "\u{f00c}",      // nf-fa-check
            error: "\u{f00d}",        // nf-fa-times
            warning: "\u{f071}",      // nf-fa-warning

            music: "\u{f001}",        // nf-fa-music
            microphone: "\u{f130}",   // nf-fa-microphone
            voice_swatch: "●",

            progress_full: "━",
            progress_empty: "─",
            progress_head: "●",

            bullet: "•",
        }
    }
}

impl Default for Icons {
    fn default() -> Self {
        Self::nerd()
    }
}

/// Loading spinner frames
pub struct LoadingSpinner;

impl LoadingSpinner {
    pub const BRAILLE: [&'static str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

    pub fn frame(tick: u64) -> &'static str {
        let idx = (tick / 4) as usize % Self::BRAILLE.len();
        Self::BRAILLE[idx]
    }
}
