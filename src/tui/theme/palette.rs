//! Color palette

use crate::song::color::parse_hex_color;
use ratatui::style::Color;

/// Chrome colors. Lyrics keep their voice colors and never use these.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_primary: Color,
    pub bg_highlight: Color,
    pub fg_primary: Color,
    pub fg_secondary: Color,
    pub accent: Color,
    pub accent_alt: Color,
    pub border: Color,
    pub playing: Color,
    pub error: Color,
}

impl Palette {
    /// Dark stage: black background, gray chrome
    pub const STAGE: Self = Self {
        bg_primary: Color::Rgb(0, 0, 0),          // #000000
        bg_highlight: Color::Rgb(48, 48, 48),     // #303030
        fg_primary: Color::Rgb(255, 255, 255),    // #ffffff
        fg_secondary: Color::Rgb(136, 136, 136),  // #888888
        accent: Color::Rgb(255, 255, 255),        // #ffffff
        accent_alt: Color::Rgb(200, 200, 200),    // #c8c8c8
        border: Color::Rgb(64, 64, 64),           // #404040
        playing: Color::Rgb(120, 220, 120),       // #78dc78
        error: Color::Rgb(240, 96, 96),           // #f06060
    };
}

impl Default for Palette {
    fn default() -> Self {
        Self::STAGE
    }
}

/// Terminal color for a voice. Anything unparseable shows as white.
pub fn voice_color(hex: &str) -> Color {
    match parse_hex_color(hex) {
        Some((r, g, b)) => Color::Rgb(r, g, b),
        None => Color::Rgb(255, 255, 255),
    }
}
