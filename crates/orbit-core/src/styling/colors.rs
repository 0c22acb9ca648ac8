//! Color definitions and conversions
//!
//! Everything on the face is drawn in RGB565, the native format of the small
//! panels the core targets. Preferences store colors as packed `0xRRGGBB`
//! values; [`rgb565_from_hex`] converts them.
//!
//! # RGB565 Format
//! - Red: 5 bits (0-31)
//! - Green: 6 bits (0-63)
//! - Blue: 5 bits (0-31)

use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::prelude::RgbColor;

// ============================================================================
// Base Colors
// ============================================================================

/// Pure black - ambient background and the default face background
pub const TRUE_BLACK: Rgb565 = Rgb565::new(0, 0, 0);

/// Pure white - maximum brightness in RGB565
pub const WHITE: Rgb565 = Rgb565::new(31, 63, 31);

/// Packed black, the default background preference
pub const HEX_BLACK: u32 = 0x000000;

/// Packed white, the default satellite and text preference
pub const HEX_WHITE: u32 = 0xFFFFFF;

// ============================================================================
// Color Options
// ============================================================================

/// Colors offered by the settings screens for background, satellites and text.
///
/// Material Design palette, black first and white last.
pub const COLOR_OPTIONS: [u32; 21] = [
    0x000000, // Black
    0x9E9E9E, // Grey
    0x607D8B, // Blue Grey
    0x795548, // Brown
    0xFFEB3B, // Yellow
    0xFFC107, // Amber
    0xFF9800, // Orange
    0xFF5722, // Deep Orange
    0xF44336, // Red
    0xE91E63, // Pink
    0x9C27B0, // Purple
    0x673AB7, // Deep Purple
    0x3F51B5, // Indigo
    0x2196F3, // Blue
    0x03A9F4, // Light Blue
    0x00BCD4, // Cyan
    0x009688, // Teal
    0x4CAF50, // Green
    0x8BC34A, // Lime Green
    0xCDDC39, // Lime
    0xFFFFFF, // White
];

/// Returns the option following `current` in [`COLOR_OPTIONS`], wrapping around.
///
/// A color that is not in the palette restarts the cycle at black.
pub fn next_color_option(current: u32) -> u32 {
    match COLOR_OPTIONS.iter().position(|&c| c == current & 0x00FF_FFFF) {
        Some(idx) => COLOR_OPTIONS[(idx + 1) % COLOR_OPTIONS.len()],
        None => COLOR_OPTIONS[0],
    }
}

// ============================================================================
// Conversions
// ============================================================================

/// Convert a packed `0xRRGGBB` value to RGB565.
///
/// Any alpha byte in the top eight bits is ignored.
pub fn rgb565_from_hex(hex: u32) -> Rgb565 {
    let r = ((hex >> 16) & 0xFF) as u8;
    let g = ((hex >> 8) & 0xFF) as u8;
    let b = (hex & 0xFF) as u8;
    Rgb565::from(Rgb888::new(r, g, b))
}

/// Blend `foreground` over `background` with the given opacity (0-255).
///
/// RGB565 has no alpha channel, so translucency is resolved against the
/// color the paint will land on.
pub fn blend(foreground: Rgb565, background: Rgb565, alpha: u8) -> Rgb565 {
    if alpha == u8::MAX {
        return foreground;
    }
    let a = alpha as u16;
    let mix = |fg: u8, bg: u8| -> u8 {
        ((fg as u16 * a + bg as u16 * (255 - a) + 127) / 255) as u8
    };
    Rgb565::new(
        mix(foreground.r(), background.r()),
        mix(foreground.g(), background.g()),
        mix(foreground.b(), background.b()),
    )
}
