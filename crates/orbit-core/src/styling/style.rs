//! Resolved visual state for the current display mode
//!
//! [`StyleState`] is a pure function of the preference snapshot and the mode
//! flags. It is recomputed on mode changes and read-only while a frame is
//! drawn, so leaving ambient mode restores exactly the interactive state that
//! was active before.

use embedded_graphics::pixelcolor::Rgb565;

use super::colors::{TRUE_BLACK, WHITE, blend, rgb565_from_hex};
use crate::config::ConfigSnapshot;
use crate::geometry::SatelliteKind;
use crate::mode::{DisplayMode, Fidelity};

/// Stroke width of satellite outlines in pixels
pub const OUTLINE_STROKE_WIDTH: u32 = 2;

/// Spread of the outline drop shadow in pixels
pub const SHADOW_RADIUS: u32 = 3;

/// Hour and minute label opacity while muted
pub const MUTED_HAND_ALPHA: u8 = 100;

/// Second label opacity while muted
pub const MUTED_SECOND_ALPHA: u8 = 80;

/// Per-satellite outline preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineFlags {
    pub hour: bool,
    pub minute: bool,
    pub second: bool,
}

impl OutlineFlags {
    pub const fn get(&self, kind: SatelliteKind) -> bool {
        match kind {
            SatelliteKind::Hour => self.hour,
            SatelliteKind::Minute => self.minute,
            SatelliteKind::Second => self.second,
        }
    }
}

/// Label opacity per satellite, 0-255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandAlpha {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl HandAlpha {
    pub const OPAQUE: Self = Self {
        hour: u8::MAX,
        minute: u8::MAX,
        second: u8::MAX,
    };

    pub const MUTED: Self = Self {
        hour: MUTED_HAND_ALPHA,
        minute: MUTED_HAND_ALPHA,
        second: MUTED_SECOND_ALPHA,
    };

    pub const fn for_muted(muted: bool) -> Self {
        if muted { Self::MUTED } else { Self::OPAQUE }
    }

    pub const fn get(&self, kind: SatelliteKind) -> u8 {
        match kind {
            SatelliteKind::Hour => self.hour,
            SatelliteKind::Minute => self.minute,
            SatelliteKind::Second => self.second,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleState {
    pub fidelity: Fidelity,
    /// Configured background; ambient frames ignore it
    pub background_color: Rgb565,
    /// Outline color
    pub hand_color: Rgb565,
    pub shadow_color: Rgb565,
    pub text_color: Rgb565,
    pub outlines: OutlineFlags,
    pub use_24_hour_clock: bool,
    pub anti_alias: bool,
    pub shadow: bool,
    pub alpha: HandAlpha,
}

impl StyleState {
    /// Resolve the style for `config` under `mode`.
    pub fn resolve(config: &ConfigSnapshot, mode: &DisplayMode) -> Self {
        let outlines = OutlineFlags {
            hour: config.draw_hour_outline,
            minute: config.draw_minute_outline,
            second: config.draw_second_outline,
        };
        let background_color = rgb565_from_hex(config.background_color);
        let alpha = HandAlpha::for_muted(mode.muted);

        match mode.fidelity {
            Fidelity::Interactive => Self {
                fidelity: Fidelity::Interactive,
                background_color,
                hand_color: rgb565_from_hex(config.satellite_color),
                shadow_color: TRUE_BLACK,
                text_color: rgb565_from_hex(config.text_color),
                outlines,
                use_24_hour_clock: config.use_24_hour_clock,
                anti_alias: true,
                shadow: true,
                alpha,
            },
            Fidelity::Ambient => Self {
                fidelity: Fidelity::Ambient,
                background_color,
                hand_color: WHITE,
                shadow_color: TRUE_BLACK,
                text_color: WHITE,
                outlines,
                use_24_hour_clock: config.use_24_hour_clock,
                anti_alias: false,
                shadow: false,
                alpha,
            },
        }
    }

    /// Re-derive opacity only, keeping colors and flags.
    pub fn with_muted(mut self, muted: bool) -> Self {
        self.alpha = HandAlpha::for_muted(muted);
        self
    }

    /// Color the whole frame is cleared to.
    pub const fn frame_background(&self) -> Rgb565 {
        match self.fidelity {
            Fidelity::Interactive => self.background_color,
            Fidelity::Ambient => TRUE_BLACK,
        }
    }

    /// Label color of a satellite with its opacity resolved.
    pub fn label_color(&self, kind: SatelliteKind) -> Rgb565 {
        blend(self.text_color, self.frame_background(), self.alpha.get(kind))
    }

    /// Date text is never dimmed.
    pub const fn date_color(&self) -> Rgb565 {
        self.text_color
    }
}
