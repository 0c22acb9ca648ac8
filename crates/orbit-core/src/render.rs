//! Render pass
//!
//! Draws one frame from precomputed satellites: background, then each
//! satellite's outline and label, then the date. The pass is pure apart from
//! mutating the target and never fails on its own; the only errors are the
//! target's.

use core::fmt::Write;

use embedded_graphics::mono_font::{
    MonoFont, MonoTextStyle,
    ascii::{FONT_7X13, FONT_9X15, FONT_10X20},
};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyle, TextStyleBuilder};

use crate::geometry::{Satellite, SatelliteKind, ScreenGeometry};
use crate::styling::{OUTLINE_STROKE_WIDTH, SHADOW_RADIUS, StyleState, blend};

/// Font used for the date line
pub const DATE_FONT: &MonoFont<'static> = &FONT_7X13;

/// Opacity of the one-pixel halo that softens outline edges
const HALO_ALPHA: u8 = 128;

pub fn satellite_font(kind: SatelliteKind) -> &'static MonoFont<'static> {
    match kind {
        SatelliteKind::Hour => &FONT_10X20,
        SatelliteKind::Minute => &FONT_9X15,
        SatelliteKind::Second => &FONT_7X13,
    }
}

/// Vertical extent of a font around its baseline.
///
/// Follows the usual typographic sign convention: `ascent` is negative
/// (above the baseline), `descent` positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    pub ascent: i32,
    pub descent: i32,
}

impl FontMetrics {
    pub fn of(font: &MonoFont<'_>) -> Self {
        let baseline = font.baseline as i32;
        Self {
            ascent: -baseline,
            descent: font.character_size.height as i32 - baseline - 1,
        }
    }

    /// Baseline shift that puts the glyph box's middle on the anchor.
    pub fn center_offset(&self) -> f32 {
        -((self.ascent + self.descent) as f32) / 2.0
    }
}

fn to_point(x: f32, y: f32) -> Point {
    Point::new(libm::roundf(x) as i32, libm::roundf(y) as i32)
}

fn centered_text_style() -> TextStyle {
    TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Alphabetic)
        .build()
}

/// Draw `text` centered on (`x`, `y`), glyph middle rather than baseline.
fn draw_centered_text<D>(
    display: &mut D,
    text: &str,
    x: f32,
    y: f32,
    font: &MonoFont<'_>,
    color: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let baseline_y = y + FontMetrics::of(font).center_offset();
    Text::with_text_style(
        text,
        to_point(x, baseline_y),
        MonoTextStyle::new(font, color),
        centered_text_style(),
    )
    .draw(display)?;
    Ok(())
}

fn draw_outline<D>(
    display: &mut D,
    satellite: &Satellite,
    style: &StyleState,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let diameter = libm::roundf(satellite.outline_radius * 2.0).max(0.0) as u32;
    let circle = Circle::with_center(to_point(satellite.center_x, satellite.center_y), diameter);

    if style.shadow {
        circle
            .into_styled(PrimitiveStyle::with_stroke(
                style.shadow_color,
                OUTLINE_STROKE_WIDTH + 2 * SHADOW_RADIUS,
            ))
            .draw(display)?;
    }

    if style.anti_alias {
        let halo = blend(style.hand_color, style.frame_background(), HALO_ALPHA);
        circle
            .into_styled(PrimitiveStyle::with_stroke(halo, OUTLINE_STROKE_WIDTH + 2))
            .draw(display)?;
    }

    circle
        .into_styled(PrimitiveStyle::with_stroke(
            style.hand_color,
            OUTLINE_STROKE_WIDTH,
        ))
        .draw(display)
}

/// Draw one complete frame.
///
/// Satellites are drawn in the given order, so later ones overlap earlier
/// ones.
pub fn render<D>(
    display: &mut D,
    geometry: &ScreenGeometry,
    style: &StyleState,
    satellites: &[Satellite],
    date_label: &str,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    display.clear(style.frame_background())?;

    for satellite in satellites {
        if satellite.draw_outline {
            draw_outline(display, satellite, style)?;
        }

        let mut label = heapless::String::<4>::new();
        write!(label, "{}", satellite.label).ok();
        draw_centered_text(
            display,
            &label,
            satellite.center_x,
            satellite.center_y,
            satellite_font(satellite.kind),
            style.label_color(satellite.kind),
        )?;
    }

    let (date_x, date_y) = geometry.date_anchor();
    draw_centered_text(
        display,
        date_label,
        date_x,
        date_y,
        DATE_FONT,
        style.date_color(),
    )
}
