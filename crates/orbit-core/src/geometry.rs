//! Satellite geometry
//!
//! Maps a [`ClockReading`] onto the screen. The hour satellite sits at the
//! center; minute and second satellites orbit it on a clock-face projection
//! where 0° points up and angles grow clockwise:
//!
//! ```text
//! x = cx + L·sin(θ)
//! y = cy − L·cos(θ)
//! ```
//!
//! Every satellite goes through [`project`] so the three stay consistent.

use heapless::Vec;

use crate::clock::ClockReading;
use crate::mode::DisplayMode;
use crate::styling::StyleState;

/// Second satellite orbit, as a fraction of the center x-coordinate
pub const SECONDS_DISTANCE: f32 = 0.85;

/// Minute satellite orbit, as a fraction of the center x-coordinate
pub const MINUTES_DISTANCE: f32 = 0.70;

/// Date label offset below center, as a fraction of the center x-coordinate
pub const DATE_DISTANCE: f32 = 0.45;

pub const HOUR_SATELLITE_RATIO: f32 = 0.333;
pub const MINUTES_SATELLITE_RATIO: f32 = 0.12665;
pub const SECONDS_SATELLITE_RATIO: f32 = 0.0999;

/// Degrees swept per minute or second
pub const DEGREES_PER_STEP: f32 = 6.0;

/// Maximum satellites in one frame (hour, minute, second)
pub const MAX_SATELLITES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatelliteKind {
    Hour,
    Minute,
    Second,
}

/// Screen-size derived lengths, recomputed on every resize.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenGeometry {
    pub center_x: f32,
    pub center_y: f32,
    pub second_hand_length: f32,
    pub minute_hand_length: f32,
    pub date_offset: f32,
    pub hour_satellite_radius: f32,
    pub minutes_satellite_radius: f32,
    pub seconds_satellite_radius: f32,
}

impl ScreenGeometry {
    /// Derive lengths from the surface size.
    ///
    /// Non-positive dimensions collapse to zero, so every length and radius
    /// of a degenerate surface is zero and drawing lands on the origin.
    pub fn from_size(width: i32, height: i32) -> Self {
        let center_x = width.max(0) as f32 / 2.0;
        let center_y = height.max(0) as f32 / 2.0;

        Self {
            center_x,
            center_y,
            second_hand_length: center_x * SECONDS_DISTANCE,
            minute_hand_length: center_x * MINUTES_DISTANCE,
            date_offset: center_x * DATE_DISTANCE,
            hour_satellite_radius: center_x * HOUR_SATELLITE_RATIO,
            minutes_satellite_radius: center_x * MINUTES_SATELLITE_RATIO,
            seconds_satellite_radius: center_x * SECONDS_SATELLITE_RATIO,
        }
    }

    /// Orbit length of a satellite. The hour satellite does not orbit.
    pub const fn hand_length(&self, kind: SatelliteKind) -> f32 {
        match kind {
            SatelliteKind::Hour => 0.0,
            SatelliteKind::Minute => self.minute_hand_length,
            SatelliteKind::Second => self.second_hand_length,
        }
    }

    pub const fn satellite_radius(&self, kind: SatelliteKind) -> f32 {
        match kind {
            SatelliteKind::Hour => self.hour_satellite_radius,
            SatelliteKind::Minute => self.minutes_satellite_radius,
            SatelliteKind::Second => self.seconds_satellite_radius,
        }
    }

    /// Point the date label is centered on, before font correction.
    pub fn date_anchor(&self) -> (f32, f32) {
        (self.center_x, self.center_y + self.date_offset)
    }
}

/// One numeric marker of the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Satellite {
    pub kind: SatelliteKind,
    pub label: u8,
    /// Clockwise from 12 o'clock
    pub angle_degrees: f32,
    pub center_x: f32,
    pub center_y: f32,
    pub outline_radius: f32,
    pub draw_outline: bool,
}

pub type Satellites = Vec<Satellite, MAX_SATELLITES>;

pub fn minute_angle(minute: u8) -> f32 {
    minute as f32 * DEGREES_PER_STEP
}

/// Angle of the second satellite, sweeping smoothly through the second.
pub fn second_angle(reading: &ClockReading) -> f32 {
    reading.fractional_second() * DEGREES_PER_STEP
}

/// Project a point `length` away from the center at `angle_degrees`.
pub fn project(center_x: f32, center_y: f32, length: f32, angle_degrees: f32) -> (f32, f32) {
    let theta = angle_degrees.to_radians();
    (
        center_x + length * libm::sinf(theta),
        center_y - length * libm::cosf(theta),
    )
}

fn satellite(
    geometry: &ScreenGeometry,
    kind: SatelliteKind,
    label: u8,
    angle_degrees: f32,
    draw_outline: bool,
) -> Satellite {
    let (center_x, center_y) = project(
        geometry.center_x,
        geometry.center_y,
        geometry.hand_length(kind),
        angle_degrees,
    );
    Satellite {
        kind,
        label,
        angle_degrees,
        center_x,
        center_y,
        outline_radius: geometry.satellite_radius(kind),
        draw_outline,
    }
}

/// Satellites for one frame, in draw order.
///
/// Outlines are only drawn in interactive mode, and the second satellite is
/// not produced at all in ambient mode.
pub fn compute_satellites(
    reading: &ClockReading,
    geometry: &ScreenGeometry,
    mode: &DisplayMode,
    style: &StyleState,
) -> Satellites {
    let outline = |kind| mode.is_interactive() && style.outlines.get(kind);
    let mut satellites = Satellites::new();

    // Capacity matches the three kinds pushed here
    satellites
        .push(satellite(
            geometry,
            SatelliteKind::Hour,
            reading.hour_label(style.use_24_hour_clock),
            0.0,
            outline(SatelliteKind::Hour),
        ))
        .ok();

    satellites
        .push(satellite(
            geometry,
            SatelliteKind::Minute,
            reading.minute,
            minute_angle(reading.minute),
            outline(SatelliteKind::Minute),
        ))
        .ok();

    if mode.is_interactive() {
        satellites
            .push(satellite(
                geometry,
                SatelliteKind::Second,
                reading.second,
                second_angle(reading),
                outline(SatelliteKind::Second),
            ))
            .ok();
    }

    satellites
}
