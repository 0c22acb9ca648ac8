//! Colors and resolved drawing style
//!
//! - [`colors`]: RGB565 constants, the settings palette, hex conversion and blending
//! - [`style`]: [`StyleState`], the per-mode visual configuration

pub mod colors;
pub mod style;

pub use colors::*;
pub use style::*;
