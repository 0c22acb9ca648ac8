//! Hardware-independent core library for the orbit watch face
//!
//! The face shows hour, minute and second as numeric "satellites": the hour
//! sits at the center, minute and second orbit it. This crate holds the whole
//! rendering and timing engine: clock readings, satellite geometry, the render
//! pass, the display-mode state machine and the second-aligned redraw
//! scheduler. Drawing surfaces, the wall clock, preferences, timers and
//! time-zone notifications are injected by the host.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod clock;
pub mod config;
pub mod framebuffer;
pub mod geometry;
pub mod mode;
pub mod render;
pub mod scheduler;
pub mod styling;
pub mod watch_face;
