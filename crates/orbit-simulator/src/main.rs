//! Desktop simulator for the orbit watch face.
//!
//! Runs orbit-core's engine in an SDL2 window via `embedded-graphics-simulator`,
//! with the host's wall clock, a deadline-based tick scheduler and keyboard
//! stand-ins for the platform notifications a watch would deliver.
//!
//! # Key bindings
//!
//! | Key     | Action                                   |
//! |---------|------------------------------------------|
//! | A       | Toggle ambient mode                      |
//! | V       | Toggle visibility                        |
//! | M       | Toggle mute (interruption filter)        |
//! | Z       | Shift the time zone by one hour          |
//! | H       | Toggle 24-hour clock                     |
//! | 1, 2, 3 | Toggle hour / minute / second outline    |
//! | B, C, T | Cycle background / satellite / text color|
//! | Q, Esc  | Quit                                     |
//!
//! Mouse presses and releases are forwarded as touch and tap events.

use std::time::{Duration, Instant};

use chrono::{FixedOffset, Local, Offset, Utc};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::{info, warn};

use orbit_core::clock::{ClockSource, TimeZoneWatcher};
use orbit_core::config::{ConfigSnapshot, StoredConfig};
use orbit_core::framebuffer::FrameBuffer;
use orbit_core::scheduler::{Scheduler, TickHandle};
use orbit_core::styling::{TRUE_BLACK, next_color_option};
use orbit_core::watch_face::{FaceEvent, TapKind, WatchFace, face_event_receiver, face_event_sender};

// ---------------------------------------------------------------------------
// Display constants
// ---------------------------------------------------------------------------

/// Edge length of the square watch surface in pixels.
const DISPLAY_SIZE_PX: u32 = 280;

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 2;

/// Upper bound on one loop iteration (~60 FPS polling).
const FRAME_DURATION: Duration = Duration::from_millis(16);

const SECONDS_PER_HOUR: i32 = 3600;

// ---------------------------------------------------------------------------
// Host capabilities
// ---------------------------------------------------------------------------

/// Host wall clock with a user-adjustable shift standing in for travel
/// between time zones.
struct SystemClock {
    offset: FixedOffset,
    shift_hours: i32,
}

impl SystemClock {
    fn new() -> Self {
        let mut clock = Self {
            offset: Local::now().offset().fix(),
            shift_hours: 0,
        };
        clock.resync_time_zone();
        clock
    }

    /// Move the "system" zone one hour east, wrapping from +14 to -12.
    fn shift_zone(&mut self) {
        self.shift_hours = if self.shift_hours >= 14 {
            -12
        } else {
            self.shift_hours + 1
        };
    }
}

impl ClockSource for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn time_zone(&self) -> FixedOffset {
        self.offset
    }

    fn resync_time_zone(&mut self) {
        let local = Local::now().offset().fix().local_minus_utc();
        let shifted = local + self.shift_hours * SECONDS_PER_HOUR;
        // Offsets past ±24h are rejected by chrono; keep the local zone then
        self.offset = FixedOffset::east_opt(shifted)
            .or_else(|| FixedOffset::east_opt(local))
            .unwrap_or(self.offset);
    }
}

/// Tick scheduler backed by `Instant` deadlines, polled from the main loop.
#[derive(Default)]
struct DeadlineScheduler {
    next_id: u32,
    pending: Vec<(TickHandle, Instant)>,
}

impl DeadlineScheduler {
    /// Hand every tick whose deadline has passed to `deliver`.
    ///
    /// Ticks `deliver` rejects stay pending and are offered again on the
    /// next call, so a full queue delays a redraw instead of dropping it.
    fn post_due(&mut self, now: Instant, mut deliver: impl FnMut(TickHandle) -> bool) {
        self.pending
            .retain(|&(handle, deadline)| deadline > now || !deliver(handle));
    }
}

impl Scheduler for DeadlineScheduler {
    fn post_delayed(&mut self, delay: embassy_time::Duration) -> TickHandle {
        self.next_id = self.next_id.wrapping_add(1);
        let handle = TickHandle(self.next_id);
        let deadline = Instant::now() + Duration::from_millis(delay.as_millis());
        self.pending.push((handle, deadline));
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.pending.retain(|(pending, _)| *pending != handle);
    }
}

/// Records whether the face currently wants time-zone notifications.
#[derive(Default)]
struct ZoneSubscription {
    active: bool,
}

impl TimeZoneWatcher for ZoneSubscription {
    fn subscribe(&mut self) {
        self.active = true;
    }

    fn unsubscribe(&mut self) {
        self.active = false;
    }
}

type SimulatorFace =
    WatchFace<FrameBuffer, SystemClock, StoredConfig, DeadlineScheduler, ZoneSubscription>;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Apply a preference key to `prefs`. Returns `false` for unrelated keys.
fn edit_preferences(keycode: Keycode, prefs: &mut ConfigSnapshot) -> bool {
    match keycode {
        Keycode::H => prefs.use_24_hour_clock = !prefs.use_24_hour_clock,
        Keycode::Num1 | Keycode::Kp1 => prefs.draw_hour_outline = !prefs.draw_hour_outline,
        Keycode::Num2 | Keycode::Kp2 => prefs.draw_minute_outline = !prefs.draw_minute_outline,
        Keycode::Num3 | Keycode::Kp3 => prefs.draw_second_outline = !prefs.draw_second_outline,
        Keycode::B => prefs.background_color = next_color_option(prefs.background_color),
        Keycode::C => prefs.satellite_color = next_color_option(prefs.satellite_color),
        Keycode::T => prefs.text_color = next_color_option(prefs.text_color),
        _ => return false,
    }
    true
}

/// Queue an event for the face, dropping it if the queue is full.
fn send(event: FaceEvent) {
    if face_event_sender().try_send(event).is_err() {
        warn!("Face event queue full, dropping {:?}", event);
    }
}

/// Store edited preferences and cycle visibility so the face re-reads them,
/// as happens when the settings screen closes on a watch.
fn apply_preferences(face: &mut SimulatorFace, prefs: &ConfigSnapshot) {
    if let Err(e) = face.config_source_mut().write(prefs) {
        warn!("Could not store preferences: {}", e);
        return;
    }
    info!("Preferences: {:?}", prefs);
    if face.mode().visible {
        send(FaceEvent::VisibilityChanged(false));
        send(FaceEvent::VisibilityChanged(true));
    }
}

fn current_minute(clock: &SystemClock) -> i64 {
    clock.now_millis().div_euclid(60_000)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting orbit simulator");
    info!(
        "Display: {}×{} (scale {}×)",
        DISPLAY_SIZE_PX, DISPLAY_SIZE_PX, WINDOW_SCALE
    );
    info!("Keys: A=Ambient  V=Visible  M=Mute  Z=Zone  H=24h  1/2/3=Outlines  B/C/T=Colors  Q=Quit");

    let size = Size::new(DISPLAY_SIZE_PX, DISPLAY_SIZE_PX);
    let mut display = SimulatorDisplay::<Rgb565>::new(size);
    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("Orbit Simulator", &output_settings);

    let mut prefs = ConfigSnapshot::default();
    let mut store = StoredConfig::new();
    if let Err(e) = store.write(&prefs) {
        warn!("Could not store default preferences: {}", e);
    }

    let mut face: SimulatorFace = WatchFace::new(
        FrameBuffer::new(size),
        SystemClock::new(),
        store,
        DeadlineScheduler::default(),
        ZoneSubscription::default(),
    );

    // Surface created, then shown
    send(FaceEvent::Resized {
        width: DISPLAY_SIZE_PX as i32,
        height: DISPLAY_SIZE_PX as i32,
    });
    send(FaceEvent::VisibilityChanged(true));

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    let _ = display.clear(TRUE_BLACK);
    window.update(&display);

    let receiver = face_event_receiver();
    let mut last_minute = current_minute(face.clock_mut());

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    'running: loop {
        let frame_start = Instant::now();

        // --- SDL events ---------------------------------------------------
        for event in window.events() {
            match event {
                SimulatorEvent::Quit => send(FaceEvent::Teardown),

                SimulatorEvent::KeyDown { keycode, .. } => match keycode {
                    Keycode::Q | Keycode::Escape => send(FaceEvent::Teardown),
                    Keycode::A => send(FaceEvent::AmbientChanged(!face.mode().is_ambient())),
                    Keycode::V => send(FaceEvent::VisibilityChanged(!face.mode().visible)),
                    Keycode::M => send(FaceEvent::InterruptionFilterChanged {
                        muted: !face.mode().muted,
                    }),
                    Keycode::Z => {
                        face.clock_mut().shift_zone();
                        if face.watcher().active {
                            send(FaceEvent::TimeZoneChanged);
                        }
                    }
                    other => {
                        if edit_preferences(other, &mut prefs) {
                            apply_preferences(&mut face, &prefs);
                        }
                    }
                },

                SimulatorEvent::MouseButtonDown { .. } => send(FaceEvent::Tap(TapKind::Touch)),
                SimulatorEvent::MouseButtonUp { .. } => send(FaceEvent::Tap(TapKind::Tap)),

                _ => {}
            }
        }

        // --- Timers -------------------------------------------------------
        face.scheduler_mut().post_due(Instant::now(), |handle| {
            face_event_sender()
                .try_send(FaceEvent::RedrawTick(handle))
                .is_ok()
        });

        let minute = current_minute(face.clock_mut());
        if minute != last_minute {
            last_minute = minute;
            send(FaceEvent::TimeTick);
        }

        // --- Face queue ---------------------------------------------------
        while let Ok(event) = receiver.try_receive() {
            if !face.process_event(event) {
                break 'running;
            }
        }

        // --- Present ------------------------------------------------------
        let _ = face.display_mut().flush(&mut display);
        window.update(&display);

        // --- Frame pacing -------------------------------------------------
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    info!("Simulator exiting after {} frames", face.render_count());
}
