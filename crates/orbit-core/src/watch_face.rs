//! Watch face engine: display-mode state machine and frame driver
//!
//! [`WatchFace`] owns the drawing target and every injected capability, and
//! exposes one method per platform notification. All of them run on a single
//! cooperative queue: either called directly by the host or fed through
//! [`FACE_EVENTS`] and drained by [`WatchFace::run`].
//!
//! Each transition follows the same order: update the mode, re-resolve the
//! style, render if something visible changed, then re-arm the redraw tick.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embedded_graphics::prelude::*;
use log::{debug, error, info};

use crate::clock::{ClockReading, ClockSource, TimeZoneWatcher};
use crate::config::{ConfigSnapshot, ConfigSource};
use crate::framebuffer::Surface;
use crate::geometry::{ScreenGeometry, compute_satellites};
use crate::mode::{DisplayMode, Fidelity};
use crate::render::render;
use crate::scheduler::{RedrawScheduler, Scheduler, TickHandle};
use crate::styling::StyleState;

/// Capacity of the face event queue
pub const FACE_EVENT_CAPACITY: usize = 8;

/// Kind of touch the platform reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapKind {
    /// Finger down
    Touch,
    /// Gesture turned into something else
    TouchCancel,
    /// Completed tap
    Tap,
}

/// Platform notifications, in queue form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceEvent {
    Resized { width: i32, height: i32 },
    AmbientChanged(bool),
    VisibilityChanged(bool),
    InterruptionFilterChanged { muted: bool },
    TimeZoneChanged,
    /// Once-a-minute platform tick
    TimeTick,
    Tap(TapKind),
    /// A tick posted through the [`Scheduler`] fired
    RedrawTick(TickHandle),
    /// Surface destroyed; stops [`WatchFace::run`]
    Teardown,
}

/// Global queue for face events
pub static FACE_EVENTS: Channel<CriticalSectionRawMutex, FaceEvent, FACE_EVENT_CAPACITY> =
    Channel::new();

/// Helper to get a face event sender
pub fn face_event_sender()
-> Sender<'static, CriticalSectionRawMutex, FaceEvent, FACE_EVENT_CAPACITY> {
    FACE_EVENTS.sender()
}

/// Helper to get a face event receiver
pub fn face_event_receiver()
-> Receiver<'static, CriticalSectionRawMutex, FaceEvent, FACE_EVENT_CAPACITY> {
    FACE_EVENTS.receiver()
}

/// The rendering and timing engine.
///
/// - `D`: drawing surface, resized along with the platform surface
/// - `C`: wall clock
/// - `F`: preference source
/// - `S`: deferred tick scheduler
/// - `W`: time-zone change subscription
pub struct WatchFace<D, C, F, S, W>
where
    D: Surface,
    C: ClockSource,
    F: ConfigSource,
    S: Scheduler,
    W: TimeZoneWatcher,
{
    display: D,
    clock: C,
    config_source: F,
    scheduler: S,
    watcher: W,
    config: ConfigSnapshot,
    mode: DisplayMode,
    style: StyleState,
    geometry: ScreenGeometry,
    redraw: RedrawScheduler,
    watching_time_zone: bool,
    frames_rendered: u32,
}

impl<D, C, F, S, W> WatchFace<D, C, F, S, W>
where
    D: Surface,
    D::Error: core::fmt::Debug,
    C: ClockSource,
    F: ConfigSource,
    S: Scheduler,
    W: TimeZoneWatcher,
{
    /// Create the engine in the interactive, hidden state.
    ///
    /// Preferences are read once here; geometry stays zero until the first
    /// [`on_resize`](Self::on_resize).
    pub fn new(display: D, clock: C, mut config_source: F, scheduler: S, watcher: W) -> Self {
        let config = config_source.read();
        let mode = DisplayMode::default();
        info!("Watch face created: {:?}", config);

        Self {
            display,
            clock,
            config_source,
            scheduler,
            watcher,
            config,
            mode,
            style: StyleState::resolve(&config, &mode),
            geometry: ScreenGeometry::default(),
            redraw: RedrawScheduler::new(),
            watching_time_zone: false,
            frames_rendered: 0,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn style(&self) -> &StyleState {
        &self.style
    }

    pub fn geometry(&self) -> &ScreenGeometry {
        &self.geometry
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn config_source_mut(&mut self) -> &mut F {
        &mut self.config_source
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn watcher(&self) -> &W {
        &self.watcher
    }

    /// Handle of the outstanding redraw tick, if any.
    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.redraw.pending()
    }

    /// Number of frames drawn since creation.
    pub fn render_count(&self) -> u32 {
        self.frames_rendered
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    pub fn on_ambient_changed(&mut self, ambient: bool) {
        if self.mode.is_ambient() == ambient {
            return;
        }
        debug!("Ambient mode: {}", ambient);
        self.mode.fidelity = if ambient {
            Fidelity::Ambient
        } else {
            Fidelity::Interactive
        };
        self.restyle();
        self.invalidate();
        self.update_timer();
    }

    pub fn on_visibility_changed(&mut self, visible: bool) {
        if self.mode.visible == visible {
            return;
        }
        debug!("Visible: {}", visible);
        self.mode.visible = visible;

        if visible {
            self.config = self.config_source.read();
            self.restyle();
            self.register_time_zone_watcher();
            // The zone may have changed while hidden
            self.clock.resync_time_zone();
            self.invalidate();
        } else {
            self.unregister_time_zone_watcher();
        }

        self.update_timer();
    }

    /// Mute mode dims the satellite labels. Scheduling is unaffected.
    pub fn on_interruption_filter_changed(&mut self, muted: bool) {
        if self.mode.muted == muted {
            return;
        }
        debug!("Muted: {}", muted);
        self.mode.muted = muted;
        self.style = self.style.with_muted(muted);
        self.invalidate();
    }

    pub fn on_time_zone_changed(&mut self) {
        if !self.watching_time_zone {
            debug!("Time zone change while unsubscribed, ignoring");
            return;
        }
        self.clock.resync_time_zone();
        debug!("Time zone resynced to {}", self.clock.time_zone());
        self.invalidate();
    }

    pub fn on_resize(&mut self, width: i32, height: i32) {
        let geometry = ScreenGeometry::from_size(width, height);
        if geometry == self.geometry {
            return;
        }
        debug!("Surface resized to {}x{}", width, height);
        self.display
            .resize(Size::new(width.max(0) as u32, height.max(0) as u32));
        self.geometry = geometry;
        self.invalidate();
    }

    /// Platform minute tick. Keeps ambient mode, which has no second tick,
    /// up to date.
    pub fn on_time_tick(&mut self) {
        self.invalidate();
    }

    pub fn on_tap(&mut self, kind: TapKind) {
        debug!("Tap: {:?}", kind);
        self.invalidate();
    }

    /// A tick posted by the redraw scheduler fired.
    ///
    /// Draws the frame and posts the next tick while the face should keep
    /// ticking. Superseded ticks are ignored.
    pub fn on_redraw_tick(&mut self, handle: TickHandle) {
        if !self.redraw.take_if_pending(handle) {
            return;
        }
        self.invalidate();
        self.update_timer();
    }

    /// Release the scheduler and time-zone subscription. Safe to call more
    /// than once.
    pub fn teardown(&mut self) {
        info!("Watch face teardown");
        self.redraw.cancel(&mut self.scheduler);
        self.unregister_time_zone_watcher();
    }

    /// Dispatch one queued event. Returns `false` once the face is torn down.
    pub fn process_event(&mut self, event: FaceEvent) -> bool {
        match event {
            FaceEvent::Resized { width, height } => self.on_resize(width, height),
            FaceEvent::AmbientChanged(ambient) => self.on_ambient_changed(ambient),
            FaceEvent::VisibilityChanged(visible) => self.on_visibility_changed(visible),
            FaceEvent::InterruptionFilterChanged { muted } => {
                self.on_interruption_filter_changed(muted)
            }
            FaceEvent::TimeZoneChanged => self.on_time_zone_changed(),
            FaceEvent::TimeTick => self.on_time_tick(),
            FaceEvent::Tap(kind) => self.on_tap(kind),
            FaceEvent::RedrawTick(handle) => self.on_redraw_tick(handle),
            FaceEvent::Teardown => {
                self.teardown();
                return false;
            }
        }
        true
    }

    /// Run the face until a [`FaceEvent::Teardown`] arrives.
    pub async fn run<const N: usize>(
        &mut self,
        receiver: Receiver<'_, CriticalSectionRawMutex, FaceEvent, N>,
    ) {
        info!("Watch face task started");
        loop {
            let event = receiver.receive().await;
            if !self.process_event(event) {
                break;
            }
        }
        info!("Watch face task stopped");
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn restyle(&mut self) {
        self.style = StyleState::resolve(&self.config, &self.mode);
    }

    fn update_timer(&mut self) {
        let now = self.clock.now_millis();
        self.redraw
            .rearm(&mut self.scheduler, now, self.mode.should_tick());
    }

    fn register_time_zone_watcher(&mut self) {
        if self.watching_time_zone {
            return;
        }
        self.watching_time_zone = true;
        self.watcher.subscribe();
    }

    fn unregister_time_zone_watcher(&mut self) {
        if !self.watching_time_zone {
            return;
        }
        self.watching_time_zone = false;
        self.watcher.unsubscribe();
    }

    /// Draw a frame now if the surface is showing.
    fn invalidate(&mut self) {
        if !self.mode.visible {
            return;
        }
        if let Err(e) = self.render_frame() {
            error!("Watch face render error: {:?}", e);
        }
    }

    fn render_frame(&mut self) -> Result<(), D::Error> {
        let reading =
            ClockReading::from_epoch_millis(self.clock.now_millis(), self.clock.time_zone());
        let satellites = compute_satellites(&reading, &self.geometry, &self.mode, &self.style);
        debug!(
            "Rendering {:02}:{:02}:{:02} ({} satellites)",
            reading.hour24,
            reading.minute,
            reading.second,
            satellites.len()
        );

        render(
            &mut self.display,
            &self.geometry,
            &self.style,
            &satellites,
            &reading.date_label(),
        )?;
        self.frames_rendered = self.frames_rendered.wrapping_add(1);
        Ok(())
    }
}
