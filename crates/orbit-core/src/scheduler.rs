//! Redraw scheduling
//!
//! The face redraws once per second while interactive and visible. Rather than
//! a fixed-period timer, each redraw posts exactly one deferred tick aimed at
//! the next whole-second boundary, so ticks stay aligned with the wall clock
//! instead of accumulating per-frame delay.
//!
//! The host owns the actual timer through the [`Scheduler`] capability and
//! delivers fired ticks back to the engine with the [`TickHandle`] it issued.

use embassy_time::Duration;
use log::debug;

/// Interactive redraw period
pub const INTERACTIVE_UPDATE_RATE_MS: i64 = 1000;

/// Token identifying one posted tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u32);

/// Single-shot deferred execution on the engine's event queue.
///
/// Cancelling a handle that already fired or was never issued must be a no-op.
pub trait Scheduler {
    fn post_delayed(&mut self, delay: Duration) -> TickHandle;
    fn cancel(&mut self, handle: TickHandle);
}

/// Delay from `now_ms` to the start of the next whole second.
///
/// Always in `1..=1000` ms; a clock sitting exactly on a boundary waits a full
/// second.
pub fn next_tick_delay(now_ms: i64) -> Duration {
    let into_second = now_ms.rem_euclid(INTERACTIVE_UPDATE_RATE_MS);
    Duration::from_millis((INTERACTIVE_UPDATE_RATE_MS - into_second) as u64)
}

/// Keeps at most one redraw tick outstanding.
#[derive(Debug, Default)]
pub struct RedrawScheduler {
    pending: Option<TickHandle>,
}

impl RedrawScheduler {
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Handle of the outstanding tick, if any.
    pub fn pending(&self) -> Option<TickHandle> {
        self.pending
    }

    /// Cancel any outstanding tick, then post a new one if `should_run`.
    pub fn rearm<S: Scheduler>(&mut self, scheduler: &mut S, now_ms: i64, should_run: bool) {
        self.cancel(scheduler);
        if should_run {
            let delay = next_tick_delay(now_ms);
            let handle = scheduler.post_delayed(delay);
            debug!("Redraw tick {:?} in {} ms", handle, delay.as_millis());
            self.pending = Some(handle);
        }
    }

    pub fn cancel<S: Scheduler>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel(handle);
        }
    }

    /// Claim a fired tick.
    ///
    /// Returns `false` for handles that were superseded or cancelled but
    /// still reached the queue; those must not trigger a redraw.
    pub fn take_if_pending(&mut self, handle: TickHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            debug!("Ignoring stale redraw tick {:?}", handle);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;
    use alloc::vec::Vec;

    #[derive(Default)]
    struct RecordingScheduler {
        next_id: u32,
        posted: Vec<(TickHandle, Duration)>,
        cancelled: Vec<TickHandle>,
    }

    impl Scheduler for RecordingScheduler {
        fn post_delayed(&mut self, delay: Duration) -> TickHandle {
            self.next_id += 1;
            let handle = TickHandle(self.next_id);
            self.posted.push((handle, delay));
            handle
        }

        fn cancel(&mut self, handle: TickHandle) {
            self.cancelled.push(handle);
        }
    }

    #[test]
    fn test_delay_lands_on_next_second() {
        assert_eq!(next_tick_delay(1500), Duration::from_millis(500));
        assert_eq!(next_tick_delay(1_792_246_050_250), Duration::from_millis(750));
        assert_eq!(next_tick_delay(999), Duration::from_millis(1));
    }

    #[test]
    fn test_delay_on_boundary_is_full_second() {
        assert_eq!(next_tick_delay(0), Duration::from_millis(1000));
        assert_eq!(next_tick_delay(42_000), Duration::from_millis(1000));
    }

    #[test]
    fn test_delay_before_epoch_still_aligns() {
        // -1500 ms is 500 ms past the -2 s boundary
        assert_eq!(next_tick_delay(-1500), Duration::from_millis(500));
    }

    #[test]
    fn test_rearm_keeps_single_tick() {
        let mut scheduler = RecordingScheduler::default();
        let mut redraw = RedrawScheduler::new();

        redraw.rearm(&mut scheduler, 1500, true);
        redraw.rearm(&mut scheduler, 1700, true);

        assert_eq!(scheduler.posted.len(), 2);
        assert_eq!(scheduler.cancelled, [TickHandle(1)]);
        assert_eq!(redraw.pending(), Some(TickHandle(2)));
        assert_eq!(scheduler.posted[1].1, Duration::from_millis(300));
    }

    #[test]
    fn test_rearm_when_stopped_only_cancels() {
        let mut scheduler = RecordingScheduler::default();
        let mut redraw = RedrawScheduler::new();

        redraw.rearm(&mut scheduler, 0, true);
        redraw.rearm(&mut scheduler, 0, false);

        assert_eq!(scheduler.posted.len(), 1);
        assert_eq!(scheduler.cancelled, [TickHandle(1)]);
        assert_eq!(redraw.pending(), None);

        // Nothing pending, nothing to cancel
        redraw.rearm(&mut scheduler, 0, false);
        assert_eq!(scheduler.cancelled.len(), 1);
    }

    #[test]
    fn test_stale_tick_is_rejected() {
        let mut scheduler = RecordingScheduler::default();
        let mut redraw = RedrawScheduler::new();

        redraw.rearm(&mut scheduler, 0, true);
        redraw.rearm(&mut scheduler, 0, true);

        assert!(!redraw.take_if_pending(TickHandle(1)));
        assert!(redraw.take_if_pending(TickHandle(2)));
        assert!(!redraw.take_if_pending(TickHandle(2)));
        assert_eq!(redraw.pending(), None);
    }
}
