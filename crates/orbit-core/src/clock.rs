//! Wall-clock readings and the clock capability
//!
//! A [`ClockReading`] is derived fresh for every frame from epoch milliseconds
//! and the clock's current UTC offset. Nothing holds on to a reading between
//! frames.

use core::fmt::Write;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike, Utc};

/// Short weekday names, Monday first.
const WEEKDAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Short month names, January first.
const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Formatted date label, e.g. `Sat, Oct 17`.
pub type DateLabel = heapless::String<16>;

/// Source of wall-clock time.
///
/// `resync_time_zone` is called when the face becomes visible and when the
/// platform reports a time-zone change; implementations pick up the system
/// offset there and keep it until the next resync.
pub trait ClockSource {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;

    /// Offset applied to [`now_millis`](Self::now_millis) for local time.
    fn time_zone(&self) -> FixedOffset;

    /// Re-read the system time zone.
    fn resync_time_zone(&mut self);
}

/// Broadcast subscription for time-zone change notifications.
///
/// While subscribed, the platform delivers changes through
/// [`WatchFace::on_time_zone_changed`](crate::watch_face::WatchFace::on_time_zone_changed).
pub trait TimeZoneWatcher {
    fn subscribe(&mut self);
    fn unsubscribe(&mut self);
}

/// Local time broken into the fields the face displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    /// Hour of day, 0-23
    pub hour24: u8,
    /// Hour on a 12-hour dial, 0-11 (noon and midnight are 0)
    pub hour12: u8,
    /// 0-59
    pub minute: u8,
    /// 0-59
    pub second: u8,
    /// Milliseconds into the current second, 0-999
    pub millis: u16,
    pub date: NaiveDate,
}

impl ClockReading {
    /// Break `epoch_millis` into local fields using `offset`.
    ///
    /// Timestamps chrono cannot represent read as the Unix epoch.
    pub fn from_epoch_millis(epoch_millis: i64, offset: FixedOffset) -> Self {
        let utc = DateTime::<Utc>::from_timestamp_millis(epoch_millis).unwrap_or_default();
        let local = utc.with_timezone(&offset);

        Self {
            hour24: local.hour() as u8,
            hour12: (local.hour() % 12) as u8,
            minute: local.minute() as u8,
            second: local.second() as u8,
            // Leap seconds report 1000+ here
            millis: local.timestamp_subsec_millis().min(999) as u16,
            date: local.date_naive(),
        }
    }

    /// Seconds including the fractional part, e.g. `30.25`.
    pub fn fractional_second(&self) -> f32 {
        self.second as f32 + self.millis as f32 / 1000.0
    }

    /// Hour as shown on the hour satellite.
    ///
    /// On a 12-hour dial 0 is shown as 12.
    pub fn hour_label(&self, use_24_hour_clock: bool) -> u8 {
        if use_24_hour_clock {
            self.hour24
        } else if self.hour12 == 0 {
            12
        } else {
            self.hour12
        }
    }

    /// Date formatted as `EEE, MMM d`.
    pub fn date_label(&self) -> DateLabel {
        let mut label = DateLabel::new();
        // Longest output is "Wed, Sep 30", well inside capacity
        write!(
            label,
            "{}, {} {}",
            WEEKDAY_NAMES[self.date.weekday().num_days_from_monday() as usize],
            MONTH_NAMES[self.date.month0() as usize],
            self.date.day()
        )
        .ok();
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2026-10-17 14:07:30.250 UTC
    const SAMPLE_MS: i64 = 1_792_246_050_250;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_reading_fields() {
        let reading = ClockReading::from_epoch_millis(SAMPLE_MS, utc());
        assert_eq!(reading.hour24, 14);
        assert_eq!(reading.hour12, 2);
        assert_eq!(reading.minute, 7);
        assert_eq!(reading.second, 30);
        assert_eq!(reading.millis, 250);
        assert_eq!(reading.date, NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
        assert_eq!(reading.fractional_second(), 30.25);
    }

    #[test]
    fn test_offset_shifts_hour_and_date() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let reading = ClockReading::from_epoch_millis(SAMPLE_MS, tokyo);
        assert_eq!(reading.hour24, 23);
        assert_eq!(reading.minute, 7);

        let honolulu = FixedOffset::west_opt(10 * 3600).unwrap();
        let reading = ClockReading::from_epoch_millis(SAMPLE_MS, honolulu);
        assert_eq!(reading.hour24, 4);
    }

    #[test]
    fn test_twelve_hour_label_never_zero() {
        // Midnight and noon UTC on 2026-10-17
        let midnight = ClockReading::from_epoch_millis(1_792_195_200_000, utc());
        let noon = ClockReading::from_epoch_millis(1_792_238_400_000, utc());

        assert_eq!(midnight.hour12, 0);
        assert_eq!(midnight.hour_label(false), 12);
        assert_eq!(midnight.hour_label(true), 0);
        assert_eq!(noon.hour_label(false), 12);
        assert_eq!(noon.hour_label(true), 12);
    }

    #[test]
    fn test_twelve_hour_label_in_range() {
        for hour in 0..24i64 {
            let ms = 1_792_195_200_000 + hour * 3_600_000;
            let label = ClockReading::from_epoch_millis(ms, utc()).hour_label(false);
            assert!((1..=12).contains(&label), "hour {} labelled {}", hour, label);
        }
    }

    #[test]
    fn test_date_label_format() {
        let reading = ClockReading::from_epoch_millis(SAMPLE_MS, utc());
        assert_eq!(reading.date_label().as_str(), "Sat, Oct 17");
    }

    #[test]
    fn test_unrepresentable_timestamp_reads_epoch() {
        let reading = ClockReading::from_epoch_millis(i64::MAX, utc());
        assert_eq!(reading.date, NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        assert_eq!(reading.hour24, 0);
        assert_eq!(reading.date_label().as_str(), "Thu, Jan 1");
    }
}
