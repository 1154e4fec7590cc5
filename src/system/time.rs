//! Time keeping for the watch face

use chrono::{NaiveDateTime, Timelike};

/// Wall-clock snapshot taken once per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockTime {
    /// Hour of the day (0–23)
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millisecond: u16,
}

impl ClockTime {
    pub fn new(hour: u8, minute: u8, second: u8, millisecond: u16) -> Self {
        Self {
            hour: hour % 24,
            minute: minute % 60,
            second: second % 60,
            millisecond: millisecond % 1_000,
        }
    }

    pub fn from_datetime(time: &NaiveDateTime) -> Self {
        // Leap seconds are reported as nanosecond values above 1e9
        let millisecond = (time.nanosecond() / 1_000_000).min(999) as u16;
        Self::new(
            time.hour() as u8,
            time.minute() as u8,
            time.second() as u8,
            millisecond,
        )
    }

    /// Hour on a 12-hour dial (0–11)
    pub fn hour12(&self) -> u8 {
        self.hour % 12
    }

    /// Hour as shown on a 12-hour label (1–12)
    pub fn display_hour(&self) -> u8 {
        match self.hour12() {
            0 => 12,
            h => h,
        }
    }

    /// Whole seconds since midnight
    pub fn seconds_of_day(&self) -> i32 {
        self.hour as i32 * 3_600 + self.minute as i32 * 60 + self.second as i32
    }

    /// Snowflake animation counter, seconds of the day divided by `seconds_per_tick`.
    pub fn tick_count(&self, seconds_per_tick: i32) -> i32 {
        self.seconds_of_day() / seconds_per_tick.max(1)
    }

    /// Hour hand rotation in degrees clockwise from 12 o'clock
    pub fn hour_rotation(&self) -> f32 {
        self.hour12() as f32 * 30.0 + self.minute as f32 / 2.0
    }

    /// Minute hand rotation in degrees
    pub fn minute_rotation(&self) -> f32 {
        self.minute as f32 * 6.0
    }

    /// Second hand rotation in degrees, sweeping with the milliseconds
    pub fn second_rotation(&self) -> f32 {
        (self.second as f32 + self.millisecond as f32 / 1_000.0) * 6.0
    }
}

/// Milliseconds since the Unix epoch, used to align redraws to round boundaries.
pub fn epoch_millis(time: &NaiveDateTime) -> i64 {
    time.and_utc().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, TimeDelta};

    fn at(h: u32, m: u32, s: u32, ms: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 3)
            .unwrap()
            .and_hms_milli_opt(h, m, s, ms)
            .unwrap()
    }

    #[test]
    fn snapshot_from_datetime() {
        let time = ClockTime::from_datetime(&at(17, 42, 9, 250));
        assert_eq!(time, ClockTime::new(17, 42, 9, 250));
        assert_eq!(time.hour12(), 5);
        assert_eq!(time.display_hour(), 5);
    }

    #[test]
    fn midnight_and_noon_show_twelve() {
        assert_eq!(ClockTime::new(0, 5, 0, 0).display_hour(), 12);
        assert_eq!(ClockTime::new(12, 5, 0, 0).display_hour(), 12);
    }

    #[test]
    fn tick_count_divides_seconds_of_day() {
        assert_eq!(ClockTime::new(0, 0, 13, 999).tick_count(14), 0);
        assert_eq!(ClockTime::new(0, 0, 14, 0).tick_count(14), 1);
        // 23:59:59 is the last tick of the day
        assert_eq!(ClockTime::new(23, 59, 59, 0).tick_count(14), 86_399 / 14);
    }

    #[test]
    fn hand_rotations() {
        let time = ClockTime::new(15, 30, 15, 500);
        assert_eq!(time.hour_rotation(), 3.0 * 30.0 + 15.0);
        assert_eq!(time.minute_rotation(), 180.0);
        assert_eq!(time.second_rotation(), 93.0);
    }

    #[test]
    fn epoch_millis_counts_from_unix_epoch() {
        let epoch = DateTime::UNIX_EPOCH.naive_utc() + TimeDelta::milliseconds(1_234);
        assert_eq!(epoch_millis(&epoch), 1_234);
    }
}
