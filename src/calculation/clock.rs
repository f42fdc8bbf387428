//! Time-of-day arithmetic shared by the resolution rules.
//!
//! All schedule times are wall-clock values without a date, so shifting and
//! differencing wrap at midnight.

use chrono::{NaiveTime, TimeDelta};

const SECONDS_PER_DAY: i64 = 86_400;

/// Shifts a time of day by a signed number of minutes, wrapping at midnight.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::shift_minutes;
/// use chrono::NaiveTime;
///
/// let t = NaiveTime::from_hms_opt(23, 50, 0).unwrap();
/// assert_eq!(shift_minutes(t, 20), NaiveTime::from_hms_opt(0, 10, 0).unwrap());
/// assert_eq!(shift_minutes(t, -50), NaiveTime::from_hms_opt(23, 0, 0).unwrap());
/// ```
pub fn shift_minutes(time: NaiveTime, minutes: i64) -> NaiveTime {
    time.overflowing_add_signed(TimeDelta::minutes(minutes)).0
}

/// Whole minutes from `from` forward to `to` on a 24-hour clock.
///
/// Seconds are truncated. When `to` is earlier than `from` the difference
/// wraps past midnight, so the result is always in `0..1440`.
pub fn elapsed_minutes(from: NaiveTime, to: NaiveTime) -> u32 {
    let seconds = (to - from).num_seconds().rem_euclid(SECONDS_PER_DAY);
    (seconds / 60) as u32
}

/// Signed whole minutes from `from` to `to`, floored toward negative infinity.
pub fn signed_minutes(from: NaiveTime, to: NaiveTime) -> i64 {
    (to - from).num_seconds().div_euclid(60)
}
