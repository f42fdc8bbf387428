//! Schedule adjustment for nursing time.
//!
//! A nursing grant shortens the working day: in shift-start mode the expected
//! arrival moves later, in shift-end mode the expected departure moves
//! earlier.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::clock::shift_minutes;
use crate::models::{AuditStep, NursingMode, NursingSchedule, Schedule};

/// The adjusted work window for a day, with the audit step documenting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustedSchedule {
    /// Expected arrival after nursing time is applied.
    pub adjusted_start: NaiveTime,
    /// Expected departure after nursing time is applied.
    pub adjusted_end: NaiveTime,
    /// The audit step recording this adjustment.
    pub audit_step: AuditStep,
}

/// Applies an effective nursing schedule to a nominal schedule.
///
/// With no nursing schedule, or one granting zero minutes, the nominal window
/// is returned unchanged. An adjusted end earlier than the adjusted start is
/// passed through as-is.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::adjust_schedule;
/// use attendance_engine::models::{NursingMode, NursingSchedule, Schedule};
/// use chrono::{NaiveDate, NaiveTime};
///
/// let schedule = Schedule {
///     expected_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
///     expected_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
///     tolerance_minutes: 10,
/// };
/// let nursing = NursingSchedule {
///     grant_id: 1,
///     from_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
///     to_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
///     mode: NursingMode::ShiftStart,
///     daily_minutes: 30,
/// };
///
/// let adjusted = adjust_schedule(&schedule, Some(&nursing), 1);
/// assert_eq!(adjusted.adjusted_start, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
/// assert_eq!(adjusted.adjusted_end, NaiveTime::from_hms_opt(17, 0, 0).unwrap());
/// ```
pub fn adjust_schedule(
    schedule: &Schedule,
    nursing: Option<&NursingSchedule>,
    step_number: u32,
) -> AdjustedSchedule {
    let mut adjusted_start = schedule.expected_start;
    let mut adjusted_end = schedule.expected_end;

    let reasoning = match nursing {
        Some(n) if n.daily_minutes > 0 => match n.mode {
            NursingMode::ShiftStart => {
                adjusted_start = shift_minutes(adjusted_start, i64::from(n.daily_minutes));
                format!(
                    "Nursing time of {} minutes moves expected start from {} to {}",
                    n.daily_minutes, schedule.expected_start, adjusted_start
                )
            }
            NursingMode::ShiftEnd => {
                adjusted_end = shift_minutes(adjusted_end, -i64::from(n.daily_minutes));
                format!(
                    "Nursing time of {} minutes moves expected end from {} to {}",
                    n.daily_minutes, schedule.expected_end, adjusted_end
                )
            }
        },
        Some(_) => "Nursing schedule grants 0 minutes, schedule unchanged".to_string(),
        None => "No nursing schedule in effect, schedule unchanged".to_string(),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "schedule_adjustment".to_string(),
        rule_name: "Nursing Schedule Adjustment".to_string(),
        input: serde_json::json!({
            "expected_start": schedule.expected_start.to_string(),
            "expected_end": schedule.expected_end.to_string(),
            "nursing_mode": nursing.map(|n| n.mode),
            "nursing_minutes": nursing.map(|n| n.daily_minutes).unwrap_or(0)
        }),
        output: serde_json::json!({
            "adjusted_start": adjusted_start.to_string(),
            "adjusted_end": adjusted_end.to_string()
        }),
        reasoning,
    };

    AdjustedSchedule {
        adjusted_start,
        adjusted_end,
        audit_step,
    }
}
