//! Real-time punch classification.
//!
//! Labels a single punch as entry, exit or intermediate as it arrives from a
//! device. The label is advisory metadata; the daily calculation picks its
//! own arrival and departure from the tagged punches.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::clock::shift_minutes;
use super::schedule_adjustment::adjust_schedule;
use crate::models::{AuditStep, NursingMode, NursingSchedule, PunchClass, Schedule};

/// The result of classifying one punch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchClassification {
    /// The label assigned to the punch.
    pub classification: PunchClass,
    /// Punches strictly before this time are entries.
    pub entry_limit: NaiveTime,
    /// Punches at or after this time are exits.
    pub adjusted_end: NaiveTime,
    /// The audit step recording this classification.
    pub audit_step: AuditStep,
}

/// Classifies a punch against a schedule and optional nursing schedule.
///
/// The entry limit is the nominal expected start plus the tolerance, plus the
/// nursing minutes when nursing is taken at the start of the shift. The exit
/// threshold is the expected end after nursing adjustment.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::classify_punch;
/// use attendance_engine::models::{PunchClass, Schedule};
/// use chrono::NaiveTime;
///
/// let schedule = Schedule {
///     expected_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
///     expected_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
///     tolerance_minutes: 10,
/// };
///
/// let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// assert_eq!(classify_punch(at(8, 9), &schedule, None, 1).classification, PunchClass::Entry);
/// assert_eq!(classify_punch(at(12, 0), &schedule, None, 1).classification, PunchClass::Intermediate);
/// assert_eq!(classify_punch(at(17, 0), &schedule, None, 1).classification, PunchClass::Exit);
/// ```
pub fn classify_punch(
    time_of_day: NaiveTime,
    schedule: &Schedule,
    nursing: Option<&NursingSchedule>,
    step_number: u32,
) -> PunchClassification {
    let nursing_start_minutes = match nursing {
        Some(n) if n.mode == NursingMode::ShiftStart => n.daily_minutes,
        _ => 0,
    };
    let total_tolerance = schedule.tolerance_minutes + nursing_start_minutes;
    let entry_limit = shift_minutes(schedule.expected_start, i64::from(total_tolerance));
    let adjusted_end = adjust_schedule(schedule, nursing, step_number).adjusted_end;

    let (classification, reasoning) = if time_of_day < entry_limit {
        (
            PunchClass::Entry,
            format!("{} is before entry limit {}", time_of_day, entry_limit),
        )
    } else if time_of_day >= adjusted_end {
        (
            PunchClass::Exit,
            format!("{} is at or after end {}", time_of_day, adjusted_end),
        )
    } else {
        (
            PunchClass::Intermediate,
            format!(
                "{} falls between entry limit {} and end {}",
                time_of_day, entry_limit, adjusted_end
            ),
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "punch_classification".to_string(),
        rule_name: "Real-time Punch Classification".to_string(),
        input: serde_json::json!({
            "time_of_day": time_of_day.to_string(),
            "expected_start": schedule.expected_start.to_string(),
            "expected_end": schedule.expected_end.to_string(),
            "tolerance_minutes": schedule.tolerance_minutes,
            "nursing_mode": nursing.map(|n| n.mode),
            "nursing_minutes": nursing.map(|n| n.daily_minutes).unwrap_or(0)
        }),
        output: serde_json::json!({
            "classification": classification,
            "total_tolerance": total_tolerance,
            "entry_limit": entry_limit.to_string(),
            "adjusted_end": adjusted_end.to_string()
        }),
        reasoning,
    };

    PunchClassification {
        classification,
        entry_limit,
        adjusted_end,
        audit_step,
    }
}
