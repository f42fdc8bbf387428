//! Daily attendance record synthesis.
//!
//! This is the top-level entry point of the engine. It consumes the calendar
//! state, the schedule, the day's punches and the leave snapshot for one
//! (employee, assignment, date) key and produces exactly one record plus the
//! audit trail that explains it. The computation is pure: the same input
//! always yields an equal [`AttendanceResolution`].

use chrono::{NaiveDate, NaiveTime};

use super::{
    adjust_schedule, calculate_lateness, calculate_overtime, calculate_worked_time,
    derive_outcome, resolve_leave,
};
use crate::models::{
    Assignment, AttendanceResolution, AuditStep, DailyAttendanceRecord, DayState, LeaveSnapshot,
    OutcomeCode, Punch, PunchKind, Schedule,
};

const PUNCH_TIME_FORMAT: &str = "%H:%M:%S";

/// Everything the engine needs to resolve one assignment on one date.
#[derive(Debug, Clone, Copy)]
pub struct AttendanceInput<'a> {
    /// The date being resolved.
    pub date: NaiveDate,
    /// The calendar classification of the date.
    pub day_state: DayState,
    /// The assignment the record belongs to.
    pub assignment: &'a Assignment,
    /// The assignment's nominal schedule.
    pub schedule: &'a Schedule,
    /// The employee's punches on the date, in any order.
    pub punches: &'a [Punch],
    /// Leave data filtered for this assignment and date.
    pub leaves: &'a LeaveSnapshot,
}

struct PunchSelection {
    first_punch: Option<NaiveTime>,
    check_in: Option<NaiveTime>,
    check_out: Option<NaiveTime>,
    audit_step: AuditStep,
}

/// Resolves one day into its canonical record.
///
/// The state machine runs in this order:
///
/// 1. A governing leave writes its code, zeroes every metric and stops.
/// 2. A day that is not a working day only reports its punches.
/// 3. A working day without punches is absent (`F`).
/// 4. Otherwise arrival is the earliest entry-tagged punch and departure the
///    latest exit-tagged punch, measured against the nursing-adjusted
///    schedule for lateness, overtime, worked time and the outcome code.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::{calculate_daily_attendance, AttendanceInput};
/// use attendance_engine::models::{
///     Assignment, DayState, LeaveSnapshot, OutcomeCode, Punch, PunchKind, Schedule,
/// };
/// use chrono::{NaiveDate, NaiveTime};
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
/// let assignment = Assignment { id: 10, employee_id: 1, start_date: date, end_date: None };
/// let schedule = Schedule {
///     expected_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
///     expected_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
///     tolerance_minutes: 10,
/// };
/// let punches = vec![
///     Punch::new(1, date.and_hms_opt(8, 2, 0).unwrap(), PunchKind::Entry),
///     Punch::new(1, date.and_hms_opt(17, 5, 0).unwrap(), PunchKind::Exit),
/// ];
/// let leaves = LeaveSnapshot::default();
///
/// let resolution = calculate_daily_attendance(&AttendanceInput {
///     date,
///     day_state: DayState::Working,
///     assignment: &assignment,
///     schedule: &schedule,
///     punches: &punches,
///     leaves: &leaves,
/// });
///
/// assert_eq!(resolution.record.observation, OutcomeCode::Late(2));
/// assert_eq!(resolution.record.worked_minutes, 543);
/// ```
pub fn calculate_daily_attendance(input: &AttendanceInput<'_>) -> AttendanceResolution {
    let mut audit_trace: Vec<AuditStep> = Vec::new();
    let mut step_number: u32 = 1;

    let mut punches: Vec<&Punch> = input.punches.iter().collect();
    punches.sort_by_key(|punch| punch.time_of_day);

    let mut record = DailyAttendanceRecord::new(
        input.assignment.id,
        input.date,
        input.day_state.is_working(),
    );
    record.punch_count = punches.len() as u32;
    record.punch_times = punches
        .iter()
        .map(|punch| punch.time_of_day.format(PUNCH_TIME_FORMAT).to_string())
        .collect::<Vec<_>>()
        .join(",");
    if let Some(nursing) = &input.leaves.nursing {
        record.nursing_minutes = nursing.daily_minutes;
        record.nursing_mode = Some(nursing.mode);
    }

    // Leave precedence
    let leave = resolve_leave(
        input.leaves,
        input.assignment.id,
        input.day_state,
        step_number,
    );
    audit_trace.push(leave.audit_step.clone());
    step_number += 1;

    if let Some(code) = leave.outcome.outcome_code() {
        record.set_outcome(code);
        return AttendanceResolution {
            record,
            audit_trace,
        };
    }

    if !input.day_state.is_working() {
        audit_trace.push(AuditStep {
            step_number,
            rule_id: "non_working_day".to_string(),
            rule_name: "Non-working Day".to_string(),
            input: serde_json::json!({
                "day_state": input.day_state,
                "punch_count": record.punch_count
            }),
            output: serde_json::json!({
                "punch_times": record.punch_times
            }),
            reasoning: format!(
                "Day is {}, only the {} punches are reported",
                input.day_state, record.punch_count
            ),
        });
        return AttendanceResolution {
            record,
            audit_trace,
        };
    }

    if punches.is_empty() {
        record.set_outcome(OutcomeCode::Absent);
        audit_trace.push(AuditStep {
            step_number,
            rule_id: "absence".to_string(),
            rule_name: "Absence".to_string(),
            input: serde_json::json!({ "punch_count": 0 }),
            output: serde_json::json!({ "code": record.observation }),
            reasoning: "Working day without punches".to_string(),
        });
        return AttendanceResolution {
            record,
            audit_trace,
        };
    }

    // Schedule adjustment
    let adjusted = adjust_schedule(input.schedule, leave.nursing.as_ref(), step_number);
    audit_trace.push(adjusted.audit_step);
    step_number += 1;

    // Arrival and departure selection
    let selection = select_punches(&punches, step_number);
    audit_trace.push(selection.audit_step);
    step_number += 1;
    record.check_in = selection.check_in;
    record.check_out = selection.check_out;

    // Lateness
    let lateness = calculate_lateness(
        selection.check_in,
        selection.first_punch,
        adjusted.adjusted_start,
        input.schedule.tolerance_minutes,
        step_number,
    );
    record.minutes_late_within_tolerance = lateness.minutes_late_within_tolerance;
    record.minutes_late_beyond_tolerance = lateness.minutes_late_beyond_tolerance;
    audit_trace.push(lateness.audit_step);
    step_number += 1;

    // Overtime
    let overtime = calculate_overtime(
        selection.check_in,
        selection.check_out,
        adjusted.adjusted_end,
        step_number,
    );
    record.overtime_minutes = overtime.overtime_minutes;
    audit_trace.push(overtime.audit_step);
    step_number += 1;

    // Worked time
    let worked = calculate_worked_time(selection.check_in, selection.check_out, step_number);
    record.worked_minutes = worked.worked_minutes;
    record.worked_hours = worked.worked_hours;
    audit_trace.push(worked.audit_step);
    step_number += 1;

    // Outcome code
    let outcome = derive_outcome(
        selection.check_in.is_some(),
        selection.check_out.is_some(),
        record.minutes_late_within_tolerance,
        record.minutes_late_beyond_tolerance,
        step_number,
    );
    record.set_outcome(outcome.code);
    audit_trace.push(outcome.audit_step);

    AttendanceResolution {
        record,
        audit_trace,
    }
}

/// Picks arrival and departure from punches sorted by time of day.
fn select_punches(punches: &[&Punch], step_number: u32) -> PunchSelection {
    let first_punch = punches.first().map(|punch| punch.time_of_day);
    let last_punch = if punches.len() >= 2 {
        punches.last().map(|punch| punch.time_of_day)
    } else {
        None
    };

    let check_in = punches
        .iter()
        .filter(|punch| punch.kind == PunchKind::Entry)
        .map(|punch| punch.time_of_day)
        .min();
    let check_out = punches
        .iter()
        .filter(|punch| punch.kind == PunchKind::Exit)
        .map(|punch| punch.time_of_day)
        .max();

    let entries = punches
        .iter()
        .filter(|punch| punch.kind == PunchKind::Entry)
        .count();
    let exits = punches
        .iter()
        .filter(|punch| punch.kind == PunchKind::Exit)
        .count();

    let audit_step = AuditStep {
        step_number,
        rule_id: "punch_selection".to_string(),
        rule_name: "Arrival and Departure Selection".to_string(),
        input: serde_json::json!({
            "punch_count": punches.len(),
            "entry_punches": entries,
            "exit_punches": exits
        }),
        output: serde_json::json!({
            "first_punch": first_punch.map(|t| t.to_string()),
            "last_punch": last_punch.map(|t| t.to_string()),
            "check_in": check_in.map(|t| t.to_string()),
            "check_out": check_out.map(|t| t.to_string())
        }),
        reasoning: format!(
            "{} entry and {} exit punches among {}; earliest entry is arrival, latest exit is departure",
            entries,
            exits,
            punches.len()
        ),
    };

    PunchSelection {
        first_punch,
        check_in,
        check_out,
        audit_step,
    }
}
