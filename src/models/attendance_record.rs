//! Daily attendance record and audit trail models.
//!
//! This module contains the [`DailyAttendanceRecord`], the engine's only
//! authoritative output, and the [`AuditStep`]/[`AttendanceResolution`] types
//! that document how a record was derived.

use chrono::{Datelike, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{NursingMode, OutcomeCode};

/// The canonical attendance result for one assignment on one date.
///
/// At most one record exists per (`assignment_id`, `date`). Recomputing from
/// the same inputs yields a structurally equal record, so `==` is the
/// idempotence check.
///
/// # Example
///
/// ```
/// use attendance_engine::models::{DailyAttendanceRecord, OutcomeCode};
/// use chrono::NaiveDate;
///
/// let record = DailyAttendanceRecord::new(42, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(), true);
/// assert_eq!(record.year, 2025);
/// assert_eq!(record.month, 3);
/// assert_eq!(record.observation, OutcomeCode::Unset);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAttendanceRecord {
    /// The assignment the record belongs to.
    pub assignment_id: u64,
    /// The date the record covers.
    pub date: NaiveDate,
    /// Calendar year of `date`.
    pub year: i32,
    /// Calendar month of `date` (1-12).
    pub month: u32,
    /// Accepted arrival time.
    pub check_in: Option<NaiveTime>,
    /// Accepted departure time.
    pub check_out: Option<NaiveTime>,
    /// Number of punches recorded on the date.
    pub punch_count: u32,
    /// All punch times of the date, sorted, comma separated.
    pub punch_times: String,
    /// Late minutes below the tolerance.
    pub minutes_late_within_tolerance: u32,
    /// Late minutes at or above the tolerance.
    pub minutes_late_beyond_tolerance: u32,
    /// Observation code.
    pub observation: OutcomeCode,
    /// Final code; always equal to the observation when computed.
    pub final_code: OutcomeCode,
    /// Daily nursing minutes in effect.
    pub nursing_minutes: u32,
    /// Nursing mode in effect.
    pub nursing_mode: Option<NursingMode>,
    /// Whole minutes between arrival and departure.
    pub worked_minutes: u32,
    /// `worked_minutes / 60`, rounded to two decimals.
    pub worked_hours: Decimal,
    /// Whole minutes worked past the adjusted end.
    pub overtime_minutes: u32,
    /// True when the calendar marks the date as a workday.
    pub is_working_day: bool,
}

impl DailyAttendanceRecord {
    /// Creates an empty record for the key with every metric zeroed.
    pub fn new(assignment_id: u64, date: NaiveDate, is_working_day: bool) -> Self {
        Self {
            assignment_id,
            date,
            year: date.year(),
            month: date.month(),
            check_in: None,
            check_out: None,
            punch_count: 0,
            punch_times: String::new(),
            minutes_late_within_tolerance: 0,
            minutes_late_beyond_tolerance: 0,
            observation: OutcomeCode::Unset,
            final_code: OutcomeCode::Unset,
            nursing_minutes: 0,
            nursing_mode: None,
            worked_minutes: 0,
            worked_hours: Decimal::ZERO,
            overtime_minutes: 0,
            is_working_day,
        }
    }

    /// Sets observation and final code together.
    pub fn set_outcome(&mut self, code: OutcomeCode) {
        self.observation = code.clone();
        self.final_code = code;
    }

    /// The unique key the record is stored under.
    pub fn key(&self) -> (u64, NaiveDate) {
        (self.assignment_id, self.date)
    }
}

/// A single step in the audit trail recording a resolution decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The record for one key plus the audit trail that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceResolution {
    /// The authoritative record.
    pub record: DailyAttendanceRecord,
    /// Ordered audit steps.
    pub audit_trace: Vec<AuditStep>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> DailyAttendanceRecord {
        DailyAttendanceRecord::new(9, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(), true)
    }

    #[test]
    fn test_new_record_derives_year_and_month() {
        let record = sample_record();
        assert_eq!(record.year, 2025);
        assert_eq!(record.month, 12);
        assert_eq!(record.worked_hours, Decimal::ZERO);
        assert!(record.is_working_day);
    }

    #[test]
    fn test_set_outcome_sets_both_codes() {
        let mut record = sample_record();
        record.set_outcome(OutcomeCode::Late(4));
        assert_eq!(record.observation, OutcomeCode::Late(4));
        assert_eq!(record.final_code, OutcomeCode::Late(4));
    }

    #[test]
    fn test_key_is_assignment_and_date() {
        let record = sample_record();
        assert_eq!(
            record.key(),
            (9, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap())
        );
    }

    #[test]
    fn test_record_serialization_uses_tokens() {
        let mut record = sample_record();
        record.set_outcome(OutcomeCode::MissingExit);
        record.worked_hours = Decimal::new(905, 2);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["observation"], "FS");
        assert_eq!(json["final_code"], "FS");
        assert_eq!(json["worked_hours"], "9.05");

        let back: DailyAttendanceRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_leave_record_with_reserved_abbreviation_round_trips() {
        let mut record = sample_record();
        record.set_outcome(OutcomeCode::leave("A"));

        let json = serde_json::to_string(&record).unwrap();
        let back: DailyAttendanceRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(back, record);
        assert_eq!(back.observation.to_string(), "A");
    }
}
