//! Overtime and worked-time calculation.
//!
//! Overtime is counted from the adjusted end to the accepted departure, and
//! only when an arrival was also accepted. Worked time spans arrival to
//! departure on a 24-hour clock.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::clock::elapsed_minutes;
use crate::models::AuditStep;

/// The result of the overtime calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeResult {
    /// Whole minutes past the adjusted end.
    pub overtime_minutes: u32,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// The result of the worked-time calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkedTimeResult {
    /// Whole minutes between arrival and departure.
    pub worked_minutes: u32,
    /// Worked minutes as hours, rounded to two decimals.
    pub worked_hours: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates overtime past the adjusted end.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::calculate_overtime;
/// use chrono::NaiveTime;
///
/// let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
///
/// let result = calculate_overtime(Some(at(9, 10)), Some(at(18, 30)), at(17, 30), 1);
/// assert_eq!(result.overtime_minutes, 60);
///
/// // An exit without an accepted arrival never accrues overtime.
/// let result = calculate_overtime(None, Some(at(20, 0)), at(17, 30), 1);
/// assert_eq!(result.overtime_minutes, 0);
/// ```
pub fn calculate_overtime(
    check_in: Option<NaiveTime>,
    check_out: Option<NaiveTime>,
    adjusted_end: NaiveTime,
    step_number: u32,
) -> OvertimeResult {
    let (overtime_minutes, reasoning) = match (check_in, check_out) {
        (Some(_), Some(departure)) if departure >= adjusted_end => {
            let minutes = elapsed_minutes(adjusted_end, departure);
            (
                minutes,
                format!(
                    "Departure {} is {} minutes after end {}",
                    departure, minutes, adjusted_end
                ),
            )
        }
        (Some(_), Some(departure)) => (
            0,
            format!("Departure {} is before end {}", departure, adjusted_end),
        ),
        (None, Some(_)) => (
            0,
            "No accepted arrival, overtime not counted".to_string(),
        ),
        (_, None) => (0, "No accepted departure".to_string()),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "overtime".to_string(),
        rule_name: "Overtime".to_string(),
        input: serde_json::json!({
            "check_in": check_in.map(|t| t.to_string()),
            "check_out": check_out.map(|t| t.to_string()),
            "adjusted_end": adjusted_end.to_string()
        }),
        output: serde_json::json!({
            "overtime_minutes": overtime_minutes
        }),
        reasoning,
    };

    OvertimeResult {
        overtime_minutes,
        audit_step,
    }
}

/// Calculates worked minutes and hours between arrival and departure.
///
/// Seconds are truncated. A departure earlier in the day than the arrival
/// is measured across midnight.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::calculate_worked_time;
/// use chrono::NaiveTime;
/// use rust_decimal::Decimal;
///
/// let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
///
/// let result = calculate_worked_time(Some(at(8, 2)), Some(at(17, 5)), 1);
/// assert_eq!(result.worked_minutes, 543);
/// assert_eq!(result.worked_hours, Decimal::new(905, 2));
/// ```
pub fn calculate_worked_time(
    check_in: Option<NaiveTime>,
    check_out: Option<NaiveTime>,
    step_number: u32,
) -> WorkedTimeResult {
    let (worked_minutes, reasoning) = match (check_in, check_out) {
        (Some(arrival), Some(departure)) => {
            let minutes = elapsed_minutes(arrival, departure);
            (
                minutes,
                format!("{} to {} is {} minutes", arrival, departure, minutes),
            )
        }
        _ => (
            0,
            "Worked time needs both arrival and departure".to_string(),
        ),
    };

    let worked_hours = (Decimal::from(worked_minutes) / Decimal::from(60)).round_dp(2);

    let audit_step = AuditStep {
        step_number,
        rule_id: "worked_time".to_string(),
        rule_name: "Worked Time".to_string(),
        input: serde_json::json!({
            "check_in": check_in.map(|t| t.to_string()),
            "check_out": check_out.map(|t| t.to_string())
        }),
        output: serde_json::json!({
            "worked_minutes": worked_minutes,
            "worked_hours": worked_hours.normalize().to_string()
        }),
        reasoning,
    };

    WorkedTimeResult {
        worked_minutes,
        worked_hours,
        audit_step,
    }
}
