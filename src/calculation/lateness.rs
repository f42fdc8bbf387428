//! Lateness calculation functionality.
//!
//! Lateness is measured from the adjusted start to the accepted arrival. When
//! no arrival was tagged, the first punch of the day stands in for it and the
//! tolerance is not applied.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::clock::{elapsed_minutes, signed_minutes};
use crate::models::AuditStep;

/// Late minutes split into the within-tolerance and beyond-tolerance buckets.
///
/// At most one of the two buckets is non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatenessResult {
    /// Late minutes strictly below the tolerance.
    pub minutes_late_within_tolerance: u32,
    /// Late minutes at or above the tolerance, or fallback lateness.
    pub minutes_late_beyond_tolerance: u32,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

impl LatenessResult {
    /// The late minutes to report, preferring the within-tolerance bucket.
    pub fn late_minutes(&self) -> u32 {
        if self.minutes_late_within_tolerance > 0 {
            self.minutes_late_within_tolerance
        } else {
            self.minutes_late_beyond_tolerance
        }
    }
}

/// Calculates lateness against the adjusted start.
///
/// # Arguments
///
/// * `check_in` - The accepted arrival (earliest entry-tagged punch)
/// * `first_punch` - The earliest punch of the day regardless of tag
/// * `adjusted_start` - Expected start after nursing adjustment
/// * `tolerance_minutes` - Grace minutes after the start
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::calculate_lateness;
/// use chrono::NaiveTime;
///
/// let at = |h, m, s| NaiveTime::from_hms_opt(h, m, s).unwrap();
///
/// let within = calculate_lateness(Some(at(8, 9, 59)), Some(at(8, 9, 59)), at(8, 0, 0), 10, 1);
/// assert_eq!(within.minutes_late_within_tolerance, 9);
///
/// let beyond = calculate_lateness(Some(at(8, 10, 0)), Some(at(8, 10, 0)), at(8, 0, 0), 10, 1);
/// assert_eq!(beyond.minutes_late_beyond_tolerance, 10);
/// ```
pub fn calculate_lateness(
    check_in: Option<NaiveTime>,
    first_punch: Option<NaiveTime>,
    adjusted_start: NaiveTime,
    tolerance_minutes: u32,
    step_number: u32,
) -> LatenessResult {
    let mut within = 0;
    let mut beyond = 0;

    let reasoning = match (check_in, first_punch) {
        (Some(arrival), _) if arrival > adjusted_start => {
            let late = elapsed_minutes(adjusted_start, arrival);
            if late < tolerance_minutes {
                within = late;
                format!(
                    "Arrival {} is {} minutes late, under the {} minute tolerance",
                    arrival, late, tolerance_minutes
                )
            } else {
                beyond = late;
                format!(
                    "Arrival {} is {} minutes late, at or over the {} minute tolerance",
                    arrival, late, tolerance_minutes
                )
            }
        }
        (Some(arrival), _) => format!("Arrival {} is on time for {}", arrival, adjusted_start),
        (None, Some(first)) => {
            let late = signed_minutes(adjusted_start, first);
            if late > 0 {
                beyond = late as u32;
                format!(
                    "No tagged arrival; first punch {} is {} minutes after {}",
                    first, late, adjusted_start
                )
            } else {
                format!(
                    "No tagged arrival; first punch {} is not after {}",
                    first, adjusted_start
                )
            }
        }
        (None, None) => "No punches to measure lateness from".to_string(),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "lateness".to_string(),
        rule_name: "Lateness".to_string(),
        input: serde_json::json!({
            "check_in": check_in.map(|t| t.to_string()),
            "first_punch": first_punch.map(|t| t.to_string()),
            "adjusted_start": adjusted_start.to_string(),
            "tolerance_minutes": tolerance_minutes
        }),
        output: serde_json::json!({
            "minutes_late_within_tolerance": within,
            "minutes_late_beyond_tolerance": beyond
        }),
        reasoning,
    };

    LatenessResult {
        minutes_late_within_tolerance: within,
        minutes_late_beyond_tolerance: beyond,
        audit_step,
    }
}
