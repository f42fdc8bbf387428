//! Outcome code derivation.
//!
//! Maps the presence of arrival and departure plus the lateness buckets onto
//! the day's code. The checks run in a fixed order and the first match wins.

use serde::{Deserialize, Serialize};

use crate::models::{AuditStep, OutcomeCode};

/// The derived outcome code, with the audit step documenting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeDerivation {
    /// The code for the observation and final fields.
    pub code: OutcomeCode,
    /// The audit step recording this derivation.
    pub audit_step: AuditStep,
}

/// Derives the outcome code of a working day with punches.
///
/// | arrival | departure | lateness | code |
/// |---|---|---|---|
/// | yes | yes | none | `A` |
/// | no | no | any | `F` |
/// | no | yes | within > 0 | `<within>` |
/// | no | yes | otherwise | `FI` |
/// | yes | no | some | `<late> - FS` |
/// | yes | no | none | `FS` |
/// | yes | yes | some | `<late>` |
///
/// Where both lateness buckets could apply, the within-tolerance value is
/// preferred.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::derive_outcome;
/// use attendance_engine::models::OutcomeCode;
///
/// assert_eq!(derive_outcome(true, true, 0, 0, 1).code, OutcomeCode::Present);
/// assert_eq!(derive_outcome(true, false, 0, 25, 1).code, OutcomeCode::LateMissingExit(25));
/// assert_eq!(derive_outcome(false, true, 0, 5, 1).code, OutcomeCode::MissingEntry);
/// ```
pub fn derive_outcome(
    has_check_in: bool,
    has_check_out: bool,
    minutes_late_within_tolerance: u32,
    minutes_late_beyond_tolerance: u32,
    step_number: u32,
) -> OutcomeDerivation {
    let late = if minutes_late_within_tolerance > 0 {
        minutes_late_within_tolerance
    } else {
        minutes_late_beyond_tolerance
    };

    let (code, reasoning) = match (has_check_in, has_check_out) {
        (true, true) if late == 0 => (
            OutcomeCode::Present,
            "Arrival and departure present, no lateness".to_string(),
        ),
        (false, false) => (
            OutcomeCode::Absent,
            "Neither arrival nor departure accepted".to_string(),
        ),
        (false, true) if minutes_late_within_tolerance > 0 => (
            OutcomeCode::Late(minutes_late_within_tolerance),
            format!(
                "No arrival, {} minutes late within tolerance",
                minutes_late_within_tolerance
            ),
        ),
        (false, true) => (OutcomeCode::MissingEntry, "Arrival missing".to_string()),
        (true, false) if late > 0 => (
            OutcomeCode::LateMissingExit(late),
            format!("{} minutes late and departure missing", late),
        ),
        (true, false) => (OutcomeCode::MissingExit, "Departure missing".to_string()),
        (true, true) => (
            OutcomeCode::Late(late),
            format!("Arrival and departure present, {} minutes late", late),
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "outcome_code".to_string(),
        rule_name: "Outcome Code Derivation".to_string(),
        input: serde_json::json!({
            "has_check_in": has_check_in,
            "has_check_out": has_check_out,
            "minutes_late_within_tolerance": minutes_late_within_tolerance,
            "minutes_late_beyond_tolerance": minutes_late_beyond_tolerance
        }),
        output: serde_json::json!({
            "code": code
        }),
        reasoning,
    };

    OutcomeDerivation { code, audit_step }
}
