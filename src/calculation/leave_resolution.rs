//! Leave precedence resolution.
//!
//! At most one leave grant governs a day. Precedence is vacation, then unpaid
//! assignment-scoped leave, then any other paid leave. Nursing time never
//! governs the day; it is passed on to the schedule adjustment.

use serde::{Deserialize, Serialize};

use crate::models::{AuditStep, DayState, LeaveGrant, LeaveKind, LeaveSnapshot, NursingSchedule, OutcomeCode};

/// The leave that overrides a day's punch evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "override", rename_all = "snake_case")]
pub enum LeaveOverride {
    /// The employee is on vacation.
    Vacation,
    /// Unpaid leave governing this assignment.
    UnpaidLeave {
        /// Code written to the record.
        abbreviation: String,
    },
    /// Any other paid leave.
    OtherLeave {
        /// Code written to the record.
        abbreviation: String,
    },
    /// No leave governs the day; punches are evaluated.
    NoOverride,
}

impl LeaveOverride {
    /// The code an override writes to the record, or `None` when punches decide.
    ///
    /// # Examples
    ///
    /// ```
    /// use attendance_engine::calculation::LeaveOverride;
    /// use attendance_engine::models::OutcomeCode;
    ///
    /// assert_eq!(LeaveOverride::Vacation.outcome_code(), Some(OutcomeCode::Vacation));
    /// assert_eq!(LeaveOverride::NoOverride.outcome_code(), None);
    /// ```
    pub fn outcome_code(&self) -> Option<OutcomeCode> {
        match self {
            LeaveOverride::Vacation => Some(OutcomeCode::Vacation),
            LeaveOverride::UnpaidLeave { abbreviation }
            | LeaveOverride::OtherLeave { abbreviation } => {
                Some(OutcomeCode::leave(abbreviation))
            }
            LeaveOverride::NoOverride => None,
        }
    }
}

/// The result of leave resolution, including the audit step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveResolution {
    /// The governing leave, if any.
    pub outcome: LeaveOverride,
    /// The nursing schedule to apply when punches are evaluated.
    pub nursing: Option<NursingSchedule>,
    /// The audit step recording this resolution.
    pub audit_step: AuditStep,
}

/// Picks the single leave grant that governs a day.
///
/// The snapshot is expected to contain only grants active on the date and
/// nested inside the assignment window (see [`LeaveSnapshot::collect`]).
/// Rules, first match wins:
///
/// 1. Vacation on any day state.
/// 2. Unpaid leave whose governing assignment is `assignment_id`, on working days.
/// 3. Other paid leave with the lowest grant id, on working days.
/// 4. No override.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::{resolve_leave, LeaveOverride};
/// use attendance_engine::models::{DayState, LeaveGrant, LeaveKind, LeaveSnapshot};
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2025, 3, 16).unwrap();
/// let snapshot = LeaveSnapshot {
///     grants: vec![LeaveGrant {
///         id: 1,
///         kind: LeaveKind::Vacation,
///         start_date: day,
///         end_date: day,
///         abbreviation: None,
///     }],
///     nursing: None,
/// };
///
/// let resolution = resolve_leave(&snapshot, 10, DayState::NonWorking, 1);
/// assert_eq!(resolution.outcome, LeaveOverride::Vacation);
/// ```
pub fn resolve_leave(
    snapshot: &LeaveSnapshot,
    assignment_id: u64,
    day_state: DayState,
    step_number: u32,
) -> LeaveResolution {
    let (outcome, governing, reasoning) = select_override(snapshot, assignment_id, day_state);

    let audit_step = AuditStep {
        step_number,
        rule_id: "leave_precedence".to_string(),
        rule_name: "Leave Precedence".to_string(),
        input: serde_json::json!({
            "assignment_id": assignment_id,
            "day_state": day_state,
            "grant_ids": snapshot.grants.iter().map(|g| g.id).collect::<Vec<_>>(),
            "nursing_grant_id": snapshot.nursing.as_ref().map(|n| n.grant_id)
        }),
        output: serde_json::json!({
            "outcome": outcome,
            "governing_grant_id": governing.map(|g| g.id)
        }),
        reasoning,
    };

    LeaveResolution {
        outcome,
        nursing: snapshot.nursing.clone(),
        audit_step,
    }
}

fn select_override(
    snapshot: &LeaveSnapshot,
    assignment_id: u64,
    day_state: DayState,
) -> (LeaveOverride, Option<&LeaveGrant>, String) {
    let mut vacation = None;
    let mut unpaid = None;
    let mut other: Option<&LeaveGrant> = None;

    for grant in &snapshot.grants {
        match &grant.kind {
            LeaveKind::Vacation => {
                vacation = vacation.or(Some(grant));
            }
            LeaveKind::UnpaidLeaveByAssignment {
                governing_assignment_id,
            } => {
                if *governing_assignment_id == assignment_id {
                    unpaid = unpaid.or(Some(grant));
                }
            }
            LeaveKind::OtherPaidLeave { .. } => {
                if other.is_none_or(|current| grant.id < current.id) {
                    other = Some(grant);
                }
            }
            LeaveKind::NursingTime => {}
        }
    }

    if let Some(grant) = vacation {
        return (
            LeaveOverride::Vacation,
            Some(grant),
            format!("Vacation grant {} applies on every day state", grant.id),
        );
    }

    if !day_state.is_working() {
        let reasoning = if unpaid.is_some() || other.is_some() {
            format!("Day is {}, non-vacation leave does not apply", day_state)
        } else {
            "No leave grant governs the day".to_string()
        };
        return (LeaveOverride::NoOverride, None, reasoning);
    }

    if let Some(grant) = unpaid {
        let abbreviation = grant.effective_abbreviation();
        return (
            LeaveOverride::UnpaidLeave {
                abbreviation: abbreviation.clone(),
            },
            Some(grant),
            format!(
                "Unpaid leave grant {} governs assignment {}: code {}",
                grant.id, assignment_id, abbreviation
            ),
        );
    }

    if let Some(grant) = other {
        let abbreviation = grant.effective_abbreviation();
        return (
            LeaveOverride::OtherLeave {
                abbreviation: abbreviation.clone(),
            },
            Some(grant),
            format!("Paid leave grant {} applies: code {}", grant.id, abbreviation),
        );
    }

    (
        LeaveOverride::NoOverride,
        None,
        "No leave grant governs the day".to_string(),
    )
}
