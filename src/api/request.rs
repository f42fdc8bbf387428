//! Request types for the attendance API.
//!
//! This module defines the JSON request structures for the
//! `/attendance/resolve` and `/punches/classify` endpoints.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::config::LeaveCodes;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Assignment, DayState, LeaveGrant, NursingSchedule, Punch, PunchKind, Schedule,
};

/// Request body for the `/attendance/resolve` endpoint.
///
/// Carries the full input snapshot for one assignment on one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveRequest {
    /// The date to resolve.
    pub date: NaiveDate,
    /// The calendar classification of the date.
    pub day_state: DayState,
    /// The assignment being resolved.
    pub assignment: Assignment,
    /// The assignment's schedule.
    pub schedule: Schedule,
    /// Punches recorded by the employee on the date.
    #[serde(default)]
    pub punches: Vec<PunchRequest>,
    /// Leave grants held by the employee.
    #[serde(default)]
    pub leaves: Vec<LeaveRequest>,
    /// Nursing sub-periods of the employee's nursing grants.
    #[serde(default)]
    pub nursing_schedules: Vec<NursingSchedule>,
}

/// Punch information in a resolve request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PunchRequest {
    /// When the punch was recorded.
    pub timestamp: NaiveDateTime,
    /// Entry/exit tag.
    #[serde(default)]
    pub kind: PunchKind,
}

/// Leave grant information in a resolve request.
///
/// The type code is mapped onto a leave kind through the configured
/// [`LeaveCodes`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Unique identifier of the grant.
    pub id: u64,
    /// The leave-type code (e.g. "VACACIONES", "LSG").
    pub type_code: String,
    /// First day of the grant (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the grant (inclusive).
    pub end_date: NaiveDate,
    /// Short code written to the record.
    #[serde(default)]
    pub abbreviation: Option<String>,
    /// The assignment an unpaid assignment-scoped leave governs.
    #[serde(default)]
    pub governing_assignment_id: Option<u64>,
}

impl LeaveRequest {
    /// Converts to a [`LeaveGrant`] using the configured codes.
    pub fn into_grant(self, codes: &LeaveCodes) -> EngineResult<LeaveGrant> {
        if self.start_date > self.end_date {
            return Err(EngineError::InvalidLeave {
                grant_id: self.id,
                message: format!(
                    "start date {} is after end date {}",
                    self.start_date, self.end_date
                ),
            });
        }

        let kind = codes.kind_for(self.id, &self.type_code, self.governing_assignment_id)?;
        Ok(LeaveGrant {
            id: self.id,
            kind,
            start_date: self.start_date,
            end_date: self.end_date,
            abbreviation: self.abbreviation,
        })
    }
}

impl ResolveRequest {
    /// Converts the request punches into the engine's punch model.
    pub fn to_punches(&self) -> Vec<Punch> {
        self.punches
            .iter()
            .map(|p| Punch::new(self.assignment.employee_id, p.timestamp, p.kind))
            .collect()
    }
}

/// Request body for the `/punches/classify` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyRequest {
    /// Time of day of the punch.
    pub time: NaiveTime,
    /// The schedule to classify against.
    pub schedule: Schedule,
    /// The nursing sub-period in effect, if any.
    #[serde(default)]
    pub nursing: Option<NursingSchedule>,
}
