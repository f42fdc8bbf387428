//! Leave grant and nursing schedule models.
//!
//! Leave kinds are a closed sum type: every consumer matches exhaustively, so
//! a new kind cannot silently fall through the precedence rules.
//! [`LeaveSnapshot::collect`] applies the validity and nesting rules that
//! decide which grants may affect one assignment on one date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Assignment;

/// Abbreviation used for unpaid assignment-scoped leave without its own.
pub const DEFAULT_UNPAID_LEAVE_ABBREVIATION: &str = "LSG";

/// The kind of a leave grant.
///
/// # Example
///
/// ```
/// use attendance_engine::models::LeaveKind;
///
/// let kind = LeaveKind::OtherPaidLeave { type_code: "MATERNIDAD".to_string() };
/// assert_eq!(kind.default_abbreviation(), "MAT");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LeaveKind {
    /// Vacation: overrides every calendar state.
    Vacation,
    /// Unpaid leave that only applies to one assignment.
    UnpaidLeaveByAssignment {
        /// The assignment the leave governs.
        governing_assignment_id: u64,
    },
    /// Nursing time: never overrides the day, only shifts the schedule.
    NursingTime,
    /// Any other paid leave (maternity, sickness, ...).
    OtherPaidLeave {
        /// The leave-type code, used for the default abbreviation.
        type_code: String,
    },
}

impl LeaveKind {
    /// The code shown when the grant carries no abbreviation of its own.
    pub fn default_abbreviation(&self) -> String {
        match self {
            LeaveKind::Vacation => "V".to_string(),
            LeaveKind::UnpaidLeaveByAssignment { .. } => {
                DEFAULT_UNPAID_LEAVE_ABBREVIATION.to_string()
            }
            LeaveKind::NursingTime => String::new(),
            LeaveKind::OtherPaidLeave { type_code } => type_code.chars().take(3).collect(),
        }
    }
}

/// A leave or permission granted to an employee for a date span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveGrant {
    /// Unique identifier of the grant; lower ids win ties between paid leaves.
    pub id: u64,
    /// The kind of leave.
    #[serde(flatten)]
    pub kind: LeaveKind,
    /// First day of the grant (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the grant (inclusive).
    pub end_date: NaiveDate,
    /// Short code written to the daily record.
    #[serde(default)]
    pub abbreviation: Option<String>,
}

impl LeaveGrant {
    /// Checks whether the grant covers the given date.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Checks whether the grant's span nests inside the assignment's window.
    pub fn nests_within(&self, assignment: &Assignment) -> bool {
        self.start_date >= assignment.start_date
            && assignment.end_date.is_none_or(|end| self.end_date <= end)
    }

    /// Returns the grant's abbreviation, or the kind's default when unset.
    ///
    /// # Examples
    ///
    /// ```
    /// use attendance_engine::models::{LeaveGrant, LeaveKind};
    /// use chrono::NaiveDate;
    ///
    /// let grant = LeaveGrant {
    ///     id: 1,
    ///     kind: LeaveKind::OtherPaidLeave { type_code: "ENFERMEDAD".to_string() },
    ///     start_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
    ///     end_date: NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
    ///     abbreviation: None,
    /// };
    /// assert_eq!(grant.effective_abbreviation(), "ENF");
    /// ```
    pub fn effective_abbreviation(&self) -> String {
        match self.abbreviation.as_deref().map(str::trim) {
            Some(abbreviation) if !abbreviation.is_empty() => abbreviation.to_string(),
            _ => self.kind.default_abbreviation(),
        }
    }

    fn applies_to(&self, assignment: &Assignment, date: NaiveDate) -> bool {
        self.is_active_on(date) && self.nests_within(assignment)
    }
}

/// Which end of the day nursing time is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NursingMode {
    /// The employee arrives later.
    ShiftStart,
    /// The employee leaves earlier.
    ShiftEnd,
}

/// The daily nursing allowance for one sub-period of a nursing grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NursingSchedule {
    /// The nursing grant this sub-period belongs to.
    pub grant_id: u64,
    /// First day of the sub-period (inclusive).
    pub from_date: NaiveDate,
    /// Last day of the sub-period (inclusive).
    pub to_date: NaiveDate,
    /// Which end of the day is shortened.
    pub mode: NursingMode,
    /// Minutes granted per day.
    pub daily_minutes: u32,
}

impl NursingSchedule {
    /// Checks whether this sub-period covers the given date.
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        self.from_date <= date && date <= self.to_date
    }
}

/// Leave data pre-filtered for one (employee, assignment, date) key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveSnapshot {
    /// Non-nursing grants that apply on the date, ordered by id.
    #[serde(default)]
    pub grants: Vec<LeaveGrant>,
    /// The nursing sub-period effective on the date, if any.
    #[serde(default)]
    pub nursing: Option<NursingSchedule>,
}

impl LeaveSnapshot {
    /// Selects the leave data that may affect `assignment` on `date`.
    ///
    /// A grant is kept when it is active on the date and nests inside the
    /// assignment's validity window. Unpaid assignment-scoped leave is kept
    /// only for the assignment it governs. The nursing schedule is the
    /// sub-period of a kept nursing grant covering the date; if several
    /// qualify, the one starting last wins, then the lowest grant id.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_engine::models::{Assignment, LeaveGrant, LeaveKind, LeaveSnapshot};
    /// use chrono::NaiveDate;
    ///
    /// let d = |day| NaiveDate::from_ymd_opt(2025, 3, day).unwrap();
    /// let assignment = Assignment { id: 5, employee_id: 1, start_date: d(1), end_date: None };
    /// let grants = vec![LeaveGrant {
    ///     id: 1,
    ///     kind: LeaveKind::UnpaidLeaveByAssignment { governing_assignment_id: 6 },
    ///     start_date: d(10),
    ///     end_date: d(20),
    ///     abbreviation: None,
    /// }];
    ///
    /// let snapshot = LeaveSnapshot::collect(&grants, &[], &assignment, d(14));
    /// assert!(snapshot.grants.is_empty());
    /// ```
    pub fn collect(
        grants: &[LeaveGrant],
        nursing_schedules: &[NursingSchedule],
        assignment: &Assignment,
        date: NaiveDate,
    ) -> Self {
        let mut general: Vec<LeaveGrant> = grants
            .iter()
            .filter(|grant| grant.applies_to(assignment, date))
            .filter(|grant| match &grant.kind {
                LeaveKind::Vacation | LeaveKind::OtherPaidLeave { .. } => true,
                LeaveKind::UnpaidLeaveByAssignment {
                    governing_assignment_id,
                } => *governing_assignment_id == assignment.id,
                LeaveKind::NursingTime => false,
            })
            .cloned()
            .collect();
        general.sort_by_key(|grant| grant.id);

        let nursing_grant_ids: Vec<u64> = grants
            .iter()
            .filter(|grant| grant.kind == LeaveKind::NursingTime)
            .filter(|grant| grant.applies_to(assignment, date))
            .map(|grant| grant.id)
            .collect();

        let nursing = nursing_schedules
            .iter()
            .filter(|schedule| nursing_grant_ids.contains(&schedule.grant_id))
            .filter(|schedule| schedule.is_effective_on(date))
            .min_by_key(|schedule| (std::cmp::Reverse(schedule.from_date), schedule.grant_id))
            .cloned();

        Self {
            grants: general,
            nursing,
        }
    }
}
