//! Work assignment and schedule models.
//!
//! An [`Assignment`] is one job an employee holds for a validity window; its
//! [`Schedule`] is the nominal daily work window the punches are measured
//! against.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A job assignment held by an employee.
///
/// # Example
///
/// ```
/// use attendance_engine::models::Assignment;
/// use chrono::NaiveDate;
///
/// let assignment = Assignment {
///     id: 10,
///     employee_id: 1,
///     start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     end_date: None,
/// };
/// assert!(assignment.is_active_on(NaiveDate::from_ymd_opt(2030, 6, 1).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Unique identifier of the assignment.
    pub id: u64,
    /// The employee holding the assignment.
    pub employee_id: u64,
    /// First day of validity (inclusive).
    pub start_date: NaiveDate,
    /// Last day of validity (inclusive); `None` means open-ended.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl Assignment {
    /// Checks whether the assignment is valid on the given date.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && self.end_date.is_none_or(|end| date <= end)
    }
}

/// The nominal work window bound to an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Expected arrival time.
    pub expected_start: NaiveTime,
    /// Expected departure time.
    pub expected_end: NaiveTime,
    /// Grace period after the expected start, in minutes.
    pub tolerance_minutes: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assignment(end_date: Option<NaiveDate>) -> Assignment {
        Assignment {
            id: 1,
            employee_id: 1,
            start_date: date(2025, 3, 1),
            end_date,
        }
    }

    #[test]
    fn test_active_window_is_inclusive() {
        let bounded = assignment(Some(date(2025, 3, 31)));
        assert!(bounded.is_active_on(date(2025, 3, 1)));
        assert!(bounded.is_active_on(date(2025, 3, 31)));
        assert!(!bounded.is_active_on(date(2025, 2, 28)));
        assert!(!bounded.is_active_on(date(2025, 4, 1)));
    }

    #[test]
    fn test_open_ended_assignment_never_expires() {
        let open = assignment(None);
        assert!(open.is_active_on(date(2099, 12, 31)));
        assert!(!open.is_active_on(date(2025, 2, 28)));
    }

    #[test]
    fn test_deserialize_schedule() {
        let json = r#"{
            "expected_start": "08:00:00",
            "expected_end": "17:00:00",
            "tolerance_minutes": 10
        }"#;

        let schedule: Schedule = serde_json::from_str(json).unwrap();
        assert_eq!(schedule.expected_start, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(schedule.expected_end, NaiveTime::from_hms_opt(17, 0, 0).unwrap());
        assert_eq!(schedule.tolerance_minutes, 10);
    }
}
