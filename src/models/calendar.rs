//! Calendar reference data.
//!
//! This module contains the [`CalendarDay`] type and the [`DayState`]
//! classification the engine uses to decide whether a date is a workday.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Classification of a calendar date.
///
/// # Example
///
/// ```
/// use attendance_engine::models::DayState;
///
/// assert!(DayState::Working.is_working());
/// assert!(!DayState::Recoverable.is_working());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayState {
    /// Holiday or other non-working day.
    NonWorking,
    /// Ordinary workday.
    Working,
    /// Make-up day for hours owed from a bridged holiday.
    Recoverable,
}

impl DayState {
    /// Returns true only for ordinary workdays.
    pub fn is_working(self) -> bool {
        self == DayState::Working
    }
}

impl std::fmt::Display for DayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayState::NonWorking => write!(f, "non_working"),
            DayState::Working => write!(f, "working"),
            DayState::Recoverable => write!(f, "recoverable"),
        }
    }
}

/// A single configured calendar date.
///
/// Calendar days are immutable reference data: the engine looks them up but
/// never mutates them. A date without a calendar day is skipped by the batch
/// driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    /// The calendar date.
    pub date: NaiveDate,
    /// Whether the date is a workday.
    pub state: DayState,
    /// Free-text description (e.g. the holiday name).
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_working_state_is_working() {
        assert!(DayState::Working.is_working());
        assert!(!DayState::NonWorking.is_working());
        assert!(!DayState::Recoverable.is_working());
    }

    #[test]
    fn test_deserialize_calendar_day() {
        let json = r#"{
            "date": "2025-07-28",
            "state": "non_working",
            "description": "Fiestas Patrias"
        }"#;

        let day: CalendarDay = serde_json::from_str(json).unwrap();
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2025, 7, 28).unwrap());
        assert_eq!(day.state, DayState::NonWorking);
        assert_eq!(day.description, "Fiestas Patrias");
    }

    #[test]
    fn test_day_state_display_matches_serde_name() {
        for state in [DayState::NonWorking, DayState::Working, DayState::Recoverable] {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state));
        }
    }
}
