//! Time-clock punch models.
//!
//! A [`Punch`] is one recorded clock event. Its [`PunchKind`] tag is what the
//! daily calculation uses to pick arrival and departure; [`PunchClass`] is the
//! advisory label produced when a punch is classified on ingest.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Tag stored with a punch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunchKind {
    /// Arrival punch.
    Entry,
    /// Departure punch.
    Exit,
    /// Anything else (intermediate punches, or punches never classified).
    #[default]
    Unspecified,
}

/// Label assigned to a punch by the real-time classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunchClass {
    /// Before the entry limit.
    Entry,
    /// At or after the adjusted end of the day.
    Exit,
    /// Between the entry limit and the adjusted end.
    Intermediate,
}

impl From<PunchClass> for PunchKind {
    fn from(class: PunchClass) -> Self {
        match class {
            PunchClass::Entry => PunchKind::Entry,
            PunchClass::Exit => PunchKind::Exit,
            PunchClass::Intermediate => PunchKind::Unspecified,
        }
    }
}

impl std::fmt::Display for PunchClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PunchClass::Entry => write!(f, "entry"),
            PunchClass::Exit => write!(f, "exit"),
            PunchClass::Intermediate => write!(f, "intermediate"),
        }
    }
}

/// A single recorded time-clock event.
///
/// # Example
///
/// ```
/// use attendance_engine::models::{Punch, PunchKind};
/// use chrono::NaiveDateTime;
///
/// let ts = NaiveDateTime::parse_from_str("2025-03-14 08:02:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// let punch = Punch::new(7, ts, PunchKind::Entry);
/// assert_eq!(punch.time_of_day.to_string(), "08:02:00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Punch {
    /// The employee who punched.
    pub employee_id: u64,
    /// Full timestamp of the punch.
    pub timestamp: NaiveDateTime,
    /// Time-of-day portion of the timestamp.
    pub time_of_day: NaiveTime,
    /// Entry/exit tag.
    #[serde(default)]
    pub kind: PunchKind,
    /// The device that recorded the punch, when known.
    #[serde(default)]
    pub device_id: Option<String>,
}

impl Punch {
    /// Creates a punch whose time of day is taken from the timestamp.
    pub fn new(employee_id: u64, timestamp: NaiveDateTime, kind: PunchKind) -> Self {
        Self {
            employee_id,
            timestamp,
            time_of_day: timestamp.time(),
            kind,
            device_id: None,
        }
    }

    /// Returns the calendar date the punch belongs to.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}
