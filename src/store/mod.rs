//! Storage seam for the attendance engine.
//!
//! The resolution core performs no I/O. Everything it reads and writes goes
//! through the traits defined here:
//!
//! - [`AttendanceStore`] feeds the batch driver and receives its records.
//! - [`PunchLedger`] backs device ingest: lookups for classification,
//!   duplicate checks, the per-device sync cutoff and punch inserts.
//!
//! Both share [`CalendarLookup`]. [`InMemoryStore`] implements all of them.

mod memory;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{
    Assignment, CalendarDay, DailyAttendanceRecord, Employee, LeaveSnapshot, NursingSchedule,
    Punch, PunchClass, PunchKind, Schedule,
};

pub use memory::InMemoryStore;

/// An employee's assignment that is valid on a date, with its schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveAssignment {
    /// The employee holding the assignment.
    pub employee: Employee,
    /// The assignment.
    pub assignment: Assignment,
    /// The assignment's schedule.
    pub schedule: Schedule,
}

/// A punch as written by device ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestedPunch {
    /// Normalized national id of the puncher.
    pub dni: String,
    /// The matching employee, when the id is known.
    pub employee_id: Option<u64>,
    /// Timestamp reported by the device.
    pub timestamp: NaiveDateTime,
    /// The device the punch came from.
    pub device_id: String,
    /// Tag stored for the daily calculation.
    pub kind: PunchKind,
    /// Real-time classification, when one could be made.
    pub classification: Option<PunchClass>,
}

impl IngestedPunch {
    /// Converts to the engine's punch model when the employee is known.
    pub fn to_punch(&self) -> Option<Punch> {
        self.employee_id.map(|employee_id| Punch {
            device_id: Some(self.device_id.clone()),
            ..Punch::new(employee_id, self.timestamp, self.kind)
        })
    }
}

/// Calendar reference data.
pub trait CalendarLookup: Send + Sync {
    /// Returns the calendar day for a date, if one is configured.
    fn calendar_day(&self, date: NaiveDate) -> EngineResult<Option<CalendarDay>>;
}

/// Read/write access needed by the batch driver.
pub trait AttendanceStore: CalendarLookup {
    /// Assignments valid on `date`, ordered by employee DNI then assignment id.
    ///
    /// With a DNI filter only that employee's assignments are returned.
    fn active_assignments(
        &self,
        date: NaiveDate,
        dni_filter: Option<&str>,
    ) -> EngineResult<Vec<ActiveAssignment>>;

    /// The employee's punches recorded on `date`.
    fn punches(&self, employee_id: u64, date: NaiveDate) -> EngineResult<Vec<Punch>>;

    /// Leave data that may affect `assignment` on `date`.
    fn leave_snapshot(
        &self,
        employee_id: u64,
        date: NaiveDate,
        assignment: &Assignment,
    ) -> EngineResult<LeaveSnapshot>;

    /// Creates or overwrites the record for its (assignment, date) key.
    fn upsert_daily_record(&self, record: &DailyAttendanceRecord) -> EngineResult<()>;
}

/// Lookups and writes needed by device ingest.
pub trait PunchLedger: CalendarLookup {
    /// Finds an employee by normalized DNI.
    fn employee_by_dni(&self, dni: &str) -> EngineResult<Option<Employee>>;

    /// The employee's assignments valid on `date`, most recently started first.
    fn assignments_for_employee(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> EngineResult<Vec<(Assignment, Schedule)>>;

    /// The nursing sub-period in effect for the employee on `date`.
    fn nursing_schedule(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> EngineResult<Option<NursingSchedule>>;

    /// Checks whether the same punch was already stored.
    fn punch_exists(
        &self,
        dni: &str,
        timestamp: NaiveDateTime,
        device_id: &str,
    ) -> EngineResult<bool>;

    /// The latest punch timestamp already stored from a device.
    ///
    /// Device ingest treats anything at or before it as already synced.
    fn last_synced(&self, device_id: &str) -> EngineResult<Option<NaiveDateTime>>;

    /// Stores a new punch.
    fn insert_punch(&self, punch: &IngestedPunch) -> EngineResult<()>;
}
