//! Core data models for the attendance engine.
//!
//! This module contains all the domain models used throughout the engine.

mod assignment;
mod attendance_record;
mod calendar;
mod employee;
mod leave;
mod outcome;
mod punch;

pub use assignment::{Assignment, Schedule};
pub use attendance_record::{AttendanceResolution, AuditStep, DailyAttendanceRecord};
pub use calendar::{CalendarDay, DayState};
pub use employee::{DNI_WIDTH, Employee};
pub use leave::{
    DEFAULT_UNPAID_LEAVE_ABBREVIATION, LeaveGrant, LeaveKind, LeaveSnapshot, NursingMode,
    NursingSchedule,
};
pub use outcome::OutcomeCode;
pub use punch::{Punch, PunchClass, PunchKind};
