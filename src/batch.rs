//! Batch resolution over a date range.
//!
//! The [`BatchDriver`] walks dates in order and resolves every active
//! assignment on each date. Each employee's result is returned as a value;
//! a failure is logged and reported without stopping siblings or later
//! dates.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::calculation::{AttendanceInput, calculate_daily_attendance};
use crate::error::{EngineError, EngineResult};
use crate::models::{CalendarDay, DailyAttendanceRecord};
use crate::store::{ActiveAssignment, AttendanceStore};

/// The result of resolving one assignment on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EmployeeOutcome {
    /// The record was computed and stored.
    Written {
        /// The employee's DNI.
        dni: String,
        /// The stored record.
        record: DailyAttendanceRecord,
    },
    /// Reading inputs or writing the record failed.
    Failed {
        /// The employee's DNI.
        dni: String,
        /// The assignment that could not be resolved.
        assignment_id: u64,
        /// Why it failed.
        reason: String,
    },
}

impl EmployeeOutcome {
    /// Returns true when the record was stored.
    pub fn is_written(&self) -> bool {
        matches!(self, EmployeeOutcome::Written { .. })
    }
}

/// What happened to one date of the range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DateStatus {
    /// Employees were resolved.
    Processed {
        /// Records stored.
        written: usize,
        /// Employees that failed.
        failed: usize,
    },
    /// No calendar day is configured; nothing was written.
    SkippedNoCalendar,
    /// No assignment is active on the date.
    SkippedNoEmployees,
    /// The calendar or the assignment list could not be read.
    LookupFailed {
        /// Why the lookup failed.
        reason: String,
    },
}

/// The report for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateReport {
    /// The date.
    pub date: NaiveDate,
    /// What happened.
    pub status: DateStatus,
    /// Per-employee outcomes, in processing order.
    pub outcomes: Vec<EmployeeOutcome>,
}

impl DateReport {
    fn skipped(date: NaiveDate, status: DateStatus) -> Self {
        Self {
            date,
            status,
            outcomes: Vec::new(),
        }
    }

    /// Records stored for the date.
    pub fn written(&self) -> usize {
        match self.status {
            DateStatus::Processed { written, .. } => written,
            _ => 0,
        }
    }
}

/// The report for a whole range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// One report per date, in date order.
    pub dates: Vec<DateReport>,
    /// Records stored across the range.
    pub total_written: usize,
    /// Employee failures across the range.
    pub total_failed: usize,
}

/// Resolves attendance for ranges of dates against a store.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use attendance_engine::batch::BatchDriver;
/// use attendance_engine::store::InMemoryStore;
/// use chrono::NaiveDate;
///
/// let driver = BatchDriver::new(Arc::new(InMemoryStore::new()));
/// let day = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
///
/// let report = driver.process_range(day, day, None).unwrap();
/// assert_eq!(report.total_written, 0);
/// ```
#[derive(Debug)]
pub struct BatchDriver<S> {
    store: Arc<S>,
}

impl<S> Clone for BatchDriver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: AttendanceStore> BatchDriver<S> {
    /// Creates a driver over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolves every date from `start` to `end` inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidDateRange`] when `start` is after `end`.
    /// Failures inside the range are reported in the [`BatchReport`].
    pub fn process_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        dni_filter: Option<&str>,
    ) -> EngineResult<BatchReport> {
        if start > end {
            return Err(EngineError::InvalidDateRange { start, end });
        }

        info!(%start, %end, dni = ?dni_filter, "Starting attendance batch");

        let mut report = BatchReport::default();
        for date in start.iter_days().take_while(|date| *date <= end) {
            let date_report = self.process_date(date, dni_filter);
            report.total_written += date_report.written();
            report.total_failed += date_report
                .outcomes
                .iter()
                .filter(|outcome| !outcome.is_written())
                .count();
            report.dates.push(date_report);
        }

        info!(
            %start,
            %end,
            total_written = report.total_written,
            total_failed = report.total_failed,
            "Attendance batch completed"
        );
        Ok(report)
    }

    /// Resolves every active assignment on one date.
    pub fn process_date(&self, date: NaiveDate, dni_filter: Option<&str>) -> DateReport {
        let calendar_day = match self.store.calendar_day(date) {
            Ok(Some(day)) => day,
            Ok(None) => {
                warn!(%date, "No calendar day configured, skipping date");
                return DateReport::skipped(date, DateStatus::SkippedNoCalendar);
            }
            Err(err) => {
                error!(%date, error = %err, "Calendar lookup failed");
                return DateReport::skipped(
                    date,
                    DateStatus::LookupFailed {
                        reason: err.to_string(),
                    },
                );
            }
        };

        let active = match self.store.active_assignments(date, dni_filter) {
            Ok(active) if active.is_empty() => {
                info!(%date, "No active assignments for date");
                return DateReport::skipped(date, DateStatus::SkippedNoEmployees);
            }
            Ok(active) => active,
            Err(err) => {
                error!(%date, error = %err, "Assignment lookup failed");
                return DateReport::skipped(
                    date,
                    DateStatus::LookupFailed {
                        reason: err.to_string(),
                    },
                );
            }
        };

        info!(
            %date,
            day_state = %calendar_day.state,
            employees = active.len(),
            "Processing date"
        );

        let outcomes: Vec<EmployeeOutcome> = active
            .iter()
            .map(|entry| self.process_employee(&calendar_day, entry))
            .collect();

        let written = outcomes.iter().filter(|o| o.is_written()).count();
        DateReport {
            date,
            status: DateStatus::Processed {
                written,
                failed: outcomes.len() - written,
            },
            outcomes,
        }
    }

    fn process_employee(&self, calendar_day: &CalendarDay, entry: &ActiveAssignment) -> EmployeeOutcome {
        match self.resolve_and_store(calendar_day, entry) {
            Ok(record) => {
                info!(
                    date = %calendar_day.date,
                    dni = %entry.employee.dni,
                    assignment_id = entry.assignment.id,
                    punches = record.punch_count,
                    code = %record.observation,
                    "Attendance record written"
                );
                EmployeeOutcome::Written {
                    dni: entry.employee.dni.clone(),
                    record,
                }
            }
            Err(err) => {
                error!(
                    date = %calendar_day.date,
                    dni = %entry.employee.dni,
                    assignment_id = entry.assignment.id,
                    error = %err,
                    "Failed to resolve attendance"
                );
                EmployeeOutcome::Failed {
                    dni: entry.employee.dni.clone(),
                    assignment_id: entry.assignment.id,
                    reason: err.to_string(),
                }
            }
        }
    }

    fn resolve_and_store(
        &self,
        calendar_day: &CalendarDay,
        entry: &ActiveAssignment,
    ) -> EngineResult<DailyAttendanceRecord> {
        let date = calendar_day.date;
        let punches = self.store.punches(entry.employee.id, date)?;
        let leaves = self
            .store
            .leave_snapshot(entry.employee.id, date, &entry.assignment)?;

        let resolution = calculate_daily_attendance(&AttendanceInput {
            date,
            day_state: calendar_day.state,
            assignment: &entry.assignment,
            schedule: &entry.schedule,
            punches: &punches,
            leaves: &leaves,
        });

        self.store.upsert_daily_record(&resolution.record)?;
        Ok(resolution.record)
    }
}
