//! In-memory store.
//!
//! Backs tests, benchmarks and the HTTP surface. Every collection sits behind
//! its own `RwLock`; records are keyed by (assignment id, date) so a second
//! upsert for the same key overwrites the first.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{NaiveDate, NaiveDateTime};

use super::{ActiveAssignment, AttendanceStore, CalendarLookup, IngestedPunch, PunchLedger};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Assignment, CalendarDay, DailyAttendanceRecord, Employee, LeaveGrant, LeaveKind,
    LeaveSnapshot, NursingSchedule, Punch, Schedule,
};

/// A thread-safe store holding everything in memory.
///
/// # Example
///
/// ```
/// use attendance_engine::models::{CalendarDay, DayState};
/// use attendance_engine::store::{CalendarLookup, InMemoryStore};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
/// let store = InMemoryStore::new().with_calendar_day(CalendarDay {
///     date,
///     state: DayState::Working,
///     description: String::new(),
/// });
///
/// assert!(store.calendar_day(date).unwrap().is_some());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    calendar: RwLock<HashMap<NaiveDate, CalendarDay>>,
    employees: RwLock<HashMap<u64, Employee>>,
    assignments: RwLock<Vec<(Assignment, Schedule)>>,
    punches: RwLock<Vec<Punch>>,
    ingested: RwLock<Vec<IngestedPunch>>,
    grants: RwLock<Vec<(u64, LeaveGrant)>>,
    nursing: RwLock<Vec<NursingSchedule>>,
    records: RwLock<BTreeMap<(u64, NaiveDate), DailyAttendanceRecord>>,
}

fn read<T>(lock: &RwLock<T>) -> EngineResult<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| EngineError::Store {
        message: "store lock poisoned".to_string(),
    })
}

fn write<T>(lock: &RwLock<T>) -> EngineResult<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| EngineError::Store {
        message: "store lock poisoned".to_string(),
    })
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a calendar day.
    pub fn with_calendar_day(mut self, day: CalendarDay) -> Self {
        self.calendar
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(day.date, day);
        self
    }

    /// Adds an employee.
    pub fn with_employee(mut self, employee: Employee) -> Self {
        self.employees
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(employee.id, employee);
        self
    }

    /// Adds an assignment and its schedule.
    pub fn with_assignment(mut self, assignment: Assignment, schedule: Schedule) -> Self {
        self.assignments
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push((assignment, schedule));
        self
    }

    /// Adds a recorded punch.
    pub fn with_punch(mut self, punch: Punch) -> Self {
        self.punches
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push(punch);
        self
    }

    /// Adds a leave grant held by an employee.
    pub fn with_leave(mut self, employee_id: u64, grant: LeaveGrant) -> Self {
        self.grants
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push((employee_id, grant));
        self
    }

    /// Adds a nursing sub-period to an existing nursing grant.
    pub fn with_nursing_schedule(mut self, schedule: NursingSchedule) -> Self {
        self.nursing
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push(schedule);
        self
    }

    /// Returns the record stored for a key.
    pub fn record(
        &self,
        assignment_id: u64,
        date: NaiveDate,
    ) -> EngineResult<Option<DailyAttendanceRecord>> {
        Ok(read(&self.records)?.get(&(assignment_id, date)).cloned())
    }

    /// Returns every stored record, ordered by key.
    pub fn records(&self) -> EngineResult<Vec<DailyAttendanceRecord>> {
        Ok(read(&self.records)?.values().cloned().collect())
    }

    /// Returns every punch written by ingest, in insertion order.
    pub fn ingested_punches(&self) -> EngineResult<Vec<IngestedPunch>> {
        Ok(read(&self.ingested)?.clone())
    }

    fn employee_grants(&self, employee_id: u64) -> EngineResult<Vec<LeaveGrant>> {
        Ok(read(&self.grants)?
            .iter()
            .filter(|(owner, _)| *owner == employee_id)
            .map(|(_, grant)| grant.clone())
            .collect())
    }
}

impl CalendarLookup for InMemoryStore {
    fn calendar_day(&self, date: NaiveDate) -> EngineResult<Option<CalendarDay>> {
        Ok(read(&self.calendar)?.get(&date).cloned())
    }
}

impl AttendanceStore for InMemoryStore {
    fn active_assignments(
        &self,
        date: NaiveDate,
        dni_filter: Option<&str>,
    ) -> EngineResult<Vec<ActiveAssignment>> {
        let dni_filter = dni_filter.map(Employee::normalize_dni);
        let employees = read(&self.employees)?;
        let assignments = read(&self.assignments)?;

        let mut active: Vec<ActiveAssignment> = assignments
            .iter()
            .filter(|(assignment, _)| assignment.is_active_on(date))
            .filter_map(|(assignment, schedule)| {
                let employee = employees.get(&assignment.employee_id)?;
                if dni_filter.as_ref().is_some_and(|dni| *dni != employee.dni) {
                    return None;
                }
                Some(ActiveAssignment {
                    employee: employee.clone(),
                    assignment: assignment.clone(),
                    schedule: schedule.clone(),
                })
            })
            .collect();

        active.sort_by(|a, b| {
            a.employee
                .dni
                .cmp(&b.employee.dni)
                .then(a.assignment.id.cmp(&b.assignment.id))
        });
        Ok(active)
    }

    fn punches(&self, employee_id: u64, date: NaiveDate) -> EngineResult<Vec<Punch>> {
        Ok(read(&self.punches)?
            .iter()
            .filter(|punch| punch.employee_id == employee_id && punch.date() == date)
            .cloned()
            .collect())
    }

    fn leave_snapshot(
        &self,
        employee_id: u64,
        date: NaiveDate,
        assignment: &Assignment,
    ) -> EngineResult<LeaveSnapshot> {
        let grants = self.employee_grants(employee_id)?;
        let nursing = read(&self.nursing)?;
        Ok(LeaveSnapshot::collect(&grants, &nursing, assignment, date))
    }

    fn upsert_daily_record(&self, record: &DailyAttendanceRecord) -> EngineResult<()> {
        write(&self.records)?.insert(record.key(), record.clone());
        Ok(())
    }
}

impl PunchLedger for InMemoryStore {
    fn employee_by_dni(&self, dni: &str) -> EngineResult<Option<Employee>> {
        Ok(read(&self.employees)?
            .values()
            .find(|employee| employee.dni == dni)
            .cloned())
    }

    fn assignments_for_employee(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> EngineResult<Vec<(Assignment, Schedule)>> {
        let mut found: Vec<(Assignment, Schedule)> = read(&self.assignments)?
            .iter()
            .filter(|(assignment, _)| {
                assignment.employee_id == employee_id && assignment.is_active_on(date)
            })
            .cloned()
            .collect();

        found.sort_by(|(a, _), (b, _)| b.start_date.cmp(&a.start_date).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    fn nursing_schedule(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> EngineResult<Option<NursingSchedule>> {
        let grant_ids: Vec<u64> = self
            .employee_grants(employee_id)?
            .into_iter()
            .filter(|grant| grant.kind == LeaveKind::NursingTime && grant.is_active_on(date))
            .map(|grant| grant.id)
            .collect();

        Ok(read(&self.nursing)?
            .iter()
            .filter(|schedule| grant_ids.contains(&schedule.grant_id))
            .filter(|schedule| schedule.is_effective_on(date))
            .min_by_key(|schedule| (std::cmp::Reverse(schedule.from_date), schedule.grant_id))
            .cloned())
    }

    fn punch_exists(
        &self,
        dni: &str,
        timestamp: NaiveDateTime,
        device_id: &str,
    ) -> EngineResult<bool> {
        Ok(read(&self.ingested)?.iter().any(|punch| {
            punch.dni == dni && punch.timestamp == timestamp && punch.device_id == device_id
        }))
    }

    fn last_synced(&self, device_id: &str) -> EngineResult<Option<NaiveDateTime>> {
        Ok(read(&self.ingested)?
            .iter()
            .filter(|punch| punch.device_id == device_id)
            .map(|punch| punch.timestamp)
            .max())
    }

    fn insert_punch(&self, punch: &IngestedPunch) -> EngineResult<()> {
        let mut ingested = write(&self.ingested)?;
        if let Some(recorded) = punch.to_punch() {
            write(&self.punches)?.push(recorded);
        }
        ingested.push(punch.clone());
        Ok(())
    }
}
