//! Classification of freshly fetched punches against stored context.

use chrono::NaiveDateTime;

use crate::calculation::classify_punch;
use crate::error::EngineResult;
use crate::models::PunchClass;
use crate::store::PunchLedger;

/// What ingest learned about a punch before storing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PunchContext {
    /// The matching employee, when the DNI is known.
    pub employee_id: Option<u64>,
    /// The real-time label, when one could be made.
    pub classification: Option<PunchClass>,
}

/// Looks up everything needed to label a punch and labels it.
///
/// No label is produced on dates without a calendar entry, on days that are
/// not workdays, or for unknown employees. A known employee without an active
/// assignment gets [`PunchClass::Intermediate`]. Otherwise the most recently
/// started assignment's schedule is used together with the employee's
/// nursing schedule for the date.
pub fn classify_in_context<L: PunchLedger + ?Sized>(
    ledger: &L,
    dni: &str,
    timestamp: NaiveDateTime,
) -> EngineResult<PunchContext> {
    let date = timestamp.date();
    let employee = ledger.employee_by_dni(dni)?;
    let employee_id = employee.as_ref().map(|e| e.id);

    let unclassified = PunchContext {
        employee_id,
        classification: None,
    };

    let working = ledger
        .calendar_day(date)?
        .is_some_and(|day| day.state.is_working());
    if !working {
        return Ok(unclassified);
    }

    let Some(employee) = employee else {
        return Ok(unclassified);
    };

    let assignments = ledger.assignments_for_employee(employee.id, date)?;
    let Some((_, schedule)) = assignments.first() else {
        return Ok(PunchContext {
            employee_id,
            classification: Some(PunchClass::Intermediate),
        });
    };

    let nursing = ledger.nursing_schedule(employee.id, date)?;
    let result = classify_punch(timestamp.time(), schedule, nursing.as_ref(), 1);

    Ok(PunchContext {
        employee_id,
        classification: Some(result.classification),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Assignment, CalendarDay, DayState, Employee, LeaveGrant, LeaveKind, NursingMode,
        NursingSchedule, Schedule,
    };
    use crate::store::InMemoryStore;
    use chrono::{NaiveDate, NaiveTime};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        d(day).and_hms_opt(h, m, 0).unwrap()
    }

    fn schedule(start: u32, end: u32) -> Schedule {
        Schedule {
            expected_start: NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
            expected_end: NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
            tolerance_minutes: 10,
        }
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new()
            .with_calendar_day(CalendarDay {
                date: d(14),
                state: DayState::Working,
                description: String::new(),
            })
            .with_calendar_day(CalendarDay {
                date: d(15),
                state: DayState::NonWorking,
                description: "Holiday".to_string(),
            })
            .with_employee(Employee {
                id: 1,
                dni: "40000001".to_string(),
                full_name: String::new(),
            })
            .with_employee(Employee {
                id: 2,
                dni: "40000002".to_string(),
                full_name: String::new(),
            })
            .with_assignment(
                Assignment {
                    id: 10,
                    employee_id: 1,
                    start_date: d(1),
                    end_date: None,
                },
                schedule(8, 17),
            )
    }

    // ==========================================================================
    // IC-001: known employee on a workday
    // ==========================================================================
    #[test]
    fn test_ic_001_classified_with_schedule() {
        let store = store();

        let entry = classify_in_context(&store, "40000001", at(14, 8, 5)).unwrap();
        let exit = classify_in_context(&store, "40000001", at(14, 17, 0)).unwrap();

        assert_eq!(entry.employee_id, Some(1));
        assert_eq!(entry.classification, Some(PunchClass::Entry));
        assert_eq!(exit.classification, Some(PunchClass::Exit));
    }

    // ==========================================================================
    // IC-002: holidays and missing calendar days are not classified
    // ==========================================================================
    #[test]
    fn test_ic_002_non_working_days_unclassified() {
        let store = store();

        let holiday = classify_in_context(&store, "40000001", at(15, 8, 0)).unwrap();
        let missing = classify_in_context(&store, "40000001", at(16, 8, 0)).unwrap();

        assert_eq!(holiday.employee_id, Some(1));
        assert_eq!(holiday.classification, None);
        assert_eq!(missing.classification, None);
    }

    // ==========================================================================
    // IC-003: unknown employee
    // ==========================================================================
    #[test]
    fn test_ic_003_unknown_employee() {
        let context = classify_in_context(&store(), "99999999", at(14, 8, 0)).unwrap();

        assert_eq!(
            context,
            PunchContext {
                employee_id: None,
                classification: None
            }
        );
    }

    // ==========================================================================
    // IC-004: known employee without assignment is intermediate
    // ==========================================================================
    #[test]
    fn test_ic_004_no_assignment_is_intermediate() {
        let context = classify_in_context(&store(), "40000002", at(14, 8, 0)).unwrap();

        assert_eq!(context.employee_id, Some(2));
        assert_eq!(context.classification, Some(PunchClass::Intermediate));
    }

    // ==========================================================================
    // IC-005: nursing at shift start widens the entry window
    // ==========================================================================
    #[test]
    fn test_ic_005_nursing_widens_entry_window() {
        let nursing = LeaveGrant {
            id: 3,
            kind: LeaveKind::NursingTime,
            start_date: d(1),
            end_date: d(31),
            abbreviation: None,
        };
        let store = store()
            .with_leave(1, nursing)
            .with_nursing_schedule(NursingSchedule {
                grant_id: 3,
                from_date: d(1),
                to_date: d(31),
                mode: NursingMode::ShiftStart,
                daily_minutes: 60,
            });

        let context = classify_in_context(&store, "40000001", at(14, 9, 5)).unwrap();

        assert_eq!(context.classification, Some(PunchClass::Entry));
    }

    #[test]
    fn test_most_recent_assignment_schedule_used() {
        let store = store().with_assignment(
            Assignment {
                id: 11,
                employee_id: 1,
                start_date: d(10),
                end_date: None,
            },
            schedule(14, 22),
        );

        let context = classify_in_context(&store, "40000001", at(14, 17, 0)).unwrap();

        assert_eq!(context.classification, Some(PunchClass::Intermediate));
    }
}
