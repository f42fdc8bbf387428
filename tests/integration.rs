//! Integration tests for the Attendance Resolution Engine.
//!
//! This test suite covers the engine end to end:
//! - Resolving single days through the HTTP API
//! - Leave precedence and nursing adjustments
//! - Real-time punch classification
//! - Batch sweeps over an in-memory store
//! - Device ingest feeding the batch driver
//! - Error cases

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Value, json};
use tower::ServiceExt;

use attendance_engine::api::{AppState, create_router};
use attendance_engine::batch::{BatchDriver, DateStatus};
use attendance_engine::config::{ConfigLoader, DeviceConfig, SyncConfig};
use attendance_engine::error::EngineResult;
use attendance_engine::ingest::{DeviceSource, RawPunch, sync_devices};
use attendance_engine::models::{
    Assignment, CalendarDay, DayState, Employee, LeaveGrant, LeaveKind, OutcomeCode, Schedule,
};
use attendance_engine::store::InMemoryStore;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    AppState::new(config)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

async fn post_resolve(body: Value) -> (StatusCode, Value) {
    post_json(create_router_for_test(), "/attendance/resolve", body).await
}

fn create_request(
    day_state: &str,
    start: &str,
    end: &str,
    tolerance: u32,
    punches: Vec<Value>,
) -> Value {
    json!({
        "date": "2025-03-14",
        "day_state": day_state,
        "assignment": { "id": 10, "employee_id": 1, "start_date": "2025-01-01" },
        "schedule": {
            "expected_start": start,
            "expected_end": end,
            "tolerance_minutes": tolerance
        },
        "punches": punches
    })
}

fn punch(time: &str, kind: &str) -> Value {
    json!({ "timestamp": format!("2025-03-14T{}", time), "kind": kind })
}

fn leave(id: u64, type_code: &str) -> Value {
    json!({
        "id": id,
        "type_code": type_code,
        "start_date": "2025-03-10",
        "end_date": "2025-03-20"
    })
}

fn record(result: &Value) -> &Value {
    &result["record"]
}

// =============================================================================
// SECTION 1: Punch evaluation on working days
// =============================================================================

#[tokio::test]
async fn test_arrival_within_tolerance_reports_minutes() {
    // 08:02 in, 17:05 out against 08:00-17:00 with 10 min tolerance
    let body = create_request(
        "working",
        "08:00:00",
        "17:00:00",
        10,
        vec![punch("08:02:00", "entry"), punch("17:05:00", "exit")],
    );

    let (status, result) = post_resolve(body).await;

    assert_eq!(status, StatusCode::OK);
    let record = record(&result);
    assert_eq!(record["observation"], "2");
    assert_eq!(record["minutes_late_within_tolerance"], 2);
    assert_eq!(record["worked_minutes"], 543);
    assert_eq!(record["overtime_minutes"], 5);
    assert_eq!(record["punch_count"], 2);
    assert_eq!(record["punch_times"], "08:02:00,17:05:00");
    assert_eq!(record["is_working_day"], true);
}

#[tokio::test]
async fn test_punctual_day_is_present() {
    let body = create_request(
        "working",
        "08:00:00",
        "17:00:00",
        10,
        vec![punch("07:55:00", "entry"), punch("17:00:00", "exit")],
    );

    let (_, result) = post_resolve(body).await;

    let record = record(&result);
    assert_eq!(record["observation"], "A");
    assert_eq!(record["final_code"], "A");
    assert_eq!(record["worked_minutes"], 545);
}

#[tokio::test]
async fn test_late_beyond_tolerance_with_overtime() {
    // 09:10 in against 09:00 with 5 min tolerance, 18:30 out against 17:30
    let body = create_request(
        "working",
        "09:00:00",
        "17:30:00",
        5,
        vec![punch("09:10:00", "entry"), punch("18:30:00", "exit")],
    );

    let (_, result) = post_resolve(body).await;

    let record = record(&result);
    assert_eq!(record["minutes_late_beyond_tolerance"], 10);
    assert_eq!(record["minutes_late_within_tolerance"], 0);
    assert_eq!(record["overtime_minutes"], 60);
    assert_eq!(record["observation"], "10");
}

#[tokio::test]
async fn test_tolerance_boundary() {
    let just_inside = create_request(
        "working",
        "08:00:00",
        "17:00:00",
        10,
        vec![punch("08:09:59", "entry"), punch("17:00:00", "exit")],
    );
    let at_boundary = create_request(
        "working",
        "08:00:00",
        "17:00:00",
        10,
        vec![punch("08:10:00", "entry"), punch("17:00:00", "exit")],
    );

    let (_, inside) = post_resolve(just_inside).await;
    let (_, boundary) = post_resolve(at_boundary).await;

    assert_eq!(record(&inside)["minutes_late_within_tolerance"], 9);
    assert_eq!(record(&inside)["minutes_late_beyond_tolerance"], 0);
    assert_eq!(record(&boundary)["minutes_late_within_tolerance"], 0);
    assert_eq!(record(&boundary)["minutes_late_beyond_tolerance"], 10);
}

#[tokio::test]
async fn test_no_punches_is_absent() {
    let body = create_request("working", "08:00:00", "17:00:00", 10, vec![]);

    let (_, result) = post_resolve(body).await;

    let record = record(&result);
    assert_eq!(record["observation"], "F");
    assert_eq!(record["punch_count"], 0);
    assert_eq!(record["check_in"], Value::Null);
}

#[tokio::test]
async fn test_missing_exit() {
    let body = create_request(
        "working",
        "08:00:00",
        "17:00:00",
        10,
        vec![punch("08:30:00", "entry"), punch("12:00:00", "unspecified")],
    );

    let (_, result) = post_resolve(body).await;

    let record = record(&result);
    assert_eq!(record["observation"], "30 - FS");
    assert_eq!(record["worked_minutes"], 0);
}

#[tokio::test]
async fn test_missing_entry() {
    let body = create_request(
        "working",
        "08:00:00",
        "17:00:00",
        10,
        vec![punch("17:10:00", "exit")],
    );

    let (_, result) = post_resolve(body).await;

    let record = record(&result);
    assert_eq!(record["observation"], "FI");
    assert_eq!(record["overtime_minutes"], 0);
}

#[tokio::test]
async fn test_holiday_reports_punches_only() {
    let body = create_request(
        "non_working",
        "08:00:00",
        "17:00:00",
        10,
        vec![punch("09:00:00", "entry"), punch("13:00:00", "exit")],
    );

    let (_, result) = post_resolve(body).await;

    let record = record(&result);
    assert_eq!(record["observation"], "");
    assert_eq!(record["punch_count"], 2);
    assert_eq!(record["worked_minutes"], 0);
    assert_eq!(record["is_working_day"], false);
}

// =============================================================================
// SECTION 2: Leave precedence and nursing time
// =============================================================================

#[tokio::test]
async fn test_vacation_on_holiday() {
    let mut body = create_request("non_working", "08:00:00", "17:00:00", 10, vec![]);
    body["leaves"] = json!([leave(1, "VACACIONES")]);

    let (_, result) = post_resolve(body).await;

    let record = record(&result);
    assert_eq!(record["observation"], "V");
    assert_eq!(record["is_working_day"], false);
}

#[tokio::test]
async fn test_unpaid_leave_only_affects_its_assignment() {
    let mut own = create_request("working", "08:00:00", "17:00:00", 10, vec![]);
    let mut lsg = leave(2, "LSG");
    lsg["governing_assignment_id"] = json!(10);
    own["leaves"] = json!([lsg.clone()]);

    let mut other = own.clone();
    lsg["governing_assignment_id"] = json!(11);
    other["leaves"] = json!([lsg]);

    let (_, own_result) = post_resolve(own).await;
    let (_, other_result) = post_resolve(other).await;

    assert_eq!(record(&own_result)["observation"], "LSG");
    assert_eq!(record(&other_result)["observation"], "F");
}

#[tokio::test]
async fn test_other_leave_lowest_id_wins() {
    let mut body = create_request(
        "working",
        "08:00:00",
        "17:00:00",
        10,
        vec![punch("08:00:00", "entry")],
    );
    let mut custom = leave(9, "ENFERMEDAD");
    custom["abbreviation"] = json!("DM");
    body["leaves"] = json!([custom, leave(5, "MATERNIDAD")]);

    let (_, result) = post_resolve(body).await;

    let record = record(&result);
    assert_eq!(record["observation"], "MAT");
    assert_eq!(record["punch_count"], 1);
    assert_eq!(record["check_in"], Value::Null);
}

#[tokio::test]
async fn test_leave_outside_assignment_window_ignored() {
    let mut body = create_request("working", "08:00:00", "17:00:00", 10, vec![]);
    body["assignment"]["start_date"] = json!("2025-03-12");
    body["leaves"] = json!([leave(1, "VACACIONES")]);

    let (_, result) = post_resolve(body).await;

    assert_eq!(record(&result)["observation"], "F");
}

#[tokio::test]
async fn test_nursing_shift_start() {
    let mut body = create_request(
        "working",
        "08:00:00",
        "17:00:00",
        10,
        vec![punch("08:35:00", "entry"), punch("17:00:00", "exit")],
    );
    body["leaves"] = json!([leave(4, "LACTANCIA")]);
    body["nursing_schedules"] = json!([{
        "grant_id": 4,
        "from_date": "2025-03-01",
        "to_date": "2025-03-31",
        "mode": "shift_start",
        "daily_minutes": 30
    }]);

    let (_, result) = post_resolve(body).await;

    let record = record(&result);
    assert_eq!(record["observation"], "5");
    assert_eq!(record["nursing_minutes"], 30);
    assert_eq!(record["nursing_mode"], "shift_start");
}

#[tokio::test]
async fn test_nursing_shift_end_moves_overtime() {
    let mut body = create_request(
        "working",
        "08:00:00",
        "17:00:00",
        10,
        vec![punch("08:00:00", "entry"), punch("16:30:00", "exit")],
    );
    body["leaves"] = json!([leave(4, "LACTANCIA")]);
    body["nursing_schedules"] = json!([{
        "grant_id": 4,
        "from_date": "2025-03-01",
        "to_date": "2025-03-31",
        "mode": "shift_end",
        "daily_minutes": 60
    }]);

    let (_, result) = post_resolve(body).await;

    let record = record(&result);
    assert_eq!(record["observation"], "A");
    assert_eq!(record["overtime_minutes"], 30);
}

// =============================================================================
// SECTION 3: Real-time classification
// =============================================================================

#[tokio::test]
async fn test_classify_with_nursing_start() {
    let body = json!({
        "time": "08:20:00",
        "schedule": {
            "expected_start": "08:00:00",
            "expected_end": "17:00:00",
            "tolerance_minutes": 10
        },
        "nursing": {
            "grant_id": 4,
            "from_date": "2025-03-01",
            "to_date": "2025-03-31",
            "mode": "shift_start",
            "daily_minutes": 30
        }
    });

    let (status, result) = post_json(create_router_for_test(), "/punches/classify", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["classification"], "entry");
    assert_eq!(result["entry_limit"], "08:40:00");
}

// =============================================================================
// SECTION 4: Error cases
// =============================================================================

#[tokio::test]
async fn test_blank_leave_code_rejected() {
    let mut body = create_request("working", "08:00:00", "17:00:00", 10, vec![]);
    body["leaves"] = json!([leave(1, " ")]);

    let (status, result) = post_resolve(body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "INVALID_LEAVE");
}

#[tokio::test]
async fn test_unknown_day_state_rejected() {
    let body = create_request("weekend", "08:00:00", "17:00:00", 10, vec![]);

    let (status, result) = post_resolve(body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_identical_requests_identical_records() {
    let body = create_request(
        "working",
        "08:00:00",
        "17:00:00",
        10,
        vec![punch("17:05:00", "exit"), punch("08:12:00", "entry")],
    );

    let (_, first) = post_resolve(body.clone()).await;
    let (_, second) = post_resolve(body).await;

    assert_eq!(first["record"], second["record"]);
    assert_eq!(first["audit_trace"], second["audit_trace"]);
}

// =============================================================================
// SECTION 5: Batch and ingest over the in-memory store
// =============================================================================

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
}

fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
    d(day).and_hms_opt(h, m, 0).unwrap()
}

fn seeded_store() -> InMemoryStore {
    let schedule = Schedule {
        expected_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        expected_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        tolerance_minutes: 10,
    };

    InMemoryStore::new()
        .with_calendar_day(CalendarDay {
            date: d(13),
            state: DayState::Working,
            description: String::new(),
        })
        .with_calendar_day(CalendarDay {
            date: d(14),
            state: DayState::Working,
            description: String::new(),
        })
        .with_employee(Employee {
            id: 1,
            dni: "04512783".to_string(),
            full_name: "Ana Torres".to_string(),
        })
        .with_assignment(
            Assignment {
                id: 10,
                employee_id: 1,
                start_date: d(1),
                end_date: None,
            },
            schedule,
        )
}

struct StaticClock {
    punches: Vec<RawPunch>,
}

impl DeviceSource for StaticClock {
    async fn fetch_punches(&self, _device: &DeviceConfig) -> EngineResult<Vec<RawPunch>> {
        Ok(self.punches.clone())
    }
}

#[tokio::test]
async fn test_ingest_then_batch() {
    let store = Arc::new(seeded_store());
    let clock = Arc::new(StaticClock {
        punches: vec![
            RawPunch {
                user_id: "4512783".to_string(),
                timestamp: at(14, 8, 4),
            },
            RawPunch {
                user_id: "4512783".to_string(),
                timestamp: at(14, 17, 15),
            },
        ],
    });
    let config = SyncConfig {
        retry_delay_ms: 1,
        ..SyncConfig::default()
    };
    let devices = vec![DeviceConfig {
        id: "clock1".to_string(),
        ip: "127.0.0.1".to_string(),
        port: 4370,
    }];

    let sync = sync_devices(clock, Arc::clone(&store), &config, &devices).await;
    assert_eq!(sync.inserted, 2);

    let driver = BatchDriver::new(Arc::clone(&store));
    let report = driver.process_range(d(13), d(15), Some("4512783")).unwrap();

    assert_eq!(report.total_written, 2);
    assert_eq!(report.dates[2].status, DateStatus::SkippedNoCalendar);

    let absent = store.record(10, d(13)).unwrap().unwrap();
    let late = store.record(10, d(14)).unwrap().unwrap();
    assert_eq!(absent.observation, OutcomeCode::Absent);
    assert_eq!(late.observation, OutcomeCode::Late(4));
    assert_eq!(late.overtime_minutes, 15);
    assert_eq!(late.worked_minutes, 551);
}

#[tokio::test]
async fn test_batch_vacation_overrides_ingested_punches() {
    let vacation = LeaveGrant {
        id: 1,
        kind: LeaveKind::Vacation,
        start_date: d(14),
        end_date: d(14),
        abbreviation: None,
    };
    let store = Arc::new(seeded_store().with_leave(1, vacation));

    let driver = BatchDriver::new(Arc::clone(&store));
    driver.process_range(d(14), d(14), None).unwrap();

    let record = store.record(10, d(14)).unwrap().unwrap();
    assert_eq!(record.observation, OutcomeCode::Vacation);
    assert_eq!(record.final_code, OutcomeCode::Vacation);
}
