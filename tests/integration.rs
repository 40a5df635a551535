//! Integration tests for the supplement engine.
//!
//! This test suite covers:
//! - Rest-period rules across consecutive days
//! - Night work and the 50% premium
//! - Report window filtering against the per-row audit output
//! - Contract branching (salaried, part-time, hourly)
//! - Input order independence
//! - The HTTP endpoint and its error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use supplement_engine::api::{AppState, create_router};
use supplement_engine::calculation::{FixedHolidays, SupplementEngine};
use supplement_engine::config::{CalculationSettings, SettingsLoader};
use supplement_engine::models::{
    CalculationOutcome, Column, DaySerial, EventType, PayBasis, PayrollCategory,
    TimesheetEvent,
};

// =============================================================================
// Test Helpers
// =============================================================================

const SALARIED: &str = "Teknik 37 hours";
const PART_TIME: &str = "Teknik 32 hours";
const HOURLY: &str = "Timelønnede";

fn load_settings() -> CalculationSettings {
    SettingsLoader::load("./config/teknik")
        .expect("Failed to load config")
        .into_settings()
}

fn create_router_for_test() -> Router {
    create_router(AppState::with_holidays(load_settings(), FixedHolidays::default()))
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn serial(s: &str) -> DaySerial {
    DaySerial::parse(s).unwrap()
}

fn marker(employee_number: &str, contract: &str, day: &str, event_type: EventType) -> TimesheetEvent {
    TimesheetEvent {
        employee_name: format!("Employee {}", employee_number),
        employee_number: employee_number.to_string(),
        contract_code: contract.to_string(),
        email: String::new(),
        date: serial(day),
        event_type,
        planned_start: None,
        planned_end: None,
        actual_start: None,
        actual_end: None,
    }
}

fn shift(employee_number: &str, contract: &str, day: &str, start: &str, end: &str) -> TimesheetEvent {
    let mut event = marker(employee_number, contract, day, EventType::Shift);
    event.planned_start = Some(serial(start));
    event.planned_end = Some(serial(end));
    event.actual_start = Some(serial(start));
    event.actual_end = Some(serial(end));
    event
}

fn run(settings: &CalculationSettings, events: Vec<TimesheetEvent>) -> CalculationOutcome {
    let holidays = FixedHolidays::default();
    SupplementEngine::new(settings, &holidays)
        .unwrap()
        .run_events(events)
        .unwrap()
}

fn cell(outcome: &CalculationOutcome, employee_number: &str, row: usize, column: Column) -> f64 {
    outcome.rows(employee_number).unwrap()[row]
        .get(column)
        .unwrap_or_else(|| panic!("{} not set on row {}", column, row))
        .number_or_zero()
}

fn assert_hours(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {} hours, got {}",
        expected,
        actual
    );
}

async fn post_calculate(router: Router, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/calculate")
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

fn create_shift_json(employee_number: &str, contract: &str, day: &str, start: &str, end: &str) -> Value {
    json!({
        "employee_number": employee_number,
        "employee_name": "Jens Hansen",
        "contract_code": contract,
        "date": day,
        "event_type": "Vagt",
        "planned_start": start,
        "planned_end": end,
        "actual_start": start,
        "actual_end": end
    })
}

// =============================================================================
// SECTION 1: Rest periods and night work
// =============================================================================

#[test]
fn test_nine_hours_rest_violates_eleven_hour_rule_by_two() {
    let outcome = run(
        &load_settings(),
        vec![
            shift("1001", SALARIED, "2019-09-02", "07:00", "15:00"),
            shift("1001", SALARIED, "2019-09-03", "00:00", "08:00"),
        ],
    );

    assert_hours(cell(&outcome, "1001", 1, Column::ElevenHourRule), 2.0);
    assert_hours(cell(&outcome, "1001", 0, Column::ElevenHourRule), 0.0);
    let line = outcome.line("1001").unwrap();
    assert_eq!(line.hours_for(PayrollCategory::RestViolation11h), decimal("2.00"));
    assert_eq!(line.hours_for(PayrollCategory::RestViolations), decimal("1.00"));
}

#[test]
fn test_shift_inside_night_window_is_all_night() {
    let outcome = run(
        &load_settings(),
        vec![shift("1001", SALARIED, "2019-09-03", "23:30", "05:00")],
    );

    assert_hours(cell(&outcome, "1001", 0, Column::NightHours), 5.5);
    assert_hours(cell(&outcome, "1001", 0, Column::Premium50), 5.5);
    assert_hours(cell(&outcome, "1001", 0, Column::OvertimeHours), 0.0);
    assert_hours(cell(&outcome, "1001", 0, Column::UnplannedSeventhDay), 0.0);
}

#[test]
fn test_long_shift_triggers_thirteen_hour_rule() {
    let outcome = run(
        &load_settings(),
        vec![shift("1001", SALARIED, "2019-09-04", "06:00", "21:30")],
    );
    assert_hours(cell(&outcome, "1001", 0, Column::ThirteenHourRule), 2.5);
    assert_eq!(
        outcome
            .line("1001")
            .unwrap()
            .hours_for(PayrollCategory::RestViolation13h),
        decimal("2.50")
    );
}

// =============================================================================
// SECTION 2: Report window
// =============================================================================

#[test]
fn test_rows_outside_window_stay_in_audit_only() {
    let settings = load_settings().with_report_window(date("2019-09-10"), date("2019-09-20"));
    let outcome = run(
        &settings,
        vec![
            shift("1001", SALARIED, "2019-09-05", "23:00", "05:00"),
            shift("1001", SALARIED, "2019-09-15", "23:00", "05:00"),
            shift("1001", SALARIED, "2019-09-25", "23:00", "05:00"),
        ],
    );

    let line = outcome.line("1001").unwrap();
    assert_eq!(line.hours_for(PayrollCategory::Night), decimal("6.00"));
    assert_eq!(line.hours_for(PayrollCategory::Premium50), decimal("6.00"));

    let rows = outcome.rows("1001").unwrap();
    assert_eq!(rows.len(), 3);
    for row in rows {
        for column in Column::ALL {
            assert!(row.is_set(column), "{} not set", column);
        }
        assert_hours(row.value(Column::NightHours).number_or_zero(), 6.0);
    }
}

#[test]
fn test_window_includes_last_day() {
    let settings = load_settings().with_report_window(date("2019-09-01"), date("2019-09-15"));
    let outcome = run(
        &settings,
        vec![
            shift("1001", SALARIED, "2019-09-01", "23:00", "05:00"),
            shift("1001", SALARIED, "2019-09-15", "23:00", "05:00"),
            shift("1001", SALARIED, "2019-09-16", "23:00", "05:00"),
        ],
    );
    assert_eq!(
        outcome.line("1001").unwrap().hours_for(PayrollCategory::Night),
        decimal("12.00")
    );
    assert_eq!(outcome.line("1001").unwrap().effective_date, date("2019-09-30"));
}

// =============================================================================
// SECTION 3: Contract branching
// =============================================================================

#[test]
fn test_overtime_differs_between_salaried_and_hourly() {
    let late = |number: &str, contract: &str| {
        let mut event = shift(number, contract, "2019-09-02", "07:00", "15:00");
        event.actual_end = Some(serial("17:30"));
        event
    };
    let outcome = run(
        &load_settings(),
        vec![
            late("1001", SALARIED),
            marker("1001", SALARIED, "2019-09-02", EventType::OvertimeNotice),
            late("2001", HOURLY),
            marker("2001", HOURLY, "2019-09-02", EventType::OvertimeNotice),
        ],
    );

    assert_hours(cell(&outcome, "1001", 0, Column::OvertimeHours), 2.5);
    assert_hours(cell(&outcome, "2001", 0, Column::OvertimeHours), 3.1);

    let salaried = outcome.line("1001").unwrap();
    let hourly = outcome.line("2001").unwrap();
    assert_eq!(salaried.pay_basis, PayBasis::Salaried);
    assert_eq!(hourly.pay_basis, PayBasis::Hourly);
    assert!(!salaried.hours.contains_key(&PayrollCategory::Overtime));
    assert_eq!(hourly.hours_for(PayrollCategory::Overtime), decimal("3.10"));
    assert!(!hourly.hours.contains_key(&PayrollCategory::TimeOffInLieu));
}

#[test]
fn test_part_time_norm_uses_contract_hours() {
    let outcome = run(
        &load_settings(),
        vec![
            shift("1001", PART_TIME, "2019-09-02", "07:00", "15:00"),
            marker("1001", PART_TIME, "2019-09-03", EventType::Training),
        ],
    );
    let norm = &outcome.line("1001").unwrap().norm;
    assert_eq!(norm.weekly_norm_hours, decimal("32"));
    // 21 working days of 6.4 hours.
    assert_eq!(norm.expected_hours, decimal("134.40"));
    assert_eq!(norm.worked_hours, decimal("14.40"));
    // 5/37 of the expected hours.
    assert_eq!(norm.part_time_deduction, decimal("18.16"));
}

#[test]
fn test_unknown_contract_aborts_run() {
    let holidays = FixedHolidays::default();
    let settings = load_settings();
    let result = SupplementEngine::new(&settings, &holidays)
        .unwrap()
        .run_events(vec![shift("1001", "Teknik 99 hours", "2019-09-02", "07:00", "15:00")]);
    assert!(result.is_err());
}

// =============================================================================
// SECTION 4: Input order
// =============================================================================

#[test]
fn test_out_of_order_input_matches_sorted_input() {
    let sorted = vec![
        shift("1001", SALARIED, "2019-09-02", "07:00", "15:00"),
        shift("1001", SALARIED, "2019-09-03", "00:00", "08:00"),
        shift("2001", HOURLY, "2019-09-07", "12:00", "22:00"),
        shift("2001", HOURLY, "2019-09-08", "06:00", "14:00"),
    ];
    let shuffled = vec![
        sorted[3].clone(),
        sorted[1].clone(),
        sorted[2].clone(),
        sorted[0].clone(),
    ];

    let settings = load_settings();
    let a = run(&settings, sorted);
    let b = run(&settings, shuffled);
    assert_eq!(a.lines, b.lines);
    assert_eq!(a.audit, b.audit);
}

fn arbitrary_event() -> impl Strategy<Value = TimesheetEvent> {
    let tags = prop::sample::select(vec![
        "Vagt",
        "Vagt",
        "Vagt",
        "Sygdom",
        "Kursus",
        "Ferietimer",
        "Løn: Overtid",
        "Løn: Ikke planlagt/7. dag",
        "Løn: Delt tjeneste",
        "Løn: Varsel",
        "Barsel",
    ]);
    let contracts = prop::sample::select(vec![SALARIED, PART_TIME, HOURLY]);
    (0u32..14, tags, contracts, 0u32..24, 1u32..16).prop_map(
        |(day, tag, contract, start_hour, length)| {
            let day = NaiveDate::from_ymd_opt(2019, 9, 1 + day).unwrap();
            let mut event = marker("1001", contract, &day.to_string(), EventType::parse(tag));
            let start = event.date.plus_days(f64::from(start_hour) / 24.0);
            event.planned_start = Some(start);
            event.planned_end = Some(start.plus_days(f64::from(length) / 24.0));
            event.actual_start = event.planned_start;
            event.actual_end = event.planned_end;
            event
        },
    )
}

proptest! {
    #[test]
    fn prop_every_row_gets_every_column(
        events in prop::collection::vec(arbitrary_event(), 1..10)
    ) {
        let settings = load_settings();
        let holidays = FixedHolidays::default();
        let outcome = SupplementEngine::new(&settings, &holidays)
            .unwrap()
            .run_events(events.clone())
            .unwrap();
        let rows = outcome.rows("1001").unwrap();
        prop_assert_eq!(rows.len(), events.len());
        for row in rows {
            for column in Column::ALL {
                prop_assert!(row.is_set(column));
            }
        }
    }

    #[test]
    fn prop_result_is_independent_of_input_order(
        days in prop::sample::subsequence((1u32..=28).collect::<Vec<_>>(), 1..8),
        seed in any::<u64>()
    ) {
        let events: Vec<TimesheetEvent> = days
            .iter()
            .map(|day| {
                let start = format!("{:02}:00", seed.wrapping_add(u64::from(*day)) % 20);
                let day = NaiveDate::from_ymd_opt(2019, 9, *day).unwrap().to_string();
                shift("1001", HOURLY, &day, &start, "23:30")
            })
            .collect();
        let mut reversed = events.clone();
        reversed.reverse();

        let settings = load_settings();
        let forward = run(&settings, events);
        let backward = run(&settings, reversed);
        prop_assert_eq!(forward.lines, backward.lines);
        prop_assert_eq!(forward.audit, backward.audit);
    }
}

// =============================================================================
// SECTION 5: HTTP API
// =============================================================================

#[tokio::test]
async fn test_api_scenario_through_http() {
    let router = create_router_for_test();
    let request = json!({
        "report_start": "2019-09-01",
        "report_end": "2019-09-30",
        "events": [
            create_shift_json("1001", SALARIED, "2019-09-03", "00:00", "08:00"),
            create_shift_json("1001", SALARIED, "2019-09-02", "07:00", "15:00")
        ]
    });

    let (status, result) = post_calculate(router, request).await;
    assert_eq!(status, StatusCode::OK);

    let outcome: CalculationOutcome = serde_json::from_value(result).unwrap();
    let line = outcome.line("1001").unwrap();
    assert_eq!(line.hours_for(PayrollCategory::RestViolation11h), decimal("2.00"));
    assert_eq!(line.employee_name, "Jens Hansen");
    assert_eq!(outcome.rows("1001").unwrap().len(), 2);
}

#[tokio::test]
async fn test_api_result_contains_required_fields() {
    let router = create_router_for_test();
    let request = json!({
        "events": [create_shift_json("1001", SALARIED, "2019-09-02", "22:00", "06:00")]
    });

    let (status, result) = post_calculate(router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(result["calculation_id"].is_string());
    assert!(result["timestamp"].is_string());
    assert!(result["engine_version"].is_string());
    assert_eq!(result["report_start"], "2019-09-01");
    assert_eq!(result["report_end"], "2019-09-30");
    assert!(result["lines"][0]["pay_codes"].is_array());
    assert!(result["audit"][0]["rows"].is_array());
}

#[tokio::test]
async fn test_api_error_malformed_json() {
    let router = create_router_for_test();
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/calculate")
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_api_error_missing_events_array() {
    let router = create_router_for_test();
    let (status, error) = post_calculate(router, json!({"report_start": "2019-09-01"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_api_error_unknown_contract() {
    let router = create_router_for_test();
    let request = json!({
        "events": [create_shift_json("1001", "Teknik 99 hours", "2019-09-02", "07:00", "15:00")]
    });
    let (status, error) = post_calculate(router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "UNKNOWN_CONTRACT");
}

#[tokio::test]
async fn test_api_error_missing_content_type() {
    let router = create_router_for_test();
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/calculate")
                .body(Body::from(json!({"events": []}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
