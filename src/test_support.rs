//! Shared fixtures for unit tests.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};

use crate::config::{CalculationSettings, ContractTerms, TimeWindow};
use crate::models::{DaySerial, DerivedRow, EventType, PayBasis, TimesheetEvent};

pub(crate) const SALARIED: &str = "Teknik 37 hours";
pub(crate) const SALARIED_QUARTERLY: &str = "Teknik 37 hours 3 måneder";
pub(crate) const PART_TIME: &str = "Teknik 32 hours";
pub(crate) const HOURLY: &str = "Timelønnede";

pub(crate) fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub(crate) fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub(crate) fn serial(s: &str) -> DaySerial {
    DaySerial::parse(s).unwrap()
}

fn terms(weekly_norm_hours: f64, norm_period_months: u32, pay_basis: PayBasis) -> ContractTerms {
    ContractTerms {
        weekly_norm_hours,
        norm_period_months,
        pay_basis,
    }
}

/// Settings mirroring `config/teknik`, reporting on September 2019.
pub(crate) fn settings() -> CalculationSettings {
    let mut contracts = BTreeMap::new();
    contracts.insert(SALARIED.to_string(), terms(37.0, 1, PayBasis::Salaried));
    contracts.insert(SALARIED_QUARTERLY.to_string(), terms(37.0, 3, PayBasis::Salaried));
    contracts.insert(PART_TIME.to_string(), terms(32.0, 1, PayBasis::Salaried));
    contracts.insert(HOURLY.to_string(), terms(37.0, 1, PayBasis::Hourly));

    CalculationSettings {
        title: "Test".to_string(),
        night_window: TimeWindow::new(time(23, 0), time(6, 0)),
        supplement_a_window: TimeWindow::new(time(14, 0), time(6, 0)),
        supplement_b_window: TimeWindow::new(time(17, 0), time(23, 0)),
        environmental_window: TimeWindow::new(time(22, 0), time(6, 0)),
        hourly_threshold_hours: 7.4,
        max_shift_hours: 13.0,
        min_rest_hours: 11.0,
        norm_reducing_events: "Ferietimer\n  Kursus \n\n".to_string(),
        weekly_standard_hours: 37.0,
        contracts,
        pay_codes: vec![],
        report_start: date("2019-09-01"),
        report_end: date("2019-09-30"),
    }
}

/// An event without times.
pub(crate) fn event(contract: &str, day: &str, event_type: EventType) -> TimesheetEvent {
    TimesheetEvent {
        employee_name: "Test Person".to_string(),
        employee_number: "1001".to_string(),
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

/// A shift worked exactly as planned; times are `HH:MM` on `day`, an end
/// before the start lands on the next day.
pub(crate) fn shift(contract: &str, day: &str, start: &str, end: &str) -> TimesheetEvent {
    worked(contract, day, (start, end), (start, end))
}

/// A shift with separate planned and actual times.
pub(crate) fn worked(
    contract: &str,
    day: &str,
    planned: (&str, &str),
    actual: (&str, &str),
) -> TimesheetEvent {
    let mut e = event(contract, day, EventType::Shift);
    e.planned_start = Some(serial(planned.0));
    e.planned_end = Some(serial(planned.1));
    e.actual_start = Some(serial(actual.0));
    e.actual_end = Some(serial(actual.1));
    e.normalized()
}

pub(crate) fn rows(events: Vec<TimesheetEvent>) -> Vec<DerivedRow> {
    events
        .into_iter()
        .map(|e| DerivedRow::new(e.normalized()))
        .collect()
}

pub(crate) fn assert_hours(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {} hours, got {}",
        expected,
        actual
    );
}
