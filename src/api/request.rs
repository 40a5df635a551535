//! Request types for the supplement engine API.
//!
//! This module defines the JSON request structures for the `/calculate` endpoint.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{DaySerial, EventType, TimesheetEvent};

/// Request body for the `/calculate` endpoint.
///
/// The agreement settings come from the server; a request only chooses the
/// report window and supplies the timesheet events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// First reported day; defaults to the configured report start.
    #[serde(default)]
    pub report_start: Option<NaiveDate>,
    /// Last reported day; defaults to the configured report end.
    #[serde(default)]
    pub report_end: Option<NaiveDate>,
    /// Public holidays to use instead of the server's calendar.
    #[serde(default)]
    pub public_holidays: Vec<NaiveDate>,
    /// Timesheet events of any number of employees, in any order.
    pub events: Vec<EventRequest>,
}

/// One timesheet event in a calculation request.
///
/// Dates and times are day-serial numbers or `YYYY-MM-DD[ HH:MM]` strings;
/// times may also be bare `HH:MM` values on the event date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRequest {
    /// The employee number.
    pub employee_number: String,
    /// The employee's display name.
    #[serde(default)]
    pub employee_name: String,
    /// The contract code.
    pub contract_code: String,
    /// The employee's email address.
    #[serde(default)]
    pub email: String,
    /// The day of the event.
    pub date: DaySerial,
    /// The event tag as exported by the rostering system.
    pub event_type: String,
    /// Rostered start.
    #[serde(default)]
    pub planned_start: Option<DaySerial>,
    /// Rostered end.
    #[serde(default)]
    pub planned_end: Option<DaySerial>,
    /// Registered start.
    #[serde(default)]
    pub actual_start: Option<DaySerial>,
    /// Registered end.
    #[serde(default)]
    pub actual_end: Option<DaySerial>,
}

impl From<EventRequest> for TimesheetEvent {
    fn from(req: EventRequest) -> Self {
        TimesheetEvent {
            employee_name: req.employee_name,
            employee_number: req.employee_number,
            contract_code: req.contract_code,
            email: req.email,
            date: req.date,
            event_type: EventType::parse(&req.event_type),
            planned_start: req.planned_start,
            planned_end: req.planned_end,
            actual_start: req.actual_start,
            actual_end: req.actual_end,
        }
        .normalized()
    }
}
