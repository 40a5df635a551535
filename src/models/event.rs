//! Timesheet events and per-employee timelines.
//!
//! This module defines the raw [`TimesheetEvent`] as delivered by the rostering
//! export, the [`EventType`] tags the rules react to, and the sorted
//! [`EmployeeTimeline`] the engine evaluates.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::DaySerial;

/// The kind of a timesheet event.
///
/// Tags come from an open set; anything not listed here is kept verbatim in
/// [`EventType::Other`].
///
/// # Example
///
/// ```
/// use supplement_engine::models::EventType;
///
/// assert_eq!(EventType::parse("Vagt"), EventType::Shift);
/// assert_eq!(EventType::parse("Barsel"), EventType::Other("Barsel".to_string()));
/// assert_eq!(EventType::OvertimeNotice.label(), "Løn: Overtid");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    /// A worked shift.
    Shift,
    /// Sickness absence.
    Sickness,
    /// Training or course day.
    Training,
    /// Holiday leave hours.
    Leave,
    /// Senior day off.
    SeniorDay,
    /// Pay event announcing that the same day's shift ran into overtime.
    OvertimeNotice,
    /// Pay event marking the same day's shift as unplanned or a 7th working day.
    UnplannedSeventhDay,
    /// Pay event for a split duty.
    SplitDuty,
    /// Pay event for short-notice roster changes.
    NoticePay,
    /// Any other tag.
    Other(String),
}

impl EventType {
    /// Parses a tag as exported by the rostering system.
    pub fn parse(tag: &str) -> Self {
        match tag.trim() {
            "Vagt" => EventType::Shift,
            "Sygdom" => EventType::Sickness,
            "Kursus" => EventType::Training,
            "Ferietimer" => EventType::Leave,
            "Seniordag" => EventType::SeniorDay,
            "Løn: Overtid" => EventType::OvertimeNotice,
            "Løn: Ikke planlagt/7. dag" => EventType::UnplannedSeventhDay,
            "Løn: Delt tjeneste" => EventType::SplitDuty,
            "Løn: Varsel" => EventType::NoticePay,
            other => EventType::Other(other.to_string()),
        }
    }

    /// Returns the tag as exported by the rostering system.
    pub fn label(&self) -> &str {
        match self {
            EventType::Shift => "Vagt",
            EventType::Sickness => "Sygdom",
            EventType::Training => "Kursus",
            EventType::Leave => "Ferietimer",
            EventType::SeniorDay => "Seniordag",
            EventType::OvertimeNotice => "Løn: Overtid",
            EventType::UnplannedSeventhDay => "Løn: Ikke planlagt/7. dag",
            EventType::SplitDuty => "Løn: Delt tjeneste",
            EventType::NoticePay => "Løn: Varsel",
            EventType::Other(tag) => tag,
        }
    }

    /// Returns true for worked shifts.
    pub fn is_shift(&self) -> bool {
        matches!(self, EventType::Shift)
    }
}

impl From<String> for EventType {
    fn from(tag: String) -> Self {
        EventType::parse(&tag)
    }
}

impl From<EventType> for String {
    fn from(event_type: EventType) -> Self {
        event_type.label().to_string()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the rostering export.
///
/// Times may be given as full day-serial values or as bare times of day;
/// [`TimesheetEvent::normalized`] anchors the latter on the event date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimesheetEvent {
    /// The employee's display name.
    #[serde(default)]
    pub employee_name: String,
    /// The employee number used to group events.
    pub employee_number: String,
    /// The contract code looked up in the contract table.
    pub contract_code: String,
    /// The employee's email address.
    #[serde(default)]
    pub email: String,
    /// The day the event belongs to (whole day).
    pub date: DaySerial,
    /// The event tag.
    pub event_type: EventType,
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

impl TimesheetEvent {
    /// Returns the event with all times on the absolute day-serial scale.
    ///
    /// - the date is truncated to midnight
    /// - bare times of day are placed on the event date
    /// - an end before its start is moved to the following day
    pub fn normalized(mut self) -> Self {
        let day = self.date.day();
        let anchor = |time: Option<DaySerial>| {
            time.map(|t| if t.is_time_only() { day + t.value() } else { t })
        };

        self.date = day;
        self.planned_start = anchor(self.planned_start);
        self.planned_end = anchor(self.planned_end);
        self.actual_start = anchor(self.actual_start);
        self.actual_end = anchor(self.actual_end);

        if let (Some(start), Some(end)) = (self.planned_start, self.planned_end) {
            if end < start {
                self.planned_end = Some(end + 1.0);
            }
        }
        if let (Some(start), Some(end)) = (self.start(), self.actual_end) {
            if end < start {
                self.actual_end = Some(end + 1.0);
            }
        }

        self
    }

    /// Returns the actual start, falling back to the planned start.
    pub fn start(&self) -> Option<DaySerial> {
        self.actual_start.or(self.planned_start)
    }

    /// Returns the actual end, falling back to the planned end.
    pub fn end(&self) -> Option<DaySerial> {
        self.actual_end.or(self.planned_end)
    }

    /// Returns the hours between start and end, or zero if either is missing.
    pub fn span_hours(&self) -> f64 {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => start.hours_until(end).max(0.0),
            _ => 0.0,
        }
    }

    /// Returns true when both events fall on the same day.
    pub fn same_date(&self, other: &TimesheetEvent) -> bool {
        self.date.same_day(other.date)
    }
}

/// All events of one employee, sorted ascending by date.
///
/// Sorting is stable, so events sharing a date keep their export order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeTimeline {
    employee_number: String,
    events: Vec<TimesheetEvent>,
}

impl EmployeeTimeline {
    /// Builds a timeline from events in any order.
    pub fn new(employee_number: impl Into<String>, events: Vec<TimesheetEvent>) -> Self {
        let mut events: Vec<TimesheetEvent> =
            events.into_iter().map(TimesheetEvent::normalized).collect();
        events.sort_by(|a, b| a.date.day_number().cmp(&b.date.day_number()));
        Self {
            employee_number: employee_number.into(),
            events,
        }
    }

    /// Builds a timeline from events the caller claims are already sorted.
    ///
    /// Returns `UnsortedTimeline` at the first event dated before its predecessor.
    pub fn from_sorted(
        employee_number: impl Into<String>,
        events: Vec<TimesheetEvent>,
    ) -> EngineResult<Self> {
        let employee_number = employee_number.into();
        let events: Vec<TimesheetEvent> =
            events.into_iter().map(TimesheetEvent::normalized).collect();
        if let Some(row) = events
            .windows(2)
            .position(|pair| pair[1].date.day_number() < pair[0].date.day_number())
        {
            return Err(EngineError::UnsortedTimeline {
                employee_number,
                row: row + 1,
            });
        }
        Ok(Self {
            employee_number,
            events,
        })
    }

    /// Returns the employee number.
    pub fn employee_number(&self) -> &str {
        &self.employee_number
    }

    /// Returns the sorted events.
    pub fn events(&self) -> &[TimesheetEvent] {
        &self.events
    }

    /// Returns the number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true when the timeline has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Groups events by employee number and sorts each group by date.
///
/// Events without an employee number are skipped. Timelines are returned
/// ordered by employee number.
pub fn group_timelines(events: impl IntoIterator<Item = TimesheetEvent>) -> Vec<EmployeeTimeline> {
    let mut grouped: BTreeMap<String, Vec<TimesheetEvent>> = BTreeMap::new();
    for event in events {
        let employee_number = event.employee_number.trim().to_string();
        if employee_number.is_empty() {
            debug!(event_type = %event.event_type, "Skipping event without employee number");
            continue;
        }
        grouped.entry(employee_number).or_default().push(event);
    }

    grouped
        .into_iter()
        .map(|(employee_number, events)| EmployeeTimeline::new(employee_number, events))
        .collect()
}
