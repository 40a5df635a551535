//! Core data models for the supplement engine.
//!
//! This module contains all the domain models used throughout the engine:
//! timesheet input, derived row caches and payroll output.

mod day_serial;
mod derived_row;
mod event;
mod payroll;

pub use day_serial::{DaySerial, HOURS_PER_DAY, time_fraction};
pub use derived_row::{CellValue, Coercion, Column, DerivedRow};
pub use event::{EmployeeTimeline, EventType, TimesheetEvent, group_timelines};
pub use payroll::{
    CalculationOutcome, EmployeeAudit, NormSummary, PayBasis, PayCodeLine, PayrollCategory,
    PayrollLine,
};
