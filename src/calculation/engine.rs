//! The calculation run.
//!
//! [`SupplementEngine`] evaluates every employee timeline independently and
//! collects the payroll lines together with the per-row audit data. Any
//! failure aborts the whole run; no partial outcome is returned. Timelines
//! without events produce no line.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::CalculationSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    CalculationOutcome, DerivedRow, EmployeeAudit, EmployeeTimeline, PayrollLine, TimesheetEvent,
    group_timelines,
};

use super::aggregator::{Aggregator, evaluate_timeline};
use super::{HolidayCalendar, RuleCatalog};

/// A shared flag for cancelling a run between two employees.
///
/// # Example
///
/// ```
/// use supplement_engine::calculation::CancellationFlag;
///
/// let flag = CancellationFlag::new();
/// let handle = flag.clone();
/// handle.cancel();
/// assert!(flag.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Creates a flag that is not set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Turns employee timelines into payroll lines under one agreement.
///
/// # Example
///
/// ```
/// use supplement_engine::calculation::{FixedHolidays, SupplementEngine};
/// use supplement_engine::config::SettingsLoader;
///
/// let settings = SettingsLoader::load("./config/teknik").unwrap().into_settings();
/// let holidays = FixedHolidays::default();
/// let engine = SupplementEngine::new(&settings, &holidays).unwrap();
/// let outcome = engine.run(&[]).unwrap();
/// assert!(outcome.lines.is_empty());
/// ```
pub struct SupplementEngine<'a> {
    settings: &'a CalculationSettings,
    holidays: &'a dyn HolidayCalendar,
}

impl<'a> SupplementEngine<'a> {
    /// Creates an engine, validating the settings once.
    pub fn new(
        settings: &'a CalculationSettings,
        holidays: &'a dyn HolidayCalendar,
    ) -> EngineResult<Self> {
        settings.validate()?;
        Ok(Self { settings, holidays })
    }

    /// Runs the calculation over sorted employee timelines.
    pub fn run(&self, timelines: &[EmployeeTimeline]) -> EngineResult<CalculationOutcome> {
        self.run_with_cancellation(timelines, &CancellationFlag::new())
    }

    /// Groups and sorts raw events, then runs the calculation.
    pub fn run_events(&self, events: Vec<TimesheetEvent>) -> EngineResult<CalculationOutcome> {
        self.run(&group_timelines(events))
    }

    /// Runs the calculation, checking the flag before each employee.
    ///
    /// # Errors
    ///
    /// `Cancelled` when the flag is set, or the first error of any employee.
    pub fn run_with_cancellation(
        &self,
        timelines: &[EmployeeTimeline],
        cancellation: &CancellationFlag,
    ) -> EngineResult<CalculationOutcome> {
        let start_time = Instant::now();
        let catalog = RuleCatalog::new(self.settings, self.holidays);
        let aggregator = Aggregator::new(self.settings, self.holidays);

        let mut lines = Vec::with_capacity(timelines.len());
        let mut audit = Vec::with_capacity(timelines.len());
        let mut total_rows = 0;

        for (completed, timeline) in timelines.iter().enumerate() {
            if cancellation.is_cancelled() {
                warn!(completed, "Calculation cancelled");
                return Err(EngineError::Cancelled { completed });
            }
            if timeline.is_empty() {
                debug!(employee_number = %timeline.employee_number(), "Skipping empty timeline");
                continue;
            }

            let (line, rows) = self
                .calculate_employee(&catalog, &aggregator, timeline)
                .inspect_err(|err| {
                    warn!(
                        employee_number = %timeline.employee_number(),
                        error = %err,
                        "Calculation aborted"
                    );
                })?;

            total_rows += rows.len();
            lines.push(line);
            audit.push(EmployeeAudit {
                employee_number: timeline.employee_number().to_string(),
                rows,
            });
        }

        info!(
            employees = lines.len(),
            rows = total_rows,
            report_start = %self.settings.report_start,
            report_end = %self.settings.report_end,
            duration_us = start_time.elapsed().as_micros(),
            "Calculation completed"
        );

        Ok(CalculationOutcome {
            calculation_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            title: self.settings.title.clone(),
            report_start: self.settings.report_start,
            report_end: self.settings.report_end,
            lines,
            audit,
        })
    }

    fn calculate_employee(
        &self,
        catalog: &RuleCatalog<'_>,
        aggregator: &Aggregator<'_>,
        timeline: &EmployeeTimeline,
    ) -> EngineResult<(PayrollLine, Vec<DerivedRow>)> {
        let rows = evaluate_timeline(catalog, timeline)?;
        let line = aggregator.payroll_line(timeline.employee_number(), &rows)?;
        debug!(
            employee_number = %timeline.employee_number(),
            rows = rows.len(),
            pay_codes = line.pay_codes.len(),
            "Employee evaluated"
        );
        Ok((line, rows))
    }
}
