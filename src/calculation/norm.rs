//! Norm resolution.
//!
//! A contract's weekly norm is evaluated over a norm period: the calendar month
//! or calendar quarter containing the report start date.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::config::{CalculationSettings, last_day_of_month};
use crate::error::{EngineError, EngineResult};
use crate::models::DaySerial;

use super::HolidayCalendar;

/// The length of a norm period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormPeriodKind {
    /// The calendar month.
    Monthly,
    /// The calendar quarter.
    Quarterly,
}

impl NormPeriodKind {
    /// Maps a period length in months to its kind.
    ///
    /// # Example
    ///
    /// ```
    /// use supplement_engine::calculation::NormPeriodKind;
    ///
    /// assert_eq!(NormPeriodKind::from_months("Teknik 37 hours", 3).unwrap(), NormPeriodKind::Quarterly);
    /// assert!(NormPeriodKind::from_months("Teknik 37 hours", 2).is_err());
    /// ```
    pub fn from_months(contract: &str, months: u32) -> EngineResult<Self> {
        match months {
            1 => Ok(NormPeriodKind::Monthly),
            3 => Ok(NormPeriodKind::Quarterly),
            kind => Err(EngineError::UnknownNormPeriodKind {
                contract: contract.to_string(),
                kind,
            }),
        }
    }

    /// Returns the period length in months.
    pub fn months(self) -> u32 {
        match self {
            NormPeriodKind::Monthly => 1,
            NormPeriodKind::Quarterly => 3,
        }
    }

    /// Returns the first and last day of the period containing a date.
    pub fn period_containing(self, date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let months = self.months();
        let first_month = (date.month() - 1) / months * months + 1;
        let last_month = first_month + months - 1;
        let start = NaiveDate::from_ymd_opt(date.year(), first_month, 1)?;
        let end = last_day_of_month(date.year(), last_month)?;
        Some((start, end))
    }
}

/// A contract's norm resolved against a report window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedNorm {
    /// The contract's weekly norm hours.
    pub weekly_norm_hours: f64,
    /// The period kind.
    pub kind: NormPeriodKind,
    /// First day of the norm period.
    pub start: NaiveDate,
    /// Last day of the norm period.
    pub end: NaiveDate,
}

impl ResolvedNorm {
    /// Returns the period start as a day serial.
    pub fn start_serial(&self) -> DaySerial {
        DaySerial::from_date(self.start)
    }

    /// Returns the day after the period end as a day serial.
    pub fn end_exclusive(&self) -> DaySerial {
        DaySerial::from_date(self.end) + 1.0
    }

    /// Returns true if a day serial falls inside the period.
    pub fn contains(&self, value: DaySerial) -> bool {
        value >= self.start_serial() && value < self.end_exclusive()
    }

    /// Returns the norm hours of one working day.
    pub fn daily_norm_hours(&self) -> f64 {
        self.weekly_norm_hours / 5.0
    }

    /// Returns the norm hours expected over the whole period.
    pub fn expected_hours(&self, holidays: &dyn HolidayCalendar) -> f64 {
        self.daily_norm_hours() * f64::from(working_days(self.start, self.end, holidays))
    }
}

/// Resolves a contract's weekly norm and the norm period containing the report start.
///
/// # Errors
///
/// `UnknownContract` if the code has no contract row, `UnknownNormPeriodKind`
/// if the row's period is neither one nor three months.
pub fn resolve_norm(settings: &CalculationSettings, contract_code: &str) -> EngineResult<ResolvedNorm> {
    let terms = settings.contract(contract_code)?;
    let kind = NormPeriodKind::from_months(contract_code, terms.norm_period_months)?;
    let (start, end) = kind
        .period_containing(settings.report_start)
        .ok_or_else(|| EngineError::InvalidSettings {
            field: "report_start".to_string(),
            message: format!("no norm period contains {}", settings.report_start),
        })?;

    Ok(ResolvedNorm {
        weekly_norm_hours: terms.weekly_norm_hours,
        kind,
        start,
        end,
    })
}

/// Counts the days from `start` to `end` inclusive that are neither weekend
/// days nor holidays.
pub fn working_days(start: NaiveDate, end: NaiveDate, holidays: &dyn HolidayCalendar) -> u32 {
    let mut count = 0;
    let mut day = start;
    while day <= end {
        let weekend = matches!(day.weekday(), Weekday::Sat | Weekday::Sun);
        if !weekend && !holidays.is_holiday(day) {
            count += 1;
        }
        day += Duration::days(1);
    }
    count
}
