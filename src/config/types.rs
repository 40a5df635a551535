//! Configuration types for the supplement engine.
//!
//! This module contains the strongly-typed settings structures that are
//! deserialized from YAML configuration files and validated once before a
//! calculation run.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EngineError, EngineResult};
use crate::models::{DaySerial, EventType, PayBasis, PayrollCategory, time_fraction};

/// A daily time window, e.g. 23:00–06:00.
///
/// When `end` is not after `start` the window runs into the next day.
///
/// # Example
///
/// ```
/// use supplement_engine::config::TimeWindow;
/// use supplement_engine::models::DaySerial;
/// use chrono::NaiveTime;
///
/// let night = TimeWindow::new(
///     NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
///     NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
/// );
/// let day = DaySerial::parse("2019-09-02").unwrap();
/// let (start, end) = night.on(day);
/// assert_eq!(start, DaySerial::parse("2019-09-02 23:00").unwrap());
/// assert_eq!(end, DaySerial::parse("2019-09-03 06:00").unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window.
    #[serde(with = "time_of_day")]
    pub start: NaiveTime,
    /// End of the window.
    #[serde(with = "time_of_day")]
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Creates a window.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Returns the start as a fraction of a day.
    pub fn start_fraction(&self) -> f64 {
        time_fraction(self.start)
    }

    /// Returns the end as a fraction of a day.
    pub fn end_fraction(&self) -> f64 {
        time_fraction(self.end)
    }

    /// Returns true when the window runs past midnight.
    pub fn wraps(&self) -> bool {
        self.end <= self.start
    }

    /// Returns the window as absolute bounds on the given day.
    pub fn on(&self, day: DaySerial) -> (DaySerial, DaySerial) {
        let day = day.day();
        let end = if self.wraps() {
            day + 1.0 + self.end_fraction()
        } else {
            day + self.end_fraction()
        };
        (day + self.start_fraction(), end)
    }
}

/// Terms of one contract code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractTerms {
    /// Weekly norm hours.
    pub weekly_norm_hours: f64,
    /// Length of the norm period in months (1 = monthly, 3 = quarterly).
    pub norm_period_months: u32,
    /// How the contract is paid.
    #[serde(default)]
    pub pay_basis: PayBasis,
}

/// A pay-code table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayCodeEntry {
    /// The payroll category.
    pub category: PayrollCategory,
    /// The pay basis the code applies to.
    pub basis: PayBasis,
    /// The payroll system's pay code.
    pub code: String,
    /// The sequence number.
    #[serde(default = "default_sequence")]
    pub sequence: u32,
}

fn default_sequence() -> u32 {
    1
}

fn default_max_shift_hours() -> f64 {
    13.0
}

fn default_min_rest_hours() -> f64 {
    11.0
}

/// Settings for one calculation run.
///
/// Loaded from `settings.yaml` (plus `contracts.yaml` and optionally
/// `pay_codes.yaml`) by [`super::SettingsLoader`]; call [`validate`](Self::validate)
/// before handing them to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationSettings {
    /// Title printed on the result.
    pub title: String,
    /// Night window; its start also caps salaried overtime.
    pub night_window: TimeWindow,
    /// Weekend/holiday supplement window.
    pub supplement_a_window: TimeWindow,
    /// Evening supplement window.
    pub supplement_b_window: TimeWindow,
    /// Environmental supplement window.
    pub environmental_window: TimeWindow,
    /// Daily hours an hourly employee works before overtime starts.
    pub hourly_threshold_hours: f64,
    /// Longest shift before the 13-hour rule applies.
    #[serde(default = "default_max_shift_hours")]
    pub max_shift_hours: f64,
    /// Shortest rest between shifts before the 11-hour rule applies.
    #[serde(default = "default_min_rest_hours")]
    pub min_rest_hours: f64,
    /// Event tags, one per line, that count as a full norm day.
    #[serde(default)]
    pub norm_reducing_events: String,
    /// Full-time weekly hours.
    pub weekly_standard_hours: f64,
    /// Contract table, keyed by contract code.
    #[serde(default)]
    pub contracts: BTreeMap<String, ContractTerms>,
    /// Pay-code overrides; empty means the built-in table.
    #[serde(default)]
    pub pay_codes: Vec<PayCodeEntry>,
    /// First reported day.
    pub report_start: NaiveDate,
    /// Last reported day.
    pub report_end: NaiveDate,
}

impl CalculationSettings {
    /// Returns a copy reporting on another window.
    pub fn with_report_window(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            report_start: start,
            report_end: end,
            ..self.clone()
        }
    }

    /// Checks the settings once before a run.
    pub fn validate(&self) -> EngineResult<()> {
        if self.report_end <= self.report_start {
            return Err(EngineError::InvalidReportWindow {
                start: self.report_start,
                end: self.report_end,
            });
        }

        positive("weekly_standard_hours", self.weekly_standard_hours)?;
        positive("max_shift_hours", self.max_shift_hours)?;
        positive("min_rest_hours", self.min_rest_hours)?;
        if self.hourly_threshold_hours.is_nan() || self.hourly_threshold_hours < 0.0 {
            return Err(EngineError::InvalidSettings {
                field: "hourly_threshold_hours".to_string(),
                message: "must not be negative".to_string(),
            });
        }

        for (code, terms) in &self.contracts {
            positive(&format!("contracts.{}.weekly_norm_hours", code), terms.weekly_norm_hours)?;
        }

        Ok(())
    }

    /// Returns the terms of a contract.
    pub fn contract(&self, code: &str) -> EngineResult<&ContractTerms> {
        self.contracts
            .get(code.trim())
            .ok_or_else(|| EngineError::UnknownContract {
                code: code.to_string(),
            })
    }

    /// Returns the configured norm-reducing tags.
    pub fn norm_reducing_tags(&self) -> impl Iterator<Item = &str> {
        self.norm_reducing_events
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }

    /// Returns true if the event type counts as a norm day.
    pub fn is_norm_reducing(&self, event_type: &EventType) -> bool {
        let label = event_type.label();
        self.norm_reducing_tags().any(|tag| tag == label)
    }

    /// Returns the report start as a day serial.
    pub fn report_start_serial(&self) -> DaySerial {
        DaySerial::from_date(self.report_start)
    }

    /// Returns the day after the report end, the exclusive window bound.
    pub fn report_end_exclusive(&self) -> DaySerial {
        DaySerial::from_date(self.report_end) + 1.0
    }

    /// Returns the last day of the month containing the report end.
    pub fn effective_date(&self) -> EngineResult<NaiveDate> {
        last_day_of_month(self.report_end.year(), self.report_end.month()).ok_or_else(|| {
            EngineError::InvalidSettings {
                field: "report_end".to_string(),
                message: format!("no month end for {}", self.report_end),
            }
        })
    }
}

/// Returns the last day of a month.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

fn positive(field: &str, value: f64) -> EngineResult<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidSettings {
            field: field.to_string(),
            message: format!("must be positive, got {}", value),
        })
    }
}

/// `HH:MM` or `HH:MM:SS` times of day.
mod time_of_day {
    use super::*;

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        ["%H:%M", "%H:%M:%S"]
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(text.trim(), format).ok())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid time of day '{}'", text)))
    }
}
