//! Day classification and window overlap.
//!
//! Supplement rules pay different windows depending on whether a shift falls
//! on a weekday, a Saturday, a Sunday or a public holiday. This module
//! classifies days and measures how much of a shift falls inside a window.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::models::{DaySerial, HOURS_PER_DAY};

use super::HolidayCalendar;

/// The class of a calendar day for supplement purposes.
///
/// # Example
///
/// ```
/// use supplement_engine::calculation::{DayClass, FixedHolidays, classify_day};
/// use supplement_engine::models::DaySerial;
///
/// let holidays = FixedHolidays::default();
/// // 2019-09-07 is a Saturday
/// let saturday = DaySerial::parse("2019-09-07").unwrap();
/// assert_eq!(classify_day(saturday, &holidays), DayClass::Saturday);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayClass {
    /// Monday through Friday.
    Weekday,
    /// Saturday.
    Saturday,
    /// Sunday.
    Sunday,
    /// A public holiday, whatever the weekday.
    Holiday,
}

impl std::fmt::Display for DayClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayClass::Weekday => write!(f, "Weekday"),
            DayClass::Saturday => write!(f, "Saturday"),
            DayClass::Sunday => write!(f, "Sunday"),
            DayClass::Holiday => write!(f, "Holiday"),
        }
    }
}

/// Classifies the day a serial value falls on.
///
/// Holidays take precedence over the weekday. A day serial outside the
/// calendar range is classified by weekday alone.
pub fn classify_day(day: DaySerial, holidays: &dyn HolidayCalendar) -> DayClass {
    if is_holiday(day, holidays) {
        return DayClass::Holiday;
    }
    match day.weekday() {
        Weekday::Sat => DayClass::Saturday,
        Weekday::Sun => DayClass::Sunday,
        _ => DayClass::Weekday,
    }
}

/// Returns true if the day a serial value falls on is a public holiday.
pub fn is_holiday(day: DaySerial, holidays: &dyn HolidayCalendar) -> bool {
    day.to_date().is_some_and(|date| holidays.is_holiday(date))
}

/// Returns the hours of `[start, end)` that fall inside `[window_start, window_end)`.
///
/// # Example
///
/// ```
/// use supplement_engine::calculation::overlap_hours;
/// use supplement_engine::models::DaySerial;
///
/// let start = DaySerial::parse("2019-09-02 20:00").unwrap();
/// let end = DaySerial::parse("2019-09-03 04:00").unwrap();
/// let window_start = DaySerial::parse("2019-09-02 23:00").unwrap();
/// let window_end = DaySerial::parse("2019-09-03 06:00").unwrap();
/// assert!((overlap_hours(start, end, window_start, window_end) - 5.0).abs() < 1e-9);
/// ```
pub fn overlap_hours(
    start: DaySerial,
    end: DaySerial,
    window_start: DaySerial,
    window_end: DaySerial,
) -> f64 {
    let from = if start > window_start { start } else { window_start };
    let to = if end < window_end { end } else { window_end };
    ((to - from) * HOURS_PER_DAY).max(0.0)
}
