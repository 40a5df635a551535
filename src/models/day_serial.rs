//! Spreadsheet-style day-serial timestamps.
//!
//! A [`DaySerial`] counts whole days since 1899-12-30 in its integer part and
//! the time of day as a fraction of 24 hours in its fractional part. Rostering
//! exports deliver every date and time in this form, so all rule arithmetic is
//! done directly on it.

use std::fmt;
use std::ops::{Add, Sub};

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of hours in one day-serial unit.
pub const HOURS_PER_DAY: f64 = 24.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Days from 0001-01-01 (CE day 1) to the spreadsheet epoch 1899-12-30.
const EPOCH_DAYS_FROM_CE: i32 = 693_594;

/// A date/time value expressed as days since the spreadsheet epoch.
///
/// # Example
///
/// ```
/// use supplement_engine::models::DaySerial;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2019, 9, 2).unwrap();
/// let serial = DaySerial::from_date(date);
/// assert_eq!(serial.value(), 43710.0);
/// assert_eq!(serial.to_date(), Some(date));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct DaySerial(pub f64);

impl DaySerial {
    /// Returns the raw serial value.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Converts a calendar date to its serial (midnight).
    pub fn from_date(date: NaiveDate) -> Self {
        DaySerial(f64::from(date.num_days_from_ce() - EPOCH_DAYS_FROM_CE))
    }

    /// Converts a date and time to its serial.
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self::from_date(datetime.date()) + time_fraction(datetime.time())
    }

    /// Parses `YYYY-MM-DD[ HH:MM[:SS]]`, `YYYY-MM-DDTHH:MM[:SS]` or a bare
    /// `HH:MM[:SS]` time of day.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let datetime_formats = [
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M",
        ];
        for format in datetime_formats {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
                return Some(Self::from_datetime(datetime));
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return Some(Self::from_date(date));
        }

        for format in ["%H:%M:%S", "%H:%M"] {
            if let Ok(time) = NaiveTime::parse_from_str(text, format) {
                return Some(DaySerial(time_fraction(time)));
            }
        }

        None
    }

    /// Returns midnight of the day this value falls on.
    pub fn day(self) -> Self {
        DaySerial(self.0.floor())
    }

    /// Returns the whole-day number.
    pub fn day_number(self) -> i64 {
        self.0.floor() as i64
    }

    /// Returns the time of day as a fraction of 24 hours.
    pub fn time_of_day(self) -> f64 {
        self.0 - self.0.floor()
    }

    /// Returns true when the value carries only a time of day.
    pub fn is_time_only(self) -> bool {
        self.0 >= 0.0 && self.0 < 1.0
    }

    /// Returns the value moved by a (possibly fractional) number of days.
    pub fn plus_days(self, days: f64) -> Self {
        DaySerial(self.0 + days)
    }

    /// Returns the hours from `self` until `later` (negative when `later` is earlier).
    pub fn hours_until(self, later: DaySerial) -> f64 {
        (later.0 - self.0) * HOURS_PER_DAY
    }

    /// Returns true when both values fall on the same calendar day.
    pub fn same_day(self, other: DaySerial) -> bool {
        self.day_number() == other.day_number()
    }

    /// Returns the earlier of two values.
    pub fn min(self, other: DaySerial) -> DaySerial {
        if other < self { other } else { self }
    }

    /// Returns the calendar date, if representable.
    pub fn to_date(self) -> Option<NaiveDate> {
        let days = i32::try_from(self.day_number()).ok()?;
        NaiveDate::from_num_days_from_ce_opt(days.checked_add(EPOCH_DAYS_FROM_CE)?)
    }

    /// Returns the date and time (to the second), if representable.
    pub fn to_datetime(self) -> Option<NaiveDateTime> {
        let seconds = (self.time_of_day() * SECONDS_PER_DAY).round() as u32;
        let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds.min(86_399), 0)?;
        Some(self.to_date()?.and_time(time))
    }

    /// Returns the weekday without going through a calendar date.
    ///
    /// Serial day 0 (1899-12-30) is a Saturday.
    pub fn weekday(self) -> Weekday {
        match self.day_number().rem_euclid(7) {
            0 => Weekday::Sat,
            1 => Weekday::Sun,
            2 => Weekday::Mon,
            3 => Weekday::Tue,
            4 => Weekday::Wed,
            5 => Weekday::Thu,
            _ => Weekday::Fri,
        }
    }
}

/// Returns a time of day as a fraction of 24 hours.
pub fn time_fraction(time: NaiveTime) -> f64 {
    f64::from(time.num_seconds_from_midnight()) / SECONDS_PER_DAY
}

impl Add<f64> for DaySerial {
    type Output = DaySerial;

    fn add(self, days: f64) -> DaySerial {
        DaySerial(self.0 + days)
    }
}

impl Sub for DaySerial {
    type Output = f64;

    fn sub(self, other: DaySerial) -> f64 {
        self.0 - other.0
    }
}

impl fmt::Display for DaySerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(datetime) if self.time_of_day() == 0.0 => write!(f, "{}", datetime.date()),
            Some(datetime) => write!(f, "{}", datetime.format("%Y-%m-%d %H:%M")),
            None => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for DaySerial {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> Deserialize<'de> for DaySerial {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Serial(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Serial(value) => Ok(DaySerial(value)),
            Raw::Text(text) => DaySerial::parse(&text).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid date/time '{}'", text))
            }),
        }
    }
}
