//! Public holiday calendars.
//!
//! Rules only ask one question of a calendar: is this date a public holiday?
//! [`DanishHolidays`] answers it for the Danish calendar; [`FixedHolidays`]
//! answers it from an explicit list.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};

/// A pure, year-stable holiday lookup.
pub trait HolidayCalendar: Send + Sync {
    /// Returns true if the date is a public holiday.
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

/// Danish public holidays.
///
/// Movable feasts are derived from Easter Sunday. General Prayer Day was
/// abolished from 2024 and is only returned for earlier years.
///
/// # Example
///
/// ```
/// use supplement_engine::calculation::{DanishHolidays, HolidayCalendar};
/// use chrono::NaiveDate;
///
/// let calendar = DanishHolidays;
/// assert!(calendar.is_holiday(NaiveDate::from_ymd_opt(2019, 4, 19).unwrap())); // Good Friday
/// assert!(!calendar.is_holiday(NaiveDate::from_ymd_opt(2019, 4, 23).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DanishHolidays;

impl DanishHolidays {
    /// Returns the holidays of a year with their Danish names.
    pub fn holidays(year: i32) -> Vec<(NaiveDate, &'static str)> {
        let mut holidays = Vec::with_capacity(12);

        if let Some(new_year) = NaiveDate::from_ymd_opt(year, 1, 1) {
            holidays.push((new_year, "nytårsdag"));
        }

        if let Some(easter) = easter_sunday(year) {
            let movable: [(i64, &'static str); 9] = [
                (-7, "palmesøndag"),
                (-3, "skærtorsdag"),
                (-2, "langfredag"),
                (0, "påskedag"),
                (1, "2. påskedag"),
                (26, "store bededag"),
                (39, "kristi himmelfartsdag"),
                (49, "pinsedag"),
                (50, "2. pinsedag"),
            ];
            for (offset, name) in movable {
                if name == "store bededag" && year >= 2024 {
                    continue;
                }
                holidays.push((easter + Duration::days(offset), name));
            }
        }

        for (day, name) in [(25, "juledag"), (26, "2. juledag")] {
            if let Some(date) = NaiveDate::from_ymd_opt(year, 12, day) {
                holidays.push((date, name));
            }
        }

        holidays
    }

    /// Returns the name of the holiday on a date, if any.
    pub fn holiday_name(date: NaiveDate) -> Option<&'static str> {
        Self::holidays(date.year())
            .into_iter()
            .find(|(holiday, _)| *holiday == date)
            .map(|(_, name)| name)
    }
}

impl HolidayCalendar for DanishHolidays {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        Self::holiday_name(date).is_some()
    }
}

/// Holidays from an explicit list of dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedHolidays {
    dates: BTreeSet<NaiveDate>,
}

impl FixedHolidays {
    /// Creates a calendar from dates.
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }
}

impl HolidayCalendar for FixedHolidays {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

/// Easter Sunday in the Gregorian calendar (anonymous Gregorian algorithm).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
}
