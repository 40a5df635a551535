//! The rule catalog.
//!
//! Every derived column has exactly one producer here. Producers read the
//! current row, up to two rows on either side, the agreement settings and the
//! holiday calendar; they pull the columns they depend on through
//! [`RuleCatalog::evaluate`], so any column can be requested in any order as
//! long as the cross-row columns of earlier rows are already settled.

use crate::config::{CalculationSettings, TimeWindow};
use crate::error::EngineResult;
use crate::models::{CellValue, Coercion, Column, DaySerial, EventType, PayBasis, TimesheetEvent};

use super::day_class::{DayClass, classify_day, overlap_hours};
use super::{HolidayCalendar, RowCursor};

/// Share of the hours inside the environmental window that is paid out.
pub const ENVIRONMENTAL_SUPPLEMENT_RATE: f64 = 0.10;

/// Tolerance for hour thresholds.
pub const EPSILON_HOURS: f64 = 1e-6;

/// Marker stored in the overtime flag column.
pub const OVERTIME_TAG: &str = "overtime";

/// Offsets of the rows a same-day pay event may sit on.
const SAME_DAY_OFFSETS: [isize; 4] = [-2, -1, 1, 2];

/// What the producers need from the current row, copied off the cursor so
/// dependencies can be pulled while it is in scope.
struct RowFacts {
    event_type: EventType,
    contract_code: String,
    date: DaySerial,
    start: Option<DaySerial>,
    end: Option<DaySerial>,
    planned_end: Option<DaySerial>,
    span_hours: f64,
}

impl RowFacts {
    fn of(event: &TimesheetEvent) -> Self {
        Self {
            event_type: event.event_type.clone(),
            contract_code: event.contract_code.clone(),
            date: event.date,
            start: event.start(),
            end: event.end(),
            planned_end: event.planned_end,
            span_hours: event.span_hours(),
        }
    }

    fn is_shift(&self) -> bool {
        self.event_type.is_shift()
    }

    fn shift_bounds(&self) -> Option<(DaySerial, DaySerial)> {
        if !self.is_shift() {
            return None;
        }
        Some((self.start?, self.end?))
    }
}

/// The supplement rules of one agreement.
///
/// # Example
///
/// ```
/// use supplement_engine::calculation::{FixedHolidays, RowCursor, RuleCatalog};
/// use supplement_engine::config::SettingsLoader;
/// use supplement_engine::models::{Column, DaySerial, DerivedRow, EventType, TimesheetEvent};
///
/// let settings = SettingsLoader::load("./config/teknik").unwrap().into_settings();
/// let holidays = FixedHolidays::default();
/// let catalog = RuleCatalog::new(&settings, &holidays);
///
/// let event = TimesheetEvent {
///     employee_name: "Jens Hansen".to_string(),
///     employee_number: "1001".to_string(),
///     contract_code: "Teknik 37 hours".to_string(),
///     email: String::new(),
///     date: DaySerial::parse("2019-09-02").unwrap(),
///     event_type: EventType::Shift,
///     planned_start: DaySerial::parse("2019-09-02 22:00"),
///     planned_end: DaySerial::parse("2019-09-03 06:00"),
///     actual_start: None,
///     actual_end: None,
/// };
/// let mut cursor = RowCursor::new(vec![DerivedRow::new(event)]);
/// cursor.advance();
/// let night = catalog.evaluate(&mut cursor, Column::NightHours).unwrap();
/// assert!((night.number_or_zero() - 7.0).abs() < 1e-6);
/// ```
pub struct RuleCatalog<'a> {
    settings: &'a CalculationSettings,
    holidays: &'a dyn HolidayCalendar,
}

impl<'a> RuleCatalog<'a> {
    /// Creates a catalog over validated settings.
    pub fn new(settings: &'a CalculationSettings, holidays: &'a dyn HolidayCalendar) -> Self {
        Self { settings, holidays }
    }

    /// Returns the settings the rules read.
    pub fn settings(&self) -> &CalculationSettings {
        self.settings
    }

    /// Returns how a column's produced value is stored.
    pub fn coercion(column: Column) -> Coercion {
        match column {
            Column::OvertimeFlag | Column::DayBefore | Column::NoticePay | Column::SplitDuty => {
                Coercion::Mixed
            }
            Column::RestViolations => Coercion::Int,
            _ => Coercion::Float,
        }
    }

    /// Returns a column of the cursor's current row, computing it if needed.
    pub fn evaluate(&self, cursor: &mut RowCursor, column: Column) -> EngineResult<CellValue> {
        cursor.calculate_column(column, Self::coercion(column), |c| self.produce(c, column))
    }

    fn produce(&self, c: &mut RowCursor, column: Column) -> EngineResult<CellValue> {
        match column {
            Column::WorkedHours => self.worked_hours(c),
            Column::OvertimeFlag => self.overtime_flag(c),
            Column::OvertimeHours => self.overtime_hours(c),
            Column::NightHours => self.night_hours(c),
            Column::UnplannedSeventhDay => self.unplanned_seventh_day(c),
            Column::SupplementA => self.supplement_a(c),
            Column::SupplementB => self.supplement_b(c),
            Column::Environmental => self.environmental(c),
            Column::ThirteenHourRule => self.thirteen_hour_rule(c),
            Column::ElevenHourRule => self.eleven_hour_rule(c),
            Column::DayBefore => self.day_before(c),
            Column::Premium100 => self.premium_100(c),
            Column::Premium50 => self.premium_50(c),
            Column::NoticePay => unit_if(c, &EventType::NoticePay),
            Column::SplitDuty => unit_if(c, &EventType::SplitDuty),
            Column::RestViolations => self.rest_violations(c),
        }
    }

    fn hours(&self, c: &mut RowCursor, column: Column) -> EngineResult<f64> {
        Ok(self.evaluate(c, column)?.number_or_zero())
    }

    fn worked_hours(&self, c: &mut RowCursor) -> EngineResult<CellValue> {
        let event = c.event()?;
        let hours = match &event.event_type {
            EventType::Shift => event.span_hours(),
            EventType::Sickness if event.actual_end.is_some() => event.span_hours(),
            other if self.settings.is_norm_reducing(other) => {
                self.settings.contract(&event.contract_code)?.weekly_norm_hours / 5.0
            }
            _ => 0.0,
        };
        Ok(hours.into())
    }

    fn overtime_flag(&self, c: &mut RowCursor) -> EngineResult<CellValue> {
        if same_day_pay_event(c, &EventType::OvertimeNotice)? {
            Ok(CellValue::Tag(OVERTIME_TAG.to_string()))
        } else {
            Ok(CellValue::Empty)
        }
    }

    fn overtime_hours(&self, c: &mut RowCursor) -> EngineResult<CellValue> {
        let row = RowFacts::of(c.event()?);
        let (Some(planned_end), Some((_, end))) = (row.planned_end, row.shift_bounds()) else {
            return Ok(0.0.into());
        };
        if end <= planned_end {
            return Ok(0.0.into());
        }

        let hours = match self.settings.contract(&row.contract_code)?.pay_basis {
            PayBasis::Salaried => {
                if !self.evaluate(c, Column::OvertimeFlag)?.is_tag() {
                    return Ok(0.0.into());
                }
                let night = self.settings.night_window;
                let cap = window_start_containing(night, planned_end).unwrap_or_else(|| {
                    next_after(row.date + night.start_fraction(), planned_end)
                });
                planned_end.hours_until(end.min(cap)).max(0.0)
            }
            PayBasis::Hourly => {
                let worked = self.hours(c, Column::WorkedHours)?;
                let threshold = self.settings.hourly_threshold_hours;
                if worked <= threshold + EPSILON_HOURS {
                    0.0
                } else if end <= row.date + 1.0 {
                    worked - threshold
                } else {
                    let night = self.hours(c, Column::NightHours)?;
                    (worked - threshold - night).max(0.0)
                }
            }
        };
        Ok(hours.into())
    }

    fn night_hours(&self, c: &mut RowCursor) -> EngineResult<CellValue> {
        let row = RowFacts::of(c.event()?);
        let Some((start, end)) = row.shift_bounds() else {
            return Ok(0.0.into());
        };
        if self.hours(c, Column::UnplannedSeventhDay)? > 0.0 {
            return Ok(0.0.into());
        }

        let hours = window_hours(self.settings.night_window, row.date, start, end);
        Ok(hours.into())
    }

    fn unplanned_seventh_day(&self, c: &mut RowCursor) -> EngineResult<CellValue> {
        let row = RowFacts::of(c.event()?);
        if !row.is_shift() || !same_day_pay_event(c, &EventType::UnplannedSeventhDay)? {
            return Ok(0.0.into());
        }
        Ok(row.span_hours.into())
    }

    fn supplement_a(&self, c: &mut RowCursor) -> EngineResult<CellValue> {
        let row = RowFacts::of(c.event()?);
        let Some((start, end)) = row.shift_bounds() else {
            return Ok(0.0.into());
        };

        let window = self.settings.supplement_a_window;
        let day = row.date;
        let rest_day = |d: DaySerial| {
            matches!(
                classify_day(d, self.holidays),
                DayClass::Sunday | DayClass::Holiday
            )
        };
        let (today, tomorrow, yesterday) = (rest_day(day), rest_day(day + 1.0), rest_day(day.plus_days(-1.0)));

        // The supplement runs from the window start on the eve of a Sunday or
        // holiday until the window end on the morning after it.
        let from = if today {
            day
        } else if tomorrow {
            day + window.start_fraction()
        } else if yesterday {
            day
        } else {
            return Ok(0.0.into());
        };
        let to = if tomorrow {
            day + 2.0 + window.end_fraction()
        } else if today {
            day + 1.0 + window.end_fraction()
        } else {
            day + window.end_fraction()
        };

        Ok(overlap_hours(start, end, from, to).into())
    }

    fn supplement_b(&self, c: &mut RowCursor) -> EngineResult<CellValue> {
        let row = RowFacts::of(c.event()?);
        let Some((start, end)) = row.shift_bounds() else {
            return Ok(0.0.into());
        };

        let (from, to) = self.settings.supplement_b_window.on(row.date);
        let hours = match classify_day(row.date, self.holidays) {
            DayClass::Sunday | DayClass::Holiday => 0.0,
            DayClass::Saturday => overlap_hours(start, end, from, to.min(row.date + 1.0)),
            DayClass::Weekday => overlap_hours(start, end, from, to),
        };
        Ok(hours.into())
    }

    fn environmental(&self, c: &mut RowCursor) -> EngineResult<CellValue> {
        let row = RowFacts::of(c.event()?);
        let Some((start, end)) = row.shift_bounds() else {
            return Ok(0.0.into());
        };
        let hours = window_hours(self.settings.environmental_window, row.date, start, end);
        Ok((hours * ENVIRONMENTAL_SUPPLEMENT_RATE).into())
    }

    fn thirteen_hour_rule(&self, c: &mut RowCursor) -> EngineResult<CellValue> {
        if !c.event()?.event_type.is_shift() {
            return Ok(0.0.into());
        }
        let worked = self.hours(c, Column::WorkedHours)?;
        let max = self.settings.max_shift_hours;
        if worked > max + EPSILON_HOURS {
            Ok((worked - max).into())
        } else {
            Ok(0.0.into())
        }
    }

    fn eleven_hour_rule(&self, c: &mut RowCursor) -> EngineResult<CellValue> {
        let row = RowFacts::of(c.event()?);
        let Some((start, _)) = row.shift_bounds() else {
            return Ok(0.0.into());
        };

        // The previous shift, looking past one non-shift row.
        let previous = [-1, -2]
            .into_iter()
            .filter_map(|offset| c.neighbor_event(offset))
            .find(|event| event.event_type.is_shift());
        let Some(previous) = previous else {
            return Ok(0.0.into());
        };
        if previous.date.day_number() != row.date.day_number() - 1 {
            return Ok(0.0.into());
        }
        let Some(previous_end) = previous.end() else {
            return Ok(0.0.into());
        };

        let rest = previous_end.hours_until(start).max(0.0);
        let min = self.settings.min_rest_hours;
        if rest < min - EPSILON_HOURS {
            Ok((min - rest).into())
        } else {
            Ok(0.0.into())
        }
    }

    fn day_before(&self, c: &mut RowCursor) -> EngineResult<CellValue> {
        let today = c.event()?.date.day_number();
        let Some(previous) = c.neighbor_event(-1) else {
            return Ok(CellValue::Empty);
        };

        let previous_day = previous.date.day_number();
        if previous_day == today {
            return c.neighbor(Column::DayBefore, -1);
        }
        if previous_day != today - 1 {
            return Ok(0.0.into());
        }

        let mut carry: f64 = 0.0;
        for offset in [-1, -2] {
            let yesterday = c
                .neighbor_event(offset)
                .is_some_and(|event| event.date.day_number() == today - 1);
            if yesterday {
                carry = carry.max(c.neighbor(Column::ThirteenHourRule, offset)?.number_or_zero());
            }
        }
        Ok(carry.into())
    }

    fn premium_100(&self, c: &mut RowCursor) -> EngineResult<CellValue> {
        let eleven = self.hours(c, Column::ElevenHourRule)?;
        let thirteen = self.hours(c, Column::ThirteenHourRule)?;

        let hours = match (eleven > 0.0, thirteen > 0.0) {
            (false, false) => 0.0,
            (true, false) => eleven,
            (false, true) => thirteen,
            (true, true) => match self.evaluate(c, Column::DayBefore)? {
                CellValue::Number(carry) if carry > 0.0 => (eleven - carry).max(thirteen),
                // No carry-over, whether zero or absent.
                _ => eleven + thirteen,
            },
        };
        Ok(hours.into())
    }

    fn premium_50(&self, c: &mut RowCursor) -> EngineResult<CellValue> {
        if !c.event()?.event_type.is_shift() {
            return Ok(0.0.into());
        }
        let overtime = self.hours(c, Column::OvertimeHours)?;
        let night = self.hours(c, Column::NightHours)?;
        let unplanned = self.hours(c, Column::UnplannedSeventhDay)?;
        let premium_100 = self.hours(c, Column::Premium100)?;
        Ok((overtime + night + unplanned - premium_100).max(0.0).into())
    }

    fn rest_violations(&self, c: &mut RowCursor) -> EngineResult<CellValue> {
        let eleven = self.hours(c, Column::ElevenHourRule)?;
        let thirteen = self.hours(c, Column::ThirteenHourRule)?;
        let count = if eleven > 0.0 || thirteen > 0.0 { 1.0 } else { 0.0 };
        Ok(count.into())
    }
}

/// Returns true if a row within two positions on the same date carries the tag.
fn same_day_pay_event(c: &RowCursor, event_type: &EventType) -> EngineResult<bool> {
    let event = c.event()?;
    Ok(SAME_DAY_OFFSETS.into_iter().any(|offset| {
        c.neighbor_event(offset)
            .is_some_and(|other| other.same_date(event) && other.event_type == *event_type)
    }))
}

fn unit_if(c: &RowCursor, event_type: &EventType) -> EngineResult<CellValue> {
    if c.event()?.event_type == *event_type {
        Ok(1.0.into())
    } else {
        Ok(CellValue::Empty)
    }
}

/// Returns the first of `time`, `time + 1 day`, ... strictly after `after`.
fn next_after(time: DaySerial, after: DaySerial) -> DaySerial {
    if time > after {
        return time;
    }
    time + ((after - time).floor() + 1.0)
}

/// Start of the occurrence of a daily window that contains `time`.
fn window_start_containing(window: TimeWindow, time: DaySerial) -> Option<DaySerial> {
    let day = time.day();
    [day.plus_days(-1.0), day]
        .into_iter()
        .map(|d| window.on(d))
        .find(|&(from, to)| from <= time && time < to)
        .map(|(from, _)| from)
}

/// Hours of `[start, end)` inside a daily window on `day`, including the
/// morning tail of a window that wraps past midnight.
fn window_hours(window: TimeWindow, day: DaySerial, start: DaySerial, end: DaySerial) -> f64 {
    let (from, to) = window.on(day);
    let evening = overlap_hours(start, end, from, to);
    if window.wraps() {
        evening + overlap_hours(start, end, day, day + window.end_fraction())
    } else {
        evening
    }
}
