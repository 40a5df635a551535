//! Calculation logic for the supplement engine.
//!
//! This module contains the row cursor and its memoized columns, the rule
//! catalog producing every derived column, day classification against a
//! holiday calendar, norm resolution, pay-code mapping, and the aggregator
//! and engine that turn employee timelines into payroll lines.

mod aggregator;
mod cursor;
mod day_class;
mod engine;
mod holidays;
mod norm;
mod pay_codes;
mod rules;

pub use aggregator::{Aggregator, evaluate_rows, evaluate_timeline, to_hours_decimal};
pub use cursor::RowCursor;
pub use day_class::{DayClass, classify_day, is_holiday, overlap_hours};
pub use engine::{CancellationFlag, SupplementEngine};
pub use holidays::{DanishHolidays, FixedHolidays, HolidayCalendar, easter_sunday};
pub use norm::{NormPeriodKind, ResolvedNorm, resolve_norm, working_days};
pub use pay_codes::PayCodeMapper;
pub use rules::{ENVIRONMENTAL_SUPPLEMENT_RATE, EPSILON_HOURS, OVERTIME_TAG, RuleCatalog};
