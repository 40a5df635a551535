//! Derived columns and their per-row cache.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::TimesheetEvent;

/// The value of one derived column.
///
/// `Empty` is distinct from `Number(0.0)`: it means "nothing here", for
/// example a neighbor lookup that left the timeline.
///
/// # Example
///
/// ```
/// use supplement_engine::models::CellValue;
///
/// assert_eq!(CellValue::Empty.number_or_zero(), 0.0);
/// assert_eq!(CellValue::Empty.as_number(), None);
/// assert_eq!(CellValue::Number(2.5).as_number(), Some(2.5));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// No value.
    #[default]
    Empty,
    /// A number, usually hours.
    Number(f64),
    /// A short symbolic marker.
    Tag(String),
}

impl CellValue {
    /// Returns true for the empty sentinel.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Returns true for a symbolic marker.
    pub fn is_tag(&self) -> bool {
        matches!(self, CellValue::Tag(_))
    }

    /// Returns the number, if this is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the number, treating anything else as zero.
    ///
    /// Only for summing; rules that must tell `Empty` from zero match explicitly.
    pub fn number_or_zero(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// How a producer's value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Store a number; `Empty` becomes 0 and a tag becomes 1.
    Float,
    /// Like `Float`, truncated toward zero.
    Int,
    /// Store the value untouched.
    Mixed,
}

impl Coercion {
    /// Applies the coercion.
    pub fn apply(self, value: CellValue) -> CellValue {
        let number = match (self, &value) {
            (Coercion::Mixed, _) => return value,
            (_, CellValue::Empty) => 0.0,
            (_, CellValue::Tag(_)) => 1.0,
            (_, CellValue::Number(n)) => *n,
        };
        match self {
            Coercion::Int => CellValue::Number(number.trunc()),
            _ => CellValue::Number(number),
        }
    }
}

/// The derived columns computed for every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    /// Hours worked, or a synthetic day for norm-reducing absence.
    WorkedHours,
    /// Set when an overtime notice shares the row's date.
    OvertimeFlag,
    /// Overtime hours, per pay basis.
    OvertimeHours,
    /// Hours inside the night window.
    NightHours,
    /// Hours of an unplanned or 7th-day shift.
    UnplannedSeventhDay,
    /// Weekend/holiday window hours.
    SupplementA,
    /// Evening window hours.
    SupplementB,
    /// Environmental supplement.
    Environmental,
    /// Hours beyond the maximum shift length.
    ThirteenHourRule,
    /// Hours missing from the minimum rest between shifts.
    ElevenHourRule,
    /// Yesterday's 13-hour value carried forward.
    DayBefore,
    /// Hours paid at 100%.
    Premium100,
    /// Hours paid at 50%.
    Premium50,
    /// Notice pay unit.
    NoticePay,
    /// Split duty unit.
    SplitDuty,
    /// 1 when the row breaks a rest-period rule.
    RestViolations,
}

impl Column {
    /// Every column, in output order.
    pub const ALL: [Column; 16] = [
        Column::WorkedHours,
        Column::OvertimeFlag,
        Column::OvertimeHours,
        Column::NightHours,
        Column::UnplannedSeventhDay,
        Column::SupplementA,
        Column::SupplementB,
        Column::Environmental,
        Column::ThirteenHourRule,
        Column::ElevenHourRule,
        Column::DayBefore,
        Column::Premium100,
        Column::Premium50,
        Column::NoticePay,
        Column::SplitDuty,
        Column::RestViolations,
    ];

    /// Columns that must be settled on every row before any premium merge.
    pub const PASS_ONE: [Column; 3] = [
        Column::WorkedHours,
        Column::ThirteenHourRule,
        Column::DayBefore,
    ];

    /// Everything else.
    pub const PASS_TWO: [Column; 13] = [
        Column::OvertimeFlag,
        Column::UnplannedSeventhDay,
        Column::NightHours,
        Column::OvertimeHours,
        Column::SupplementA,
        Column::SupplementB,
        Column::Environmental,
        Column::ElevenHourRule,
        Column::Premium100,
        Column::Premium50,
        Column::NoticePay,
        Column::SplitDuty,
        Column::RestViolations,
    ];

    /// Returns the column's key.
    pub fn name(self) -> &'static str {
        match self {
            Column::WorkedHours => "worked_hours",
            Column::OvertimeFlag => "overtime_flag",
            Column::OvertimeHours => "overtime_hours",
            Column::NightHours => "night_hours",
            Column::UnplannedSeventhDay => "unplanned_seventh_day",
            Column::SupplementA => "supplement_a",
            Column::SupplementB => "supplement_b",
            Column::Environmental => "environmental",
            Column::ThirteenHourRule => "thirteen_hour_rule",
            Column::ElevenHourRule => "eleven_hour_rule",
            Column::DayBefore => "day_before",
            Column::Premium100 => "premium_100",
            Column::Premium50 => "premium_50",
            Column::NoticePay => "notice_pay",
            Column::SplitDuty => "split_duty",
            Column::RestViolations => "rest_violations",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A timesheet event together with its write-once column cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRow {
    /// The source event.
    pub event: TimesheetEvent,
    /// Computed columns.
    pub values: BTreeMap<Column, CellValue>,
}

impl DerivedRow {
    /// Wraps an event with an empty cache.
    pub fn new(event: TimesheetEvent) -> Self {
        Self {
            event,
            values: BTreeMap::new(),
        }
    }

    /// Returns the cached value of a column.
    pub fn get(&self, column: Column) -> Option<&CellValue> {
        self.values.get(&column)
    }

    /// Returns the cached value, or `Empty` if the column is not set.
    pub fn value(&self, column: Column) -> CellValue {
        self.get(column).cloned().unwrap_or_default()
    }

    /// Returns true if the column is set.
    pub fn is_set(&self, column: Column) -> bool {
        self.values.contains_key(&column)
    }

    /// Stores a value unless the column is already set.
    ///
    /// Returns false, leaving the cache untouched, on a second write.
    pub fn insert(&mut self, column: Column, value: CellValue) -> bool {
        if self.is_set(column) {
            return false;
        }
        self.values.insert(column, value);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DaySerial, EventType};

    fn row() -> DerivedRow {
        DerivedRow::new(TimesheetEvent {
            employee_name: String::new(),
            employee_number: "1".to_string(),
            contract_code: "Teknik 37 hours".to_string(),
            email: String::new(),
            date: DaySerial(43710.0),
            event_type: EventType::Shift,
            planned_start: None,
            planned_end: None,
            actual_start: None,
            actual_end: None,
        })
    }

    #[test]
    fn test_mixed_coercion_preserves_empty() {
        assert_eq!(Coercion::Mixed.apply(CellValue::Empty), CellValue::Empty);
        assert_eq!(
            Coercion::Mixed.apply(CellValue::Tag("overtime".to_string())),
            CellValue::Tag("overtime".to_string())
        );
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(Coercion::Float.apply(CellValue::Empty), CellValue::Number(0.0));
        assert_eq!(
            Coercion::Float.apply(CellValue::Tag("x".to_string())),
            CellValue::Number(1.0)
        );
        assert_eq!(Coercion::Float.apply(CellValue::Number(1.75)), CellValue::Number(1.75));
    }

    #[test]
    fn test_int_coercion_truncates() {
        assert_eq!(Coercion::Int.apply(CellValue::Number(1.75)), CellValue::Number(1.0));
        assert_eq!(Coercion::Int.apply(CellValue::Number(-1.75)), CellValue::Number(-1.0));
    }

    #[test]
    fn test_insert_is_write_once() {
        let mut row = row();
        assert!(row.insert(Column::NightHours, CellValue::Number(2.0)));
        assert!(!row.insert(Column::NightHours, CellValue::Number(3.0)));
        assert_eq!(row.value(Column::NightHours), CellValue::Number(2.0));
    }

    #[test]
    fn test_unset_value_reads_empty() {
        assert_eq!(row().value(Column::Premium50), CellValue::Empty);
    }

    #[test]
    fn test_passes_cover_every_column_once() {
        let mut columns: Vec<Column> = Column::PASS_ONE
            .iter()
            .chain(Column::PASS_TWO.iter())
            .copied()
            .collect();
        columns.sort();
        let mut all = Column::ALL.to_vec();
        all.sort();
        assert_eq!(columns, all);
    }

    #[test]
    fn test_cell_values_serialize_untagged() {
        assert_eq!(serde_json::to_string(&CellValue::Empty).unwrap(), "null");
        assert_eq!(serde_json::to_string(&CellValue::Number(1.5)).unwrap(), "1.5");
        assert_eq!(
            serde_json::to_string(&CellValue::Tag("overtime".to_string())).unwrap(),
            "\"overtime\""
        );
    }
}
