//! Payroll output models.
//!
//! This module contains the [`CalculationOutcome`] produced by one run and the
//! [`PayrollLine`] posted per employee, together with the payroll categories
//! and pay bases they are keyed by.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Column, DerivedRow};

/// How an employee on a contract is paid.
///
/// # Example
///
/// ```
/// use supplement_engine::models::PayBasis;
///
/// assert_eq!(PayBasis::default(), PayBasis::Salaried);
/// assert_eq!(serde_json::to_string(&PayBasis::Hourly).unwrap(), "\"hourly\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayBasis {
    /// Monthly salary; overtime is settled as time off in lieu.
    #[default]
    Salaried,
    /// Paid per hour; overtime is paid out.
    Hourly,
}

impl fmt::Display for PayBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayBasis::Salaried => write!(f, "salaried"),
            PayBasis::Hourly => write!(f, "hourly"),
        }
    }
}

/// A class of hours posted to payroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollCategory {
    /// Paid-out overtime.
    Overtime,
    /// Night hours.
    Night,
    /// Unplanned or 7th-day hours.
    UnplannedSeventhDay,
    /// Weekend/holiday window hours.
    SupplementA,
    /// Evening window hours.
    SupplementB,
    /// Environmental supplement.
    Environmental,
    /// Missing minimum rest.
    #[serde(rename = "rest_violation_11h")]
    RestViolation11h,
    /// Excess shift length.
    #[serde(rename = "rest_violation_13h")]
    RestViolation13h,
    /// Number of rest-period violations.
    RestViolations,
    /// Hours at 50%.
    #[serde(rename = "premium_50")]
    Premium50,
    /// Hours at 100%.
    #[serde(rename = "premium_100")]
    Premium100,
    /// Notice pay units.
    NoticePay,
    /// Split duty units.
    SplitDuty,
    /// Accrued time off in lieu.
    TimeOffInLieu,
}

impl PayrollCategory {
    /// Every category, in posting order.
    pub const ALL: [PayrollCategory; 14] = [
        PayrollCategory::Overtime,
        PayrollCategory::Night,
        PayrollCategory::UnplannedSeventhDay,
        PayrollCategory::SupplementA,
        PayrollCategory::SupplementB,
        PayrollCategory::Environmental,
        PayrollCategory::RestViolation11h,
        PayrollCategory::RestViolation13h,
        PayrollCategory::RestViolations,
        PayrollCategory::Premium50,
        PayrollCategory::Premium100,
        PayrollCategory::NoticePay,
        PayrollCategory::SplitDuty,
        PayrollCategory::TimeOffInLieu,
    ];

    /// Returns the category's key.
    pub fn name(self) -> &'static str {
        match self {
            PayrollCategory::Overtime => "overtime",
            PayrollCategory::Night => "night",
            PayrollCategory::UnplannedSeventhDay => "unplanned_seventh_day",
            PayrollCategory::SupplementA => "supplement_a",
            PayrollCategory::SupplementB => "supplement_b",
            PayrollCategory::Environmental => "environmental",
            PayrollCategory::RestViolation11h => "rest_violation_11h",
            PayrollCategory::RestViolation13h => "rest_violation_13h",
            PayrollCategory::RestViolations => "rest_violations",
            PayrollCategory::Premium50 => "premium_50",
            PayrollCategory::Premium100 => "premium_100",
            PayrollCategory::NoticePay => "notice_pay",
            PayrollCategory::SplitDuty => "split_duty",
            PayrollCategory::TimeOffInLieu => "time_off_in_lieu",
        }
    }

    /// Returns the row column summed into this category.
    ///
    /// `TimeOffInLieu` is a whole-period figure and has none.
    pub fn column(self) -> Option<Column> {
        match self {
            PayrollCategory::Overtime => Some(Column::OvertimeHours),
            PayrollCategory::Night => Some(Column::NightHours),
            PayrollCategory::UnplannedSeventhDay => Some(Column::UnplannedSeventhDay),
            PayrollCategory::SupplementA => Some(Column::SupplementA),
            PayrollCategory::SupplementB => Some(Column::SupplementB),
            PayrollCategory::Environmental => Some(Column::Environmental),
            PayrollCategory::RestViolation11h => Some(Column::ElevenHourRule),
            PayrollCategory::RestViolation13h => Some(Column::ThirteenHourRule),
            PayrollCategory::RestViolations => Some(Column::RestViolations),
            PayrollCategory::Premium50 => Some(Column::Premium50),
            PayrollCategory::Premium100 => Some(Column::Premium100),
            PayrollCategory::NoticePay => Some(Column::NoticePay),
            PayrollCategory::SplitDuty => Some(Column::SplitDuty),
            PayrollCategory::TimeOffInLieu => None,
        }
    }

    /// Returns true if the category is posted for the pay basis.
    ///
    /// Hourly staff are paid overtime directly; salaried staff accrue it as
    /// time off in lieu instead.
    pub fn applies_to(self, basis: PayBasis) -> bool {
        match self {
            PayrollCategory::Overtime => basis == PayBasis::Hourly,
            PayrollCategory::TimeOffInLieu => basis == PayBasis::Salaried,
            _ => true,
        }
    }
}

impl fmt::Display for PayrollCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One posting: a category's units under its pay code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayCodeLine {
    /// The category posted.
    pub category: PayrollCategory,
    /// The payroll system's pay code.
    pub code: String,
    /// The sequence number under the pay code.
    pub sequence: u32,
    /// Hours or units.
    pub units: Decimal,
}

/// Whole-norm-period figures for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormSummary {
    /// The contract's weekly norm.
    pub weekly_norm_hours: Decimal,
    /// First day of the norm period.
    pub period_start: NaiveDate,
    /// Last day of the norm period.
    pub period_end: NaiveDate,
    /// Norm hours expected in the period.
    pub expected_hours: Decimal,
    /// Hours worked (including norm-reducing days) in the period.
    pub worked_hours: Decimal,
    /// Worked minus expected.
    pub excess_hours: Decimal,
    /// Deduction applied to part-time excess.
    pub part_time_deduction: Decimal,
    /// Time off in lieu accrued.
    pub time_off_in_lieu: Decimal,
}

/// Payroll figures for one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollLine {
    /// The employee number.
    pub employee_number: String,
    /// The employee's display name.
    pub employee_name: String,
    /// The contract the figures were computed under.
    pub contract_code: String,
    /// The contract's pay basis.
    pub pay_basis: PayBasis,
    /// Summed hours per applicable category, rows inside the report window only.
    pub hours: BTreeMap<PayrollCategory, Decimal>,
    /// Postings for every nonzero category.
    pub pay_codes: Vec<PayCodeLine>,
    /// Norm-period figures.
    pub norm: NormSummary,
    /// Last day of the month containing the report end.
    pub effective_date: NaiveDate,
}

impl PayrollLine {
    /// Returns the summed hours of a category, zero if absent.
    pub fn hours_for(&self, category: PayrollCategory) -> Decimal {
        self.hours.get(&category).copied().unwrap_or(Decimal::ZERO)
    }
}

/// Per-row audit output for one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeAudit {
    /// The employee number.
    pub employee_number: String,
    /// Every row of the timeline with all derived columns.
    pub rows: Vec<DerivedRow>,
}

/// The complete result of a calculation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationOutcome {
    /// Unique identifier of the run.
    pub calculation_id: Uuid,
    /// When the run finished.
    pub timestamp: DateTime<Utc>,
    /// Version of the engine that produced the result.
    pub engine_version: String,
    /// Title from the settings.
    pub title: String,
    /// First reported day.
    pub report_start: NaiveDate,
    /// Last reported day.
    pub report_end: NaiveDate,
    /// One line per employee.
    pub lines: Vec<PayrollLine>,
    /// Per-row audit data per employee.
    pub audit: Vec<EmployeeAudit>,
}

impl CalculationOutcome {
    /// Returns the payroll line of an employee.
    pub fn line(&self, employee_number: &str) -> Option<&PayrollLine> {
        self.lines.iter().find(|l| l.employee_number == employee_number)
    }

    /// Returns the audit rows of an employee.
    pub fn rows(&self, employee_number: &str) -> Option<&[DerivedRow]> {
        self.audit
            .iter()
            .find(|a| a.employee_number == employee_number)
            .map(|a| a.rows.as_slice())
    }
}
