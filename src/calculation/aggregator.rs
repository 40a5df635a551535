//! Two-pass evaluation and payroll aggregation.
//!
//! Rows are evaluated in two passes over the whole timeline: the first settles
//! worked hours, the 13-hour rule and the day-before carry-over on every row,
//! the second computes everything else. Only then are rows inside the report
//! window summed into payroll categories.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::config::CalculationSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Column, DerivedRow, EmployeeTimeline, NormSummary, PayBasis, PayrollCategory, PayrollLine,
};

use super::norm::resolve_norm;
use super::{HolidayCalendar, PayCodeMapper, RowCursor, RuleCatalog};

/// Evaluates every column on every row in two ordered passes.
///
/// # Example
///
/// ```
/// use supplement_engine::calculation::{FixedHolidays, RuleCatalog, evaluate_rows};
/// use supplement_engine::config::SettingsLoader;
///
/// let settings = SettingsLoader::load("./config/teknik").unwrap().into_settings();
/// let holidays = FixedHolidays::default();
/// let catalog = RuleCatalog::new(&settings, &holidays);
/// let rows = evaluate_rows(&catalog, vec![]).unwrap();
/// assert!(rows.is_empty());
/// ```
pub fn evaluate_rows(catalog: &RuleCatalog<'_>, rows: Vec<DerivedRow>) -> EngineResult<Vec<DerivedRow>> {
    let mut cursor = RowCursor::new(rows);
    for pass in [&Column::PASS_ONE[..], &Column::PASS_TWO[..]] {
        cursor.rewind();
        while cursor.advance() {
            for column in pass {
                catalog.evaluate(&mut cursor, *column)?;
            }
        }
    }
    Ok(cursor.into_rows())
}

/// Evaluates an employee timeline.
pub fn evaluate_timeline(
    catalog: &RuleCatalog<'_>,
    timeline: &EmployeeTimeline,
) -> EngineResult<Vec<DerivedRow>> {
    let rows = timeline.events().iter().cloned().map(DerivedRow::new).collect();
    evaluate_rows(catalog, rows)
}

/// Converts hours to a decimal rounded to two places.
pub fn to_hours_decimal(hours: f64) -> Decimal {
    Decimal::from_f64(hours).unwrap_or(Decimal::ZERO).round_dp(2)
}

/// Sums evaluated rows into payroll lines.
pub struct Aggregator<'a> {
    settings: &'a CalculationSettings,
    holidays: &'a dyn HolidayCalendar,
    pay_codes: PayCodeMapper,
}

impl<'a> Aggregator<'a> {
    /// Creates an aggregator; pay codes come from the settings' overrides.
    pub fn new(settings: &'a CalculationSettings, holidays: &'a dyn HolidayCalendar) -> Self {
        Self {
            settings,
            holidays,
            pay_codes: PayCodeMapper::from_settings(settings),
        }
    }

    /// Builds the payroll line of one employee from their evaluated rows.
    ///
    /// The contract is taken from the first row. Category sums cover rows
    /// dated inside `[report_start, report_end + 1 day)`; norm figures cover
    /// the norm period.
    pub fn payroll_line(&self, employee_number: &str, rows: &[DerivedRow]) -> EngineResult<PayrollLine> {
        let first = rows.first().ok_or_else(|| EngineError::InvalidEvent {
            employee_number: employee_number.to_string(),
            message: "timeline has no events".to_string(),
        })?;
        let contract_code = first.event.contract_code.trim().to_string();
        let basis = self.settings.contract(&contract_code)?.pay_basis;

        let window_start = self.settings.report_start_serial();
        let window_end = self.settings.report_end_exclusive();
        let in_window: Vec<&DerivedRow> = rows
            .iter()
            .filter(|row| row.event.date >= window_start && row.event.date < window_end)
            .collect();

        let mut hours = BTreeMap::new();
        for category in PayrollCategory::ALL {
            if !category.applies_to(basis) {
                continue;
            }
            if let Some(column) = category.column() {
                hours.insert(category, to_hours_decimal(sum(&in_window, column)));
            }
        }

        let norm = self.norm_summary(&contract_code, rows, &hours, basis)?;
        if PayrollCategory::TimeOffInLieu.applies_to(basis) {
            hours.insert(PayrollCategory::TimeOffInLieu, norm.time_off_in_lieu);
        }

        let mut pay_codes = Vec::new();
        for (category, units) in &hours {
            if !units.is_zero() {
                pay_codes.push(self.pay_codes.line(*category, basis, *units)?);
            }
        }

        Ok(PayrollLine {
            employee_number: employee_number.to_string(),
            employee_name: first.event.employee_name.clone(),
            contract_code,
            pay_basis: basis,
            hours,
            pay_codes,
            norm,
            effective_date: self.settings.effective_date()?,
        })
    }

    fn norm_summary(
        &self,
        contract_code: &str,
        rows: &[DerivedRow],
        hours: &BTreeMap<PayrollCategory, Decimal>,
        basis: PayBasis,
    ) -> EngineResult<NormSummary> {
        let norm = resolve_norm(self.settings, contract_code)?;

        let in_period: Vec<&DerivedRow> = rows
            .iter()
            .filter(|row| norm.contains(row.event.date))
            .collect();
        let expected = to_hours_decimal(norm.expected_hours(self.holidays));
        let worked = to_hours_decimal(sum(&in_period, Column::WorkedHours));
        let excess = worked - expected;

        let standard = self.settings.weekly_standard_hours;
        let part_time_deduction = if norm.weekly_norm_hours < standard {
            to_hours_decimal(norm.expected_hours(self.holidays) * (1.0 - norm.weekly_norm_hours / standard))
        } else {
            Decimal::ZERO
        };

        let time_off_in_lieu = if basis == PayBasis::Salaried {
            let premium_50 = hours.get(&PayrollCategory::Premium50).copied().unwrap_or_default();
            let premium_100 = hours.get(&PayrollCategory::Premium100).copied().unwrap_or_default();
            let one_and_a_half = Decimal::new(15, 1);
            let accrued_excess = if excess > Decimal::ZERO {
                one_and_a_half * (excess - part_time_deduction).max(Decimal::ZERO)
            } else {
                excess
            };
            (one_and_a_half * premium_50 + Decimal::new(2, 0) * premium_100 + accrued_excess).round_dp(2)
        } else {
            Decimal::ZERO
        };

        Ok(NormSummary {
            weekly_norm_hours: to_hours_decimal(norm.weekly_norm_hours),
            period_start: norm.start,
            period_end: norm.end,
            expected_hours: expected,
            worked_hours: worked,
            excess_hours: excess,
            part_time_deduction,
            time_off_in_lieu,
        })
    }
}

fn sum(rows: &[&DerivedRow], column: Column) -> f64 {
    rows.iter().map(|row| row.value(column).number_or_zero()).sum()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::calculation::FixedHolidays;
    use crate::models::{EventType, TimesheetEvent};
    use crate::test_support::{HOURLY, PART_TIME, SALARIED, date, event, rows, settings, shift, worked};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line_for(settings: &CalculationSettings, events: Vec<TimesheetEvent>) -> PayrollLine {
        let holidays = FixedHolidays::default();
        let catalog = RuleCatalog::new(settings, &holidays);
        let evaluated = evaluate_rows(&catalog, rows(events)).unwrap();
        Aggregator::new(settings, &holidays)
            .payroll_line("1001", &evaluated)
            .unwrap()
    }

    #[test]
    fn test_window_is_half_open() {
        let line = line_for(
            &settings(),
            vec![
                shift(SALARIED, "2019-08-31", "23:00", "05:00"),
                shift(SALARIED, "2019-09-01", "23:00", "05:00"),
                shift(SALARIED, "2019-09-30", "23:00", "05:00"),
                shift(SALARIED, "2019-10-01", "23:00", "05:00"),
            ],
        );
        assert_eq!(line.hours_for(PayrollCategory::Night), dec("12.00"));
    }

    #[test]
    fn test_salaried_line_has_time_off_but_no_overtime() {
        let line = line_for(&settings(), vec![shift(SALARIED, "2019-09-02", "23:00", "05:00")]);
        assert!(!line.hours.contains_key(&PayrollCategory::Overtime));
        assert_eq!(line.pay_basis, PayBasis::Salaried);
        assert_eq!(line.norm.expected_hours, dec("155.40"));
        assert_eq!(line.norm.worked_hours, dec("6.00"));
        assert_eq!(line.norm.excess_hours, dec("-149.40"));
        assert_eq!(line.norm.part_time_deduction, Decimal::ZERO);
        // 1.5 x 6 night hours at 50%, plus the (negative) excess.
        assert_eq!(line.hours_for(PayrollCategory::TimeOffInLieu), dec("-140.40"));
    }

    #[test]
    fn test_hourly_line_has_overtime_but_no_time_off() {
        let line = line_for(
            &settings(),
            vec![worked(HOURLY, "2019-09-02", ("07:00", "15:00"), ("07:00", "17:30"))],
        );
        assert!(!line.hours.contains_key(&PayrollCategory::TimeOffInLieu));
        assert_eq!(line.hours_for(PayrollCategory::Overtime), dec("3.10"));
        assert_eq!(line.norm.time_off_in_lieu, Decimal::ZERO);
        let overtime = line
            .pay_codes
            .iter()
            .find(|p| p.category == PayrollCategory::Overtime)
            .unwrap();
        assert_eq!(overtime.code, "4100");
    }

    #[test]
    fn test_part_time_excess_after_deduction() {
        let mut settings = settings();
        settings.contracts.get_mut(PART_TIME).unwrap().weekly_norm_hours = 5.0;
        let events = ["2019-09-02", "2019-09-03", "2019-09-04", "2019-09-05", "2019-09-06"]
            .iter()
            .map(|day| shift(PART_TIME, day, "08:00", "18:00"))
            .collect();

        let line = line_for(&settings, events);
        assert_eq!(line.norm.expected_hours, dec("21.00"));
        assert_eq!(line.norm.worked_hours, dec("50.00"));
        assert_eq!(line.norm.excess_hours, dec("29.00"));
        assert_eq!(line.norm.part_time_deduction, dec("18.16"));
        assert_eq!(line.norm.time_off_in_lieu, dec("16.26"));
        assert_eq!(line.hours_for(PayrollCategory::SupplementB), dec("5.00"));
    }

    #[test]
    fn test_norm_reducing_days_count_as_worked() {
        let line = line_for(
            &settings(),
            vec![
                event(SALARIED, "2019-09-02", EventType::Training),
                event(SALARIED, "2019-09-03", EventType::Leave),
            ],
        );
        assert_eq!(line.norm.worked_hours, dec("14.80"));
    }

    #[test]
    fn test_pay_codes_only_for_nonzero_categories() {
        let line = line_for(&settings(), vec![shift(SALARIED, "2019-09-02", "07:00", "15:00")]);
        let categories: Vec<_> = line.pay_codes.iter().map(|p| p.category).collect();
        assert_eq!(categories, vec![PayrollCategory::TimeOffInLieu]);
    }

    #[test]
    fn test_effective_date_is_month_end_of_report_end() {
        let settings = settings().with_report_window(date("2019-09-01"), date("2019-09-15"));
        let line = line_for(&settings, vec![shift(SALARIED, "2019-09-02", "07:00", "15:00")]);
        assert_eq!(line.effective_date, date("2019-09-30"));
    }

    #[test]
    fn test_empty_rows_are_rejected() {
        let settings = settings();
        let holidays = FixedHolidays::default();
        let err = Aggregator::new(&settings, &holidays)
            .payroll_line("1001", &[])
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidEvent { .. }));
    }

    #[test]
    fn test_unknown_contract_on_first_row() {
        let settings = settings();
        let holidays = FixedHolidays::default();
        let catalog = RuleCatalog::new(&settings, &holidays);
        let evaluated = evaluate_rows(
            &catalog,
            rows(vec![shift("Teknik 99 hours", "2019-09-02", "07:00", "15:00")]),
        )
        .unwrap();
        let err = Aggregator::new(&settings, &holidays)
            .payroll_line("1001", &evaluated)
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownContract { .. }));
    }

    #[test]
    fn test_to_hours_decimal_rounds() {
        assert_eq!(to_hours_decimal(3.0999999999), dec("3.10"));
        assert_eq!(to_hours_decimal(f64::NAN), Decimal::ZERO);
    }
}
