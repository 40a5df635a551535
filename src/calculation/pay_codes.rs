//! Pay-code mapping.
//!
//! Payroll categories are posted under a (code, sequence) pair that depends on
//! the contract's pay basis. The built-in table can be overridden entry by
//! entry from `pay_codes.yaml`.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::config::CalculationSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{PayBasis, PayCodeLine, PayrollCategory};

/// The built-in pay-code table.
const DEFAULT_PAY_CODES: [(PayrollCategory, PayBasis, &str, u32); 26] = [
    (PayrollCategory::Night, PayBasis::Salaried, "3110", 1),
    (PayrollCategory::UnplannedSeventhDay, PayBasis::Salaried, "3120", 1),
    (PayrollCategory::SupplementA, PayBasis::Salaried, "3130", 1),
    (PayrollCategory::SupplementB, PayBasis::Salaried, "3140", 1),
    (PayrollCategory::Environmental, PayBasis::Salaried, "3150", 1),
    (PayrollCategory::RestViolation11h, PayBasis::Salaried, "3160", 1),
    (PayrollCategory::RestViolation13h, PayBasis::Salaried, "3160", 2),
    (PayrollCategory::RestViolations, PayBasis::Salaried, "3170", 1),
    (PayrollCategory::Premium50, PayBasis::Salaried, "3180", 1),
    (PayrollCategory::Premium100, PayBasis::Salaried, "3180", 2),
    (PayrollCategory::NoticePay, PayBasis::Salaried, "3190", 1),
    (PayrollCategory::SplitDuty, PayBasis::Salaried, "3195", 1),
    (PayrollCategory::TimeOffInLieu, PayBasis::Salaried, "3200", 1),
    (PayrollCategory::Overtime, PayBasis::Hourly, "4100", 1),
    (PayrollCategory::Night, PayBasis::Hourly, "4110", 1),
    (PayrollCategory::UnplannedSeventhDay, PayBasis::Hourly, "4120", 1),
    (PayrollCategory::SupplementA, PayBasis::Hourly, "4130", 1),
    (PayrollCategory::SupplementB, PayBasis::Hourly, "4140", 1),
    (PayrollCategory::Environmental, PayBasis::Hourly, "4150", 1),
    (PayrollCategory::RestViolation11h, PayBasis::Hourly, "4160", 1),
    (PayrollCategory::RestViolation13h, PayBasis::Hourly, "4160", 2),
    (PayrollCategory::RestViolations, PayBasis::Hourly, "4170", 1),
    (PayrollCategory::Premium50, PayBasis::Hourly, "4180", 1),
    (PayrollCategory::Premium100, PayBasis::Hourly, "4180", 2),
    (PayrollCategory::NoticePay, PayBasis::Hourly, "4190", 1),
    (PayrollCategory::SplitDuty, PayBasis::Hourly, "4195", 1),
];

/// Maps payroll categories to pay codes.
///
/// # Example
///
/// ```
/// use supplement_engine::calculation::PayCodeMapper;
/// use supplement_engine::models::{PayBasis, PayrollCategory};
///
/// let mapper = PayCodeMapper::new();
/// let (code, sequence) = mapper.lookup(PayrollCategory::Premium100, PayBasis::Salaried).unwrap();
/// assert_eq!((code, sequence), ("3180", 2));
/// assert!(mapper.lookup(PayrollCategory::Overtime, PayBasis::Salaried).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PayCodeMapper {
    codes: HashMap<(PayrollCategory, PayBasis), (String, u32)>,
}

impl Default for PayCodeMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl PayCodeMapper {
    /// Creates a mapper with the built-in table.
    pub fn new() -> Self {
        let codes = DEFAULT_PAY_CODES
            .iter()
            .map(|(category, basis, code, sequence)| {
                ((*category, *basis), (code.to_string(), *sequence))
            })
            .collect();
        Self { codes }
    }

    /// Creates a mapper with the built-in table overridden by the settings.
    pub fn from_settings(settings: &CalculationSettings) -> Self {
        let mut mapper = Self::new();
        for entry in &settings.pay_codes {
            mapper
                .codes
                .insert((entry.category, entry.basis), (entry.code.clone(), entry.sequence));
        }
        mapper
    }

    /// Returns the code and sequence of a category for a pay basis.
    pub fn lookup(&self, category: PayrollCategory, basis: PayBasis) -> EngineResult<(&str, u32)> {
        self.codes
            .get(&(category, basis))
            .map(|(code, sequence)| (code.as_str(), *sequence))
            .ok_or_else(|| EngineError::UnknownCategory {
                category: category.to_string(),
                basis: basis.to_string(),
            })
    }

    /// Builds the posting of a category's units.
    pub fn line(
        &self,
        category: PayrollCategory,
        basis: PayBasis,
        units: Decimal,
    ) -> EngineResult<PayCodeLine> {
        let (code, sequence) = self.lookup(category, basis)?;
        Ok(PayCodeLine {
            category,
            code: code.to_string(),
            sequence,
            units,
        })
    }
}
