//! Error types for the supplement engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while turning timesheet events
//! into payroll lines. Every one of them aborts the calculation run.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the supplement engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use supplement_engine::error::EngineError;
///
/// let error = EngineError::UnknownContract {
///     code: "Teknik 40 hours".to_string(),
/// };
/// assert_eq!(error.to_string(), "Unknown contract: Teknik 40 hours");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A settings value failed validation.
    #[error("Invalid setting '{field}': {message}")]
    InvalidSettings {
        /// The setting that was invalid.
        field: String,
        /// A description of what made the setting invalid.
        message: String,
    },

    /// The report end date is not after the report start date.
    #[error("Report end {end} is not after report start {start}")]
    InvalidReportWindow {
        /// The report start date.
        start: NaiveDate,
        /// The report end date.
        end: NaiveDate,
    },

    /// Contract code has no row in the contract table.
    #[error("Unknown contract: {code}")]
    UnknownContract {
        /// The contract code that was not found.
        code: String,
    },

    /// Norm period kind is neither monthly nor quarterly.
    #[error("Unknown norm period kind {kind} for contract '{contract}'")]
    UnknownNormPeriodKind {
        /// The contract carrying the kind.
        contract: String,
        /// The raw kind code (length in months).
        kind: u32,
    },

    /// No pay code is mapped for a payroll category and pay basis.
    #[error("Unknown payroll category '{category}' for {basis} contracts")]
    UnknownCategory {
        /// The payroll category.
        category: String,
        /// The pay basis of the contract.
        basis: String,
    },

    /// A required column was read before it was computed.
    #[error("Column '{column}' is not set on row {row}")]
    MissingColumn {
        /// The column that was read.
        column: String,
        /// The zero-based row index.
        row: usize,
    },

    /// A column was written twice on the same row.
    #[error("Column '{column}' is already set on row {row}")]
    ColumnAlreadySet {
        /// The column that was written.
        column: String,
        /// The zero-based row index.
        row: usize,
    },

    /// A column depends on itself through the rule catalog.
    #[error("Cyclic dependency while computing column '{column}' on row {row}")]
    CyclicDependency {
        /// The column that re-entered its own computation.
        column: String,
        /// The zero-based row index.
        row: usize,
    },

    /// The row cursor was read while not positioned on a row.
    #[error("Row cursor is not positioned on a row")]
    CursorNotPositioned,

    /// An employee timeline is not sorted by date.
    #[error("Timeline for employee '{employee_number}' is not sorted at row {row}")]
    UnsortedTimeline {
        /// The employee whose timeline is out of order.
        employee_number: String,
        /// The first row dated before its predecessor.
        row: usize,
    },

    /// A timesheet event was invalid or contained inconsistent data.
    #[error("Invalid event for employee '{employee_number}': {message}")]
    InvalidEvent {
        /// The employee the event belongs to.
        employee_number: String,
        /// A description of what made the event invalid.
        message: String,
    },

    /// The run was cancelled between two employees.
    #[error("Calculation cancelled after {completed} employees")]
    Cancelled {
        /// Number of employees fully processed before cancellation.
        completed: usize,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
