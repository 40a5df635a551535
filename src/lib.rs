//! Supplement and overtime engine for technician timesheets
//!
//! This crate turns a rostering export (planned and actual shifts, absences
//! and markers per employee) into payroll lines: night work, weekend and
//! evening supplements, rest-period violations, overtime premiums, and the
//! norm-period balance that becomes time off in lieu.
//!
//! Every event row gets a set of derived columns. Columns are computed on
//! demand through a [`calculation::RowCursor`], may read the same or a
//! neighboring row, and are written once.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;

#[cfg(test)]
pub(crate) mod test_support;
