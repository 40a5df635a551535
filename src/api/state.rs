//! Application state for the supplement engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::calculation::{DanishHolidays, HolidayCalendar};
use crate::config::CalculationSettings;

/// Shared application state.
///
/// Contains resources that are shared across all request handlers,
/// such as the loaded agreement settings and the holiday calendar.
#[derive(Clone)]
pub struct AppState {
    settings: Arc<CalculationSettings>,
    holidays: Arc<dyn HolidayCalendar>,
}

impl AppState {
    /// Creates a new application state using the Danish public holidays.
    pub fn new(settings: CalculationSettings) -> Self {
        Self::with_holidays(settings, DanishHolidays)
    }

    /// Creates a new application state with a specific holiday calendar.
    pub fn with_holidays(
        settings: CalculationSettings,
        holidays: impl HolidayCalendar + 'static,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            holidays: Arc::new(holidays),
        }
    }

    /// Returns a reference to the agreement settings.
    pub fn settings(&self) -> &CalculationSettings {
        &self.settings
    }

    /// Returns a reference to the holiday calendar.
    pub fn holidays(&self) -> &dyn HolidayCalendar {
        self.holidays.as_ref()
    }
}
