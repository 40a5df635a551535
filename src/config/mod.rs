//! Configuration loading and management for the supplement engine.
//!
//! This module provides functionality to load agreement settings from YAML
//! files: time windows, thresholds, the contract table and pay codes.
//!
//! # Example
//!
//! ```no_run
//! use supplement_engine::config::SettingsLoader;
//!
//! let loader = SettingsLoader::load("./config/teknik").unwrap();
//! println!("Loaded agreement: {}", loader.settings().title);
//! ```

mod loader;
mod types;

pub use loader::SettingsLoader;
pub use types::{
    CalculationSettings, ContractTerms, PayCodeEntry, TimeWindow, last_day_of_month,
};
