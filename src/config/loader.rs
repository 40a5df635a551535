//! Settings loading functionality.
//!
//! This module provides the [`SettingsLoader`] type for loading agreement
//! settings from YAML files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{CalculationSettings, ContractTerms, PayCodeEntry};

#[derive(Debug, Deserialize)]
struct ContractsFile {
    contracts: BTreeMap<String, ContractTerms>,
}

#[derive(Debug, Deserialize)]
struct PayCodesFile {
    pay_codes: Vec<PayCodeEntry>,
}

/// Loads and provides access to agreement settings.
///
/// # Directory Structure
///
/// ```text
/// config/teknik/
/// ├── settings.yaml    # Windows, thresholds, norm-reducing events, report window
/// ├── contracts.yaml   # Contract code -> weekly norm, norm period, pay basis
/// └── pay_codes.yaml   # Optional pay-code overrides
/// ```
///
/// # Example
///
/// ```no_run
/// use supplement_engine::config::SettingsLoader;
///
/// let loader = SettingsLoader::load("./config/teknik").unwrap();
/// println!("Loaded agreement: {}", loader.settings().title);
/// ```
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    settings: CalculationSettings,
}

impl SettingsLoader {
    /// Loads settings from the specified directory.
    ///
    /// Contracts and pay codes from their own files are merged over any given
    /// inline in `settings.yaml`.
    ///
    /// # Returns
    ///
    /// Returns a `SettingsLoader` on success, or an error if:
    /// - `settings.yaml` or `contracts.yaml` is missing
    /// - any file contains invalid YAML
    /// - the merged settings fail validation
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let mut settings = Self::load_yaml::<CalculationSettings>(&path.join("settings.yaml"))?;

        let contracts = Self::load_yaml::<ContractsFile>(&path.join("contracts.yaml"))?;
        settings.contracts.extend(contracts.contracts);

        let pay_codes_path = path.join("pay_codes.yaml");
        if pay_codes_path.exists() {
            let pay_codes = Self::load_yaml::<PayCodesFile>(&pay_codes_path)?;
            settings.pay_codes.extend(pay_codes.pay_codes);
        }

        settings.validate()?;

        debug!(
            path = %path.display(),
            contracts = settings.contracts.len(),
            pay_codes = settings.pay_codes.len(),
            "Loaded agreement settings"
        );

        Ok(Self { settings })
    }

    /// Parses settings from a single YAML document.
    pub fn from_yaml_str(yaml: &str) -> EngineResult<Self> {
        let settings: CalculationSettings =
            serde_yaml::from_str(yaml).map_err(|e| EngineError::ConfigParseError {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?;
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded settings.
    pub fn settings(&self) -> &CalculationSettings {
        &self.settings
    }

    /// Consumes the loader and returns the settings.
    pub fn into_settings(self) -> CalculationSettings {
        self.settings
    }
}
