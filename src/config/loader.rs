//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineSettings, PayrollConfig, TaxConfig, ThrDayBasis, ThrSettings};

/// Loads and provides access to payroll configuration.
///
/// # Directory Structure
///
/// ```text
/// config/payroll/
/// ├── engine.yaml   # Rule version
/// ├── tax.yaml      # Withholding categories and bracket tables
/// └── thr.yaml      # THR day basis
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/payroll").unwrap();
/// println!("Rule version: {}", loader.engine().rule_version);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - A tax category referenced by the status map has no bracket table
    /// - A bracket table is not in ascending `up_to` order, or has an open
    ///   bracket before its last one
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let engine = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;

        let tax_path = path.join("tax.yaml");
        let tax = Self::load_yaml::<TaxConfig>(&tax_path)?;
        Self::validate_tax(&tax, &tax_path)?;

        let thr_path = path.join("thr.yaml");
        let thr = Self::load_yaml::<ThrSettings>(&thr_path)?;
        if thr.day_basis == ThrDayBasis::WorkingDays && thr.working_days_in_year == 0 {
            return Err(EngineError::ConfigParseError {
                path: thr_path.display().to_string(),
                message: "working_days_in_year must be positive".to_string(),
            });
        }

        Ok(Self::from_config(PayrollConfig { engine, tax, thr }))
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: PayrollConfig) -> Self {
        Self { config }
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

    fn validate_tax(tax: &TaxConfig, path: &Path) -> EngineResult<()> {
        let referenced = tax
            .status_categories
            .values()
            .chain(std::iter::once(&tax.default_category));

        for category in referenced {
            if tax.brackets.get(category).is_none_or(|b| b.is_empty()) {
                return Err(EngineError::ConfigParseError {
                    path: path.display().to_string(),
                    message: format!("no brackets for tax category {}", category.as_str()),
                });
            }
        }

        for (category, brackets) in &tax.brackets {
            let mut previous = None;
            for (index, bracket) in brackets.iter().enumerate() {
                let message = match (bracket.up_to, previous) {
                    (None, _) if index + 1 < brackets.len() => {
                        Some("only the last bracket may omit up_to")
                    }
                    (Some(up_to), Some(below)) if up_to <= below => {
                        Some("up_to must be strictly ascending")
                    }
                    _ => None,
                };
                if let Some(message) = message {
                    return Err(EngineError::ConfigParseError {
                        path: path.display().to_string(),
                        message: format!(
                            "tax category {} bracket {}: {}",
                            category.as_str(),
                            index + 1,
                            message
                        ),
                    });
                }
                previous = bracket.up_to;
            }
        }
        Ok(())
    }

    /// Returns the full configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Returns the engine settings.
    pub fn engine(&self) -> &EngineSettings {
        &self.config.engine
    }

    /// Returns the tax configuration.
    pub fn tax(&self) -> &TaxConfig {
        &self.config.tax
    }

    /// Returns the THR settings.
    pub fn thr(&self) -> &ThrSettings {
        &self.config.thr
    }
}
