//! Configuration loading and management for the payroll engine.
//!
//! This module provides functionality to load payroll configuration from YAML files,
//! including the rule version, withholding tax tables and THR settings.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/payroll").unwrap();
//! println!("Tax reduces net: {}", config.tax().reduces_net);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    EngineSettings, PayrollConfig, TaxBracket, TaxCategory, TaxConfig, ThrDayBasis, ThrSettings,
};
