//! Payroll Period Engine
//!
//! This crate runs a company's payroll period through its lifecycle: it turns
//! raw attendance into per-day decisions, routes corrections through an owner
//! approval workflow, and on finalization computes one auditable pay row per
//! employee. THR (the statutory holiday allowance) is computed alongside from
//! tenure and employee type.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod workflow;
