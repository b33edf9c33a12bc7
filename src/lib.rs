//! Doser dosage calculator
//!
//! Estimates how much vaporizer material covers a target THC/CBD dose, and
//! keeps a local log of calculated sessions.

pub mod calculator;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod stats;

pub use calculator::{calculate_dosage, calculate_dosage_with, validate_inputs};
pub use catalog::Catalog;
pub use error::{DoserError, Result};
pub use models::{CalculatorInputs, CalculatorOutputs, DosePerUnit, DoseType, MeasurementMethod};
