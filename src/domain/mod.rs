//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - reference-table rows and query scope (`CodeRecord`, `Scope`)
//! - risk inputs and outputs (`ClinicalSignals`, `RiskAssessment`)
//! - the encounter form record (`Encounter`)

pub mod encounter;
pub mod types;

pub use encounter::*;
pub use types::*;
