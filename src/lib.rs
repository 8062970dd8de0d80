//! `ehr-assist` library crate.
//!
//! The binary (`ehr`) is a thin wrapper around this library so that:
//!
//! - lookup and scoring are testable without spawning processes
//! - the engine can be embedded by other front-ends (forms, services)
//!
//! Main entry points:
//!
//! - [`lookup::ReferenceTable`] / [`lookup::CodeIndex`]: ICD-10 search
//! - [`risk::score`]: heuristic risk tier
//! - [`explain::Explainer`]: optional natural-language elaboration
//! - [`assistant::answer`]: form help lookup

pub mod app;
pub mod assistant;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod explain;
pub mod io;
pub mod lookup;
pub mod report;
pub mod risk;
pub mod tui;
