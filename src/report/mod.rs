//! Formatted terminal output.
//!
//! Formatting lives in one place so the lookup and scoring code stays free of
//! presentation concerns.

pub mod format;

pub use format::*;
