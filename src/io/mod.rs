//! Input/output helpers.
//!
//! - reference-table CSV ingest + schema validation (`ingest`)
//! - encounter JSON read/write (`encounter`)

pub mod encounter;
pub mod ingest;

pub use encounter::*;
pub use ingest::*;
