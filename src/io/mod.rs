//! Input/output helpers.
//!
//! - historical CSV ingest + validation (`ingest`)
//! - model artifact read/write (`store`)

pub mod ingest;
pub mod store;

pub use ingest::*;
pub use store::*;
