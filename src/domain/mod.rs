//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the model variant and calendar enums (`Variant`, `Season`, `Feature`)
//! - raw observations and their feature vectors (`RawRecord`, `FeatureVector`)
//! - forecast and recommendation outputs (`Forecast`, `Recommendation`)

pub mod types;

pub use types::*;
