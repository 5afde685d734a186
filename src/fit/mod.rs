//! Model fitting.
//!
//! Responsibilities:
//!
//! - deterministic train/test split
//! - OLS fit over built feature vectors
//! - diagnostics (MAE, R², feature importance)
//! - batch prediction against a trained model

pub mod model;
pub mod regression;
pub mod split;

pub use model::*;
pub use regression::*;
pub use split::*;
