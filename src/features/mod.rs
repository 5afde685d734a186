//! Feature construction.
//!
//! Turns `RawRecord`s into fixed-order numeric vectors. The fitting and forecasting
//! layers both go through here so train-time and predict-time encodings cannot drift.

pub mod builder;

pub use builder::*;
