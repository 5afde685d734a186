//! Short-horizon trend forecasting.
//!
//! - `demand`: the replaceable future-demand estimator
//! - `trend`: synthesizes future records and prices them

pub mod demand;
pub mod trend;

pub use demand::*;
pub use trend::*;
