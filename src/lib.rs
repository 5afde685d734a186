//! `pricecast` library crate.
//!
//! Trains a linear price model on historical hotel or flight prices, projects a
//! short-horizon price trend, and turns it into a booking recommendation.
//!
//! - `pipeline` is the public entry point; the other modules are its building blocks
//! - no binary ships here, so front-ends (CLI, service, notebooks) stay outside the crate
//! - the crate never installs a `tracing` subscriber

pub mod config;
pub mod domain;
pub mod encoding;
pub mod error;
pub mod features;
pub mod fit;
pub mod forecast;
pub mod io;
pub mod math;
pub mod pipeline;
pub mod recommend;
pub mod report;
