//! Reporting utilities: historical price statistics, analytics, and formatted output.

pub mod format;
pub mod insights;

pub use format::*;
pub use insights::*;

use crate::domain::RawRecord;
use crate::math::{mean, sample_std};

/// Summary of observed prices in a historical corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation; `None` with fewer than two prices.
    pub std_dev: Option<f64>,
}

/// Statistics over the priced records; `None` if no record has a price.
pub fn price_stats(records: &[RawRecord]) -> Option<PriceStats> {
    let prices: Vec<f64> = records.iter().filter_map(|r| r.price).collect();
    let mean = mean(&prices)?;
    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(PriceStats {
        count: prices.len(),
        mean,
        min,
        max,
        std_dev: sample_std(&prices),
    })
}
