//! Future demand estimation.
//!
//! Demand for future dates is unknown, so the forecaster asks a `DemandEstimator` for
//! it. The default is a seeded heuristic; a better demand model only has to implement
//! the trait.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};

use crate::config::DemandHeuristic;
use crate::error::AppError;

/// Supplies a demand score for a future date.
pub trait DemandEstimator {
    fn estimate(&mut self, date: NaiveDate) -> f64;
}

/// `base + weekend_boost + peak_boost + U(-a, a)` with a seeded RNG.
#[derive(Debug, Clone)]
pub struct HeuristicDemand {
    config: DemandHeuristic,
    rng: StdRng,
    noise: Uniform<f64>,
}

impl HeuristicDemand {
    pub fn new(config: DemandHeuristic) -> Result<Self, AppError> {
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed);
        let noise = Uniform::new_inclusive(-config.noise_amplitude, config.noise_amplitude);
        Ok(Self { config, rng, noise })
    }

    /// Demand before noise is added.
    pub fn expected(&self, date: NaiveDate) -> f64 {
        let mut demand = self.config.base;
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            demand += self.config.weekend_boost;
        }
        if self.config.peak_months.contains(&date.month()) {
            demand += self.config.peak_boost;
        }
        demand
    }
}

impl DemandEstimator for HeuristicDemand {
    fn estimate(&mut self, date: NaiveDate) -> f64 {
        self.expected(date) + self.noise.sample(&mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn expected_applies_boosts() {
        let h = HeuristicDemand::new(DemandHeuristic::default()).unwrap();
        // Wednesday in March: no boosts.
        assert_eq!(h.expected(date(2025, 3, 12)), 100.0);
        // Saturday in March: weekend only.
        assert_eq!(h.expected(date(2025, 3, 15)), 110.0);
        // Wednesday in July: peak only.
        assert_eq!(h.expected(date(2025, 7, 16)), 115.0);
        // Sunday in December: both.
        assert_eq!(h.expected(date(2025, 12, 14)), 125.0);
    }

    #[test]
    fn noise_stays_in_band() {
        let mut h = HeuristicDemand::new(DemandHeuristic::default()).unwrap();
        let d = date(2025, 3, 12);
        for _ in 0..1_000 {
            let v = h.estimate(d);
            assert!((95.0..=105.0).contains(&v), "{v}");
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let d = date(2025, 8, 2);
        let mut a = HeuristicDemand::new(DemandHeuristic::default()).unwrap();
        let mut b = HeuristicDemand::new(DemandHeuristic::default()).unwrap();
        let xs: Vec<f64> = (0..20).map(|_| a.estimate(d)).collect();
        let ys: Vec<f64> = (0..20).map(|_| b.estimate(d)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn overflowing_amplitude_is_rejected_not_sampled() {
        let config = DemandHeuristic {
            noise_amplitude: 1e308,
            ..DemandHeuristic::default()
        };
        let err = HeuristicDemand::new(config).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidConfig);
    }

    #[test]
    fn zero_amplitude_is_noise_free() {
        let config = DemandHeuristic {
            noise_amplitude: 0.0,
            ..DemandHeuristic::default()
        };
        let mut h = HeuristicDemand::new(config).unwrap();
        assert_eq!(h.estimate(date(2025, 3, 12)), 100.0);
    }
}
