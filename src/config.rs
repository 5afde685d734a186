//! Pipeline configuration.
//!
//! Defaults: 80/20 split with seed 42, demand heuristic
//! `100 + 10 weekend + 15 peak ± 5`. `PipelineConfig::from_env` loads `.env` and applies
//! `PRICECAST_*` overrides on top.

use std::str::FromStr;

use crate::error::AppError;

/// Training knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    /// Corpora smaller than this are rejected.
    pub min_rows: usize,
    /// Fraction of rows held out for test metrics.
    pub test_fraction: f64,
    /// Seed for the train/test shuffle.
    pub split_seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            min_rows: 50,
            test_fraction: 0.2,
            split_seed: 42,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.min_rows < 2 {
            return Err(AppError::invalid_config("min_rows must be at least 2."));
        }
        if !(self.test_fraction.is_finite() && self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(AppError::invalid_config(format!(
                "test_fraction must be in (0, 1), got {}.",
                self.test_fraction
            )));
        }
        Ok(())
    }
}

/// Upper bound on the demand noise half-width; the sampling range `2a` must stay finite.
pub const MAX_NOISE_AMPLITUDE: f64 = 1.0e6;

/// Constants of the future-demand heuristic.
///
/// `demand = base + weekend_boost (Sat/Sun) + peak_boost (peak month) + U(-a, a)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandHeuristic {
    pub base: f64,
    pub weekend_boost: f64,
    pub peak_boost: f64,
    pub peak_months: Vec<u32>,
    /// Half-width `a` of the uniform noise band.
    pub noise_amplitude: f64,
    pub seed: u64,
}

impl Default for DemandHeuristic {
    fn default() -> Self {
        Self {
            base: 100.0,
            weekend_boost: 10.0,
            peak_boost: 15.0,
            peak_months: vec![6, 7, 8, 12],
            noise_amplitude: 5.0,
            seed: 42,
        }
    }
}

impl DemandHeuristic {
    pub fn validate(&self) -> Result<(), AppError> {
        for (name, v) in [
            ("base", self.base),
            ("weekend_boost", self.weekend_boost),
            ("peak_boost", self.peak_boost),
        ] {
            if !v.is_finite() {
                return Err(AppError::invalid_config(format!("Demand {name} must be finite.")));
            }
        }
        if !(self.noise_amplitude.is_finite()
            && (0.0..=MAX_NOISE_AMPLITUDE).contains(&self.noise_amplitude))
        {
            return Err(AppError::invalid_config(format!(
                "Noise amplitude must be in [0, {MAX_NOISE_AMPLITUDE}], got {}.",
                self.noise_amplitude
            )));
        }
        if let Some(m) = self.peak_months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(AppError::invalid_config(format!("Peak month {m} is outside 1-12.")));
        }
        Ok(())
    }
}

/// Field values used when synthesizing records for which nothing is observed.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionDefaults {
    /// Demand score assumed for "today" when pricing the current date.
    pub current_demand_score: f64,
    /// Advance booking days assumed for flight records.
    pub flight_advance_booking_days: u32,
}

impl Default for PredictionDefaults {
    fn default() -> Self {
        Self {
            current_demand_score: 105.0,
            flight_advance_booking_days: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineConfig {
    pub train: TrainConfig,
    pub demand: DemandHeuristic,
    pub defaults: PredictionDefaults,
}

impl PipelineConfig {
    /// Defaults with `.env` / process environment overrides applied.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        tracing::debug!(?config, "loaded pipeline config");
        Ok(config)
    }

    /// Defaults with overrides taken from `lookup` (keys are `PRICECAST_*`).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut c = Self::default();

        override_parsed(&lookup, "PRICECAST_MIN_ROWS", &mut c.train.min_rows)?;
        override_parsed(&lookup, "PRICECAST_TEST_FRACTION", &mut c.train.test_fraction)?;
        override_parsed(&lookup, "PRICECAST_SPLIT_SEED", &mut c.train.split_seed)?;

        override_parsed(&lookup, "PRICECAST_DEMAND_BASE", &mut c.demand.base)?;
        override_parsed(&lookup, "PRICECAST_WEEKEND_BOOST", &mut c.demand.weekend_boost)?;
        override_parsed(&lookup, "PRICECAST_PEAK_BOOST", &mut c.demand.peak_boost)?;
        override_parsed(&lookup, "PRICECAST_NOISE_AMPLITUDE", &mut c.demand.noise_amplitude)?;
        override_parsed(&lookup, "PRICECAST_DEMAND_SEED", &mut c.demand.seed)?;
        if let Some(raw) = lookup("PRICECAST_PEAK_MONTHS") {
            c.demand.peak_months = parse_month_list(&raw)?;
        }

        override_parsed(
            &lookup,
            "PRICECAST_CURRENT_DEMAND",
            &mut c.defaults.current_demand_score,
        )?;
        override_parsed(
            &lookup,
            "PRICECAST_FLIGHT_ADVANCE_DAYS",
            &mut c.defaults.flight_advance_booking_days,
        )?;

        c.validate()?;
        Ok(c)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.train.validate()?;
        self.demand.validate()?;
        if !self.defaults.current_demand_score.is_finite() {
            return Err(AppError::invalid_config("Current demand score must be finite."));
        }
        Ok(())
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, slot: &mut T) -> Result<(), AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key) else {
        return Ok(());
    };
    *slot = raw
        .trim()
        .parse()
        .map_err(|_| AppError::invalid_config(format!("Invalid value for {key}: '{raw}'")))?;
    Ok(())
}

fn parse_month_list(raw: &str) -> Result<Vec<u32>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>().map_err(|_| {
                AppError::invalid_config(format!("Invalid month in PRICECAST_PEAK_MONTHS: '{s}'"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::error::ErrorKind;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn no_overrides_gives_defaults() {
        let c = PipelineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(c, PipelineConfig::default());
        assert_eq!(c.train.split_seed, 42);
        assert_eq!(c.demand.peak_months, vec![6, 7, 8, 12]);
        assert_eq!(c.defaults.flight_advance_booking_days, 30);
    }

    #[test]
    fn overrides_are_applied() {
        let c = PipelineConfig::from_lookup(lookup_from(&[
            ("PRICECAST_TEST_FRACTION", "0.25"),
            ("PRICECAST_SPLIT_SEED", " 7 "),
            ("PRICECAST_PEAK_MONTHS", "7, 8"),
            ("PRICECAST_NOISE_AMPLITUDE", "0"),
        ]))
        .unwrap();
        assert_eq!(c.train.test_fraction, 0.25);
        assert_eq!(c.train.split_seed, 7);
        assert_eq!(c.demand.peak_months, vec![7, 8]);
        assert_eq!(c.demand.noise_amplitude, 0.0);
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = PipelineConfig::from_lookup(lookup_from(&[("PRICECAST_MIN_ROWS", "lots")]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);

        let err = PipelineConfig::from_lookup(lookup_from(&[("PRICECAST_TEST_FRACTION", "1.5")]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);

        let err = PipelineConfig::from_lookup(lookup_from(&[("PRICECAST_PEAK_MONTHS", "6,13")]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);

        let err =
            PipelineConfig::from_lookup(lookup_from(&[("PRICECAST_NOISE_AMPLITUDE", "-1")]))
                .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);

        for huge in ["1e308", "1e7", "inf"] {
            let err =
                PipelineConfig::from_lookup(lookup_from(&[("PRICECAST_NOISE_AMPLITUDE", huge)]))
                    .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidConfig, "{huge}");
        }
        let c = PipelineConfig::from_lookup(lookup_from(&[("PRICECAST_NOISE_AMPLITUDE", "1e6")]))
            .unwrap();
        assert_eq!(c.demand.noise_amplitude, MAX_NOISE_AMPLITUDE);
    }
}
