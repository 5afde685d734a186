//! Training and prediction for the linear price model.
//!
//! Given priced historical records we:
//! - fit category encodings on the full corpus
//! - build feature vectors
//! - split rows deterministically into train/test
//! - solve OLS on the training rows
//! - report MAE/R² on both splits and a feature-importance ranking
//!
//! Metrics and importances are diagnostics only; they never feed back into the model.

use crate::config::TrainConfig;
use crate::domain::{weekday_label, RawRecord, Variant};
use crate::encoding::{CategoryEncoding, CategoryFallback, Encodings};
use crate::error::{AppError, ErrorKind};
use crate::features::FeatureBuilder;
use crate::fit::model::TrainedModel;
use crate::fit::split::train_test_split;
use crate::math::{fit_linear, mean_absolute_error, predict_linear, r2_score};

/// Error metrics on the train and test splits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingMetrics {
    pub train_mae: f64,
    pub test_mae: f64,
    pub train_r2: f64,
    pub test_r2: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureImportance {
    pub feature: String,
    /// Absolute coefficient magnitude.
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub variant: Variant,
    pub metrics: TrainingMetrics,
    /// Descending by importance; ties keep feature declaration order.
    pub feature_importance: Vec<FeatureImportance>,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Prices for a batch plus any category substitutions made while encoding it.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub prices: Vec<f64>,
    pub fallbacks: Vec<CategoryFallback>,
}

/// Fit a model for `variant` on priced records.
pub fn train(
    variant: Variant,
    records: &[RawRecord],
    config: &TrainConfig,
) -> Result<(TrainedModel, TrainingReport), AppError> {
    config.validate()?;

    let n = records.len();
    if n < config.min_rows {
        return Err(AppError::insufficient_data(format!(
            "Need at least {} priced records to train, got {n}.",
            config.min_rows
        )));
    }

    let mut prices = Vec::with_capacity(n);
    for (idx, r) in records.iter().enumerate() {
        match r.price {
            Some(p) if p.is_finite() && p > 0.0 => prices.push(p),
            Some(p) => {
                return Err(AppError::invalid_record(format!(
                    "record {idx}: price must be positive and finite, got {p}."
                )));
            }
            None => {
                return Err(AppError::invalid_record(format!("record {idx}: missing price.")));
            }
        }
    }

    let encodings = Encodings {
        day_of_week: CategoryEncoding::fit(records.iter().map(|r| weekday_label(r.day_of_week)))?,
        season: CategoryEncoding::fit(records.iter().map(|r| r.season.label()))?,
    };

    let builder = FeatureBuilder::new(variant, &encodings);
    let rows: Vec<Vec<f64>> = builder
        .build_all(records)?
        .into_iter()
        .map(|b| b.vector.values().to_vec())
        .collect();

    let split = train_test_split(n, config.test_fraction, config.split_seed);
    tracing::debug!(
        %variant,
        train_rows = split.train.len(),
        test_rows = split.test.len(),
        seed = config.split_seed,
        "split training corpus"
    );

    let x_train: Vec<&[f64]> = split.train.iter().map(|&i| rows[i].as_slice()).collect();
    let y_train: Vec<f64> = split.train.iter().map(|&i| prices[i]).collect();
    let x_test: Vec<&[f64]> = split.test.iter().map(|&i| rows[i].as_slice()).collect();
    let y_test: Vec<f64> = split.test.iter().map(|&i| prices[i]).collect();

    let fit = fit_linear(&x_train, &y_train).ok_or_else(|| {
        AppError::insufficient_data("Training data does not determine a stable linear fit.")
    })?;

    let predict_rows = |xs: &[&[f64]]| -> Vec<f64> {
        xs.iter()
            .map(|row| predict_linear(fit.intercept, &fit.coefficients, row))
            .collect()
    };
    let train_pred = predict_rows(&x_train);
    let test_pred = predict_rows(&x_test);

    let metrics = TrainingMetrics {
        train_mae: mean_absolute_error(&y_train, &train_pred),
        test_mae: mean_absolute_error(&y_test, &test_pred),
        train_r2: r2_score(&y_train, &train_pred),
        test_r2: r2_score(&y_test, &test_pred),
    };

    let model = TrainedModel::from_parts(
        variant,
        variant.feature_names(),
        fit.coefficients,
        fit.intercept,
        encodings,
    )
    .map_err(|e| AppError::insufficient_data(format!("Fitted model is unusable: {e}")))?;

    let feature_importance = rank_features(&model);

    tracing::info!(
        %variant,
        train_mae = metrics.train_mae,
        test_mae = metrics.test_mae,
        train_r2 = metrics.train_r2,
        test_r2 = metrics.test_r2,
        "trained price model"
    );

    let report = TrainingReport {
        variant,
        metrics,
        feature_importance,
        train_rows: split.train.len(),
        test_rows: split.test.len(),
    };
    Ok((model, report))
}

/// Rank features by absolute coefficient, descending.
pub fn rank_features(model: &TrainedModel) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = model
        .feature_order()
        .iter()
        .zip(model.coefficients())
        .map(|(name, c)| FeatureImportance {
            feature: name.clone(),
            importance: c.abs(),
        })
        .collect();
    // `sort_by` is stable, so equal magnitudes keep declaration order.
    ranked.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

/// Predict prices for a batch of records.
///
/// No floor is applied: a negative or implausibly low price is returned as computed and
/// any clamping is left to the caller.
pub fn predict(model: &TrainedModel, records: &[RawRecord]) -> Result<Prediction, AppError> {
    let builder = FeatureBuilder::new(model.variant(), model.encodings());
    let mut prices = Vec::with_capacity(records.len());
    let mut fallbacks = Vec::new();

    for built in builder.build_all(records)? {
        prices.push(model.predict_vector(&built.vector)?);
        fallbacks.extend(built.fallbacks);
    }

    Ok(Prediction { prices, fallbacks })
}

/// Stateful holder around an optional trained model.
///
/// Useful where a model slot exists before training or loading has happened; any
/// prediction in that state fails with `NotTrained`.
#[derive(Debug, Clone)]
pub struct RegressionEngine {
    variant: Variant,
    config: TrainConfig,
    model: Option<TrainedModel>,
}

impl RegressionEngine {
    pub fn new(variant: Variant, config: TrainConfig) -> Self {
        Self {
            variant,
            config,
            model: None,
        }
    }

    pub fn from_model(model: TrainedModel) -> Self {
        Self {
            variant: model.variant(),
            config: TrainConfig::default(),
            model: Some(model),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    pub fn train(&mut self, records: &[RawRecord]) -> Result<TrainingReport, AppError> {
        let (model, report) = train(self.variant, records, &self.config)?;
        self.model = Some(model);
        Ok(report)
    }

    pub fn model(&self) -> Result<&TrainedModel, AppError> {
        self.model.as_ref().ok_or_else(|| {
            AppError::new(
                ErrorKind::NotTrained,
                format!("The {} model must be trained or loaded before predicting.", self.variant),
            )
        })
    }

    pub fn predict(&self, records: &[RawRecord]) -> Result<Prediction, AppError> {
        predict(self.model()?, records)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Datelike, Days, NaiveDate};

    /// Daily records with a price that is exactly linear in the features.
    pub(crate) fn linear_corpus(variant: Variant, n: usize) -> Vec<RawRecord> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let date = start.checked_add_days(Days::new(i as u64)).unwrap();
                let demand = 90.0 + (i % 7) as f64 * 3.0 + (i % 5) as f64;
                let advance = (i % 60) as u32 + 1;
                let mut price = 80.0 + 0.9 * demand + if date.weekday().number_from_monday() >= 6 {
                    25.0
                } else {
                    0.0
                };
                if variant == Variant::Flight {
                    price += 0.5 * advance as f64;
                }
                let record = RawRecord::for_date(date, demand).with_price(price);
                match variant {
                    Variant::Flight => record.with_advance_booking_days(advance),
                    Variant::Hotel => record,
                }
            })
            .collect()
    }

    #[test]
    fn too_few_rows_is_insufficient() {
        let records = linear_corpus(Variant::Hotel, 49);
        let err = train(Variant::Hotel, &records, &TrainConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn missing_price_is_invalid_record() {
        let mut records = linear_corpus(Variant::Hotel, 60);
        records[10].price = None;
        let err = train(Variant::Hotel, &records, &TrainConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRecord);
        assert!(err.message().contains("record 10"));
    }

    #[test]
    fn fits_linear_prices_closely() {
        let records = linear_corpus(Variant::Hotel, 500);
        let (model, report) = train(Variant::Hotel, &records, &TrainConfig::default()).unwrap();

        assert_eq!(report.train_rows, 400);
        assert_eq!(report.test_rows, 100);
        assert!(report.metrics.train_mae < 1e-6, "{:?}", report.metrics);
        assert!(report.metrics.test_mae < 1e-6, "{:?}", report.metrics);
        assert!(report.metrics.test_r2 > 0.999_999);

        let pred = predict(&model, &records[..3]).unwrap();
        for (p, r) in pred.prices.iter().zip(&records) {
            assert!((p - r.price.unwrap()).abs() < 1e-6);
        }
        assert!(pred.fallbacks.is_empty());
    }

    #[test]
    fn training_is_deterministic() {
        let records = linear_corpus(Variant::Flight, 200);
        let config = TrainConfig::default();
        let (a, ra) = train(Variant::Flight, &records, &config).unwrap();
        let (b, rb) = train(Variant::Flight, &records, &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(ra, rb);
        assert_eq!(a.coefficients().len(), 9);
    }

    #[test]
    fn importance_is_sorted_with_stable_ties() {
        let records = linear_corpus(Variant::Hotel, 100);
        let (model, _) = train(Variant::Hotel, &records, &TrainConfig::default()).unwrap();
        let tied = TrainedModel::from_parts(
            Variant::Hotel,
            Variant::Hotel.feature_names(),
            vec![1.0, -3.0, 1.0, 0.5, -1.0, 3.0, 0.0, 2.0],
            0.0,
            model.encodings().clone(),
        )
        .unwrap();

        let names: Vec<String> = rank_features(&tied).into_iter().map(|f| f.feature).collect();
        assert_eq!(
            names,
            vec![
                "day",
                "demand_score",
                "season_code",
                "month",
                "day_of_year",
                "is_weekend",
                "week_of_year",
                "day_of_week_code",
            ]
        );
    }

    #[test]
    fn engine_requires_training() {
        let engine = RegressionEngine::new(Variant::Hotel, TrainConfig::default());
        assert!(!engine.is_trained());
        let err = engine.predict(&linear_corpus(Variant::Hotel, 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotTrained);

        let mut engine = engine;
        engine.train(&linear_corpus(Variant::Hotel, 80)).unwrap();
        assert!(engine.is_trained());
        assert_eq!(engine.predict(&linear_corpus(Variant::Hotel, 2)).unwrap().prices.len(), 2);
    }
}
