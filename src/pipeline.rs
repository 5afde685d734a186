//! Public entry points for the train -> predict -> forecast -> recommend workflow.
//!
//! Each step is a thin composition of the lower-level modules so that callers
//! (a CLI, a service, a notebook) only deal with records, models and forecasts.

use std::path::Path;

use chrono::NaiveDate;

use crate::config::{PipelineConfig, PredictionDefaults, TrainConfig};
use crate::domain::{Forecast, RawRecord, Recommendation, Variant};
use crate::error::AppError;
use crate::fit::{self, TrainedModel, TrainingReport};
use crate::forecast::{project, synthesize, HeuristicDemand};
use crate::io::ingest::{load_history, IngestedData};
use crate::recommend::classify;

/// All outputs of training from a CSV file.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub ingest: IngestedData,
    pub model: TrainedModel,
    pub report: TrainingReport,
}

/// Fit a model for `variant` on priced records.
pub fn train(
    variant: Variant,
    records: &[RawRecord],
    config: &TrainConfig,
) -> Result<(TrainedModel, TrainingReport), AppError> {
    fit::train(variant, records, config)
}

/// Ingest a historical CSV and train on its valid rows.
pub fn train_from_csv(
    path: &Path,
    variant: Variant,
    config: &TrainConfig,
) -> Result<TrainOutcome, AppError> {
    let ingest = load_history(path, variant)?;
    let (model, report) = train(variant, &ingest.records, config)?;
    Ok(TrainOutcome {
        ingest,
        model,
        report,
    })
}

/// Record describing `date` as "today", filled from the prediction defaults.
pub fn today_record(variant: Variant, date: NaiveDate, defaults: &PredictionDefaults) -> RawRecord {
    synthesize(variant, date, defaults.current_demand_score, defaults)
}

/// Price a single record with a trained model.
pub fn predict_current(model: &TrainedModel, record: &RawRecord) -> Result<f64, AppError> {
    let prediction = fit::predict(model, std::slice::from_ref(record))?;
    prediction
        .prices
        .first()
        .copied()
        .ok_or_else(|| AppError::invalid_record("Prediction produced no price."))
}

/// Project `horizon_days` of prices after `anchor_date` using the configured demand heuristic.
pub fn forecast(
    model: &TrainedModel,
    anchor_date: NaiveDate,
    horizon_days: u32,
    config: &PipelineConfig,
) -> Result<Forecast, AppError> {
    let mut demand = HeuristicDemand::new(config.demand.clone())?;
    project(model, anchor_date, horizon_days, &mut demand, &config.defaults)
}

/// Classify `current_price` against a forecast.
pub fn recommend(current_price: f64, forecast: &Forecast) -> Result<Recommendation, AppError> {
    classify(current_price, forecast)
}
