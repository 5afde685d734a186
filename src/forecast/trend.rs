//! Multi-day price projection.
//!
//! For each day after the anchor we synthesize a record (calendar fields from the date,
//! demand from the estimator, flight booking lead from the defaults) and price it with
//! the trained model.

use chrono::{Days, NaiveDate};

use crate::config::PredictionDefaults;
use crate::domain::{Forecast, ForecastPoint, RawRecord, Variant};
use crate::error::{AppError, ErrorKind};
use crate::fit::{predict, TrainedModel};
use crate::forecast::demand::DemandEstimator;

pub const MIN_HORIZON_DAYS: u32 = 1;
pub const MAX_HORIZON_DAYS: u32 = 365;

/// Project prices for `anchor_date + 1 ..= anchor_date + horizon_days`.
pub fn project(
    model: &TrainedModel,
    anchor_date: NaiveDate,
    horizon_days: u32,
    demand: &mut dyn DemandEstimator,
    defaults: &PredictionDefaults,
) -> Result<Forecast, AppError> {
    if !(MIN_HORIZON_DAYS..=MAX_HORIZON_DAYS).contains(&horizon_days) {
        return Err(AppError::new(
            ErrorKind::InvalidHorizon,
            format!(
                "Horizon must be between {MIN_HORIZON_DAYS} and {MAX_HORIZON_DAYS} days, got {horizon_days}."
            ),
        ));
    }

    let mut records = Vec::with_capacity(horizon_days as usize);
    for offset in 1..=horizon_days {
        let date = anchor_date
            .checked_add_days(Days::new(u64::from(offset)))
            .ok_or_else(|| {
                AppError::invalid_record(format!("{anchor_date} + {offset} days is out of range."))
            })?;
        records.push(synthesize(model.variant(), date, demand.estimate(date), defaults));
    }

    let prediction = predict(model, &records)?;
    let points = records
        .iter()
        .zip(prediction.prices)
        .filter_map(|(r, price)| {
            r.date.map(|date| ForecastPoint {
                date,
                predicted_price: price,
                demand_score: r.demand_score,
            })
        })
        .collect();

    tracing::debug!(
        variant = %model.variant(),
        %anchor_date,
        horizon_days,
        fallbacks = prediction.fallbacks.len(),
        "projected price trend"
    );

    Ok(Forecast {
        anchor_date,
        points,
        fallbacks: prediction.fallbacks,
    })
}

/// Unpriced record for `date` with the variant's default fields filled in.
pub fn synthesize(
    variant: Variant,
    date: NaiveDate,
    demand_score: f64,
    defaults: &PredictionDefaults,
) -> RawRecord {
    let record = RawRecord::for_date(date, demand_score);
    match variant {
        Variant::Flight => record.with_advance_booking_days(defaults.flight_advance_booking_days),
        Variant::Hotel => record,
    }
}
