//! Raw record → feature vector.
//!
//! The builder is a pure function of `(record, variant, encodings)`. Calendar features
//! come from the record date (ISO week numbering), categorical fields go through the
//! frozen encodings, and `advance_booking_days` is appended only for flights.

use chrono::Datelike;

use crate::domain::{weekday_label, CategoryField, Feature, FeatureVector, RawRecord, Variant};
use crate::encoding::{CategoryFallback, Encodings};
use crate::error::AppError;

/// Output of a single build: the vector plus any category substitutions.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltFeatures {
    pub vector: FeatureVector,
    pub fallbacks: Vec<CategoryFallback>,
}

/// Builds feature vectors for one variant against one set of encodings.
#[derive(Debug, Clone, Copy)]
pub struct FeatureBuilder<'a> {
    variant: Variant,
    encodings: &'a Encodings,
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(variant: Variant, encodings: &'a Encodings) -> Self {
        Self { variant, encodings }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Feature names in the order `build` emits them.
    pub fn feature_names(&self) -> Vec<String> {
        self.variant.feature_names()
    }

    pub fn build(&self, record: &RawRecord) -> Result<BuiltFeatures, AppError> {
        let date = record
            .date
            .ok_or_else(|| AppError::invalid_record("Record has no date."))?;

        if !(1..=12).contains(&record.month) {
            return Err(AppError::invalid_record(format!(
                "Month {} is outside 1-12.",
                record.month
            )));
        }
        record.check_calendar()?;
        if !record.demand_score.is_finite() {
            return Err(AppError::invalid_record("Demand score is not finite."));
        }

        let advance_days = match self.variant {
            Variant::Flight => Some(record.advance_booking_days.ok_or_else(|| {
                AppError::invalid_record("Flight record is missing `advance_booking_days`.")
            })?),
            Variant::Hotel => None,
        };

        let mut fallbacks = Vec::new();
        let features = self.variant.features();
        let mut values = Vec::with_capacity(features.len());

        for feature in features {
            let v = match feature {
                Feature::Month => record.month as f64,
                Feature::Day => date.day() as f64,
                Feature::DayOfYear => date.ordinal() as f64,
                Feature::WeekOfYear => date.iso_week().week() as f64,
                Feature::IsWeekend => {
                    if record.is_weekend {
                        1.0
                    } else {
                        0.0
                    }
                }
                Feature::DemandScore => record.demand_score,
                Feature::DayOfWeekCode => self.encodings.encode_into(
                    CategoryField::DayOfWeek,
                    weekday_label(record.day_of_week),
                    &mut fallbacks,
                ) as f64,
                Feature::SeasonCode => self.encodings.encode_into(
                    CategoryField::Season,
                    record.season.label(),
                    &mut fallbacks,
                ) as f64,
                // Only present in the flight feature list, where `advance_days` is set.
                Feature::AdvanceBookingDays => advance_days.unwrap_or_default() as f64,
            };
            values.push(v);
        }

        Ok(BuiltFeatures {
            vector: FeatureVector::new(values),
            fallbacks,
        })
    }

    /// Build every record, tagging errors with the record index.
    pub fn build_all(&self, records: &[RawRecord]) -> Result<Vec<BuiltFeatures>, AppError> {
        records
            .iter()
            .enumerate()
            .map(|(idx, r)| self.build(r).map_err(|e| e.context(format!("record {idx}"))))
            .collect()
    }
}
