//! The trained, immutable price model.

use crate::domain::{FeatureVector, Variant};
use crate::encoding::Encodings;
use crate::error::AppError;
use crate::math::predict_linear;

/// Coefficients, intercept, and encodings for one variant.
///
/// Instances are only produced by training or by `from_parts` (artifact load), both of
/// which enforce:
///
/// - `feature_order` equals the variant's feature list exactly
/// - `coefficients.len() == feature_order.len()`
/// - every number is finite, every encoding is well formed
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    variant: Variant,
    feature_order: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
    encodings: Encodings,
}

impl TrainedModel {
    pub fn from_parts(
        variant: Variant,
        feature_order: Vec<String>,
        coefficients: Vec<f64>,
        intercept: f64,
        encodings: Encodings,
    ) -> Result<Self, AppError> {
        let expected = variant.feature_names();
        if feature_order != expected {
            return Err(AppError::corrupt_artifact(format!(
                "Feature order {feature_order:?} does not match the {variant} feature set {expected:?}."
            )));
        }
        if coefficients.len() != feature_order.len() {
            return Err(AppError::corrupt_artifact(format!(
                "Model has {} coefficients for {} features.",
                coefficients.len(),
                feature_order.len()
            )));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(AppError::corrupt_artifact("Model parameters must be finite."));
        }
        encodings.validate()?;

        Ok(Self {
            variant,
            feature_order,
            coefficients,
            intercept,
            encodings,
        })
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn feature_order(&self) -> &[String] {
        &self.feature_order
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn encodings(&self) -> &Encodings {
        &self.encodings
    }

    /// Price for an already-built feature vector.
    ///
    /// Fails if the vector length does not match the model (a vector built for the
    /// other variant).
    pub fn predict_vector(&self, vector: &FeatureVector) -> Result<f64, AppError> {
        if vector.len() != self.coefficients.len() {
            return Err(AppError::invalid_record(format!(
                "Feature vector has {} values, model expects {}.",
                vector.len(),
                self.coefficients.len()
            )));
        }
        Ok(predict_linear(self.intercept, &self.coefficients, vector.values()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::CategoryEncoding;
    use crate::error::ErrorKind;

    fn encodings() -> Encodings {
        Encodings {
            day_of_week: CategoryEncoding::fit(["Monday", "Sunday"]).unwrap(),
            season: CategoryEncoding::fit(["Winter"]).unwrap(),
        }
    }

    #[test]
    fn from_parts_accepts_consistent_model() {
        let names = Variant::Hotel.feature_names();
        let model =
            TrainedModel::from_parts(Variant::Hotel, names, vec![1.0; 8], 5.0, encodings()).unwrap();
        let v = FeatureVector::new(vec![1.0; 8]);
        assert_eq!(model.predict_vector(&v).unwrap(), 13.0);
    }

    #[test]
    fn flight_order_without_advance_days_is_corrupt() {
        let names = Variant::Hotel.feature_names();
        let err = TrainedModel::from_parts(Variant::Flight, names, vec![1.0; 8], 0.0, encodings())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptArtifact);
    }

    #[test]
    fn reordered_features_are_corrupt() {
        let mut names = Variant::Hotel.feature_names();
        names.swap(0, 1);
        let err = TrainedModel::from_parts(Variant::Hotel, names, vec![1.0; 8], 0.0, encodings())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptArtifact);
    }

    #[test]
    fn coefficient_count_and_finiteness_are_checked() {
        let names = Variant::Hotel.feature_names();
        let err = TrainedModel::from_parts(Variant::Hotel, names.clone(), vec![1.0; 7], 0.0, encodings())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptArtifact);

        let mut coefs = vec![1.0; 8];
        coefs[3] = f64::NAN;
        let err = TrainedModel::from_parts(Variant::Hotel, names, coefs, 0.0, encodings()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptArtifact);
    }

    #[test]
    fn wrong_length_vector_is_rejected() {
        let names = Variant::Hotel.feature_names();
        let model =
            TrainedModel::from_parts(Variant::Hotel, names, vec![1.0; 8], 0.0, encodings()).unwrap();
        let err = model.predict_vector(&FeatureVector::new(vec![1.0; 9])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRecord);
    }
}
