//! Label → integer code mappings for categorical fields.
//!
//! An encoding is fitted once on the training corpus and then frozen:
//!
//! - distinct labels are sorted lexicographically and code = rank, so refitting the
//!   same corpus always reproduces the same mapping
//! - lookups never fail: an unseen label resolves to the first known label (code 0)
//!   and the substitution is reported to the caller

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::CategoryField;
use crate::error::AppError;

/// Frozen label → code mapping for one categorical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryEncoding {
    codes: BTreeMap<String, u32>,
}

/// Result of looking up a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoded {
    Known(u32),
    /// The label was not seen at fit time; `code` belongs to the first known label.
    Fallback { code: u32 },
}

impl Encoded {
    pub fn code(self) -> u32 {
        match self {
            Encoded::Known(code) | Encoded::Fallback { code } => code,
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, Encoded::Fallback { .. })
    }
}

/// A recorded substitution of an unseen label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryFallback {
    pub field: CategoryField,
    pub value: String,
    pub substitute: String,
}

impl CategoryEncoding {
    /// Fit an encoding over the distinct values of a corpus column.
    pub fn fit<I, S>(values: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels: Vec<String> = values.into_iter().map(|v| v.as_ref().to_string()).collect();
        labels.sort();
        labels.dedup();

        if labels.is_empty() {
            return Err(AppError::insufficient_data(
                "Cannot fit a category encoding on zero values.",
            ));
        }

        let codes = labels
            .into_iter()
            .enumerate()
            .map(|(rank, label)| (label, rank as u32))
            .collect();
        Ok(Self { codes })
    }

    /// Look up `value`, falling back to the first known label if unseen.
    pub fn encode(&self, value: &str) -> Encoded {
        match self.codes.get(value) {
            Some(&code) => Encoded::Known(code),
            None => Encoded::Fallback {
                code: self.fallback_code(),
            },
        }
    }

    /// Code of the lexicographically-first label.
    pub fn fallback_code(&self) -> u32 {
        self.codes.values().next().copied().unwrap_or(0)
    }

    pub fn fallback_label(&self) -> Option<&str> {
        self.codes.keys().next().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.codes.keys().map(String::as_str)
    }

    pub fn code_of(&self, label: &str) -> Option<u32> {
        self.codes.get(label).copied()
    }

    /// Check the shape a fitted encoding always has: non-empty, codes equal to the
    /// sorted rank of each label.
    pub fn validate(&self, field: CategoryField) -> Result<(), AppError> {
        if self.codes.is_empty() {
            return Err(AppError::corrupt_artifact(format!(
                "Encoding for `{}` is empty.",
                field.name()
            )));
        }
        for (rank, (label, &code)) in self.codes.iter().enumerate() {
            if code as usize != rank {
                return Err(AppError::corrupt_artifact(format!(
                    "Encoding for `{}` maps '{label}' to {code}, expected {rank}.",
                    field.name()
                )));
            }
        }
        Ok(())
    }
}

/// Per-field encodings owned by a trained model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encodings {
    pub day_of_week: CategoryEncoding,
    pub season: CategoryEncoding,
}

impl Encodings {
    pub fn get(&self, field: CategoryField) -> &CategoryEncoding {
        match field {
            CategoryField::DayOfWeek => &self.day_of_week,
            CategoryField::Season => &self.season,
        }
    }

    /// Encode `value` for `field`, recording a fallback into `fallbacks` if one happens.
    pub fn encode_into(
        &self,
        field: CategoryField,
        value: &str,
        fallbacks: &mut Vec<CategoryFallback>,
    ) -> u32 {
        let encoding = self.get(field);
        let encoded = encoding.encode(value);
        if encoded.is_fallback() {
            let substitute = encoding.fallback_label().unwrap_or_default().to_string();
            tracing::warn!(
                field = field.name(),
                value,
                substitute = substitute.as_str(),
                "unseen category, using fallback code"
            );
            fallbacks.push(CategoryFallback {
                field,
                value: value.to_string(),
                substitute,
            });
        }
        encoded.code()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.day_of_week.validate(CategoryField::DayOfWeek)?;
        self.season.validate(CategoryField::Season)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn fit_sorts_and_dedups() {
        let enc = CategoryEncoding::fit(["Winter", "Summer", "Winter", "Fall", "Spring"]).unwrap();
        assert_eq!(enc.len(), 4);
        assert_eq!(enc.code_of("Fall"), Some(0));
        assert_eq!(enc.code_of("Spring"), Some(1));
        assert_eq!(enc.code_of("Summer"), Some(2));
        assert_eq!(enc.code_of("Winter"), Some(3));
    }

    #[test]
    fn refit_is_deterministic() {
        let a = CategoryEncoding::fit(["Tuesday", "Monday", "Sunday"]).unwrap();
        let b = CategoryEncoding::fit(["Sunday", "Tuesday", "Monday", "Monday"]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unseen_value_falls_back_to_first_label() {
        let enc = CategoryEncoding::fit(["Saturday", "Monday", "Friday"]).unwrap();
        assert_eq!(enc.encode("Monday"), Encoded::Known(1));

        let missing = enc.encode("Holiday");
        assert!(missing.is_fallback());
        assert_eq!(missing.code(), 0);
        assert_eq!(enc.fallback_label(), Some("Friday"));

        // Lookup is total, including odd inputs.
        for s in ["", " ", "monday", "\u{1F600}"] {
            assert_eq!(enc.encode(s).code(), 0);
        }
        assert_eq!(enc.len(), 3);
    }

    #[test]
    fn fit_on_empty_is_insufficient() {
        let err = CategoryEncoding::fit(Vec::<String>::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn encode_into_records_fallbacks() {
        let encodings = Encodings {
            day_of_week: CategoryEncoding::fit(["Monday", "Tuesday"]).unwrap(),
            season: CategoryEncoding::fit(["Summer"]).unwrap(),
        };
        let mut fallbacks = Vec::new();
        assert_eq!(encodings.encode_into(CategoryField::DayOfWeek, "Tuesday", &mut fallbacks), 1);
        assert!(fallbacks.is_empty());

        assert_eq!(encodings.encode_into(CategoryField::Season, "Winter", &mut fallbacks), 0);
        assert_eq!(
            fallbacks,
            vec![CategoryFallback {
                field: CategoryField::Season,
                value: "Winter".to_string(),
                substitute: "Summer".to_string(),
            }]
        );
    }

    #[test]
    fn validate_rejects_sparse_codes() {
        let enc: CategoryEncoding = serde_json::from_str(r#"{"Fall": 0, "Winter": 2}"#).unwrap();
        let err = enc.validate(CategoryField::Season).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptArtifact);

        let empty: CategoryEncoding = serde_json::from_str("{}").unwrap();
        assert!(empty.validate(CategoryField::Season).is_err());
    }
}
