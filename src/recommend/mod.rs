//! Booking recommendation policy.
//!
//! `percent_change = (avg_future - current) * 100 / current`, then:
//!
//! | percent_change        | action  | confidence |
//! | --------------------- | ------- | ---------- |
//! | `> 10`                | Book    | High       |
//! | `(5, 10]`             | Book    | Medium     |
//! | `[-5, 5]`             | Monitor | Medium     |
//! | `[-10, -5)`           | Wait    | Medium     |
//! | `< -10`               | Wait    | High       |

use crate::domain::{Action, Confidence, Forecast, Recommendation};
use crate::error::{AppError, ErrorKind};
use crate::math::mean;

const STRONG_MOVE_PCT: f64 = 10.0;
const MOVE_PCT: f64 = 5.0;

/// Classify the current price against a forecast.
pub fn classify(current_price: f64, forecast: &Forecast) -> Result<Recommendation, AppError> {
    classify_prices(current_price, &forecast.prices())
}

/// Same as [`classify`] over a bare list of future prices.
pub fn classify_prices(current_price: f64, future_prices: &[f64]) -> Result<Recommendation, AppError> {
    if !(current_price.is_finite() && current_price > 0.0) {
        return Err(AppError::new(
            ErrorKind::DivisionUndefined,
            format!("Current price must be positive to compute a change, got {current_price}."),
        ));
    }
    let avg = mean(future_prices).ok_or_else(|| {
        AppError::new(
            ErrorKind::DivisionUndefined,
            "Forecast is empty; average future price is undefined.",
        )
    })?;

    let percent_change = (avg - current_price) * 100.0 / current_price;
    let (action, confidence) = decide(percent_change);

    let reason = match action {
        Action::Book => format!("Prices expected to increase by {percent_change:.1}%"),
        Action::Wait => format!("Prices expected to decrease by {:.1}%", percent_change.abs()),
        Action::Monitor => format!("Prices expected to remain stable ({percent_change:.1}% change)"),
    };

    Ok(Recommendation {
        action,
        confidence,
        percent_change,
        current_price,
        predicted_avg_price: avg,
        reason,
    })
}

/// Map a percent change onto exactly one bucket.
pub fn decide(percent_change: f64) -> (Action, Confidence) {
    if percent_change > STRONG_MOVE_PCT {
        (Action::Book, Confidence::High)
    } else if percent_change > MOVE_PCT {
        (Action::Book, Confidence::Medium)
    } else if percent_change < -STRONG_MOVE_PCT {
        (Action::Wait, Confidence::High)
    } else if percent_change < -MOVE_PCT {
        (Action::Wait, Confidence::Medium)
    } else {
        (Action::Monitor, Confidence::Medium)
    }
}
