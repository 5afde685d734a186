//! Formatted terminal/text output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::domain::{Action, Forecast, Recommendation};
use crate::fit::TrainingReport;
use crate::report::PriceStats;

/// How many features the training summary lists.
const TOP_FEATURES: usize = 5;

/// Metrics plus the top features of a training run.
pub fn format_training_summary(report: &TrainingReport) -> String {
    let mut out = String::new();
    let m = &report.metrics;

    out.push_str(&format!(
        "=== {} price model ===\n",
        report.variant.display_name()
    ));
    out.push_str(&format!(
        "Rows: train={} | test={}\n",
        report.train_rows, report.test_rows
    ));
    out.push_str(&format!("Training MAE: ${:.2}\n", m.train_mae));
    out.push_str(&format!("Testing MAE:  ${:.2}\n", m.test_mae));
    out.push_str(&format!("Training R²:  {:.3}\n", m.train_r2));
    out.push_str(&format!("Testing R²:   {:.3}\n", m.test_r2));

    out.push_str("\nTop features:\n");
    for f in report.feature_importance.iter().take(TOP_FEATURES) {
        out.push_str(&format!("- {:<22} {:.2}\n", f.feature, f.importance));
    }

    out
}

/// Day-by-day forecast table.
pub fn format_forecast_table(forecast: &Forecast) -> String {
    let mut out = String::new();
    out.push_str(
        format!("{:<12} {:>10} {:>12}\n", "date", "demand", "price").trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<12} {:-<10} {:-<12}\n", "", "", "").trim_end());
    out.push('\n');

    for p in &forecast.points {
        out.push_str(&format!(
            "{:<12} {:>10.1} {:>12}\n",
            p.date.to_string(),
            p.demand_score,
            fmt_money(p.predicted_price)
        ));
    }

    if forecast.is_degraded() {
        out.push_str(&format!(
            "(note: {} category value(s) were unseen at training time)\n",
            forecast.fallbacks.len()
        ));
    }

    out
}

/// Action, confidence, reason, and the price figures behind them.
pub fn format_recommendation(rec: &Recommendation) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} ({} confidence)\n",
        rec.action.display_name(),
        rec.confidence.label()
    ));
    out.push_str(&format!("{}\n", rec.reason));
    out.push_str(&format!(
        "Current: {} | Predicted avg: {} | Change: {:+.1}%\n",
        fmt_money(rec.current_price),
        fmt_money(rec.predicted_avg_price),
        rec.percent_change
    ));
    match (rec.action, rec.savings()) {
        (Action::Wait, Some(s)) => {
            out.push_str(&format!("Potential savings: {}\n", fmt_money(s)));
        }
        (Action::Book, Some(s)) => {
            out.push_str(&format!("Book now to save: {}\n", fmt_money(s)));
        }
        _ => {}
    }
    out
}

/// One-line summary of historical prices.
pub fn format_price_stats(stats: &PriceStats) -> String {
    format!(
        "n={} | mean={} | min={} | max={} | std={}",
        stats.count,
        fmt_money(stats.mean),
        fmt_money(stats.min),
        fmt_money(stats.max),
        stats
            .std_dev
            .map(fmt_money)
            .unwrap_or_else(|| "-".to_string()),
    )
}

fn fmt_money(v: f64) -> String {
    if v.is_finite() {
        format!("${v:.2}")
    } else {
        "-".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::{Action, Confidence, ForecastPoint, Variant};
    use crate::fit::{FeatureImportance, TrainingMetrics};

    #[test]
    fn training_summary_lists_top_five() {
        let report = TrainingReport {
            variant: Variant::Hotel,
            metrics: TrainingMetrics {
                train_mae: 12.346,
                test_mae: 13.0,
                train_r2: 0.8123,
                test_r2: 0.79,
            },
            feature_importance: (0..8)
                .map(|i| FeatureImportance {
                    feature: format!("f{i}"),
                    importance: 8.0 - i as f64,
                })
                .collect(),
            train_rows: 400,
            test_rows: 100,
        };
        let text = format_training_summary(&report);
        assert!(text.starts_with("=== Hotel price model ==="));
        assert!(text.contains("Training MAE: $12.35"));
        assert!(text.contains("Training R²:  0.812"));
        assert!(text.contains("- f4"));
        assert!(!text.contains("- f5"));
    }

    #[test]
    fn forecast_table_has_row_per_day() {
        let anchor = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let forecast = Forecast {
            anchor_date: anchor,
            points: (1..=3)
                .map(|i| ForecastPoint {
                    date: anchor + chrono::Days::new(i),
                    predicted_price: 100.0 + i as f64,
                    demand_score: 100.0,
                })
                .collect(),
            fallbacks: Vec::new(),
        };
        let text = format_forecast_table(&forecast);
        assert_eq!(text.lines().count(), 5);
        assert!(text.contains("2025-01-04"));
        assert!(text.contains("$103.00"));
    }

    #[test]
    fn recommendation_shows_savings() {
        let rec = Recommendation {
            action: Action::Wait,
            confidence: Confidence::High,
            percent_change: -12.5,
            current_price: 200.0,
            predicted_avg_price: 175.0,
            reason: "Prices expected to decrease by 12.5%".to_string(),
        };
        let text = format_recommendation(&rec);
        assert!(text.starts_with("WAIT (High confidence)"));
        assert!(text.contains("Change: -12.5%"));
        assert!(text.contains("Potential savings: $25.00"));
    }
}
