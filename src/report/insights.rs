//! Historical price analytics.
//!
//! Plain aggregations over priced records:
//! - weekend vs weekday averages and the weekend premium
//! - per-season and per-weekday averages
//! - trailing rolling mean (records are assumed date-sorted)
//! - where a current price sits relative to the historical average

use chrono::Weekday;

use crate::domain::{RawRecord, Season};
use crate::error::{AppError, ErrorKind};
use crate::math::mean;

/// Window of the price moving average, in rows (one row per day).
pub const ROLLING_WINDOW_DAYS: usize = 7;

/// Premium above which weekends are worth calling out.
pub const NOTABLE_WEEKEND_PREMIUM_PCT: f64 = 10.0;

/// A current price below `avg * GREAT_DEAL_RATIO` is a great deal.
pub const GREAT_DEAL_RATIO: f64 = 0.9;
/// A current price above `avg * ABOVE_AVERAGE_RATIO` is above average.
pub const ABOVE_AVERAGE_RATIO: f64 = 1.1;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeekendPremium {
    pub weekend_avg: f64,
    pub weekday_avg: f64,
    /// `(weekend_avg - weekday_avg) / weekday_avg * 100`.
    pub premium_pct: f64,
}

impl WeekendPremium {
    pub fn is_notable(&self) -> bool {
        self.premium_pct > NOTABLE_WEEKEND_PREMIUM_PCT
    }
}

/// Mean price of one group of records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupAverage<K> {
    pub key: K,
    pub avg_price: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceStanding {
    GreatDeal,
    Typical,
    AboveAverage,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceComparison {
    pub standing: PriceStanding,
    pub historical_avg: f64,
    /// Signed distance from the average, in percent of the average.
    pub percent_vs_average: f64,
}

/// Weekend vs weekday averages; `None` unless both groups have a price.
pub fn weekend_premium(records: &[RawRecord]) -> Option<WeekendPremium> {
    let (weekend, weekday): (Vec<&RawRecord>, Vec<&RawRecord>) =
        records.iter().partition(|r| r.is_weekend);
    let weekend_avg = mean(&prices(weekend))?;
    let weekday_avg = mean(&prices(weekday))?;
    if weekday_avg <= 0.0 {
        return None;
    }
    Some(WeekendPremium {
        weekend_avg,
        weekday_avg,
        premium_pct: (weekend_avg - weekday_avg) / weekday_avg * 100.0,
    })
}

/// Average price per season, in `Season::ALL` order; seasons without prices are skipped.
pub fn season_averages(records: &[RawRecord]) -> Vec<GroupAverage<Season>> {
    group_averages(Season::ALL, records, |r| r.season)
}

/// Season with the lowest average price; ties go to the earlier season.
pub fn cheapest_season(records: &[RawRecord]) -> Option<GroupAverage<Season>> {
    season_averages(records)
        .into_iter()
        .reduce(|best, g| if g.avg_price < best.avg_price { g } else { best })
}

/// Average price per weekday, Monday first; days without prices are skipped.
pub fn weekday_averages(records: &[RawRecord]) -> Vec<GroupAverage<Weekday>> {
    group_averages(WEEK, records, |r| r.day_of_week)
}

/// Trailing mean over `window` values; the first `window - 1` entries are `None`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    let lead = (window - 1).min(values.len());
    let mut out = vec![None; lead];
    out.extend(values.windows(window).map(mean));
    out
}

/// 7-day rolling mean of the priced records, aligned with them.
pub fn rolling_price_mean(records: &[RawRecord]) -> Vec<Option<f64>> {
    let prices: Vec<f64> = records.iter().filter_map(|r| r.price).collect();
    rolling_mean(&prices, ROLLING_WINDOW_DAYS)
}

/// Place `current_price` relative to the historical average price.
pub fn compare_to_history(
    current_price: f64,
    records: &[RawRecord],
) -> Result<PriceComparison, AppError> {
    let avg = mean(&prices(records.iter())).filter(|a| *a > 0.0).ok_or_else(|| {
        AppError::new(
            ErrorKind::DivisionUndefined,
            "No positive historical average to compare against.",
        )
    })?;

    let standing = if current_price < avg * GREAT_DEAL_RATIO {
        PriceStanding::GreatDeal
    } else if current_price > avg * ABOVE_AVERAGE_RATIO {
        PriceStanding::AboveAverage
    } else {
        PriceStanding::Typical
    };

    Ok(PriceComparison {
        standing,
        historical_avg: avg,
        percent_vs_average: (current_price - avg) / avg * 100.0,
    })
}

fn prices<'a>(records: impl IntoIterator<Item = &'a RawRecord>) -> Vec<f64> {
    records.into_iter().filter_map(|r| r.price).collect()
}

fn group_averages<K, const N: usize>(
    keys: [K; N],
    records: &[RawRecord],
    key_of: impl Fn(&RawRecord) -> K,
) -> Vec<GroupAverage<K>>
where
    K: Copy + PartialEq,
{
    keys.into_iter()
        .filter_map(|key| {
            let group: Vec<f64> = records
                .iter()
                .filter(|r| key_of(*r) == key)
                .filter_map(|r| r.price)
                .collect();
            mean(&group).map(|avg_price| GroupAverage {
                key,
                avg_price,
                count: group.len(),
            })
        })
        .collect()
}
