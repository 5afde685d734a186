//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - built from CSV rows or synthesized for future dates
//! - passed between the feature, fitting, and forecasting layers
//! - written into saved model artifacts

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::encoding::CategoryFallback;
use crate::error::AppError;

/// Which priced good a model targets.
///
/// The variant decides the feature set: flights carry `advance_booking_days`, hotels do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Hotel,
    Flight,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Hotel, Variant::Flight];

    /// Ordered feature list emitted by the feature builder for this variant.
    pub fn features(self) -> &'static [Feature] {
        match self {
            Variant::Hotel => &HOTEL_FEATURES,
            Variant::Flight => &Feature::ALL,
        }
    }

    /// Feature names in emission order (the persisted `feature_order`).
    pub fn feature_names(self) -> Vec<String> {
        self.features().iter().map(|f| f.name().to_string()).collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Hotel => "hotel",
            Variant::Flight => "flight",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Variant::Hotel => "Hotel",
            Variant::Flight => "Flight",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meteorological season derived from the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    /// Canonical mapping: Dec/Jan/Feb → Winter, Mar–May → Spring, Jun–Aug → Summer,
    /// Sep–Nov → Fall. Returns `None` for months outside 1–12.
    pub fn from_month(month: u32) -> Option<Season> {
        match month {
            12 | 1 | 2 => Some(Season::Winter),
            3..=5 => Some(Season::Spring),
            6..=8 => Some(Season::Summer),
            9..=11 => Some(Season::Fall),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }

    /// Parse a season label, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Season> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spring" => Some(Season::Spring),
            "summer" => Some(Season::Summer),
            "fall" | "autumn" => Some(Season::Fall),
            "winter" => Some(Season::Winter),
            _ => None,
        }
    }
}

/// Full English weekday name, e.g. `"Monday"`.
pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parse a full or abbreviated English weekday name (case-insensitive).
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    s.trim().parse::<Weekday>().ok()
}

/// Categorical fields that go through a category encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryField {
    DayOfWeek,
    Season,
}

impl CategoryField {
    pub fn name(self) -> &'static str {
        match self {
            CategoryField::DayOfWeek => "day_of_week",
            CategoryField::Season => "season",
        }
    }
}

static HOTEL_FEATURES: [Feature; 8] = [
    Feature::Month,
    Feature::Day,
    Feature::DayOfYear,
    Feature::WeekOfYear,
    Feature::IsWeekend,
    Feature::DemandScore,
    Feature::DayOfWeekCode,
    Feature::SeasonCode,
];

/// One column of the feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Month,
    Day,
    DayOfYear,
    WeekOfYear,
    IsWeekend,
    DemandScore,
    DayOfWeekCode,
    SeasonCode,
    AdvanceBookingDays,
}

impl Feature {
    /// Declaration order; also the emission order.
    pub const ALL: [Feature; 9] = [
        Feature::Month,
        Feature::Day,
        Feature::DayOfYear,
        Feature::WeekOfYear,
        Feature::IsWeekend,
        Feature::DemandScore,
        Feature::DayOfWeekCode,
        Feature::SeasonCode,
        Feature::AdvanceBookingDays,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::Month => "month",
            Feature::Day => "day",
            Feature::DayOfYear => "day_of_year",
            Feature::WeekOfYear => "week_of_year",
            Feature::IsWeekend => "is_weekend",
            Feature::DemandScore => "demand_score",
            Feature::DayOfWeekCode => "day_of_week_code",
            Feature::SeasonCode => "season_code",
            Feature::AdvanceBookingDays => "advance_booking_days",
        }
    }
}

/// One observation (historical, current, or synthesized future).
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub date: Option<NaiveDate>,
    /// Absent for future or unknown points.
    pub price: Option<f64>,
    pub day_of_week: Weekday,
    pub month: u32,
    pub is_weekend: bool,
    pub season: Season,
    pub demand_score: f64,
    /// Present only for the flight variant.
    pub advance_booking_days: Option<u32>,
}

impl RawRecord {
    /// Build an unpriced record whose calendar fields are all derived from `date`.
    pub fn for_date(date: NaiveDate, demand_score: f64) -> Self {
        let day_of_week = date.weekday();
        let month = date.month();
        Self {
            date: Some(date),
            price: None,
            day_of_week,
            month,
            is_weekend: matches!(day_of_week, Weekday::Sat | Weekday::Sun),
            season: Season::from_month(month).unwrap_or(Season::Winter),
            demand_score,
            advance_booking_days: None,
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_advance_booking_days(mut self, days: u32) -> Self {
        self.advance_booking_days = Some(days);
        self
    }

    /// Require `month`, `day_of_week`, `is_weekend` and `season` to agree with `date`.
    pub fn check_calendar(&self) -> Result<(), AppError> {
        let date = self
            .date
            .ok_or_else(|| AppError::invalid_record("Record has no date."))?;

        if self.month != date.month() {
            return Err(AppError::invalid_record(format!(
                "Month {} does not match date {date}.",
                self.month
            )));
        }
        if self.day_of_week != date.weekday() {
            return Err(AppError::invalid_record(format!(
                "Day of week {} does not match date {date} ({}).",
                weekday_label(self.day_of_week),
                weekday_label(date.weekday())
            )));
        }
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        if self.is_weekend != weekend {
            return Err(AppError::invalid_record(format!(
                "is_weekend={} does not match date {date}.",
                self.is_weekend
            )));
        }
        if Season::from_month(self.month) != Some(self.season) {
            return Err(AppError::invalid_record(format!(
                "Season {} does not match month {}.",
                self.season.label(),
                self.month
            )));
        }
        Ok(())
    }
}

/// Fixed-order numeric encoding of one record. Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub(crate) fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One projected day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_price: f64,
    /// Demand score synthesized for this date.
    pub demand_score: f64,
}

/// Ascending per-day price projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub anchor_date: NaiveDate,
    pub points: Vec<ForecastPoint>,
    /// Category substitutions that happened while encoding the synthesized records.
    pub fallbacks: Vec<CategoryFallback>,
}

impl Forecast {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.predicted_price).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Mean predicted price, or `None` for an empty forecast.
    pub fn average_price(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        let sum: f64 = self.points.iter().map(|p| p.predicted_price).sum();
        Some(sum / self.points.len() as f64)
    }

    /// True if any category fell back to its default code during projection.
    pub fn is_degraded(&self) -> bool {
        !self.fallbacks.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Book,
    Wait,
    Monitor,
}

impl Action {
    pub fn display_name(self) -> &'static str {
        match self {
            Action::Book => "BOOK NOW",
            Action::Wait => "WAIT",
            Action::Monitor => "MONITOR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn label(self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }
}

/// Booking advice derived from a current price and a forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub action: Action,
    pub confidence: Confidence,
    pub percent_change: f64,
    pub current_price: f64,
    pub predicted_avg_price: f64,
    pub reason: String,
}

impl Recommendation {
    /// Money at stake in following the advice.
    ///
    /// `Wait`: expected savings from waiting. `Book`: expected extra cost avoided by
    /// booking now. `Monitor` has no figure.
    pub fn savings(&self) -> Option<f64> {
        match self.action {
            Action::Wait => Some(self.current_price - self.predicted_avg_price),
            Action::Book => Some(self.predicted_avg_price - self.current_price),
            Action::Monitor => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_mapping_is_canonical() {
        assert_eq!(Season::from_month(12), Some(Season::Winter));
        assert_eq!(Season::from_month(2), Some(Season::Winter));
        assert_eq!(Season::from_month(3), Some(Season::Spring));
        assert_eq!(Season::from_month(8), Some(Season::Summer));
        assert_eq!(Season::from_month(11), Some(Season::Fall));
        assert_eq!(Season::from_month(0), None);
        assert_eq!(Season::from_month(13), None);
    }

    #[test]
    fn hotel_features_exclude_advance_booking() {
        let hotel = Variant::Hotel.feature_names();
        let flight = Variant::Flight.feature_names();
        assert_eq!(hotel.len(), 8);
        assert_eq!(flight.len(), 9);
        assert!(!hotel.iter().any(|n| n == "advance_booking_days"));
        assert_eq!(flight.last().map(String::as_str), Some("advance_booking_days"));
        assert_eq!(&flight[..8], &hotel[..]);
    }

    #[test]
    fn for_date_derives_calendar_fields() {
        // 2024-07-06 was a Saturday.
        let date = NaiveDate::from_ymd_opt(2024, 7, 6).unwrap();
        let r = RawRecord::for_date(date, 105.0);
        assert_eq!(r.day_of_week, Weekday::Sat);
        assert_eq!(r.month, 7);
        assert!(r.is_weekend);
        assert_eq!(r.season, Season::Summer);
        assert!(r.price.is_none());
        assert!(r.advance_booking_days.is_none());
    }

    #[test]
    fn calendar_fields_must_match_date() {
        // 2024-07-01 was a Monday.
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let good = RawRecord::for_date(date, 100.0);
        assert!(good.check_calendar().is_ok());

        let mut month = good.clone();
        month.month = 3;
        month.season = Season::Spring;
        let err = month.check_calendar().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidRecord);
        assert!(err.message().starts_with("Month 3"));

        let mut weekday = good.clone();
        weekday.day_of_week = Weekday::Tue;
        assert!(weekday.check_calendar().unwrap_err().message().contains("Day of week"));

        let mut weekend = good.clone();
        weekend.is_weekend = true;
        assert!(weekend.check_calendar().unwrap_err().message().contains("is_weekend"));

        let mut season = good;
        season.season = Season::Winter;
        assert!(season.check_calendar().unwrap_err().message().contains("Season"));
    }

    #[test]
    fn weekday_labels_parse_back() {
        for day in [Weekday::Mon, Weekday::Wed, Weekday::Sun] {
            assert_eq!(parse_weekday(weekday_label(day)), Some(day));
        }
        assert_eq!(parse_weekday("friday"), Some(Weekday::Fri));
        assert_eq!(parse_weekday("Funday"), None);
    }

    #[test]
    fn savings_follow_action() {
        let mut rec = Recommendation {
            action: Action::Wait,
            confidence: Confidence::High,
            percent_change: -20.0,
            current_price: 200.0,
            predicted_avg_price: 160.0,
            reason: String::new(),
        };
        assert_eq!(rec.savings(), Some(40.0));
        rec.action = Action::Monitor;
        assert_eq!(rec.savings(), None);
    }
}
