//! CSV ingest of historical price rows.
//!
//! This module turns a historical price CSV into `RawRecord`s that are safe to train on.
//!
//! Design goals:
//! - **Strict schema** for required columns (missing column fails the whole file)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (rows kept in file order)
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::domain::{parse_weekday, RawRecord, Season, Variant};
use crate::error::{AppError, ErrorKind};

const BASE_COLUMNS: [&str; 7] = [
    "date",
    "price",
    "day_of_week",
    "month",
    "is_weekend",
    "season",
    "demand_score",
];
const FLIGHT_COLUMN: &str = "advance_booking_days";

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: parsed records plus the rows that were rejected.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub variant: Variant,
    pub records: Vec<RawRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load historical rows for `variant` from a CSV file.
pub fn load_history(path: &Path, variant: Variant) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|e| {
        let kind = if e.kind() == std::io::ErrorKind::NotFound {
            ErrorKind::NotFound
        } else {
            ErrorKind::Io
        };
        AppError::new(kind, format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    read_history(file, variant)
}

/// Parse historical rows for `variant` from any reader.
pub fn read_history<R: Read>(reader: R, variant: Variant) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::invalid_record(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(variant, &header_map)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for result in reader.records() {
        rows_read += 1;
        // Header is line 1; used only if the reader reports no position.
        let fallback_line = rows_read + 1;

        let (line, parsed) = match result {
            Ok(record) => (
                record_line(record.position(), fallback_line),
                parse_row(&record, &header_map, variant),
            ),
            Err(e) => (
                record_line(e.position(), fallback_line),
                Err(format!("CSV parse error: {e}")),
            ),
        };
        match parsed {
            Ok(r) => records.push(r),
            Err(message) => {
                tracing::warn!(line, %message, "rejected CSV row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    let rows_used = records.len();
    if rows_used == 0 {
        return Err(AppError::insufficient_data(format!(
            "No valid rows in CSV ({rows_read} read, {} rejected).",
            row_errors.len()
        )));
    }

    tracing::info!(%variant, rows_read, rows_used, rejected = row_errors.len(), "ingested history");

    Ok(IngestedData {
        variant,
        records,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(
    variant: Variant,
    header_map: &HashMap<String, usize>,
) -> Result<(), AppError> {
    for col in BASE_COLUMNS {
        if !header_map.contains_key(col) {
            return Err(AppError::invalid_record(format!("Missing required column: `{col}`")));
        }
    }
    if variant == Variant::Flight && !header_map.contains_key(FLIGHT_COLUMN) {
        return Err(AppError::invalid_record(format!(
            "Missing required column for flight data: `{FLIGHT_COLUMN}`"
        )));
    }
    Ok(())
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    variant: Variant,
) -> Result<RawRecord, String> {
    let date = parse_date(required(record, header_map, "date")?)?;

    let price: f64 = parse_num(required(record, header_map, "price")?, "price")?;
    if !(price.is_finite() && price > 0.0) {
        return Err(format!("price must be positive, got {price}"));
    }

    let dow_raw = required(record, header_map, "day_of_week")?;
    let day_of_week =
        parse_weekday(dow_raw).ok_or_else(|| format!("unknown day_of_week '{dow_raw}'"))?;

    let month: u32 = parse_num(required(record, header_map, "month")?, "month")?;
    let season_raw = required(record, header_map, "season")?;
    let season = Season::parse(season_raw).ok_or_else(|| format!("unknown season '{season_raw}'"))?;
    if Season::from_month(month) != Some(season) {
        return Err(format!("season {} does not match month {month}", season.label()));
    }

    let is_weekend = parse_flag(required(record, header_map, "is_weekend")?)?;

    let demand_score: f64 = parse_num(required(record, header_map, "demand_score")?, "demand_score")?;
    if !demand_score.is_finite() {
        return Err("demand_score is not finite".to_string());
    }

    let advance_booking_days = match variant {
        Variant::Flight => Some(parse_num::<u32>(
            required(record, header_map, FLIGHT_COLUMN)?,
            FLIGHT_COLUMN,
        )?),
        Variant::Hotel => None,
    };

    let record = RawRecord {
        date: Some(date),
        price: Some(price),
        day_of_week,
        month,
        is_weekend,
        season,
        demand_score,
        advance_booking_days,
    };
    record
        .check_calendar()
        .map_err(|e| e.message().to_string())?;
    Ok(record)
}

/// 1-based line where a record starts; multi-line quoted fields make this differ from the row index.
fn record_line(position: Option<&csv::Position>, fallback: usize) -> usize {
    position.map_or(fallback, |p| p.line() as usize)
}

fn required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    col: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(col)
        .ok_or_else(|| format!("missing column `{col}`"))?;
    match record.get(*idx) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(format!("missing value for `{col}`")),
    }
}

fn parse_num<T: std::str::FromStr>(raw: &str, col: &str) -> Result<T, String> {
    raw.parse::<T>()
        .map_err(|_| format!("invalid {col} '{raw}'"))
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(format!("invalid is_weekend '{raw}'")),
    }
}

/// `YYYY-MM-DD`, optionally followed by a time of day (ignored).
fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .map_err(|_| format!("invalid date '{raw}'"))
}
