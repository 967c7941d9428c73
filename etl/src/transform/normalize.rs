//! Raw row normalization.
//!
//! Coerces the text columns of [`RawFlightRecord`] into typed values:
//!
//! | Column | Rule |
//! |---|---|
//! | `FlightDate` | ISO or US date, optional time part dropped |
//! | `DepDelayMinutes` / `ArrDelayMinutes` | null → 0, decimals truncated |
//! | `Cancelled` / `Diverted` | `1`/`true`/`yes` → true, `0`/`false`/`no`/empty → false |
//! | `IATA_Code_Operating_Airline` | aliased to `airline_code` |
//!
//! Rows are never rejected for their values' ranges; an unparsable cell is
//! an input-format error and aborts the run.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{NormalizeError, NormalizeResult};
use crate::models::{FlightRecord, RawFlightRecord};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
];

const NULL_MARKERS: [&str; 4] = ["na", "nan", "null", "none"];
const TRUE_VALUES: [&str; 6] = ["1", "1.0", "true", "t", "yes", "y"];
const FALSE_VALUES: [&str; 7] = ["", "0", "0.0", "false", "f", "no", "n"];

/// Normalize all rows, preserving order.
pub fn normalize_records(raw: &[RawFlightRecord]) -> NormalizeResult<Vec<FlightRecord>> {
    raw.iter()
        .enumerate()
        // +1 for 0-index, +1 for header
        .map(|(i, row)| normalize_record(row, i + 2))
        .collect()
}

/// Normalize one row. `line` is only used for error context.
pub fn normalize_record(raw: &RawFlightRecord, line: usize) -> NormalizeResult<FlightRecord> {
    Ok(FlightRecord {
        flight_date: parse_flight_date(&raw.flight_date).ok_or_else(|| NormalizeError::InvalidDate {
            line,
            column: "FlightDate",
            value: raw.flight_date.clone(),
        })?,
        airline_code: raw.operating_airline.trim().to_string(),
        origin: raw.origin.trim().to_string(),
        origin_city: raw.origin_city.trim().to_string(),
        dest: raw.dest.trim().to_string(),
        dest_city: raw.dest_city.trim().to_string(),
        dep_delay_minutes: parse_delay(raw.dep_delay_minutes.as_deref(), line, "DepDelayMinutes")?,
        arr_delay_minutes: parse_delay(raw.arr_delay_minutes.as_deref(), line, "ArrDelayMinutes")?,
        cancelled: parse_flag(&raw.cancelled, line, "Cancelled")?,
        diverted: parse_flag(&raw.diverted, line, "Diverted")?,
    })
}

/// Parse a flight date, dropping any time-of-day part.
pub fn parse_flight_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn parse_delay(value: Option<&str>, line: usize, column: &'static str) -> NormalizeResult<i64> {
    let value = match value.map(str::trim) {
        None => return Ok(0),
        Some(v) if v.is_empty() || NULL_MARKERS.contains(&v.to_lowercase().as_str()) => return Ok(0),
        Some(v) => v,
    };

    if let Ok(n) = value.parse::<i64>() {
        return Ok(n);
    }

    let invalid = || NormalizeError::InvalidNumber {
        line,
        column,
        value: value.to_string(),
    };
    let float = value.parse::<f64>().map_err(|_| invalid())?;
    if !float.is_finite() {
        return Err(invalid());
    }
    Ok(float.trunc() as i64)
}

fn parse_flag(value: &str, line: usize, column: &'static str) -> NormalizeResult<bool> {
    let normalized = value.trim().to_lowercase();
    if TRUE_VALUES.contains(&normalized.as_str()) {
        Ok(true)
    } else if FALSE_VALUES.contains(&normalized.as_str()) {
        Ok(false)
    } else {
        Err(NormalizeError::InvalidFlag {
            line,
            column,
            value: value.to_string(),
        })
    }
}
