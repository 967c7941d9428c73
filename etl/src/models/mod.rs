//! Domain models for the flight-delay star schema.
//!
//! - [`RawFlightRecord`] - One input row, text columns as read
//! - [`FlightRecord`] - One normalized row
//! - [`DimDate`], [`DimAirline`], [`DimAirport`] - Dimension rows
//! - [`FactFlightDelay`] - Fact row with resolved foreign keys
//! - [`StarSchema`] - The four tables produced by one run

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// =============================================================================
// Input rows
// =============================================================================

/// Column names the input file must provide.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "FlightDate",
    "DepDelayMinutes",
    "ArrDelayMinutes",
    "Cancelled",
    "Diverted",
    "IATA_Code_Operating_Airline",
    "Origin",
    "OriginCityName",
    "Dest",
    "DestCityName",
];

/// One flight leg as read from the input file.
///
/// Every column stays text; the normalizer owns all coercion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFlightRecord {
    #[serde(rename = "FlightDate")]
    pub flight_date: String,
    #[serde(rename = "IATA_Code_Operating_Airline")]
    pub operating_airline: String,
    #[serde(rename = "Origin")]
    pub origin: String,
    #[serde(rename = "OriginCityName")]
    pub origin_city: String,
    #[serde(rename = "Dest")]
    pub dest: String,
    #[serde(rename = "DestCityName")]
    pub dest_city: String,
    /// Empty cell deserializes to `None`.
    #[serde(rename = "DepDelayMinutes")]
    pub dep_delay_minutes: Option<String>,
    #[serde(rename = "ArrDelayMinutes")]
    pub arr_delay_minutes: Option<String>,
    #[serde(rename = "Cancelled")]
    pub cancelled: String,
    #[serde(rename = "Diverted")]
    pub diverted: String,
}

/// A normalized flight leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    pub flight_date: NaiveDate,
    /// Aliased from `IATA_Code_Operating_Airline`.
    pub airline_code: String,
    pub origin: String,
    pub origin_city: String,
    pub dest: String,
    pub dest_city: String,
    pub dep_delay_minutes: i64,
    pub arr_delay_minutes: i64,
    pub cancelled: bool,
    pub diverted: bool,
}

// =============================================================================
// Dimensions
// =============================================================================

/// Calendar date dimension row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimDate {
    /// Unix-epoch seconds of the date at midnight UTC.
    pub date_id: i64,
    pub full_date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl DimDate {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            date_id: date_key(date),
            full_date: date,
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

/// Surrogate key of a calendar date: epoch seconds at midnight UTC.
pub fn date_key(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
}

/// Airline dimension row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimAirline {
    pub airline_id: i64,
    pub airline_code: String,
}

/// Airport dimension row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimAirport {
    pub airport_id: i64,
    pub airport_code: String,
    pub city: String,
}

// =============================================================================
// Fact
// =============================================================================

/// One flight leg with resolved surrogate keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactFlightDelay {
    pub flight_id: i64,
    pub date_id: i64,
    pub airline_id: i64,
    pub origin_airport_id: i64,
    pub dest_airport_id: i64,
    pub dep_delay_minutes: i64,
    pub arr_delay_minutes: i64,
    pub cancelled: bool,
    pub diverted: bool,
}

// =============================================================================
// Star Schema
// =============================================================================

/// All four tables computed by one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StarSchema {
    pub dim_date: Vec<DimDate>,
    pub dim_airline: Vec<DimAirline>,
    pub dim_airport: Vec<DimAirport>,
    pub fact_flight_delay: Vec<FactFlightDelay>,
}

impl StarSchema {
    /// Check key uniqueness and referential closure.
    ///
    /// Returns one message per violation; an empty vector means the schema
    /// satisfies every constraint the loader's DDL declares.
    pub fn verify(&self) -> Vec<String> {
        let mut problems = Vec::new();

        let dates = unique_keys("DimDate.date_id", self.dim_date.iter().map(|d| d.date_id), &mut problems);
        let airlines = unique_keys(
            "DimAirline.airline_id",
            self.dim_airline.iter().map(|a| a.airline_id),
            &mut problems,
        );
        let airports = unique_keys(
            "DimAirport.airport_id",
            self.dim_airport.iter().map(|a| a.airport_id),
            &mut problems,
        );
        unique_keys(
            "FactFlightDelay.flight_id",
            self.fact_flight_delay.iter().map(|f| f.flight_id),
            &mut problems,
        );

        for fact in &self.fact_flight_delay {
            let refs = [
                ("date_id", fact.date_id, &dates),
                ("airline_id", fact.airline_id, &airlines),
                ("origin_airport_id", fact.origin_airport_id, &airports),
                ("dest_airport_id", fact.dest_airport_id, &airports),
            ];
            for (column, key, known) in refs {
                if !known.contains(&key) {
                    problems.push(format!(
                        "flight {}: {} {} has no dimension row",
                        fact.flight_id, column, key
                    ));
                }
            }
        }

        problems
    }
}

fn unique_keys(
    label: &str,
    keys: impl Iterator<Item = i64>,
    problems: &mut Vec<String>,
) -> HashSet<i64> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            problems.push(format!("{} {} is duplicated", label, key));
        }
    }
    seen
}
