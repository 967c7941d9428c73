//! Dimension building and surrogate-key assignment.
//!
//! # Key assignment
//!
//! ```text
//! DimDate     date_id    = epoch seconds of the date at midnight (content-derived)
//! DimAirline  airline_id = rank of first appearance in input order (1, 2, 3, ...)
//! DimAirport  airport_id = rank of first appearance in origins ++ destinations
//! ```
//!
//! Ranks are handed out by [`SurrogateKeys`], an explicit value → key
//! registry filled in one pass. Input row order is part of the contract:
//! reordering the input renumbers airlines and airports, while dates keep
//! their keys.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::NaiveDate;

use crate::logs::log_warning;
use crate::models::{DimAirline, DimAirport, DimDate, FlightRecord};

/// Ordered registry assigning 1-based keys by first appearance.
#[derive(Debug, Clone)]
pub struct SurrogateKeys<K> {
    keys: HashMap<K, i64>,
    order: Vec<K>,
}

impl<K: Eq + Hash + Clone> SurrogateKeys<K> {
    pub fn new() -> Self {
        Self {
            keys: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Return the key of `value`, assigning the next rank if it is new.
    pub fn assign(&mut self, value: &K) -> i64 {
        if let Some(&key) = self.keys.get(value) {
            return key;
        }
        let key = self.order.len() as i64 + 1;
        self.keys.insert(value.clone(), key);
        self.order.push(value.clone());
        key
    }

    pub fn get(&self, value: &K) -> Option<i64> {
        self.keys.get(value).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Values with their keys, in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &K)> {
        self.order.iter().enumerate().map(|(i, v)| (i as i64 + 1, v))
    }
}

impl<K: Eq + Hash + Clone> Default for SurrogateKeys<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// The three dimensions plus the lookups the fact joiner needs.
#[derive(Debug, Clone, Default)]
pub struct Dimensions {
    pub dim_date: Vec<DimDate>,
    pub dim_airline: Vec<DimAirline>,
    pub dim_airport: Vec<DimAirport>,
    pub date_ids: HashMap<NaiveDate, i64>,
    pub airline_ids: HashMap<String, i64>,
    pub airport_ids: HashMap<String, i64>,
}

/// Build all three dimensions from normalized records.
pub fn build_dimensions(records: &[FlightRecord]) -> Dimensions {
    let dim_date = build_dim_date(records);
    let dim_airline = build_dim_airline(records);
    let dim_airport = build_dim_airport(records);

    Dimensions {
        date_ids: dim_date.iter().map(|d| (d.full_date, d.date_id)).collect(),
        airline_ids: dim_airline
            .iter()
            .map(|a| (a.airline_code.clone(), a.airline_id))
            .collect(),
        airport_ids: dim_airport
            .iter()
            .map(|a| (a.airport_code.clone(), a.airport_id))
            .collect(),
        dim_date,
        dim_airline,
        dim_airport,
    }
}

/// Distinct flight dates in first-seen order.
pub fn build_dim_date(records: &[FlightRecord]) -> Vec<DimDate> {
    let mut seen = SurrogateKeys::new();
    for rec in records {
        seen.assign(&rec.flight_date);
    }
    seen.iter().map(|(_, date)| DimDate::from_date(*date)).collect()
}

/// Distinct airline codes ranked by first appearance.
pub fn build_dim_airline(records: &[FlightRecord]) -> Vec<DimAirline> {
    let mut keys = SurrogateKeys::new();
    for rec in records {
        keys.assign(&rec.airline_code);
    }
    keys.iter()
        .map(|(airline_id, code)| DimAirline {
            airline_id,
            airline_code: code.clone(),
        })
        .collect()
}

/// Distinct airport codes pooled from origins, then destinations.
///
/// The first city seen for a code wins; later differing city names are
/// dropped.
pub fn build_dim_airport(records: &[FlightRecord]) -> Vec<DimAirport> {
    let pooled = records
        .iter()
        .map(|r| (&r.origin, &r.origin_city))
        .chain(records.iter().map(|r| (&r.dest, &r.dest_city)));

    let mut keys = SurrogateKeys::new();
    let mut cities: Vec<String> = Vec::new();
    let mut conflicts = 0usize;

    for (code, city) in pooled {
        let before = keys.len();
        let id = keys.assign(code);
        if keys.len() > before {
            cities.push(city.clone());
        } else if cities[(id - 1) as usize] != *city {
            conflicts += 1;
        }
    }

    if conflicts > 0 {
        log_warning(format!(
            "{} airport rows disagree with the first city seen for their code (kept first)",
            conflicts
        ));
    }

    keys.iter()
        .zip(cities)
        .map(|((airport_id, code), city)| DimAirport {
            airport_id,
            airport_code: code.clone(),
            city,
        })
        .collect()
}
