//! Fact table assembly.
//!
//! Resolves each normalized record's natural keys through four lookups
//! (date, airline, origin airport, destination airport). The joins are
//! inner joins: a record with any unresolved key is dropped, never emitted
//! with a null key. `flight_id` is numbered after the joins, so it is
//! always dense (1..=n).

use crate::models::{FactFlightDelay, FlightRecord};
use crate::transform::dimensions::Dimensions;

/// Fact rows plus the number of records the inner joins dropped.
#[derive(Debug, Clone, Default)]
pub struct JoinOutcome {
    pub facts: Vec<FactFlightDelay>,
    pub dropped: usize,
}

/// Join surrogate keys onto the records.
pub fn join_facts(records: &[FlightRecord], dims: &Dimensions) -> JoinOutcome {
    let mut facts = Vec::with_capacity(records.len());
    let mut dropped = 0;

    for rec in records {
        let keys = dims
            .date_ids
            .get(&rec.flight_date)
            .zip(dims.airline_ids.get(&rec.airline_code))
            .zip(dims.airport_ids.get(&rec.origin))
            .zip(dims.airport_ids.get(&rec.dest));

        let Some((((&date_id, &airline_id), &origin_airport_id), &dest_airport_id)) = keys else {
            dropped += 1;
            continue;
        };

        facts.push(FactFlightDelay {
            flight_id: facts.len() as i64 + 1,
            date_id,
            airline_id,
            origin_airport_id,
            dest_airport_id,
            dep_delay_minutes: rec.dep_delay_minutes,
            arr_delay_minutes: rec.arr_delay_minutes,
            cancelled: rec.cancelled,
            diverted: rec.diverted,
        });
    }

    JoinOutcome { facts, dropped }
}
