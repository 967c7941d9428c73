//! DuckDB loader.
//!
//! Applies the star-schema DDL and performs a full-replace load: all four
//! tables are cleared and refilled inside one transaction, so a failure at
//! any point leaves the previous contents in place.
//!
//! ```text
//! BEGIN
//!   DROP   FactFlightDelay, DimAirport, DimAirline, DimDate   (children first)
//!   CREATE <schema DDL>
//!   APPEND DimDate, DimAirline, DimAirport, FactFlightDelay   (parents first)
//! COMMIT
//! ```
//!
//! Tables are cleared by drop-and-recreate rather than `DELETE`: DuckDB
//! refuses to delete a referenced dimension row in the transaction that
//! deleted the referencing fact rows.

use std::fmt;
use std::path::Path;

use duckdb::{params, Connection};
use serde::Serialize;

use crate::error::{LoadError, LoadResult};
use crate::models::StarSchema;

/// DDL embedded at compile time; overridable with `--schema`.
pub const SCHEMA_DDL: &str = include_str!("../../sql/schema.sql");

/// Target tables in insertion order.
pub const TABLES: [&str; 4] = ["DimDate", "DimAirline", "DimAirport", "FactFlightDelay"];

/// Row counts per table after a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub dim_date: usize,
    pub dim_airline: usize,
    pub dim_airport: usize,
    pub fact_flight_delay: usize,
}

impl LoadSummary {
    pub fn of(star: &StarSchema) -> Self {
        Self {
            dim_date: star.dim_date.len(),
            dim_airline: star.dim_airline.len(),
            dim_airport: star.dim_airport.len(),
            fact_flight_delay: star.fact_flight_delay.len(),
        }
    }
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DimDate={}, DimAirline={}, DimAirport={}, FactFlightDelay={}",
            self.dim_date, self.dim_airline, self.dim_airport, self.fact_flight_delay
        )
    }
}

/// Read the schema override, or fall back to the embedded DDL.
pub fn load_schema_ddl(path: Option<&Path>) -> LoadResult<String> {
    match path {
        Some(p) => std::fs::read_to_string(p).map_err(|source| LoadError::SchemaFile {
            path: p.display().to_string(),
            source,
        }),
        None => Ok(SCHEMA_DDL.to_string()),
    }
}

/// Owns the DuckDB connection for one run
pub struct DuckDbLoader {
    conn: Connection,
}

impl DuckDbLoader {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> LoadResult<Self> {
        Ok(Self::from_connection(Connection::open(path)?))
    }

    pub fn in_memory() -> LoadResult<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Execute schema DDL. Expected to be idempotent (`IF NOT EXISTS`).
    pub fn apply_schema(&self, ddl: &str) -> LoadResult<()> {
        self.conn.execute_batch(ddl)?;
        Ok(())
    }

    /// Replace the contents of all four tables with `star`.
    ///
    /// `ddl` recreates the tables after they are dropped; it must define all
    /// of [`TABLES`].
    pub fn replace_all(&mut self, star: &StarSchema, ddl: &str) -> LoadResult<LoadSummary> {
        let tx = self.conn.transaction()?;

        for table in TABLES.iter().rev() {
            tx.execute_batch(&format!("DROP TABLE IF EXISTS {};", table))?;
        }
        tx.execute_batch(ddl)?;

        {
            let mut app = tx.appender("DimDate")?;
            for d in &star.dim_date {
                app.append_row(params![
                    d.date_id,
                    d.full_date.to_string(),
                    d.year,
                    d.month as i32,
                    d.day as i32
                ])?;
            }
            app.flush()?;
        }

        {
            let mut app = tx.appender("DimAirline")?;
            for a in &star.dim_airline {
                app.append_row(params![a.airline_id, a.airline_code])?;
            }
            app.flush()?;
        }

        {
            let mut app = tx.appender("DimAirport")?;
            for a in &star.dim_airport {
                app.append_row(params![a.airport_id, a.airport_code, a.city])?;
            }
            app.flush()?;
        }

        {
            let mut app = tx.appender("FactFlightDelay")?;
            for f in &star.fact_flight_delay {
                app.append_row(params![
                    f.flight_id,
                    f.date_id,
                    f.airline_id,
                    f.origin_airport_id,
                    f.dest_airport_id,
                    f.dep_delay_minutes,
                    f.arr_delay_minutes,
                    f.cancelled,
                    f.diverted
                ])?;
            }
            app.flush()?;
        }

        tx.commit()?;
        Ok(LoadSummary::of(star))
    }

    /// Current row count of every target table.
    pub fn table_counts(&self) -> LoadResult<LoadSummary> {
        let count = |table: &str| -> LoadResult<usize> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT count(*) FROM {}", table), [], |row| row.get(0))?;
            Ok(n as usize)
        };

        Ok(LoadSummary {
            dim_date: count("DimDate")?,
            dim_airline: count("DimAirline")?,
            dim_airport: count("DimAirport")?,
            fact_flight_delay: count("FactFlightDelay")?,
        })
    }
}
