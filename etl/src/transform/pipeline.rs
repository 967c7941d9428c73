//! High-level pipeline API: CSV → normalized rows → star schema → DuckDB.
//!
//! # Example
//!
//! ```rust,ignore
//! use flightdelay::{run_etl, EtlConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = run_etl(&EtlConfig::from_env()?)?;
//!     println!("Loaded {}", report.loaded);
//!     Ok(())
//! }
//! ```

use serde::Serialize;

use super::dimensions::build_dimensions;
use super::join::join_facts;
use super::normalize::normalize_records;
use crate::config::EtlConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::loader::{load_schema_ddl, DuckDbLoader, LoadSummary};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::{FlightRecord, StarSchema};
use crate::parser::{read_flights_file, ParseResult};

/// CSV file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl From<&ParseResult> for CsvInfo {
    fn from(parsed: &ParseResult) -> Self {
        Self {
            encoding: parsed.encoding.clone(),
            delimiter: parsed.delimiter,
            headers: parsed.headers.clone(),
            row_count: parsed.records.len(),
        }
    }
}

/// Star schema built from one set of normalized records
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub star: StarSchema,
    /// Records dropped by the inner joins (zero when dimensions come from the same records)
    pub dropped: usize,
}

/// Output of the in-memory part of the pipeline
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub csv_info: CsvInfo,
    pub records: Vec<FlightRecord>,
    pub star: StarSchema,
    pub dropped: usize,
}

/// Result of a complete run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub csv_info: CsvInfo,
    pub loaded: LoadSummary,
    pub dropped: usize,
}

/// Derive the dimensions, then join them back onto the records.
pub fn build_star_schema(records: &[FlightRecord]) -> BuildResult {
    let dims = build_dimensions(records);
    let joined = join_facts(records, &dims);

    BuildResult {
        star: StarSchema {
            dim_date: dims.dim_date,
            dim_airline: dims.dim_airline,
            dim_airport: dims.dim_airport,
            fact_flight_delay: joined.facts,
        },
        dropped: joined.dropped,
    }
}

/// Read and normalize the configured input file.
pub fn read_and_normalize(config: &EtlConfig) -> PipelineResult<(CsvInfo, Vec<FlightRecord>)> {
    log_info(format!("📖 Reading {}", config.input_path.display()));
    let parsed = read_flights_file(&config.input_path, config.delimiter)?;
    let csv_info = CsvInfo::from(&parsed);

    log_success(format!("Detected encoding: {}", csv_info.encoding));
    log_success(format!("Separator: '{}'", format_delimiter(csv_info.delimiter)));
    log_success(format!("Read {} rows", csv_info.row_count));

    if parsed.records.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    log_info("🧹 Normalizing rows...");
    let records = normalize_records(&parsed.records)?;
    log_success(format!("{} rows normalized", records.len()));

    Ok((csv_info, records))
}

/// Run every in-memory stage: read, normalize, build dimensions, join.
pub fn transform_file(config: &EtlConfig) -> PipelineResult<TransformOutput> {
    let (csv_info, records) = read_and_normalize(config)?;

    log_info("⭐ Building star schema...");
    let built = build_star_schema(&records);
    print_star_summary(&built.star);

    if built.dropped > 0 {
        log_warning(format!("{} rows dropped by unresolved keys", built.dropped));
    }

    Ok(TransformOutput {
        csv_info,
        records,
        star: built.star,
        dropped: built.dropped,
    })
}

/// Full ETL: transform the input, then replace the warehouse contents.
pub fn run_etl(config: &EtlConfig) -> PipelineResult<RunReport> {
    let output = transform_file(config)?;

    log_info(format!("🦆 Loading into {}", config.database_path.display()));
    let ddl = load_schema_ddl(config.schema_path.as_deref())?;
    let mut loader = DuckDbLoader::open(&config.database_path)?;
    loader.apply_schema(&ddl)?;
    let loaded = loader.replace_all(&output.star, &ddl)?;

    log_success(format!("ETL completed: {}", loaded));

    Ok(RunReport {
        csv_info: output.csv_info,
        loaded,
        dropped: output.dropped,
    })
}

fn print_star_summary(star: &StarSchema) {
    log_info_indent(format!("DimDate: {} rows", star.dim_date.len()), 1);
    log_info_indent(format!("DimAirline: {} rows", star.dim_airline.len()), 1);
    log_info_indent(format!("DimAirport: {} rows", star.dim_airport.len()), 1);
    log_info_indent(format!("FactFlightDelay: {} rows", star.fact_flight_delay.len()), 1);
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::date_key;
    use chrono::NaiveDate;
    use std::path::Path;

    const HEADER: &str = "FlightDate,DepDelayMinutes,ArrDelayMinutes,Cancelled,Diverted,IATA_Code_Operating_Airline,Origin,OriginCityName,Dest,DestCityName";

    const EXAMPLE: &str = "\
FlightDate,DepDelayMinutes,ArrDelayMinutes,Cancelled,Diverted,IATA_Code_Operating_Airline,Origin,OriginCityName,Dest,DestCityName
2024-01-01,10,,False,False,AA,JFK,New York,LAX,Los Angeles
2024-01-02,,5,False,False,AA,LAX,Los Angeles,JFK,New York
";

    fn write_csv(dir: &Path, content: &str) -> EtlConfig {
        let input = dir.join("flights.csv");
        std::fs::write(&input, content).unwrap();
        EtlConfig {
            input_path: input,
            database_path: dir.join("flights.duckdb"),
            schema_path: None,
            delimiter: None,
        }
    }

    #[test]
    fn test_worked_example() {
        let dir = tempfile::tempdir().unwrap();
        let output = transform_file(&write_csv(dir.path(), EXAMPLE)).unwrap();
        let star = &output.star;

        assert_eq!(star.dim_date.len(), 2);
        assert_eq!(star.dim_airline.len(), 1);
        assert_eq!(star.dim_airline[0].airline_code, "AA");
        assert_eq!(star.dim_airline[0].airline_id, 1);

        let airports: Vec<_> = star
            .dim_airport
            .iter()
            .map(|a| (a.airport_code.as_str(), a.airport_id))
            .collect();
        assert_eq!(airports, vec![("JFK", 1), ("LAX", 2)]);

        assert_eq!(star.fact_flight_delay.len(), 2);
        let first = &star.fact_flight_delay[0];
        let second = &star.fact_flight_delay[1];
        assert_eq!((first.dep_delay_minutes, first.arr_delay_minutes), (10, 0));
        assert_eq!((second.dep_delay_minutes, second.arr_delay_minutes), (0, 5));
        assert_eq!((first.flight_id, second.flight_id), (1, 2));
        assert_eq!((first.origin_airport_id, first.dest_airport_id), (1, 2));
        assert_eq!(output.dropped, 0);
        assert!(star.verify().is_empty());
    }

    #[test]
    fn test_date_ids_are_epoch_seconds() {
        let dir = tempfile::tempdir().unwrap();
        let output = transform_file(&write_csv(dir.path(), EXAMPLE)).unwrap();

        for row in &output.star.dim_date {
            assert_eq!(row.date_id, date_key(row.full_date));
        }
        assert_eq!(
            output.star.dim_date[0].full_date,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_rebuild_is_deterministic_but_order_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        let rows = [
            "2024-03-01,0,0,0,0,UA,SFO,San Francisco,ORD,Chicago",
            "2024-03-02,0,0,0,0,DL,ATL,Atlanta,SFO,San Francisco",
        ];
        let forward = format!("{}\n{}\n{}\n", HEADER, rows[0], rows[1]);
        let reversed = format!("{}\n{}\n{}\n", HEADER, rows[1], rows[0]);

        let a = transform_file(&write_csv(dir.path(), &forward)).unwrap().star;
        let b = transform_file(&write_csv(dir.path(), &forward)).unwrap().star;
        assert_eq!(a, b);

        let c = transform_file(&write_csv(dir.path(), &reversed)).unwrap().star;
        let mut dates_a: Vec<_> = a.dim_date.iter().map(|d| (d.full_date, d.date_id)).collect();
        let mut dates_c: Vec<_> = c.dim_date.iter().map(|d| (d.full_date, d.date_id)).collect();
        dates_a.sort();
        dates_c.sort();
        assert_eq!(dates_a, dates_c);

        let ua_a = a.dim_airline.iter().find(|x| x.airline_code == "UA").unwrap().airline_id;
        let ua_c = c.dim_airline.iter().find(|x| x.airline_code == "UA").unwrap().airline_id;
        assert_ne!(ua_a, ua_c);
    }

    #[test]
    fn test_fact_count_matches_input_and_keys_close() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = String::from(HEADER);
        content.push('\n');
        let airports = ["JFK", "LAX", "ORD", "ATL", "SEA"];
        for i in 0..40 {
            content.push_str(&format!(
                "2024-02-{:02},{},,{},0,{},{},City {},{},City {}\n",
                i % 28 + 1,
                i,
                i % 2,
                ["AA", "DL", "UA"][i % 3],
                airports[i % 5],
                i % 5,
                airports[(i + 2) % 5],
                (i + 2) % 5,
            ));
        }

        let output = transform_file(&write_csv(dir.path(), &content)).unwrap();
        assert_eq!(output.records.len(), 40);
        assert_eq!(output.star.fact_flight_delay.len(), 40);
        assert_eq!(output.star.dim_airline.len(), 3);
        assert_eq!(output.star.dim_airport.len(), 5);
        assert!(output.star.verify().is_empty());
    }

    #[test]
    fn test_header_only_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = transform_file(&write_csv(dir.path(), HEADER));
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn test_malformed_date_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let content = format!("{}\nnext tuesday,0,0,0,0,AA,JFK,NY,LAX,LA\n", HEADER);
        let result = transform_file(&write_csv(dir.path(), &content));
        assert!(matches!(result, Err(PipelineError::Normalize(_))));
    }

    #[test]
    fn test_run_etl_loads_duckdb() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_csv(dir.path(), EXAMPLE);

        let report = run_etl(&config).unwrap();
        assert_eq!(report.loaded.fact_flight_delay, 2);
        assert_eq!(report.csv_info.row_count, 2);

        let loader = DuckDbLoader::open(&config.database_path).unwrap();
        assert_eq!(loader.table_counts().unwrap(), report.loaded);

        let orphans: i64 = loader
            .connection()
            .query_row(
                "SELECT count(*) FROM FactFlightDelay f \
                 LEFT JOIN DimAirport o ON f.origin_airport_id = o.airport_id \
                 LEFT JOIN DimAirport d ON f.dest_airport_id = d.airport_id \
                 WHERE o.airport_id IS NULL OR d.airport_id IS NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn test_run_etl_twice_on_same_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_csv(dir.path(), EXAMPLE);

        let first = run_etl(&config).unwrap();
        let second = run_etl(&config).unwrap();
        assert_eq!(first.loaded, second.loaded);

        let loader = DuckDbLoader::open(&config.database_path).unwrap();
        assert_eq!(
            loader.table_counts().unwrap(),
            LoadSummary { dim_date: 2, dim_airline: 1, dim_airport: 2, fact_flight_delay: 2 }
        );
    }
}
