//! # Flightdelay - flight-delay star schema ETL
//!
//! Transforms a flat flight-delay CSV (one row per flight leg) into a star
//! schema and loads it into DuckDB.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Normalize  │────▶│ Dimensions  │────▶│   DuckDB    │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (typed rows)│     │ + Fact join │     │ (replace)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flightdelay::{run_etl, EtlConfig};
//!
//! let report = run_etl(&EtlConfig::default()).unwrap();
//! println!("Loaded {}", report.loaded);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Per-stage error types
//! - [`config`] - Paths and delimiter, from env and CLI
//! - [`logs`] - Progress logging (text or JSON lines)
//! - [`models`] - Raw rows, normalized rows, dimension and fact rows
//! - [`parser`] - CSV reading with auto-detection
//! - [`transform`] - Normalization, dimensions, fact join, pipeline
//! - [`loader`] - DuckDB schema and full-replace load

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Input
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod loader;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::EtlConfig;

pub use error::{
    ConfigError, CsvError, LoadError, NormalizeError, PipelineError, PipelineResult,
};

pub use models::{
    DimAirline, DimAirport, DimDate, FactFlightDelay, FlightRecord, RawFlightRecord, StarSchema,
};

pub use parser::{read_flights_bytes, read_flights_file, ParseResult};

pub use transform::pipeline::{
    build_star_schema, read_and_normalize, run_etl, transform_file, BuildResult, CsvInfo,
    RunReport, TransformOutput,
};

pub use loader::{DuckDbLoader, LoadSummary, SCHEMA_DDL};
