//! Run configuration.
//!
//! Values are resolved in three layers: built-in defaults, then environment
//! variables (a `.env` file is loaded first when present), then CLI flags
//! applied by the binary through the `with_*` builders.

use std::env;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Default location of the raw flight CSV
pub const DEFAULT_INPUT_PATH: &str = "data/raw_flights.csv";

/// Default DuckDB database file
pub const DEFAULT_DATABASE_PATH: &str = "flights.duckdb";

pub const ENV_INPUT: &str = "FLIGHT_ETL_INPUT";
pub const ENV_DATABASE: &str = "FLIGHT_ETL_DATABASE";
pub const ENV_SCHEMA: &str = "FLIGHT_ETL_SCHEMA";
pub const ENV_DELIMITER: &str = "FLIGHT_ETL_DELIMITER";

/// Configuration for one ETL run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtlConfig {
    /// Raw flight CSV
    pub input_path: PathBuf,
    /// DuckDB database file
    pub database_path: PathBuf,
    /// DDL file replacing the embedded schema
    pub schema_path: Option<PathBuf>,
    /// Field delimiter; auto-detected from the header when `None`
    pub delimiter: Option<char>,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            schema_path: None,
            delimiter: None,
        }
    }
}

impl EtlConfig {
    /// Build a configuration from defaults and environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(input) = lookup(ENV_INPUT).filter(|v| !v.is_empty()) {
            config.input_path = PathBuf::from(input);
        }
        if let Some(database) = lookup(ENV_DATABASE).filter(|v| !v.is_empty()) {
            config.database_path = PathBuf::from(database);
        }
        if let Some(schema) = lookup(ENV_SCHEMA).filter(|v| !v.is_empty()) {
            config.schema_path = Some(PathBuf::from(schema));
        }
        if let Some(delimiter) = lookup(ENV_DELIMITER).filter(|v| !v.is_empty()) {
            config.delimiter = Some(parse_delimiter(&delimiter)?);
        }

        Ok(config)
    }

    pub fn with_input(mut self, path: Option<PathBuf>) -> Self {
        if let Some(p) = path {
            self.input_path = p;
        }
        self
    }

    pub fn with_database(mut self, path: Option<PathBuf>) -> Self {
        if let Some(p) = path {
            self.database_path = p;
        }
        self
    }

    pub fn with_schema(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.schema_path = path;
        }
        self
    }

    pub fn with_delimiter(mut self, delimiter: Option<char>) -> Self {
        if delimiter.is_some() {
            self.delimiter = delimiter;
        }
        self
    }
}

/// Parse a delimiter setting. Accepts a single ASCII character, or `\t` / `tab`.
pub fn parse_delimiter(value: &str) -> Result<char, ConfigError> {
    match value {
        "\\t" | "tab" | "TAB" => return Ok('\t'),
        _ => {}
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c),
        _ => Err(ConfigError::InvalidDelimiter(value.to_string())),
    }
}
