//! Flightdelay CLI - load flight-delay CSV data into a DuckDB star schema
//!
//! ```bash
//! flightdelay run                         # Full ETL with env/default paths
//! flightdelay run -i flights.csv -d w.db  # Full ETL with explicit paths
//! flightdelay build -o star.json          # Build the star schema, no database
//! flightdelay normalize                   # Just normalize rows to JSON
//! flightdelay schema                      # Print the embedded DDL
//! ```

use clap::{Args, Parser, Subcommand};
use flightdelay::config::{parse_delimiter, EtlConfig};
use flightdelay::logs::{log_error, log_success, log_warning, LogFormat, LOGGER};
use flightdelay::{read_and_normalize, run_etl, transform_file, SCHEMA_DDL};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "flightdelay")]
#[command(about = "Transform flight-delay CSV data into a DuckDB star schema", long_about = None)]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Input CSV file (default: $FLIGHT_ETL_INPUT or data/raw_flights.csv)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// CSV delimiter (auto-detect if not specified)
    #[arg(long, value_parser = parse_delimiter)]
    delimiter: Option<char>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: CSV → star schema → DuckDB (full replace)
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// DuckDB database file (default: $FLIGHT_ETL_DATABASE or flights.duckdb)
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// DDL file to apply instead of the embedded schema
        #[arg(short, long)]
        schema: Option<PathBuf>,
    },

    /// Build the star schema in memory and output it as JSON
    Build {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Normalize raw rows and output them as JSON
    Normalize {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the embedded schema DDL
    Schema,
}

fn main() {
    let cli = Cli::parse();
    LOGGER.set_format(cli.log_format);

    let result = match cli.command {
        Commands::Run { input, database, schema } => cmd_run(input, database, schema),
        Commands::Build { input, output } => cmd_build(input, output.as_deref()),
        Commands::Normalize { input, output } => cmd_normalize(input, output.as_deref()),
        Commands::Schema => {
            println!("{}", SCHEMA_DDL);
            Ok(())
        }
    };

    if let Err(e) = result {
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn resolve_config(input: InputArgs) -> Result<EtlConfig, Box<dyn std::error::Error>> {
    Ok(EtlConfig::from_env()?
        .with_input(input.input)
        .with_delimiter(input.delimiter))
}

fn cmd_run(
    input: InputArgs,
    database: Option<PathBuf>,
    schema: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(input)?
        .with_database(database)
        .with_schema(schema);

    run_etl(&config)?;
    Ok(())
}

fn cmd_build(input: InputArgs, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(input)?;
    let result = transform_file(&config)?;

    let problems = result.star.verify();
    if problems.is_empty() {
        log_success("Keys unique, every fact row resolves");
    } else {
        log_warning(format!("{} integrity problems", problems.len()));
        for p in problems.iter().take(5) {
            log_warning(format!("• {}", p));
        }
    }

    let json = serde_json::to_string_pretty(&result.star)?;
    write_output(&json, output)
}

fn cmd_normalize(input: InputArgs, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(input)?;
    let (_, records) = read_and_normalize(&config)?;

    let json = serde_json::to_string_pretty(&records)?;
    write_output(&json, output)
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            log_success(format!("💾 Output written to: {}", p.display()));
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
