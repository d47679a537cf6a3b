//! graph-to-rdb: Load graph JSON lines into relational tables
//!
//! Usage:
//!   # Validate only, print the table definitions
//!   graph-to-rdb --mapping map.yaml graph.jsonl
//!
//!   # Write one CSV per table and a CREATE.sql
//!   graph-to-rdb --mapping map.yaml --csv-dir ./tables --sql-dir ./sql graph.jsonl
//!
//!   # Read from stdin, route only after every record validated
//!   cat graph.jsonl | graph-to-rdb --mapping map.yaml --deferred --csv-dir ./tables

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use graph_to_rdb::{transform_jsonl, TransformConfig, Transformer, CREATE_KEY};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "graph-to-rdb")]
#[command(about = "Load graph JSON lines into relational tables", long_about = None)]
struct Args {
    /// Input JSON lines file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Mapping configuration (YAML or JSON)
    #[arg(long, short = 'm')]
    mapping: PathBuf,

    /// Directory for one CSV file per table
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Directory for CREATE.sql; definitions go to stdout if omitted
    #[arg(long)]
    sql_dir: Option<PathBuf>,

    /// Validate every record before routing any of them
    #[arg(long)]
    deferred: bool,

    /// Field delimiter for CSV output (default: ",")
    #[arg(long)]
    delimiter: Option<char>,

    /// Accept keys the mapping and record formats do not define
    #[arg(long)]
    lenient: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = TransformConfig {
        begin_conversion: !args.deferred,
        strict_keys: !args.lenient,
        ..TransformConfig::default()
    };
    if let Some(delimiter) = args.delimiter {
        if !delimiter.is_ascii() {
            bail!("delimiter must be a single ASCII character, got {:?}", delimiter);
        }
        config.csv_delimiter = delimiter as u8;
    }

    let mapping_text = std::fs::read_to_string(&args.mapping)
        .with_context(|| format!("Failed to read mapping: {}", args.mapping.display()))?;
    let mut transformer =
        Transformer::from_mapping_text(&mapping_text, config).context("Invalid mapping")?;

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open input: {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(std::io::stdin())),
    };
    transform_jsonl(reader, &mut transformer).context("Failed to process input")?;

    if args.deferred {
        transformer.generate_rdb().context("Failed to generate tables")?;
    }

    let stats = transformer.stats();
    log::info!(
        "{} records validated, {} rows inserted, {} skipped",
        stats.validated,
        stats.inserted,
        stats.skipped
    );

    if let Some(dir) = &args.csv_dir {
        transformer.write_to_csv(dir).context("Failed to write CSV output")?;
    }

    match &args.sql_dir {
        Some(dir) => {
            transformer
                .generate_sql(Some(dir))
                .context("Failed to write table definitions")?;
        }
        None => {
            if let Some(sql) = transformer.generate_sql(None)? {
                if let Some(create) = sql.get(CREATE_KEY) {
                    println!("{}", create);
                }
            }
        }
    }

    Ok(())
}
