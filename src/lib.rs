pub mod aggregate;
pub mod cli;
pub mod data;
pub mod decimal;
pub mod error;
pub mod filter;
pub mod io_utils;
pub mod loader;
pub mod table;

use std::{env, sync::OnceLock};

use clap::Parser;
use encoding_rs::{Encoding, UTF_8};
use log::{LevelFilter, debug, warn};

use crate::{cli::Cli, error::CliError, loader::LoadOptions};

/// Prefix for every diagnostic line written to stderr.
pub const TOOL_TAG: &str = "[csvtool]";

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csvtool", LevelFilter::Warn);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<(), CliError> {
    init_logging();
    let cli = Cli::parse();
    let rendered = execute(&cli)?;
    table::print_output(&rendered, output_encoding(cli.output_encoding.as_deref()));
    Ok(())
}

/// Runs load, filters and aggregate (or row rendering) and returns the
/// rendered table. Nothing is rendered when any stage fails.
pub fn execute(cli: &Cli) -> Result<String, CliError> {
    let options = LoadOptions {
        delimiter: cli.delimiter,
        encoding: cli.input_encoding.clone(),
    };
    let mut rows = loader::load_csv(&cli.csv_file, &options)?;

    if !cli.filters.is_empty() {
        debug!("Applying {} filter(s): {:?}", cli.filters.len(), cli.filters);
        rows = filter::apply_filters(&rows, &cli.filters).map_err(CliError::Filter)?;
    }

    // An empty `--aggregate` value means no aggregate.
    match cli.aggregate.as_deref().filter(|expression| !expression.is_empty()) {
        Some(expression) => {
            let result =
                aggregate::apply_aggregate(&rows, expression).map_err(CliError::Aggregate)?;
            Ok(table::render_aggregate(&result))
        }
        None => Ok(table::render_rows(&rows)),
    }
}

fn output_encoding(label: Option<&str>) -> &'static Encoding {
    io_utils::resolve_encoding(label).unwrap_or_else(|| {
        warn!(
            "Unknown output encoding '{}', writing utf-8",
            label.unwrap_or_default()
        );
        UTF_8
    })
}
