use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "csvtool",
    author,
    version,
    about = "Filter and aggregate CSV files from the command line",
    long_about = None
)]
pub struct Cli {
    /// Path to the CSV file to process (`-` reads stdin)
    #[arg(value_name = "CSV_FILE")]
    pub csv_file: PathBuf,
    /// Filter such as `price>300`, `price<300` or `name=John`; repeat to combine with AND
    #[arg(long = "where", value_name = "EXPR", action = clap::ArgAction::Append)]
    pub filters: Vec<String>,
    /// Aggregate such as `rating=avg` where the function is avg, min or max;
    /// filtered rows are printed when omitted or empty
    #[arg(long = "aggregate", value_name = "EXPR")]
    pub aggregate: Option<String>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Character encoding for stdout (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" | "\\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
