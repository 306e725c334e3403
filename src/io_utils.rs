//! I/O utilities for CSV reading, decoding, and output encoding.
//!
//! All file I/O in csvtool flows through this module. It provides:
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.tsv` → tab,
//!   anything else → comma) with manual override support.
//! - **Encoding**: input decoding and lossy output encoding via `encoding_rs`,
//!   defaulting to UTF-8.
//! - **Reader construction**: `open_csv_reader` and `open_csv_reader_from_path`.
//! - **stdin**: the `-` path convention routes through standard input.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

/// Replacement for characters the output encoding cannot represent.
pub const SUBSTITUTE_CHAR: char = '?';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

/// Looks up an encoding by WHATWG label, returning `None` for unknown labels.
pub fn resolve_encoding(label: Option<&str>) -> Option<&'static Encoding> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes()),
        None => Some(UTF_8),
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(
    path: &Path,
    delimiter: u8,
) -> Result<csv::Reader<Box<dyn Read>>> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    Ok(open_csv_reader(reader, delimiter))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

/// Decodes the header record, dropping a leading byte-order mark from the
/// first field.
pub fn decode_headers(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
) -> Result<Vec<String>> {
    let mut headers = decode_record(record, encoding)?;
    if let Some(first) = headers.first_mut() {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }
    Ok(headers)
}

pub fn reader_headers<R>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
) -> Result<Vec<String>>
where
    R: Read,
{
    let headers = reader.byte_headers().context("Reading header row")?.clone();
    decode_headers(&headers, encoding).context("Decoding header row")
}

/// Encodes `text` for output, substituting [`SUBSTITUTE_CHAR`] for every
/// character `encoding` cannot represent. Returns the bytes and whether any
/// substitution happened.
pub fn encode_lossy(text: &str, encoding: &'static Encoding) -> (Vec<u8>, bool) {
    let (encoded, _, had_errors) = encoding.encode(text);
    if !had_errors {
        return (encoded.into_owned(), false);
    }
    let mut output = Vec::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        let (bytes, _, unmappable) = encoding.encode(ch.encode_utf8(&mut buf));
        if unmappable {
            output.push(SUBSTITUTE_CHAR as u8);
        } else {
            output.extend_from_slice(&bytes);
        }
    }
    (output, true)
}
