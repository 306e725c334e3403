//! Reads a delimited text file into an in-memory [`Dataset`].
//!
//! The first record is the header; every following record becomes a [`Row`]
//! sharing that header. No type coercion happens here, all values stay strings.

use std::{io::Read, path::Path, sync::Arc};

use anyhow::{Context, bail};
use encoding_rs::Encoding;
use log::{debug, info};

use crate::{
    data::{Dataset, Row},
    error::LoadError,
    io_utils,
};

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Field delimiter; inferred from the file extension when `None`.
    pub delimiter: Option<u8>,
    /// WHATWG encoding label; UTF-8 when `None`.
    pub encoding: Option<String>,
}

impl LoadOptions {
    fn resolve_encoding(&self) -> Result<&'static Encoding, LoadError> {
        io_utils::resolve_encoding(self.encoding.as_deref()).ok_or_else(|| {
            LoadError::UnknownEncoding {
                label: self.encoding.clone().unwrap_or_default(),
            }
        })
    }
}

/// Loads the whole CSV file at `path`. The path `-` reads standard input.
pub fn load_csv(path: &Path, options: &LoadOptions) -> Result<Dataset, LoadError> {
    if !io_utils::is_dash(path) && !path.is_file() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let encoding = options.resolve_encoding()?;
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    debug!(
        "Loading {:?} with delimiter {:?} and encoding {}",
        path,
        delimiter as char,
        encoding.name()
    );
    let reader = io_utils::open_csv_reader_from_path(path, delimiter).map_err(LoadError::Format)?;
    let rows = read_dataset(reader, encoding).map_err(LoadError::Format)?;
    info!("Loaded {} row(s) from {:?}", rows.len(), path);
    Ok(rows)
}

/// Loads CSV content from an arbitrary reader. The delimiter defaults to comma.
pub fn load_csv_from_reader<R: Read>(
    reader: R,
    options: &LoadOptions,
) -> Result<Dataset, LoadError> {
    let encoding = options.resolve_encoding()?;
    let delimiter = options.delimiter.unwrap_or(io_utils::DEFAULT_CSV_DELIMITER);
    let reader = io_utils::open_csv_reader(reader, delimiter);
    read_dataset(reader, encoding).map_err(LoadError::Format)
}

fn read_dataset<R: Read>(
    mut reader: csv::Reader<R>,
    encoding: &'static Encoding,
) -> anyhow::Result<Dataset> {
    let headers = io_utils::reader_headers(&mut reader, encoding)?;
    if headers.is_empty() {
        bail!("CSV files without a header row are not supported");
    }
    let headers: Arc<[String]> = headers.into();

    let mut rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
        let decoded = io_utils::decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {}", idx + 2))?;
        rows.push(Row::new(Arc::clone(&headers), decoded));
    }
    Ok(rows)
}
