//! CSV load and export.

use crate::config::PreprocessingConfig;
use crate::error::{PreprocessingError, Result, ResultExt};
use polars::prelude::*;
use std::io::Cursor;
use std::path::PathBuf;
use tracing::{debug, info, warn};

const EXAMPLE_CSV: &[u8] = include_bytes!("../data/titanic_sample.csv");

/// Where a dataset comes from.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// Raw CSV bytes, e.g. an uploaded file.
    Bytes(Vec<u8>),
    /// A CSV file on disk.
    Path(PathBuf),
    /// The bundled Titanic sample.
    Example,
}

impl DataSource {
    fn describe(&self) -> String {
        match self {
            DataSource::Bytes(bytes) => format!("{} uploaded bytes", bytes.len()),
            DataSource::Path(path) => path.display().to_string(),
            DataSource::Example => "bundled example".to_string(),
        }
    }
}

/// Load a dataset from `source`.
///
/// The first row is the header. If polars cannot parse the data as-is, the
/// loader retries without quote handling and then once more after
/// normalizing doubled quotes and blank lines.
pub fn load(source: &DataSource, config: &PreprocessingConfig) -> Result<DataFrame> {
    let label = source.describe();
    let df = match source {
        DataSource::Bytes(bytes) => read_csv_with_fallbacks(bytes.clone(), config),
        DataSource::Path(path) => {
            let bytes = std::fs::read(path)
                .map_err(PreprocessingError::from)
                .context(format!("Reading {}", path.display()))?;
            read_csv_with_fallbacks(bytes, config)
        }
        DataSource::Example => read_csv_with_fallbacks(EXAMPLE_CSV.to_vec(), config),
    }?;

    info!(
        "Loaded {} rows x {} columns from {}",
        df.height(),
        df.width(),
        label
    );
    Ok(df)
}

fn read_csv(bytes: Vec<u8>, config: &PreprocessingConfig, quote: Option<u8>) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(config.infer_schema_length)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(config.csv_separator_byte())
                .with_quote_char(quote),
        )
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
}

fn read_csv_with_fallbacks(bytes: Vec<u8>, config: &PreprocessingConfig) -> Result<DataFrame> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(PreprocessingError::LoadFailed("input is empty".to_string()));
    }

    match read_csv(bytes.clone(), config, Some(b'"')) {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Standard CSV parse failed: {}", e),
    }

    match read_csv(bytes.clone(), config, None) {
        Ok(df) => return Ok(df),
        Err(e) => debug!("CSV parse without quotes failed: {}", e),
    }

    let cleaned = normalize_csv(&String::from_utf8_lossy(&bytes));
    read_csv(cleaned.into_bytes(), config, Some(b'"')).map_err(|e| {
        warn!("Giving up on CSV input: {}", e);
        PreprocessingError::LoadFailed(e.to_string())
    })
}

/// Collapse doubled quotes and drop blank lines.
fn normalize_csv(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize `df` as UTF-8 CSV: a header row, then one line per row. Missing
/// values are written as empty fields.
///
/// CSV carries no types. Loading the output again re-infers them, so a text
/// column of digit strings such as zip codes comes back as integers and loses
/// its leading zeros.
pub fn export(df: &DataFrame, config: &PreprocessingConfig) -> Result<Vec<u8>> {
    let mut out = df.clone();
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .with_separator(config.csv_separator_byte())
        .with_quote_char(b'"')
        .finish(&mut out)
        .context("Writing CSV")?;

    debug!("Exported {} rows as {} bytes", df.height(), buf.len());
    Ok(buf)
}
