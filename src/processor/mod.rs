//! Shared dataframe stages used by every pipeline.
//!
//! Raw CSV loading, CSV (de)serialization for cache artifacts and output
//! schema conformance live here. The per-value stages each have their own
//! module: date decomposition, rounding and rates, level binning and key
//! deduplication.

pub mod dates;
pub mod deduplication;
pub mod levels;
pub mod numeric;

use crate::constants::YEAR;
use crate::error::{PipelineError, Result};
use crate::models::YearRange;

use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Read a raw CSV file with a header row.
///
/// A missing file is reported as [`PipelineError::SourceNotFound`] rather
/// than a polars I/O error.
pub fn read_csv_file(path: &Path, infer_schema_rows: Option<usize>) -> Result<DataFrame> {
    if !path.exists() {
        return Err(PipelineError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(infer_schema_rows)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    debug!(
        "Read {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Parse CSV bytes produced by [`write_csv_bytes`]
pub fn read_csv_bytes(bytes: Vec<u8>) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;
    Ok(df)
}

/// Serialize a frame to CSV with a header row and no index
pub fn write_csv_bytes(df: &mut DataFrame) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(df)?;
    Ok(buffer)
}

/// Fail with [`PipelineError::MissingColumn`] unless every column is present
pub fn require_columns(df: &DataFrame, columns: &[&str], source_name: &str) -> Result<()> {
    match columns
        .iter()
        .find(|name| df.get_column_index(name).is_none())
    {
        Some(missing) => Err(PipelineError::MissingColumn {
            column: missing.to_string(),
            source_name: source_name.to_string(),
        }),
        None => Ok(()),
    }
}

/// Select exactly the schema's columns, in order, cast to the schema's types.
///
/// Applied to fresh results and to cache hits alike, so both paths hand the
/// caller the same frame.
pub fn conform(df: DataFrame, schema: &[(&str, DataType)]) -> Result<DataFrame> {
    let exprs: Vec<Expr> = schema
        .iter()
        .map(|(name, dtype)| col(*name).strict_cast(dtype.clone()))
        .collect();
    Ok(df.lazy().select(exprs).collect()?)
}

/// Resolve sentinel bounds of `range` against the frame's `year` column
pub fn resolve_year_range(df: &DataFrame, range: YearRange) -> Result<YearRange> {
    if range.is_resolved() {
        return Ok(range);
    }
    let years = df
        .column(YEAR)?
        .as_materialized_series()
        .strict_cast(&DataType::Int64)?;
    let years = years.i64()?;
    Ok(range.resolve(years.min(), years.max()))
}

/// Keep rows whose `year` lies in `range`, bounds inclusive
pub fn filter_years(df: DataFrame, range: YearRange) -> Result<DataFrame> {
    let range = resolve_year_range(&df, range)?;
    let filtered = df
        .lazy()
        .filter(range.filter_expr())
        .collect()?;
    debug!("Kept {} rows for years {}", filtered.height(), range);
    Ok(filtered)
}

/// Column names in order, as owned strings
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}
