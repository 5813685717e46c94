//! Date Decomposer: split composite dates into `year`, `month`, `day`.
//!
//! Two encodings appear in the raw data. Accident and weather exports carry
//! ISO-like strings (`YYYY-MM-DD`, optionally followed by `THH:MM:SS`) that
//! are split by fixed character offsets. Pollution measurements carry a
//! packed hourly integer `YYYYMMDDHH`.

use crate::constants::{DAY, MONTH, YEAR};
use crate::error::{PipelineError, Result};
use crate::models::DateParts;

use polars::prelude::*;

/// Split a date string at offsets 0..4, 5..7 and 8.. .
///
/// The day field is the run of digits starting at offset 8, so a trailing
/// time component is ignored. Separators are not checked.
pub fn split_date_str(value: &str, column: &str) -> Result<DateParts> {
    let field = |range: std::ops::Range<usize>, name: &str| -> Result<i64> {
        let text = value.get(range).ok_or_else(|| {
            PipelineError::malformed_date(column, value, format!("cannot slice {name}"))
        })?;
        text.parse::<i64>().map_err(|e| {
            PipelineError::malformed_date(column, value, format!("invalid {name} '{text}': {e}"))
        })
    };

    let year = field(0..4, YEAR)?;
    let month = field(5..7, MONTH)?;

    let rest = value
        .get(8..)
        .ok_or_else(|| PipelineError::malformed_date(column, value, "cannot slice day"))?;
    let day_len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let day = rest[..day_len].parse::<i64>().map_err(|e| {
        PipelineError::malformed_date(column, value, format!("invalid day '{rest}': {e}"))
    })?;

    Ok(DateParts::new(year, month, day))
}

/// Decode a packed `YYYYMMDDHH` integer, discarding the hour
pub fn decode_packed_date(packed: i64) -> DateParts {
    DateParts::new(
        packed.div_euclid(1_000_000),
        packed.rem_euclid(1_000_000).div_euclid(10_000),
        packed.rem_euclid(10_000).div_euclid(100),
    )
}

/// Append `year`, `month`, `day` columns decoded from a string column
pub fn decompose_date_column(mut df: DataFrame, column: &str) -> Result<DataFrame> {
    let values = df.column(column)?.as_materialized_series().cast(&DataType::String)?;
    let parts = values
        .str()?
        .into_iter()
        .map(|value| match value {
            Some(value) => split_date_str(value, column),
            None => Err(PipelineError::malformed_date(column, "", "missing date")),
        })
        .collect::<Result<Vec<_>>>()?;

    append_date_parts(&mut df, &parts)?;
    Ok(df)
}

/// Append `year`, `month`, `day` columns decoded from a packed integer column
pub fn decompose_packed_column(mut df: DataFrame, column: &str) -> Result<DataFrame> {
    let values = df
        .column(column)?
        .as_materialized_series()
        .strict_cast(&DataType::Int64)?;
    let parts = values
        .i64()?
        .into_iter()
        .map(|value| {
            value
                .map(decode_packed_date)
                .ok_or_else(|| PipelineError::malformed_date(column, "", "missing date"))
        })
        .collect::<Result<Vec<_>>>()?;

    append_date_parts(&mut df, &parts)?;
    Ok(df)
}

fn append_date_parts(df: &mut DataFrame, parts: &[DateParts]) -> Result<()> {
    let years: Vec<i64> = parts.iter().map(|p| p.year).collect();
    let months: Vec<i64> = parts.iter().map(|p| p.month).collect();
    let days: Vec<i64> = parts.iter().map(|p| p.day).collect();

    df.with_column(Series::new(YEAR.into(), years))?;
    df.with_column(Series::new(MONTH.into(), months))?;
    df.with_column(Series::new(DAY.into(), days))?;
    Ok(())
}
