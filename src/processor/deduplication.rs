//! Date-key deduplication for overlapping raw exports.

use crate::constants::{DAY, MONTH, YEAR};
use crate::error::Result;

use polars::prelude::*;
use std::collections::HashSet;
use tracing::debug;

type DateKey = (Option<i64>, Option<i64>, Option<i64>);

/// Mask selecting the first row of every `(year, month, day)` key
pub fn first_occurrence_mask(df: &DataFrame) -> Result<BooleanChunked> {
    let key_column = |name: &str| -> Result<Series> {
        Ok(df
            .column(name)?
            .as_materialized_series()
            .strict_cast(&DataType::Int64)?)
    };
    let years = key_column(YEAR)?;
    let months = key_column(MONTH)?;
    let days = key_column(DAY)?;

    let mut seen: HashSet<DateKey> = HashSet::with_capacity(df.height());
    let mask: BooleanChunked = years
        .i64()?
        .into_iter()
        .zip(months.i64()?.into_iter())
        .zip(days.i64()?.into_iter())
        .map(|((year, month), day)| seen.insert((year, month, day)))
        .collect();
    Ok(mask)
}

/// Drop rows whose date key was already seen, keeping the first occurrence
/// and the original row order
pub fn drop_duplicate_dates(df: &DataFrame) -> Result<DataFrame> {
    let mask = first_occurrence_mask(df)?;
    let deduplicated = df.filter(&mask)?;

    let removed = df.height() - deduplicated.height();
    if removed > 0 {
        debug!("Removed {} rows with duplicate date keys", removed);
    }
    Ok(deduplicated)
}
