//! Derived ordinal codes: pollutant levels and weather cloudiness.

use crate::error::Result;

use polars::prelude::*;

/// Ordinal level 0..=3 of `value` against three ascending upper bounds.
///
/// Buckets are closed on the right: `(-inf, b1]`, `(b1, b2]`, `(b2, b3]`,
/// `(b3, inf)`. NaN has no level.
pub fn level_for(value: f64, bounds: &[f64; 3]) -> Option<i64> {
    if value.is_nan() {
        return None;
    }
    let level = bounds.iter().take_while(|&&bound| value > bound).count();
    Some(level as i64)
}

/// Level column named `name` for a numeric column
pub fn level_column(
    df: &DataFrame,
    source: &str,
    name: &str,
    bounds: &[f64; 3],
) -> Result<Series> {
    let values = df
        .column(source)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let levels: Int64Chunked = values
        .f64()?
        .into_iter()
        .map(|value| value.and_then(|v| level_for(v, bounds)))
        .collect();
    Ok(levels.with_name(name.into()).into_series())
}

/// Cloudiness code of a free-text condition description.
///
/// First match wins: "Overcast" is 3, "Partially cloudy" is 1, any other
/// "cloudy" is 2, everything else 0. Matching is case-sensitive, so
/// "Cloudy" alone is 0.
pub fn cloudiness_code(condition: &str) -> i64 {
    if condition.contains("Overcast") {
        3
    } else if condition.contains("Partially cloudy") {
        1
    } else if condition.contains("cloudy") {
        2
    } else {
        0
    }
}

/// Cloudiness column named `name`; missing conditions map to 0
pub fn cloudiness_column(df: &DataFrame, source: &str, name: &str) -> Result<Series> {
    let conditions = df
        .column(source)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let codes: Int64Chunked = conditions
        .str()?
        .into_iter()
        .map(|condition| Some(condition.map_or(0, cloudiness_code)))
        .collect();
    Ok(codes.with_name(name.into()).into_series())
}
