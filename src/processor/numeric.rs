//! Rounding and percentage rates.

use crate::error::Result;

use polars::prelude::*;

/// Round half to even at `decimals` places, as `numpy.round` does
pub fn round_half_even(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// `numerator / denominator * 100`, or `None` when the denominator is zero
pub fn percentage(numerator: i64, denominator: i64, decimals: i32) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    Some(round_half_even(
        numerator as f64 / denominator as f64 * 100.0,
        decimals,
    ))
}

/// Round every value of the named float columns in place
pub fn round_columns(df: &mut DataFrame, columns: &[&str], decimals: i32) -> Result<()> {
    for name in columns {
        let values = df
            .column(name)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let rounded: Float64Chunked = values
            .f64()?
            .into_iter()
            .map(|value| value.map(|v| round_half_even(v, decimals)))
            .collect();
        df.with_column(rounded.with_name((*name).into()).into_series())?;
    }
    Ok(())
}

/// Build a rate column `numerator / denominator * 100`.
///
/// Rows with a zero or missing denominator get a null rate.
pub fn percentage_column(
    df: &DataFrame,
    numerator: &str,
    denominator: &str,
    name: &str,
    decimals: i32,
) -> Result<Series> {
    let numerators = df
        .column(numerator)?
        .as_materialized_series()
        .strict_cast(&DataType::Int64)?;
    let denominators = df
        .column(denominator)?
        .as_materialized_series()
        .strict_cast(&DataType::Int64)?;

    let rates: Float64Chunked = numerators
        .i64()?
        .into_iter()
        .zip(denominators.i64()?.into_iter())
        .map(|(n, d)| match (n, d) {
            (Some(n), Some(d)) => percentage(n, d, decimals),
            _ => None,
        })
        .collect();

    Ok(rates.with_name(name.into()).into_series())
}
