//! Daily mean pollutant concentrations with ordinal severity levels.
//!
//! Raw measurements are hourly, keyed by a packed `YYYYMMDDHH` integer.
//! Each day's rows are imputed with the day's own mean, averaged, rounded
//! to two decimals and binned into levels 0..=3 per pollutant.

use crate::cache::{CacheStore, FsCache};
use crate::config::PipelineConfig;
use crate::constants::pollution::*;
use crate::constants::{DATE_KEY, ROUND_DECIMALS};
use crate::error::Result;
use crate::models::{Domain, YearRange};
use crate::processor::{self, conform, dates, levels, numeric, require_columns};

use polars::prelude::*;
use tracing::{debug, info};

/// Name of the level column derived from `pollutant`
pub fn level_name(pollutant: &str) -> String {
    format!("{pollutant}{LEVEL_SUFFIX}")
}

/// Output columns and types: date key, then each pollutant followed by its level
pub fn output_schema() -> Vec<(String, DataType)> {
    let mut schema: Vec<(String, DataType)> = DATE_KEY
        .iter()
        .map(|name| (name.to_string(), DataType::Int64))
        .collect();
    for (pollutant, _) in POLLUTANTS {
        schema.push((pollutant.to_string(), DataType::Float64));
        schema.push((level_name(pollutant), DataType::Int64));
    }
    schema
}

fn conform_output(df: DataFrame) -> Result<DataFrame> {
    let schema = output_schema();
    let borrowed: Vec<(&str, DataType)> = schema
        .iter()
        .map(|(name, dtype)| (name.as_str(), dtype.clone()))
        .collect();
    conform(df, &borrowed)
}

/// Pollution pipeline over a cache backend
#[derive(Debug)]
pub struct PollutionPipeline<C: CacheStore = FsCache> {
    config: PipelineConfig,
    cache: C,
}

impl PollutionPipeline<FsCache> {
    /// Pipeline caching under the configured data directory
    pub fn new(config: PipelineConfig) -> Self {
        let cache = FsCache::new(config.data_path());
        Self::with_cache(config, cache)
    }
}

impl<C: CacheStore> PollutionPipeline<C> {
    pub fn with_cache(config: PipelineConfig, cache: C) -> Self {
        Self { config, cache }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Daily table for a custom year range, cached as the raw-range artifact.
    ///
    /// The artifact does not record its range: once stored it is returned for
    /// any range until [`reset_file`](Self::reset_file) is called.
    pub fn import_raw(&self, range: YearRange) -> Result<DataFrame> {
        self.cached(RAW_RANGE_FILE, range)
    }

    /// Daily table for the configured default years (2017..=2019)
    pub fn import_csv(&self) -> Result<DataFrame> {
        self.cached(PREPROCESSED_FILE, self.config.default_range)
    }

    /// Read the full historical source and derive the daily table for `range`
    pub fn preprocess(&self, range: YearRange) -> Result<DataFrame> {
        let raw = processor::read_csv_file(
            &self.config.data_file(RAW_FILE),
            self.config.infer_schema_rows,
        )?;
        transform(raw, range)
    }

    /// Delete both cached artifacts; missing ones are skipped
    pub fn reset_file(&self) -> Result<()> {
        for key in Domain::Pollution.cache_files() {
            if self.cache.invalidate(key)? {
                info!("Removed cached {}", key);
            } else {
                debug!("No cached {} to remove", key);
            }
        }
        Ok(())
    }

    fn cached(&self, key: &str, range: YearRange) -> Result<DataFrame> {
        if let Some(cached) = self.cache.load(key)? {
            info!("Cache hit for {} ({} rows)", key, cached.height());
            return conform_output(cached);
        }

        info!("Cache miss for {}, deriving years {}", key, range);
        let mut df = self.preprocess(range)?;
        self.cache.store(key, &mut df)?;
        info!("Stored {} daily pollution rows", df.height());
        Ok(df)
    }
}

/// NaN readings count as missing, like empty cells
fn missing_as_null(expr: Expr) -> Expr {
    expr.fill_nan(lit(NULL).cast(DataType::Float64))
}

/// Derive the daily pollution table from raw hourly measurements.
///
/// Sentinel bounds in `range` resolve to the first and last year present in
/// the data.
pub fn transform(raw: DataFrame, range: YearRange) -> Result<DataFrame> {
    let mut required = vec![RAW_DATE];
    required.extend(POLLUTANTS.iter().map(|(name, _)| *name));
    require_columns(&raw, &required, RAW_FILE)?;

    let df = dates::decompose_packed_column(raw, RAW_DATE)?;
    let range = processor::resolve_year_range(&df, range)?;
    debug!("Keeping pollution years {}", range);

    let key: Vec<Expr> = DATE_KEY.iter().map(|name| col(*name)).collect();
    let mut selected = key.clone();
    selected.extend(POLLUTANTS.iter().map(|(name, _)| {
        missing_as_null(col(*name).cast(DataType::Float64)).alias(*name)
    }));

    let imputed: Vec<Expr> = POLLUTANTS
        .iter()
        .map(|(name, _)| {
            col(*name)
                .fill_null(col(*name).mean().over(key.clone()))
                .alias(*name)
        })
        .collect();
    let means: Vec<Expr> = POLLUTANTS
        .iter()
        .map(|(name, _)| col(*name).mean())
        .collect();

    let mut daily = df
        .lazy()
        .filter(range.filter_expr())
        .select(selected)
        .with_columns(imputed)
        .group_by(key.clone())
        .agg(means)
        .sort_by_exprs(key, SortMultipleOptions::default())
        .collect()?;
    debug!("Aggregated pollution to {} days", daily.height());

    let pollutants: Vec<&str> = POLLUTANTS.iter().map(|(name, _)| *name).collect();
    numeric::round_columns(&mut daily, &pollutants, ROUND_DECIMALS)?;

    for (pollutant, bounds) in POLLUTANTS {
        let level = levels::level_column(&daily, pollutant, &level_name(pollutant), &bounds)?;
        daily.with_column(level)?;
    }

    conform_output(daily)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::constants::{DAY, YEAR};
    use crate::processor::column_names;

    fn raw_frame() -> DataFrame {
        df! {
            "dt" => [2016123100i64, 2017010100, 2017010101, 2017010200, 2018010100],
            "loc" => [101i64, 101, 102, 101, 101],
            "so2" => [Some(0.004f64), Some(0.01), None, Some(0.03), Some(1.0)],
            "no2" => [Some(0.02f64), Some(0.02), Some(0.04), Some(0.05), Some(0.3)],
            "co" => [Some(0.5f64), Some(0.4), Some(0.6), Some(3.0), Some(20.0)],
            "o3" => [Some(0.01f64), Some(0.02), Some(0.02), Some(0.1), Some(0.2)],
            "pm10" => [Some(40.0f64), Some(20.0), Some(30.0), None, Some(200.0)],
            "pm2.5" => [Some(10.0f64), Some(10.0), Some(21.0), None, Some(100.0)],
        }
        .unwrap()
    }

    fn column_f64(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    fn column_i64(df: &DataFrame, name: &str) -> Vec<Option<i64>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_output_column_order() {
        let df = transform(raw_frame(), YearRange::unbounded()).unwrap();
        assert_eq!(
            column_names(&df),
            vec![
                "year", "month", "day", "so2", "so2_level", "no2", "no2_level", "co",
                "co_level", "o3", "o3_level", "pm10", "pm10_level", "pm2.5", "pm2.5_level",
            ]
        );
    }

    #[test]
    fn test_year_filter_is_inclusive() {
        let df = transform(raw_frame(), YearRange::new(2017, 2017)).unwrap();
        assert_eq!(column_i64(&df, YEAR), vec![Some(2017), Some(2017)]);
        assert_eq!(column_i64(&df, DAY), vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_sentinels_use_data_bounds() {
        let df = transform(raw_frame(), YearRange::unbounded()).unwrap();
        assert_eq!(df.height(), 4);
        assert_eq!(column_i64(&df, YEAR).first(), Some(&Some(2016)));
        assert_eq!(column_i64(&df, YEAR).last(), Some(&Some(2018)));

        let df = transform(raw_frame(), YearRange::new(2017, -1)).unwrap();
        assert_eq!(df.height(), 3);
    }

    #[test]
    fn test_daily_mean_with_imputation() {
        let df = transform(raw_frame(), YearRange::new(2017, 2017)).unwrap();

        // Missing so2 on 2017-01-01 takes that day's mean, leaving it unchanged.
        assert_eq!(column_f64(&df, "so2"), vec![Some(0.01), Some(0.03)]);
        assert_eq!(column_f64(&df, "no2"), vec![Some(0.03), Some(0.05)]);
        assert_eq!(column_f64(&df, "pm10"), vec![Some(25.0), None]);
    }

    #[test]
    fn test_levels_follow_rounded_means() {
        let df = transform(raw_frame(), YearRange::unbounded()).unwrap();

        assert_eq!(
            column_i64(&df, "so2_level"),
            vec![Some(0), Some(0), Some(1), Some(3)]
        );
        assert_eq!(
            column_i64(&df, "co_level"),
            vec![Some(0), Some(0), Some(1), Some(3)]
        );
        assert_eq!(
            column_i64(&df, "pm10_level"),
            vec![Some(1), Some(0), None, Some(3)]
        );
        assert_eq!(
            column_i64(&df, "pm2.5_level"),
            vec![Some(0), Some(1), None, Some(3)]
        );
    }

    #[test]
    fn test_means_are_rounded() {
        let df = transform(raw_frame(), YearRange::new(2017, 2017)).unwrap();
        assert_eq!(column_f64(&df, "pm2.5"), vec![Some(15.5), None]);
        assert_eq!(column_f64(&df, "co"), vec![Some(0.5), Some(3.0)]);
    }

    #[test]
    fn test_nan_readings_are_imputed() {
        let raw = df! {
            "dt" => [2017010100i64, 2017010101],
            "so2" => [0.01f64, 0.01],
            "no2" => [0.02f64, 0.02],
            "co" => [0.4f64, 0.4],
            "o3" => [0.02f64, f64::NAN],
            "pm10" => [f64::NAN, 40.0],
            "pm2.5" => [f64::NAN, f64::NAN],
        }
        .unwrap();

        let df = transform(raw, YearRange::unbounded()).unwrap();
        assert_eq!(column_f64(&df, "pm10"), vec![Some(40.0)]);
        assert_eq!(column_i64(&df, "pm10_level"), vec![Some(1)]);
        assert_eq!(column_f64(&df, "o3"), vec![Some(0.02)]);
        assert_eq!(column_f64(&df, "pm2.5"), vec![None]);
        assert_eq!(column_i64(&df, "pm2.5_level"), vec![None]);
    }

    #[test]
    fn test_missing_pollutant_column_fails() {
        let raw = raw_frame().drop("o3").unwrap();
        assert!(transform(raw, YearRange::unbounded()).is_err());
    }

    #[test]
    fn test_reset_clears_both_artifacts() {
        let pipeline =
            PollutionPipeline::with_cache(PipelineConfig::default(), MemoryCache::new());
        let mut df = transform(raw_frame(), YearRange::unbounded()).unwrap();
        pipeline.cache().store(RAW_RANGE_FILE, &mut df).unwrap();
        pipeline.cache().store(PREPROCESSED_FILE, &mut df).unwrap();

        pipeline.reset_file().unwrap();
        assert!(pipeline.cache().is_empty());
    }
}
