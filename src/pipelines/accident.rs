//! Daily traffic accident counts and casualty rates.

use crate::cache::{CacheStore, FsCache};
use crate::config::PipelineConfig;
use crate::constants::accident::*;
use crate::constants::{DATE_KEY, DAY, MONTH, ROUND_DECIMALS, YEAR};
use crate::error::Result;
use crate::models::Domain;
use crate::processor::{self, column_names, conform, dates, numeric, require_columns};

use polars::prelude::*;
use tracing::{debug, info};

/// Output columns and types, in order
pub fn output_schema() -> Vec<(&'static str, DataType)> {
    vec![
        (YEAR, DataType::Int64),
        (MONTH, DataType::Int64),
        (DAY, DataType::Int64),
        (ACCIDENT_CNT, DataType::Int64),
        (DEATH, DataType::Int64),
        (FATAL, DataType::Int64),
        (INJURED, DataType::Int64),
        (DEATH_RATE, DataType::Float64),
        (FATAL_RATE, DataType::Float64),
    ]
}

/// Accident pipeline over a cache backend
#[derive(Debug)]
pub struct AccidentPipeline<C: CacheStore = FsCache> {
    config: PipelineConfig,
    cache: C,
}

impl AccidentPipeline<FsCache> {
    /// Pipeline caching under the configured data directory
    pub fn new(config: PipelineConfig) -> Self {
        let cache = FsCache::new(config.data_path());
        Self::with_cache(config, cache)
    }
}

impl<C: CacheStore> AccidentPipeline<C> {
    pub fn with_cache(config: PipelineConfig, cache: C) -> Self {
        Self { config, cache }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Daily accident table, from cache when present
    pub fn import_csv(&self) -> Result<DataFrame> {
        if let Some(cached) = self.cache.load(PREPROCESSED_FILE)? {
            info!("Cache hit for {} ({} rows)", PREPROCESSED_FILE, cached.height());
            return conform(cached, &output_schema());
        }

        info!("Cache miss for {}, reading raw accidents", PREPROCESSED_FILE);
        let raw = processor::read_csv_file(
            &self.config.data_file(RAW_FILE),
            self.config.infer_schema_rows,
        )?;

        let mut df = preprocess(raw)?;
        self.cache.store(PREPROCESSED_FILE, &mut df)?;
        info!("Stored {} daily accident rows", df.height());
        Ok(df)
    }

    /// Delete the cached table; a missing artifact is not an error
    pub fn reset_file(&self) -> Result<()> {
        for key in Domain::Accident.cache_files() {
            if self.cache.invalidate(key)? {
                info!("Removed cached {}", key);
            } else {
                debug!("No cached {} to remove", key);
            }
        }
        Ok(())
    }
}

/// Aggregate raw accident records to one row per day.
///
/// Days with no accidents have null rates.
pub fn preprocess(raw: DataFrame) -> Result<DataFrame> {
    let raw = drop_index_columns(raw)?;
    let mut required = vec![RAW_DATE];
    required.extend(COUNT_COLUMNS.iter().map(|(raw_name, _)| *raw_name));
    require_columns(&raw, &required, RAW_FILE)?;

    let df = dates::decompose_date_column(raw, RAW_DATE)?;
    let df = date_fields_first(&df, RAW_DATE)?;

    let sums: Vec<Expr> = COUNT_COLUMNS
        .iter()
        .map(|(raw_name, name)| col(*raw_name).strict_cast(DataType::Int64).sum().alias(*name))
        .collect();

    let mut daily = df
        .lazy()
        .group_by(DATE_KEY.map(col))
        .agg(sums)
        .sort_by_exprs(DATE_KEY.map(col), SortMultipleOptions::default())
        .collect()?;
    debug!("Aggregated accidents to {} days", daily.height());

    let death_rate =
        numeric::percentage_column(&daily, DEATH, ACCIDENT_CNT, DEATH_RATE, ROUND_DECIMALS)?;
    let fatal_rate =
        numeric::percentage_column(&daily, FATAL, ACCIDENT_CNT, FATAL_RATE, ROUND_DECIMALS)?;
    daily.with_column(death_rate)?;
    daily.with_column(fatal_rate)?;

    conform(daily, &output_schema())
}

/// Drop the unnamed index column left behind by an exported dataframe
fn drop_index_columns(df: DataFrame) -> Result<DataFrame> {
    let index_columns: Vec<String> = column_names(&df)
        .into_iter()
        .filter(|name| name.trim().is_empty() || name.starts_with("Unnamed"))
        .collect();
    if index_columns.is_empty() {
        return Ok(df);
    }
    debug!("Dropping index columns {:?}", index_columns);
    Ok(df.drop_many(index_columns))
}

/// Move `year`, `month`, `day` to the front and drop the source date column
fn date_fields_first(df: &DataFrame, source: &str) -> Result<DataFrame> {
    let mut order: Vec<String> = DATE_KEY.iter().map(|name| name.to_string()).collect();
    order.extend(
        column_names(df)
            .into_iter()
            .filter(|name| name != source && !DATE_KEY.contains(&name.as_str())),
    );
    Ok(df.select(order)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    fn raw_frame() -> DataFrame {
        df! {
            "" => [0i64, 1, 2, 3],
            RAW_DATE => ["2017-01-01", "2017-01-01", "2017-01-02", "2017-01-03"],
            "자치구명" => ["강남구", "종로구", "강남구", "마포구"],
            RAW_ACCIDENTS => [6i64, 4, 3, 0],
            RAW_DEATHS => [1i64, 0, 0, 0],
            RAW_SEVERE => [1i64, 1, 1, 0],
            RAW_MINOR => [5i64, 3, 2, 0],
        }
        .unwrap()
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

    fn column_f64(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_preprocess_schema() {
        let df = preprocess(raw_frame()).unwrap();
        let expected: Vec<&str> = output_schema().iter().map(|(name, _)| *name).collect();
        assert_eq!(column_names(&df), expected);
    }

    #[test]
    fn test_preprocess_sums_per_day() {
        let df = preprocess(raw_frame()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(column_i64(&df, DAY), vec![Some(1), Some(2), Some(3)]);
        assert_eq!(column_i64(&df, ACCIDENT_CNT), vec![Some(10), Some(3), Some(0)]);
        assert_eq!(column_i64(&df, DEATH), vec![Some(1), Some(0), Some(0)]);
        assert_eq!(column_i64(&df, FATAL), vec![Some(2), Some(1), Some(0)]);
        assert_eq!(column_i64(&df, INJURED), vec![Some(8), Some(2), Some(0)]);
    }

    #[test]
    fn test_rates_and_zero_accident_day() {
        let df = preprocess(raw_frame()).unwrap();

        assert_eq!(
            column_f64(&df, DEATH_RATE),
            vec![Some(10.0), Some(0.0), None]
        );
        assert_eq!(
            column_f64(&df, FATAL_RATE),
            vec![Some(20.0), Some(33.33), None]
        );
    }

    #[test]
    fn test_malformed_date_fails() {
        let raw = df! {
            RAW_DATE => ["2017/1/1"],
            RAW_ACCIDENTS => [1i64],
            RAW_DEATHS => [0i64],
            RAW_SEVERE => [0i64],
            RAW_MINOR => [1i64],
        }
        .unwrap();

        assert!(preprocess(raw).is_err());
    }

    #[test]
    fn test_missing_count_column_fails() {
        let raw = df! {
            RAW_DATE => ["2017-01-01"],
            RAW_ACCIDENTS => [1i64],
        }
        .unwrap();

        assert!(matches!(
            preprocess(raw),
            Err(crate::PipelineError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_reset_without_cache_is_noop() {
        let pipeline = AccidentPipeline::with_cache(PipelineConfig::default(), MemoryCache::new());
        assert!(pipeline.reset_file().is_ok());
        assert!(pipeline.reset_file().is_ok());
    }
}
