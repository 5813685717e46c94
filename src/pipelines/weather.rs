//! Daily weather observations from one or more raw exports.
//!
//! Exports may overlap in time; rows are concatenated in file order and only
//! the first row of each day survives.

use crate::cache::{CacheStore, FsCache};
use crate::config::PipelineConfig;
use crate::constants::weather::*;
use crate::constants::{DAY, MONTH, YEAR};
use crate::error::{PipelineError, Result};
use crate::models::Domain;
use crate::processor::{self, conform, dates, deduplication, levels, require_columns};

use polars::prelude::*;
use tracing::{debug, info};

/// Output columns and types, in order
pub fn output_schema() -> Vec<(&'static str, DataType)> {
    OUTPUT_COLUMNS
        .iter()
        .map(|&name| {
            let dtype = if [YEAR, MONTH, DAY, CLOUDY].contains(&name) {
                DataType::Int64
            } else {
                DataType::Float64
            };
            (name, dtype)
        })
        .collect()
}

/// Append `.csv` unless the name already ends with it
pub fn with_csv_suffix(name: &str) -> String {
    if name.ends_with(CSV_SUFFIX) {
        name.to_string()
    } else {
        format!("{name}{CSV_SUFFIX}")
    }
}

/// Weather pipeline over a cache backend
#[derive(Debug)]
pub struct WeatherPipeline<C: CacheStore = FsCache> {
    config: PipelineConfig,
    cache: C,
}

impl WeatherPipeline<FsCache> {
    /// Pipeline caching under the configured data directory
    pub fn new(config: PipelineConfig) -> Self {
        let cache = FsCache::new(config.data_path());
        Self::with_cache(config, cache)
    }
}

impl<C: CacheStore> WeatherPipeline<C> {
    pub fn with_cache(config: PipelineConfig, cache: C) -> Self {
        Self { config, cache }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Daily table over every row of the named exports, cached as the raw
    /// artifact
    pub fn import_raw<S: AsRef<str>>(&self, filenames: &[S]) -> Result<DataFrame> {
        if let Some(cached) = self.load_cached(RAW_CACHE_FILE)? {
            return Ok(cached);
        }

        info!("Cache miss for {}, reading {} exports", RAW_CACHE_FILE, filenames.len());
        let mut df = self.import_csv_names(filenames)?;
        self.cache.store(RAW_CACHE_FILE, &mut df)?;
        info!("Stored {} daily weather rows", df.height());
        Ok(df)
    }

    /// Daily table from the configured default exports, limited to the
    /// default years
    pub fn import_csv(&self) -> Result<DataFrame> {
        if let Some(cached) = self.load_cached(PREPROCESSED_FILE)? {
            return Ok(cached);
        }

        info!(
            "Cache miss for {}, reading default exports for {}",
            PREPROCESSED_FILE, self.config.default_range
        );
        let df = self.import_csv_names(&self.config.weather_default_files)?;
        let mut df = processor::filter_years(df, self.config.default_range)?;
        self.cache.store(PREPROCESSED_FILE, &mut df)?;
        info!("Stored {} daily weather rows", df.height());
        Ok(df)
    }

    /// Read and concatenate the named exports in order, then preprocess.
    ///
    /// Names without a `.csv` suffix get one. An empty list fails with
    /// [`PipelineError::NoInputFiles`].
    pub fn import_csv_names<S: AsRef<str>>(&self, filenames: &[S]) -> Result<DataFrame> {
        let frames = filenames
            .iter()
            .map(|name| {
                let name = with_csv_suffix(name.as_ref());
                let raw = processor::read_csv_file(
                    &self.config.data_file(&name),
                    self.config.infer_schema_rows,
                )?;
                normalize_export(raw, &name).map(IntoLazy::lazy)
            })
            .collect::<Result<Vec<_>>>()?;

        if frames.is_empty() {
            return Err(PipelineError::NoInputFiles {
                domain: Domain::Weather.to_string(),
            });
        }

        let combined = concat(frames, UnionArgs::default())?.collect()?;
        debug!("Concatenated {} weather rows", combined.height());
        preprocess(combined)
    }

    /// Delete both cached artifacts; missing ones are skipped
    pub fn reset_file(&self) -> Result<()> {
        for key in Domain::Weather.cache_files() {
            if self.cache.invalidate(key)? {
                info!("Removed cached {}", key);
            } else {
                debug!("No cached {} to remove", key);
            }
        }
        Ok(())
    }

    fn load_cached(&self, key: &str) -> Result<Option<DataFrame>> {
        match self.cache.load(key)? {
            Some(cached) => {
                info!("Cache hit for {} ({} rows)", key, cached.height());
                conform(cached, &output_schema()).map(Some)
            }
            None => Ok(None),
        }
    }
}

/// Keep the columns used downstream with uniform types so exports stack
fn normalize_export(raw: DataFrame, source_name: &str) -> Result<DataFrame> {
    let mut required = vec![RAW_DATE, RAW_CONDITIONS];
    required.extend(MEASUREMENTS);
    require_columns(&raw, &required, source_name)?;

    let mut exprs = vec![
        col(RAW_DATE).strict_cast(DataType::String),
        col(RAW_CONDITIONS).strict_cast(DataType::String),
    ];
    exprs.extend(
        MEASUREMENTS
            .iter()
            .map(|name| col(*name).strict_cast(DataType::Float64)),
    );
    Ok(raw.lazy().select(exprs).collect()?)
}

/// Turn concatenated raw rows into the daily weather table.
///
/// Decomposes `datetime`, derives the cloudiness code from `conditions`,
/// zero-fills missing or NaN measurements and keeps the first row per day.
pub fn preprocess(df: DataFrame) -> Result<DataFrame> {
    let mut required = vec![RAW_DATE, RAW_CONDITIONS];
    required.extend(MEASUREMENTS);
    require_columns(&df, &required, "weather exports")?;

    let mut df = dates::decompose_date_column(df, RAW_DATE)?;
    let cloudy = levels::cloudiness_column(&df, RAW_CONDITIONS, CLOUDY)?;
    df.with_column(cloudy)?;

    let exprs: Vec<Expr> = OUTPUT_COLUMNS
        .iter()
        .map(|&name| {
            if MEASUREMENTS.contains(&name) {
                col(name)
                    .strict_cast(DataType::Float64)
                    .fill_nan(lit(0.0))
                    .fill_null(lit(0.0))
                    .alias(name)
            } else {
                col(name)
            }
        })
        .collect();
    let df = df.lazy().select(exprs).collect()?;

    let df = deduplication::drop_duplicate_dates(&df)?;
    debug!("Preprocessed weather to {} days", df.height());
    conform(df, &output_schema())
}
