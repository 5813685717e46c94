//! Seoul daily datasets
//!
//! Cleans three raw Seoul datasets (traffic accidents, air pollution and
//! weather) and reduces each to one row per calendar day.
//!
//! This library provides:
//! - Date decomposition into `year`, `month`, `day` keys
//! - Group-mean imputation, zero-fill and first-occurrence deduplication
//! - Daily sums and means per domain
//! - Derived casualty rates, pollutant levels and a cloudiness code
//! - Cached derived tables behind a [`cache::CacheStore`], with explicit reset
//!
//! ```no_run
//! use seoul_daily::{PipelineConfig, Pipelines};
//!
//! # fn main() -> seoul_daily::Result<()> {
//! let pipelines = Pipelines::new(PipelineConfig::new("/srv/seoul"));
//! let accidents = pipelines.accident.import_csv()?;
//! let pollution = pipelines.pollution.import_csv()?;
//! let weather = pipelines.weather.import_csv()?;
//! println!("{} {} {}", accidents.height(), pollution.height(), weather.height());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod pipelines;
pub mod processor;

pub use cache::{CacheStore, FsCache, MemoryCache};
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use models::{DateParts, Domain, YearRange};
pub use pipelines::{AccidentPipeline, Pipelines, PollutionPipeline, WeatherPipeline};
