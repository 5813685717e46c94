//! Domain pipelines.
//!
//! Each pipeline loads a cached daily table when present and otherwise
//! derives it from raw inputs and caches it. All three share the same
//! configuration and cache layout, so [`Pipelines`] bundles them.

pub mod accident;
pub mod pollution;
pub mod weather;

pub use accident::AccidentPipeline;
pub use pollution::PollutionPipeline;
pub use weather::WeatherPipeline;

use crate::config::PipelineConfig;
use crate::error::Result;

/// All three pipelines over one filesystem data directory
#[derive(Debug)]
pub struct Pipelines {
    pub accident: AccidentPipeline,
    pub pollution: PollutionPipeline,
    pub weather: WeatherPipeline,
}

impl Pipelines {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            accident: AccidentPipeline::new(config.clone()),
            pollution: PollutionPipeline::new(config.clone()),
            weather: WeatherPipeline::new(config),
        }
    }

    /// Delete every cache artifact of every domain
    pub fn reset_all(&self) -> Result<()> {
        self.accident.reset_file()?;
        self.pollution.reset_file()?;
        self.weather.reset_file()
    }
}
