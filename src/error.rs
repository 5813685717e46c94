//! Error handling for the daily aggregation pipelines.
//!
//! Every failure is fatal to the current call and surfaces to the caller
//! unchanged. Nothing is retried.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Source file not found at path: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("No {domain} data to import.")]
    NoInputFiles { domain: String },

    #[error("Malformed date in column '{column}': '{value}' - {reason}")]
    MalformedDate {
        column: String,
        value: String,
        reason: String,
    },

    #[error("Required column '{column}' missing from {source_name}")]
    MissingColumn { column: String, source_name: String },

    #[error("Cache error for '{key}': {reason}")]
    Cache { key: String, reason: String },
}

impl PipelineError {
    /// Create a malformed date error
    pub fn malformed_date(
        column: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedDate {
            column: column.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a cache error
    pub fn cache(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Cache {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
