//! Core data structures shared by the three pipelines.

use crate::constants::{self, YEAR, YEAR_SENTINEL};
use polars::prelude::{Expr, col, lit};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Datasets handled by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Accident,
    Pollution,
    Weather,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Accident, Domain::Pollution, Domain::Weather];

    pub fn name(&self) -> &'static str {
        match self {
            Domain::Accident => "accident",
            Domain::Pollution => "pollution",
            Domain::Weather => "weather",
        }
    }

    /// Cache artifacts owned by this domain, deleted by its reset
    pub fn cache_files(&self) -> &'static [&'static str] {
        match self {
            Domain::Accident => &[constants::accident::PREPROCESSED_FILE],
            Domain::Pollution => &[
                constants::pollution::RAW_RANGE_FILE,
                constants::pollution::PREPROCESSED_FILE,
            ],
            Domain::Weather => &[
                constants::weather::RAW_CACHE_FILE,
                constants::weather::PREPROCESSED_FILE,
            ],
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inclusive range of calendar years.
///
/// Either bound may be [`YEAR_SENTINEL`] (`-1`), meaning "whatever the data
/// starts or ends with"; call [`YearRange::resolve`] before filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i64,
    pub end: i64,
}

impl YearRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Range with both bounds taken from the data
    pub fn unbounded() -> Self {
        Self::new(YEAR_SENTINEL, YEAR_SENTINEL)
    }

    pub fn is_resolved(&self) -> bool {
        self.start != YEAR_SENTINEL && self.end != YEAR_SENTINEL
    }

    /// Replace sentinel bounds with the observed minimum and maximum year.
    ///
    /// With no observed years a sentinel bound stays `-1`, which then
    /// filters against nothing.
    pub fn resolve(&self, observed_min: Option<i64>, observed_max: Option<i64>) -> Self {
        let start = match (self.start, observed_min) {
            (YEAR_SENTINEL, Some(min)) => min,
            (start, _) => start,
        };
        let end = match (self.end, observed_max) {
            (YEAR_SENTINEL, Some(max)) => max,
            (end, _) => end,
        };
        Self { start, end }
    }

    /// Predicate keeping rows whose `year` lies in the range, bounds inclusive
    pub fn filter_expr(&self) -> Expr {
        col(YEAR)
            .gt_eq(lit(self.start))
            .and(col(YEAR).lt_eq(lit(self.end)))
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self::new(constants::DEFAULT_START_YEAR, constants::DEFAULT_END_YEAR)
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Calendar date split into the grouping key fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateParts {
    pub year: i64,
    pub month: i64,
    pub day: i64,
}

impl DateParts {
    pub fn new(year: i64, month: i64, day: i64) -> Self {
        Self { year, month, day }
    }
}
