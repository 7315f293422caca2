//! Validated ingest, join and quarter filtering of SEC filing metrics.
//!
//! Three CSV extracts (companies, filings, metrics) are loaded under size
//! and time limits, sanitized field by field, joined into one record per
//! metric row and grouped by company. The resulting [`domain::Dataset`] is
//! queried with [`filter_dataset`] and labelled with [`build_quarter_axis`].

pub mod common;
pub mod config;
pub mod domain;
pub mod pipeline;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;

pub mod observability;

use crate::app::process_use_case::ProcessDatasetUseCase;
use crate::common::error::{FilterError, ProcessingError, RangeError};
use crate::config::PipelineConfig;
use crate::domain::{CombinedRecord, Dataset, GroupedData, QuarterLabel};
use crate::pipeline::processing::filter::FilterQuery;

/// Load, sanitize, join and aggregate the configured sources.
pub async fn process_dataset(config: PipelineConfig) -> Result<Dataset, ProcessingError> {
    ProcessDatasetUseCase::with_default_fetcher(config).process().await
}

/// Records of the selected companies within the quarter range, sorted by
/// date and capped by `config.filter.max_results`.
pub fn filter_dataset(
    grouped: &GroupedData,
    query: &FilterQuery,
    config: &PipelineConfig,
) -> Result<Vec<CombinedRecord>, FilterError> {
    pipeline::processing::filter::filter_dataset(grouped, query, &config.validation, &config.filter)
}

/// Every `(year, quarter)` label from `min_year` Q1 to `max_year` Q4.
pub fn build_quarter_axis(
    min_year: i64,
    max_year: i64,
    config: &PipelineConfig,
) -> Result<Vec<QuarterLabel>, RangeError> {
    pipeline::processing::quarters::build_quarter_axis(
        min_year,
        max_year,
        &config.validation,
        &config.axis,
    )
}
