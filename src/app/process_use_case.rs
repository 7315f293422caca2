use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use crate::app::ports::ResourceFetcherPort;
use crate::common::constants::*;
use crate::common::error::{LoadError, ProcessingError};
use crate::config::PipelineConfig;
use crate::domain::{Dataset, ProcessingStats, RawRow};
use crate::infra::DefaultFetcher;
use crate::observability::metrics;
use crate::pipeline::ingestion::loader::{BoundedLoader, TableSchema};
use crate::pipeline::ingestion::resource::Resource;
use crate::pipeline::processing::aggregate::aggregate;
use crate::pipeline::processing::join::join_records;
use crate::pipeline::processing::sanitize::{dedupe_metrics, RecordSanitizer};

const METRIC_OPTIONAL_COLUMNS: &[&str] = &[
    COL_TOTAL_ASSETS,
    COL_TOTAL_LIABILITIES,
    COL_REVENUE,
    COL_NET_INCOME,
    COL_DIVISOR,
];

/// Loads the three extracts concurrently and turns them into a [`Dataset`].
///
/// Any load failure aborts the run and cancels the other in-flight loads.
/// Row-level problems never fail the run; they only show up in
/// [`Dataset::stats`].
pub struct ProcessDatasetUseCase {
    loader: BoundedLoader,
    config: PipelineConfig,
}

impl ProcessDatasetUseCase {
    pub fn new(fetcher: Arc<dyn ResourceFetcherPort>, config: PipelineConfig) -> Self {
        Self {
            loader: BoundedLoader::new(fetcher, config.limits.clone()),
            config,
        }
    }

    /// Create a use case that reads URLs over HTTP and paths from disk
    pub fn with_default_fetcher(config: PipelineConfig) -> Self {
        Self::new(Arc::new(DefaultFetcher::new()), config)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    async fn load_source(
        &self,
        source: &'static str,
        location: &str,
        schema: TableSchema<'_>,
        max_rows: usize,
    ) -> Result<Vec<RawRow>, LoadError> {
        let resource = Resource::parse(location)?;
        self.loader
            .load(&resource, schema, max_rows)
            .instrument(info_span!("load", source = source, resource = %resource))
            .await
    }

    pub async fn process(&self) -> Result<Dataset, ProcessingError> {
        let sources = &self.config.sources;
        let limits = &self.config.limits;

        let (raw_companies, raw_filings, raw_metrics) = tokio::try_join!(
            self.load_source(
                COMPANIES_SOURCE,
                &sources.companies,
                TableSchema::new(COMPANY_COLUMNS),
                limits.max_company_rows,
            ),
            self.load_source(
                FILINGS_SOURCE,
                &sources.filings,
                TableSchema::new(FILING_COLUMNS),
                limits.max_filing_rows,
            ),
            self.load_source(
                METRICS_SOURCE,
                &sources.metrics,
                TableSchema::new(METRIC_COLUMNS).with_optional(METRIC_OPTIONAL_COLUMNS),
                limits.max_metric_rows,
            ),
        )?;

        let rules = &self.config.validation;
        let sanitizer = RecordSanitizer::new(rules);

        let companies: Vec<_> = raw_companies
            .iter()
            .filter_map(|row| sanitizer.sanitize_company(row))
            .collect();
        let filings: Vec<_> = raw_filings
            .iter()
            .filter_map(|row| sanitizer.sanitize_filing(row))
            .collect();
        let sanitized_metrics: Vec<_> = raw_metrics
            .iter()
            .filter_map(|row| sanitizer.sanitize_metric(row))
            .collect();

        metrics::sanitize::rows_sanitized(
            COMPANIES_SOURCE,
            companies.len(),
            raw_companies.len() - companies.len(),
        );
        metrics::sanitize::rows_sanitized(
            FILINGS_SOURCE,
            filings.len(),
            raw_filings.len() - filings.len(),
        );
        metrics::sanitize::rows_sanitized(
            METRICS_SOURCE,
            sanitized_metrics.len(),
            raw_metrics.len() - sanitized_metrics.len(),
        );

        let valid_metrics = sanitized_metrics.len();
        let (unique_metrics, duplicate_metrics) = dedupe_metrics(sanitized_metrics);
        metrics::sanitize::duplicates_dropped(duplicate_metrics);

        let joined = join_records(&companies, &filings, &unique_metrics, rules);

        let stats = ProcessingStats {
            raw_companies: raw_companies.len(),
            raw_filings: raw_filings.len(),
            raw_metrics: raw_metrics.len(),
            valid_companies: companies.len(),
            valid_filings: filings.len(),
            valid_metrics,
            duplicate_metrics,
            missing_filing: joined.drops.missing_filing,
            missing_company: joined.drops.missing_company,
            invalid_date: joined.drops.invalid_date,
            out_of_bounds: joined.drops.out_of_bounds,
            combined_records: joined.records.len(),
        };

        info!(
            companies = stats.valid_companies,
            filings = stats.valid_filings,
            metrics = stats.valid_metrics,
            duplicates = stats.duplicate_metrics,
            combined = stats.combined_records,
            "sanitized and joined sources"
        );

        let dataset = aggregate(joined.records, stats)?;
        info!(
            companies = dataset.companies.len(),
            records = dataset.combined_data.len(),
            min_year = dataset.date_range.min,
            max_year = dataset.date_range.max,
            "dataset ready"
        );
        Ok(dataset)
    }
}
