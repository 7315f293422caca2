//! Pipeline metrics recorded through the `metrics` facade.
//!
//! No recorder is installed here; a host process that wants the numbers
//! installs one (for example a Prometheus exporter) before running.

use std::fmt;

/// All metric names used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Loader metrics
    LoaderRequestsSuccess,
    LoaderRequestsError,
    LoaderRequestDuration,
    LoaderPayloadBytes,
    LoaderRowsParsed,
    LoaderUnexpectedColumns,

    // Sanitize metrics
    SanitizeRowsAccepted,
    SanitizeRowsRejected,
    SanitizeDuplicatesDropped,

    // Join metrics
    JoinRecordsCombined,
    JoinRecordsDropped,

    // Filter metrics
    FilterQueries,
    FilterResultSize,
    FilterTruncated,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::LoaderRequestsSuccess => "filing_metrics_loader_requests_success_total",
            MetricName::LoaderRequestsError => "filing_metrics_loader_requests_error_total",
            MetricName::LoaderRequestDuration => "filing_metrics_loader_request_duration_seconds",
            MetricName::LoaderPayloadBytes => "filing_metrics_loader_payload_bytes",
            MetricName::LoaderRowsParsed => "filing_metrics_loader_rows_parsed_total",
            MetricName::LoaderUnexpectedColumns => "filing_metrics_loader_unexpected_columns_total",

            MetricName::SanitizeRowsAccepted => "filing_metrics_sanitize_rows_accepted_total",
            MetricName::SanitizeRowsRejected => "filing_metrics_sanitize_rows_rejected_total",
            MetricName::SanitizeDuplicatesDropped => "filing_metrics_sanitize_duplicates_dropped_total",

            MetricName::JoinRecordsCombined => "filing_metrics_join_records_combined_total",
            MetricName::JoinRecordsDropped => "filing_metrics_join_records_dropped_total",

            MetricName::FilterQueries => "filing_metrics_filter_queries_total",
            MetricName::FilterResultSize => "filing_metrics_filter_result_size",
            MetricName::FilterTruncated => "filing_metrics_filter_truncated_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod loader {
    use super::MetricName;

    pub fn request_success(source: &str, duration_secs: f64, payload_bytes: usize) {
        ::metrics::counter!(MetricName::LoaderRequestsSuccess.as_str(), "source" => source.to_string())
            .increment(1);
        ::metrics::histogram!(MetricName::LoaderRequestDuration.as_str(), "source" => source.to_string())
            .record(duration_secs);
        ::metrics::histogram!(MetricName::LoaderPayloadBytes.as_str(), "source" => source.to_string())
            .record(payload_bytes as f64);
    }

    pub fn request_error(source: &str, error_type: &'static str) {
        ::metrics::counter!(
            MetricName::LoaderRequestsError.as_str(),
            "source" => source.to_string(),
            "error_type" => error_type
        )
        .increment(1);
    }

    pub fn rows_parsed(source: &str, rows: usize) {
        ::metrics::counter!(MetricName::LoaderRowsParsed.as_str(), "source" => source.to_string())
            .increment(rows as u64);
    }

    pub fn unexpected_columns(source: &str, count: usize) {
        ::metrics::counter!(MetricName::LoaderUnexpectedColumns.as_str(), "source" => source.to_string())
            .increment(count as u64);
    }
}

pub mod sanitize {
    use super::MetricName;

    pub fn rows_sanitized(source: &str, accepted: usize, rejected: usize) {
        ::metrics::counter!(MetricName::SanitizeRowsAccepted.as_str(), "source" => source.to_string())
            .increment(accepted as u64);
        ::metrics::counter!(MetricName::SanitizeRowsRejected.as_str(), "source" => source.to_string())
            .increment(rejected as u64);
    }

    pub fn duplicates_dropped(count: usize) {
        ::metrics::counter!(MetricName::SanitizeDuplicatesDropped.as_str()).increment(count as u64);
    }
}

pub mod join {
    use super::MetricName;

    pub fn records_combined(count: usize) {
        ::metrics::counter!(MetricName::JoinRecordsCombined.as_str()).increment(count as u64);
    }

    pub fn records_dropped(reason: &'static str, count: usize) {
        if count > 0 {
            ::metrics::counter!(MetricName::JoinRecordsDropped.as_str(), "reason" => reason)
                .increment(count as u64);
        }
    }
}

pub mod filter {
    use super::MetricName;

    pub fn query_completed(result_size: usize, truncated: bool) {
        ::metrics::counter!(MetricName::FilterQueries.as_str()).increment(1);
        ::metrics::histogram!(MetricName::FilterResultSize.as_str()).record(result_size as f64);
        if truncated {
            ::metrics::counter!(MetricName::FilterTruncated.as_str()).increment(1);
        }
    }
}
