use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use csv::{ReaderBuilder, Trim};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::app::ports::ResourceFetcherPort;
use crate::common::error::LoadError;
use crate::config::LoadLimits;
use crate::domain::RawRow;
use crate::observability::metrics;
use crate::pipeline::ingestion::resource::Resource;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Column contract for one extract. Missing `required` columns are fatal;
/// columns outside both lists are logged and kept.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema<'a> {
    pub required: &'a [&'a str],
    pub optional: &'a [&'a str],
}

impl<'a> TableSchema<'a> {
    pub fn new(required: &'a [&'a str]) -> Self {
        Self {
            required,
            optional: &[],
        }
    }

    pub fn with_optional(mut self, optional: &'a [&'a str]) -> Self {
        self.optional = optional;
        self
    }

    fn knows(&self, column: &str) -> bool {
        self.required.contains(&column) || self.optional.contains(&column)
    }
}

/// Fetches a tabular resource under time and size limits and parses it
/// into raw rows.
pub struct BoundedLoader {
    fetcher: Arc<dyn ResourceFetcherPort>,
    limits: LoadLimits,
}

impl BoundedLoader {
    pub fn new(fetcher: Arc<dyn ResourceFetcherPort>, limits: LoadLimits) -> Self {
        Self { fetcher, limits }
    }

    pub fn limits(&self) -> &LoadLimits {
        &self.limits
    }

    /// Load at most `max_rows` rows from `resource`. Extra rows are dropped
    /// silently; dropping the returned future cancels the transfer.
    pub async fn load(
        &self,
        resource: &Resource,
        schema: TableSchema<'_>,
        max_rows: usize,
    ) -> Result<Vec<RawRow>, LoadError> {
        let name = resource.to_string();
        let started = Instant::now();

        let fetched = tokio::time::timeout(
            self.limits.timeout(),
            self.fetcher.fetch(resource, self.limits.max_bytes),
        )
        .await;

        let bytes = match fetched {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => {
                metrics::loader::request_error(&name, error_type(&e));
                return Err(e);
            }
            Err(_) => {
                metrics::loader::request_error(&name, "timeout");
                return Err(LoadError::Timeout {
                    resource: name,
                    secs: self.limits.timeout_secs,
                });
            }
        };
        metrics::loader::request_success(&name, started.elapsed().as_secs_f64(), bytes.len());

        let rows = parse_table(&name, &bytes, schema, max_rows, self.limits.max_columns)?;
        metrics::loader::rows_parsed(&name, rows.len());
        info!(resource = %name, rows = rows.len(), bytes = bytes.len(), "loaded source");
        Ok(rows)
    }
}

fn error_type(error: &LoadError) -> &'static str {
    match error {
        LoadError::Timeout { .. } => "timeout",
        LoadError::Status { .. } => "status",
        LoadError::TooLarge { .. } => "too_large",
        LoadError::Transport { .. } => "transport",
        LoadError::Io { .. } => "io",
        _ => "other",
    }
}

/// Parse CSV bytes into raw rows, enforcing the column contract.
pub fn parse_table(
    resource: &str,
    bytes: &[u8],
    schema: TableSchema<'_>,
    max_rows: usize,
    max_columns: usize,
) -> Result<Vec<RawRow>, LoadError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(LoadError::EmptyTable {
            resource: resource.to_string(),
        });
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| LoadError::Parse {
            resource: resource.to_string(),
            message: format!("Failed to read headers: {}", e),
        })?
        .clone();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::EmptyTable {
            resource: resource.to_string(),
        });
    }
    if headers.len() > max_columns {
        return Err(LoadError::TooManyColumns {
            resource: resource.to_string(),
            count: headers.len(),
            limit: max_columns,
        });
    }

    let present: HashSet<&str> = headers.iter().collect();
    if let Some(missing) = schema.required.iter().find(|c| !present.contains(**c)) {
        return Err(LoadError::MissingColumn {
            resource: resource.to_string(),
            column: missing.to_string(),
        });
    }

    let unexpected: Vec<&str> = headers
        .iter()
        .filter(|h| !h.is_empty() && !schema.knows(h))
        .collect();
    if !unexpected.is_empty() {
        warn!(
            resource = %resource,
            columns = ?unexpected,
            "unexpected columns present; continuing"
        );
        metrics::loader::unexpected_columns(resource, unexpected.len());
    }

    let mut rows = Vec::new();
    let mut truncated = false;
    // Cells are decoded lossily; a cell with invalid UTF-8 fails validation
    // later and only its row is dropped.
    for record in reader.byte_records() {
        if rows.len() == max_rows {
            truncated = true;
            break;
        }
        let record = record.map_err(|e| LoadError::Parse {
            resource: resource.to_string(),
            message: format!("Failed to read record: {}", e),
        })?;

        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, field)| {
                let cell = String::from_utf8_lossy(field).into_owned();
                (header.to_string(), Value::String(cell))
            })
            .collect();
        rows.push(row);
    }

    if truncated {
        debug!(resource = %resource, max_rows, "row cap reached; remaining rows ignored");
    }
    if rows.is_empty() {
        return Err(LoadError::NoRows {
            resource: resource.to_string(),
        });
    }

    Ok(rows)
}
