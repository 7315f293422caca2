use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::common::constants::{DEFAULT_COMPANIES_PATH, DEFAULT_FILINGS_PATH, DEFAULT_METRICS_PATH};
use crate::common::error::ConfigError;

/// Configuration for one processing run. Every section falls back to its
/// defaults when absent from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub sources: SourcesConfig,
    pub limits: LoadLimits,
    pub validation: ValidationRules,
    pub filter: FilterLimits,
    pub axis: AxisLimits,
}

/// Where the three extracts live: an `http(s)://` URL or a local path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub companies: String,
    pub filings: String,
    pub metrics: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            companies: DEFAULT_COMPANIES_PATH.to_string(),
            filings: DEFAULT_FILINGS_PATH.to_string(),
            metrics: DEFAULT_METRICS_PATH.to_string(),
        }
    }
}

/// Ceilings enforced by the bounded loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadLimits {
    pub timeout_secs: u64,
    pub max_bytes: u64,
    pub max_columns: usize,
    pub max_company_rows: usize,
    pub max_filing_rows: usize,
    pub max_metric_rows: usize,
}

impl Default for LoadLimits {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_bytes: 10 * 1024 * 1024,
            max_columns: 50,
            max_company_rows: 10_000,
            max_filing_rows: 100_000,
            max_metric_rows: 100_000,
        }
    }
}

impl LoadLimits {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Field-level bounds shared by ingestion and filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    pub min_year: i32,
    pub max_year: i32,
    pub max_metric_value: f64,
    /// Filing URLs must be `https` on this host or one of its subdomains.
    pub trusted_domain: String,
    pub max_symbol_len: usize,
    pub max_company_name_len: usize,
    pub max_form_name_len: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_year: 1900,
            max_year: 2030,
            max_metric_value: 1e12,
            trusted_domain: "sec.gov".to_string(),
            max_symbol_len: 10,
            max_company_name_len: 200,
            max_form_name_len: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterLimits {
    pub max_companies: usize,
    /// Soft cap: larger results are truncated, not rejected.
    pub max_results: usize,
    pub max_input_records: usize,
}

impl Default for FilterLimits {
    fn default() -> Self {
        Self {
            max_companies: 50,
            max_results: 5000,
            max_input_records: 100_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisLimits {
    pub max_span_years: i64,
}

impl Default for AxisLimits {
    fn default() -> Self {
        Self { max_span_years: 50 }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Reject configurations that would make every run fail or every row drop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.validation.min_year > self.validation.max_year {
            return Err(ConfigError::Invalid(format!(
                "validation.min_year {} is after validation.max_year {}",
                self.validation.min_year, self.validation.max_year
            )));
        }
        if self.limits.timeout_secs == 0 {
            return Err(ConfigError::Invalid("limits.timeout_secs must be positive".to_string()));
        }
        let limits = &self.limits;
        for (name, value) in [
            ("limits.max_bytes", limits.max_bytes),
            ("limits.max_columns", limits.max_columns as u64),
            ("limits.max_company_rows", limits.max_company_rows as u64),
            ("limits.max_filing_rows", limits.max_filing_rows as u64),
            ("limits.max_metric_rows", limits.max_metric_rows as u64),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} must be positive", name)));
            }
        }
        if self.validation.trusted_domain.trim().is_empty() {
            return Err(ConfigError::Invalid("validation.trusted_domain must not be empty".to_string()));
        }
        if !(self.validation.max_metric_value.is_finite() && self.validation.max_metric_value >= 0.0) {
            return Err(ConfigError::Invalid(
                "validation.max_metric_value must be a finite non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}
