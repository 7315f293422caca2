use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// One untyped source row: column name to cell value.
pub type RawRow = HashMap<String, Value>;

/// A sanitized company. Identity key is `cik`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub symbol: String,
    pub company_name: String,
    /// Canonical decimal form, without leading zeros.
    pub cik: String,
}

/// A sanitized filing. Identity key is `id`; `cik` refers to a [`Company`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filing {
    pub id: String,
    pub form_name: String,
    pub cik: String,
    pub value_date: NaiveDate,
    pub filing_date: NaiveDate,
    #[serde(rename = "formURL")]
    pub form_url: String,
}

/// A sanitized metric row. Identity key is `form_id`, which refers to a [`Filing`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    pub form_id: String,
    pub ccp: f64,
    pub ltd: f64,
    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub revenue: Option<f64>,
    pub net_income: Option<f64>,
    /// Unit divisor for consumers that rescale; defaults to 1.
    pub divisor: f64,
}

/// A metric row joined through its filing to its company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedRecord {
    pub id: String,
    pub company: String,
    pub symbol: String,
    pub cik: String,
    pub year: i32,
    /// Calendar quarter, 1 to 4.
    pub quarter: u8,
    pub date: NaiveDate,
    pub date_string: String,
    pub quarter_label: String,
    pub ccp: f64,
    pub ltd: f64,
    pub form_name: String,
    #[serde(rename = "formURL")]
    pub form_url: String,
}

/// Records grouped by company name, each group sorted by date.
pub type GroupedData = BTreeMap<String, Vec<CombinedRecord>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub min: i32,
    pub max: i32,
}

/// Before/after counts for each pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStats {
    pub raw_companies: usize,
    pub raw_filings: usize,
    pub raw_metrics: usize,
    pub valid_companies: usize,
    pub valid_filings: usize,
    pub valid_metrics: usize,
    pub duplicate_metrics: usize,
    pub missing_filing: usize,
    pub missing_company: usize,
    pub invalid_date: usize,
    pub out_of_bounds: usize,
    pub combined_records: usize,
}

/// The processed, queryable dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub combined_data: Vec<CombinedRecord>,
    pub grouped_data: GroupedData,
    pub companies: Vec<String>,
    pub years: Vec<i32>,
    pub date_range: DateRange,
    pub stats: ProcessingStats,
}

/// One entry of the quarter axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterLabel {
    pub year: i32,
    pub quarter: u8,
    pub label: String,
}

impl QuarterLabel {
    pub fn new(year: i32, quarter: u8) -> Self {
        Self {
            year,
            quarter,
            label: quarter_label(year, quarter),
        }
    }
}

/// Canonical quarter label, e.g. `Q4 2023`.
pub fn quarter_label(year: i32, quarter: u8) -> String {
    format!("Q{} {}", quarter, year)
}
