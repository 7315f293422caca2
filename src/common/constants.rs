//! Column names of the three source extracts and other shared constants.
//! The column lists are the schema contract the loader enforces.

// Companies extract
pub const COL_SYMBOL: &str = "symbol";
pub const COL_COMPANY_NAME: &str = "companyName";
pub const COL_CIK: &str = "cik";

// Filings extract
pub const COL_FILING_ID: &str = "id";
pub const COL_FORM_NAME: &str = "formName";
pub const COL_VALUE_DATE: &str = "valueDate";
pub const COL_FILING_DATE: &str = "filingDate";
pub const COL_FORM_URL: &str = "formURL";

// Metrics extract
pub const COL_FORM_ID: &str = "formId";
pub const COL_CCP: &str = "ccp";
pub const COL_LTD: &str = "ltd";
pub const COL_TOTAL_ASSETS: &str = "totalAssets";
pub const COL_TOTAL_LIABILITIES: &str = "totalLiabilities";
pub const COL_REVENUE: &str = "revenue";
pub const COL_NET_INCOME: &str = "netIncome";
pub const COL_DIVISOR: &str = "divisor";

pub const COMPANY_COLUMNS: &[&str] = &[COL_SYMBOL, COL_COMPANY_NAME, COL_CIK];

pub const FILING_COLUMNS: &[&str] = &[
    COL_FILING_ID,
    COL_FORM_NAME,
    COL_CIK,
    COL_VALUE_DATE,
    COL_FILING_DATE,
    COL_FORM_URL,
];

/// Only the required metric columns; auxiliary ones may be absent.
pub const METRIC_COLUMNS: &[&str] = &[COL_FORM_ID, COL_CCP, COL_LTD];

// Source names used in logs, metrics and errors
pub const COMPANIES_SOURCE: &str = "companies";
pub const FILINGS_SOURCE: &str = "filings";
pub const METRICS_SOURCE: &str = "metrics";

// Identifier bounds
pub const MAX_CIK: i64 = 9_999_999_999;
pub const MAX_RECORD_ID: i64 = 1_000_000_000_000_000;

// Default source locations
pub const DEFAULT_COMPANIES_PATH: &str = "data/companies.csv";
pub const DEFAULT_FILINGS_PATH: &str = "data/filings.csv";
pub const DEFAULT_METRICS_PATH: &str = "data/metrics.csv";

pub const CONFIG_ENV_VAR: &str = "FILING_METRICS_CONFIG";
