use thiserror::Error;

/// Failures of the bounded loader. Every variant names the resource it
/// concerns so the caller can tell which extract broke.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Timed out after {secs}s while fetching '{resource}'")]
    Timeout { resource: String, secs: u64 },

    #[error("Fetching '{resource}' returned HTTP status {status}")]
    Status { resource: String, status: u16 },

    #[error("'{resource}' is {size} bytes, exceeding the {limit} byte limit")]
    TooLarge { resource: String, size: u64, limit: u64 },

    #[error("HTTP request for '{resource}' failed: {message}")]
    Transport { resource: String, message: String },

    #[error("Failed to read '{resource}': {source}")]
    Io {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{resource}' as CSV: {message}")]
    Parse { resource: String, message: String },

    #[error("'{resource}' is empty")]
    EmptyTable { resource: String },

    #[error("'{resource}' has a header but no data rows")]
    NoRows { resource: String },

    #[error("'{resource}' is missing required column '{column}'")]
    MissingColumn { resource: String, column: String },

    #[error("'{resource}' has {count} columns, exceeding the limit of {limit}")]
    TooManyColumns {
        resource: String,
        count: usize,
        limit: usize,
    },

    #[error("Invalid resource '{0}'")]
    InvalidResource(String),
}

/// Run-level failures of dataset processing.
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Failed to load source data: {0}")]
    Load(#[from] LoadError),

    #[error("No valid companies remained after processing {records} combined records")]
    NoCompanies { records: usize },

    #[error("No valid years remained after processing {records} combined records")]
    NoYears { records: usize },
}

/// Invalid filter parameters. Raised before any record is inspected.
#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("Invalid filter parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("Start year {start_year} is after end year {end_year}")]
    StartAfterEnd { start_year: i64, end_year: i64 },

    #[error("Too many companies selected: {count} (limit {limit})")]
    TooManyCompanies { count: usize, limit: usize },

    #[error("Too many records submitted for filtering: {count} (limit {limit})")]
    TooManyRecords { count: usize, limit: usize },
}

/// Invalid quarter-axis year range.
#[derive(Error, Debug, PartialEq)]
pub enum RangeError {
    #[error("Year {year} is outside the supported range {min}-{max}")]
    InvalidYear { year: i64, min: i32, max: i32 },

    #[error("Minimum year {min_year} is after maximum year {max_year}")]
    MinAfterMax { min_year: i64, max_year: i64 },

    #[error("Year span {span} exceeds the limit of {limit} years")]
    SpanTooLarge { span: i64, limit: i64 },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ProcessingError>;
