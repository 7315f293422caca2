// Common constants and error types used across the crate

pub mod constants;
pub mod error;

pub use error::{ConfigError, FilterError, LoadError, ProcessingError, RangeError};
