// Pipeline processing: validation, sanitizing, join, aggregation and filtering

pub mod aggregate;
pub mod filter;
pub mod join;
pub mod quarters;
pub mod sanitize;
pub mod validate;
