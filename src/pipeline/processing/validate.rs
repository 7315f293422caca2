//! Field validators.
//!
//! Every validator is total: it returns `Some(value)` when the input coerces
//! to an in-bounds value and `None` otherwise. A coerced zero is `Some(0)`,
//! never confused with an invalid field.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use url::Url;

static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("ISO date pattern is valid")
});

const STRIPPED_CHARS: &[char] = &['<', '>', '"', '\'', '&'];

/// Strip markup-significant characters, trim and truncate to `max_length`
/// characters. Only string input is accepted; the result may be empty.
pub fn validate_string(value: &Value, max_length: usize) -> Option<String> {
    let raw = value.as_str()?;
    let stripped: String = raw.chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect();
    Some(stripped.trim().chars().take(max_length).collect())
}

/// Like [`validate_string`] but rejects values that sanitize to empty.
pub fn validate_required_string(value: &Value, max_length: usize) -> Option<String> {
    validate_string(value, max_length).filter(|s| !s.is_empty())
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

/// Coerce to a finite float within `[min, max]`.
pub fn validate_number(value: &Value, min: f64, max: f64) -> Option<f64> {
    let number = coerce_f64(value)?;
    if !number.is_finite() || number < min || number > max {
        return None;
    }
    Some(number)
}

/// Coerce to an integer (truncating toward zero) within `[min, max]`.
pub fn validate_integer(value: &Value, min: i64, max: i64) -> Option<i64> {
    let number = coerce_f64(value)?;
    if !number.is_finite() {
        return None;
    }
    let truncated = number.trunc();
    if truncated < min as f64 || truncated > max as f64 {
        return None;
    }
    let integer = truncated as i64;
    (min..=max).contains(&integer).then_some(integer)
}

/// Accept only the exact `YYYY-MM-DD` form naming a real calendar date whose
/// year lies within `[min_year, max_year]`.
pub fn validate_date(value: &Value, min_year: i32, max_year: i32) -> Option<NaiveDate> {
    let raw = value.as_str()?;
    if !ISO_DATE.is_match(raw) {
        return None;
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    (min_year..=max_year).contains(&date.year()).then_some(date)
}

/// Accept only absolute `https` URLs whose host is `trusted_domain` or one of
/// its subdomains. Lookalikes such as `evilsec.gov` are rejected. The
/// trimmed input is returned as given, so markup characters reject it.
pub fn validate_url(value: &Value, trusted_domain: &str) -> Option<String> {
    let raw = value.as_str()?.trim();
    if raw.contains(STRIPPED_CHARS) || raw.contains(char::is_whitespace) {
        return None;
    }
    let url = Url::parse(raw).ok()?;
    if url.scheme() != "https" {
        return None;
    }
    let host = url.host_str()?.trim_end_matches('.').to_ascii_lowercase();
    let domain = trusted_domain.trim().trim_start_matches('.').to_ascii_lowercase();
    if domain.is_empty() {
        return None;
    }
    let trusted = host == domain || host.ends_with(&format!(".{}", domain));
    trusted.then(|| raw.to_string())
}
