use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde_json::Value;
use tracing::debug;

use crate::config::ValidationRules;
use crate::domain::{quarter_label, CombinedRecord, Company, Filing, MetricRecord};
use crate::observability::metrics;
use crate::pipeline::processing::validate::validate_date;

/// Counts of metric rows the join discarded, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinDrops {
    pub missing_filing: usize,
    pub missing_company: usize,
    pub invalid_date: usize,
    pub out_of_bounds: usize,
}

impl JoinDrops {
    pub fn total(&self) -> usize {
        self.missing_filing + self.missing_company + self.invalid_date + self.out_of_bounds
    }
}

#[derive(Debug, Clone, Default)]
pub struct JoinOutput {
    /// One record per metric row that resolved, in metric encounter order.
    pub records: Vec<CombinedRecord>,
    pub drops: JoinDrops,
}

/// Calendar quarter (1-4) of a 1-based month.
pub fn quarter_of_month(month: u32) -> u8 {
    ((month + 2) / 3) as u8
}

/// Formats the date and validates it again, so only dates that survive
/// the same checks as ingestion are emitted.
fn round_trip_date(date: NaiveDate, rules: &ValidationRules) -> Option<(NaiveDate, String)> {
    let date_string = date.format("%Y-%m-%d").to_string();
    let reparsed = validate_date(&Value::String(date_string.clone()), rules.min_year, rules.max_year)?;
    (reparsed == date).then_some((reparsed, date_string))
}

fn within_bounds(value: f64, max: f64) -> bool {
    value.is_finite() && (0.0..=max).contains(&value)
}

/// Join metrics to filings (by `form_id`) and filings to companies (by
/// `cik`). Unlinkable or out-of-bounds metrics are dropped silently; only
/// their counts are reported.
pub fn join_records(
    companies: &[Company],
    filings: &[Filing],
    metric_records: &[MetricRecord],
    rules: &ValidationRules,
) -> JoinOutput {
    // Later duplicates overwrite earlier ones
    let company_by_cik: HashMap<&str, &Company> =
        companies.iter().map(|c| (c.cik.as_str(), c)).collect();
    let filing_by_id: HashMap<&str, &Filing> = filings.iter().map(|f| (f.id.as_str(), f)).collect();

    let mut output = JoinOutput::default();

    for metric in metric_records {
        let Some(filing) = filing_by_id.get(metric.form_id.as_str()) else {
            output.drops.missing_filing += 1;
            continue;
        };
        let Some(company) = company_by_cik.get(filing.cik.as_str()) else {
            output.drops.missing_company += 1;
            continue;
        };
        let Some((date, date_string)) = round_trip_date(filing.value_date, rules) else {
            output.drops.invalid_date += 1;
            continue;
        };
        if !within_bounds(metric.ccp, rules.max_metric_value)
            || !within_bounds(metric.ltd, rules.max_metric_value)
        {
            output.drops.out_of_bounds += 1;
            continue;
        }

        let year = date.year();
        let quarter = quarter_of_month(date.month());
        output.records.push(CombinedRecord {
            id: filing.id.clone(),
            company: company.company_name.clone(),
            symbol: company.symbol.clone(),
            cik: company.cik.clone(),
            year,
            quarter,
            date,
            date_string,
            quarter_label: quarter_label(year, quarter),
            ccp: metric.ccp,
            ltd: metric.ltd,
            form_name: filing.form_name.clone(),
            form_url: filing.form_url.clone(),
        });
    }

    let drops = output.drops;
    metrics::join::records_combined(output.records.len());
    metrics::join::records_dropped("missing_filing", drops.missing_filing);
    metrics::join::records_dropped("missing_company", drops.missing_company);
    metrics::join::records_dropped("invalid_date", drops.invalid_date);
    metrics::join::records_dropped("out_of_bounds", drops.out_of_bounds);
    debug!(
        metrics = metric_records.len(),
        combined = output.records.len(),
        missing_filing = drops.missing_filing,
        missing_company = drops.missing_company,
        invalid_date = drops.invalid_date,
        out_of_bounds = drops.out_of_bounds,
        "join complete"
    );

    output
}
