use std::collections::HashSet;

use serde_json::Value;

use crate::common::constants::*;
use crate::config::ValidationRules;
use crate::domain::{Company, Filing, MetricRecord, RawRow};
use crate::pipeline::processing::validate::{
    validate_date, validate_integer, validate_number, validate_required_string, validate_url,
};

const MAX_DIVISOR: f64 = 1e9;

/// Turns raw rows into typed records. A row either yields a complete record
/// or nothing: any failed required field rejects the whole row.
pub struct RecordSanitizer<'a> {
    rules: &'a ValidationRules,
}

fn cell<'r>(row: &'r RawRow, column: &str) -> &'r Value {
    row.get(column).unwrap_or(&Value::Null)
}

fn canonical_id(row: &RawRow, column: &str, max: i64) -> Option<String> {
    validate_integer(cell(row, column), 0, max).map(|id| id.to_string())
}

impl<'a> RecordSanitizer<'a> {
    pub fn new(rules: &'a ValidationRules) -> Self {
        Self { rules }
    }

    pub fn sanitize_company(&self, row: &RawRow) -> Option<Company> {
        let symbol = validate_required_string(cell(row, COL_SYMBOL), self.rules.max_symbol_len)?;
        let company_name =
            validate_required_string(cell(row, COL_COMPANY_NAME), self.rules.max_company_name_len)?;
        let cik = canonical_id(row, COL_CIK, MAX_CIK)?;

        Some(Company {
            symbol,
            company_name,
            cik,
        })
    }

    pub fn sanitize_filing(&self, row: &RawRow) -> Option<Filing> {
        let rules = self.rules;
        let id = canonical_id(row, COL_FILING_ID, MAX_RECORD_ID)?;
        let form_name = validate_required_string(cell(row, COL_FORM_NAME), rules.max_form_name_len)?;
        let cik = canonical_id(row, COL_CIK, MAX_CIK)?;
        let value_date = validate_date(cell(row, COL_VALUE_DATE), rules.min_year, rules.max_year)?;
        let filing_date = validate_date(cell(row, COL_FILING_DATE), rules.min_year, rules.max_year)?;
        let form_url = validate_url(cell(row, COL_FORM_URL), &rules.trusted_domain)?;

        Some(Filing {
            id,
            form_name,
            cik,
            value_date,
            filing_date,
            form_url,
        })
    }

    /// Required: `formId`, `ccp`, `ltd` (both non-negative). Auxiliary
    /// columns are kept when valid and silently dropped when not.
    pub fn sanitize_metric(&self, row: &RawRow) -> Option<MetricRecord> {
        let max = self.rules.max_metric_value;
        let form_id = canonical_id(row, COL_FORM_ID, MAX_RECORD_ID)?;
        let ccp = validate_number(cell(row, COL_CCP), 0.0, f64::MAX)?;
        let ltd = validate_number(cell(row, COL_LTD), 0.0, f64::MAX)?;

        Some(MetricRecord {
            form_id,
            ccp,
            ltd,
            total_assets: validate_number(cell(row, COL_TOTAL_ASSETS), 0.0, max),
            total_liabilities: validate_number(cell(row, COL_TOTAL_LIABILITIES), 0.0, max),
            revenue: validate_number(cell(row, COL_REVENUE), 0.0, max),
            net_income: validate_number(cell(row, COL_NET_INCOME), -max, max),
            divisor: validate_number(cell(row, COL_DIVISOR), f64::MIN_POSITIVE, MAX_DIVISOR)
                .unwrap_or(1.0),
        })
    }
}

/// Keep the first metric seen for each `form_id`. Returns the survivors and
/// the number of duplicates dropped.
pub fn dedupe_metrics(metric_records: Vec<MetricRecord>) -> (Vec<MetricRecord>, usize) {
    let before = metric_records.len();
    let mut seen = HashSet::new();
    let unique: Vec<MetricRecord> = metric_records
        .into_iter()
        .filter(|m| seen.insert(m.form_id.clone()))
        .collect();
    let dropped = before - unique.len();
    (unique, dropped)
}
