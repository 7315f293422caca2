use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::common::error::FilterError;
use crate::config::{FilterLimits, ValidationRules};
use crate::domain::{CombinedRecord, GroupedData, QuarterLabel};
use crate::observability::metrics;
use crate::pipeline::processing::validate::validate_string;

/// A company selection and an inclusive quarter range.
///
/// An empty `companies` list selects every company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterQuery {
    pub companies: Vec<String>,
    pub start_year: i64,
    pub end_year: i64,
    pub start_quarter: i64,
    pub end_quarter: i64,
}

impl FilterQuery {
    /// Whole years: Q1 of `start_year` through Q4 of `end_year`.
    pub fn new(companies: Vec<String>, start_year: i64, end_year: i64) -> Self {
        Self {
            companies,
            start_year,
            end_year,
            start_quarter: 1,
            end_quarter: 4,
        }
    }

    pub fn with_quarters(mut self, start_quarter: i64, end_quarter: i64) -> Self {
        self.start_quarter = start_quarter;
        self.end_quarter = end_quarter;
        self
    }

    /// Build a query from two positions on a quarter axis, as produced by
    /// a range-selection control.
    pub fn from_axis(
        axis: &[QuarterLabel],
        start_index: usize,
        end_index: usize,
        companies: Vec<String>,
    ) -> Result<Self, FilterError> {
        let position = |name: &'static str, index: usize| {
            axis.get(index).ok_or_else(|| FilterError::InvalidParameter {
                name,
                value: format!("{} (axis has {} entries)", index, axis.len()),
            })
        };
        let start = position("start_index", start_index)?;
        let end = position("end_index", end_index)?;

        Ok(Self::new(companies, start.year as i64, end.year as i64)
            .with_quarters(start.quarter as i64, end.quarter as i64))
    }

    fn validate(&self, rules: &ValidationRules, limits: &FilterLimits) -> Result<(), FilterError> {
        let years = rules.min_year as i64..=rules.max_year as i64;
        for (name, value, range) in [
            ("start_year", self.start_year, years.clone()),
            ("end_year", self.end_year, years),
            ("start_quarter", self.start_quarter, 1..=4),
            ("end_quarter", self.end_quarter, 1..=4),
        ] {
            if !range.contains(&value) {
                return Err(FilterError::InvalidParameter {
                    name,
                    value: value.to_string(),
                });
            }
        }
        if self.start_year > self.end_year {
            return Err(FilterError::StartAfterEnd {
                start_year: self.start_year,
                end_year: self.end_year,
            });
        }
        if self.companies.len() > limits.max_companies {
            return Err(FilterError::TooManyCompanies {
                count: self.companies.len(),
                limit: limits.max_companies,
            });
        }
        Ok(())
    }

    /// Quarter bounds apply only in the boundary years.
    fn matches(&self, record: &CombinedRecord) -> bool {
        let year = record.year as i64;
        let quarter = record.quarter as i64;
        if year < self.start_year || year > self.end_year {
            return false;
        }
        if year == self.start_year && quarter < self.start_quarter {
            return false;
        }
        if year == self.end_year && quarter > self.end_quarter {
            return false;
        }
        true
    }

    /// Sanitized, de-duplicated selection in the caller's order.
    fn selected_companies(&self, max_len: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        self.companies
            .iter()
            .filter_map(|name| validate_string(&Value::String(name.clone()), max_len))
            .filter(|name| !name.is_empty())
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }
}

/// Records matching `query`, sorted by date and capped at
/// `limits.max_results`. Parameters are checked before any record is read.
pub fn filter_dataset(
    grouped: &GroupedData,
    query: &FilterQuery,
    rules: &ValidationRules,
    limits: &FilterLimits,
) -> Result<Vec<CombinedRecord>, FilterError> {
    query.validate(rules, limits)?;

    let total: usize = grouped.values().map(Vec::len).sum();
    if total > limits.max_input_records {
        return Err(FilterError::TooManyRecords {
            count: total,
            limit: limits.max_input_records,
        });
    }

    let selected = query.selected_companies(rules.max_company_name_len);
    let groups: Vec<&Vec<CombinedRecord>> = if selected.is_empty() {
        grouped.values().collect()
    } else {
        selected.iter().filter_map(|name| grouped.get(name)).collect()
    };

    let mut results: Vec<CombinedRecord> = groups
        .into_iter()
        .flat_map(|records| records.iter().filter(|r| query.matches(r)).cloned())
        .collect();
    results.sort_by_key(|r| r.date);

    let truncated = results.len() > limits.max_results;
    if truncated {
        debug!(matched = results.len(), limit = limits.max_results, "filter result truncated");
        results.truncate(limits.max_results);
    }
    metrics::filter::query_completed(results.len(), truncated);

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quarter_label;
    use chrono::NaiveDate;

    fn record(id: usize, company: &str, year: i32, quarter: u8) -> CombinedRecord {
        let date = NaiveDate::from_ymd_opt(year, quarter as u32 * 3, 28).unwrap();
        CombinedRecord {
            id: id.to_string(),
            company: company.to_string(),
            symbol: company.to_uppercase(),
            cik: "1".to_string(),
            year,
            quarter,
            date,
            date_string: date.format("%Y-%m-%d").to_string(),
            quarter_label: quarter_label(year, quarter),
            ccp: 1.0,
            ltd: 1.0,
            form_name: "10-Q".to_string(),
            form_url: "https://sec.gov/x".to_string(),
        }
    }

    fn grouped() -> GroupedData {
        let mut grouped = GroupedData::new();
        let mut id = 0;
        for company in ["Apple Inc.", "Microsoft Corp"] {
            let records = grouped.entry(company.to_string()).or_default();
            for year in 2019..=2021 {
                for quarter in 1..=4 {
                    id += 1;
                    records.push(record(id, company, year, quarter));
                }
            }
        }
        grouped
    }

    fn run(query: FilterQuery) -> Result<Vec<CombinedRecord>, FilterError> {
        filter_dataset(&grouped(), &query, &ValidationRules::default(), &FilterLimits::default())
    }

    #[test]
    fn test_empty_selection_matches_all_companies() {
        let all = run(FilterQuery::new(vec![], 2019, 2021)).unwrap();
        let explicit = run(FilterQuery::new(
            vec!["Apple Inc.".to_string(), "Microsoft Corp".to_string()],
            2019,
            2021,
        ))
        .unwrap();

        assert_eq!(all.len(), 24);
        let ids = |records: &[CombinedRecord]| {
            let mut ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
            ids.sort();
            ids
        };
        assert_eq!(ids(&all), ids(&explicit));
    }

    #[test]
    fn test_single_quarter_window() {
        let results = run(FilterQuery::new(vec![], 2020, 2020).with_quarters(4, 4)).unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.year == 2020 && r.quarter == 4));
    }

    #[test]
    fn test_quarter_bounds_only_at_edges() {
        let results = run(
            FilterQuery::new(vec!["Apple Inc.".to_string()], 2019, 2021).with_quarters(3, 2),
        )
        .unwrap();

        let labels: Vec<&str> = results.iter().map(|r| r.quarter_label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Q3 2019", "Q4 2019", "Q1 2020", "Q2 2020", "Q3 2020", "Q4 2020", "Q1 2021", "Q2 2021"]
        );
    }

    #[test]
    fn test_results_sorted_and_capped() {
        let limits = FilterLimits {
            max_results: 5,
            ..FilterLimits::default()
        };
        let results = filter_dataset(
            &grouped(),
            &FilterQuery::new(vec![], 2019, 2021),
            &ValidationRules::default(),
            &limits,
        )
        .unwrap();

        assert_eq!(results.len(), 5);
        assert!(results.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_unknown_and_markup_names() {
        let results = run(FilterQuery::new(
            vec!["<Apple Inc.>".to_string(), "Nobody".to_string(), "   ".to_string()],
            2021,
            2021,
        ))
        .unwrap();
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.company == "Apple Inc."));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert_eq!(
            run(FilterQuery::new(vec![], 2021, 2019)),
            Err(FilterError::StartAfterEnd {
                start_year: 2021,
                end_year: 2019
            })
        );
        assert!(matches!(
            run(FilterQuery::new(vec![], 1899, 2019)),
            Err(FilterError::InvalidParameter { name: "start_year", .. })
        ));
        assert!(matches!(
            run(FilterQuery::new(vec![], 2019, 2020).with_quarters(0, 4)),
            Err(FilterError::InvalidParameter { name: "start_quarter", .. })
        ));
        assert!(matches!(
            run(FilterQuery::new(vec![], 2019, 2020).with_quarters(1, 5)),
            Err(FilterError::InvalidParameter { name: "end_quarter", .. })
        ));

        let too_many: Vec<String> = (0..51).map(|i| format!("Company {}", i)).collect();
        assert_eq!(
            run(FilterQuery::new(too_many, 2019, 2020)),
            Err(FilterError::TooManyCompanies { count: 51, limit: 50 })
        );
    }

    #[test]
    fn test_too_many_input_records() {
        let limits = FilterLimits {
            max_input_records: 10,
            ..FilterLimits::default()
        };
        let result = filter_dataset(
            &grouped(),
            &FilterQuery::new(vec![], 2019, 2021),
            &ValidationRules::default(),
            &limits,
        );
        assert_eq!(result, Err(FilterError::TooManyRecords { count: 24, limit: 10 }));
    }

    #[test]
    fn test_query_from_axis_indices() {
        let axis: Vec<QuarterLabel> = (2019..=2021)
            .flat_map(|y| (1..=4).map(move |q| QuarterLabel::new(y, q)))
            .collect();

        let query = FilterQuery::from_axis(&axis, 3, 4, vec![]).unwrap();
        assert_eq!(query, FilterQuery::new(vec![], 2019, 2020).with_quarters(4, 1));

        assert!(matches!(
            FilterQuery::from_axis(&axis, 0, 12, vec![]),
            Err(FilterError::InvalidParameter { name: "end_index", .. })
        ));
    }
}
