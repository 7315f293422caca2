use std::collections::BTreeSet;

use crate::common::error::ProcessingError;
use crate::domain::{CombinedRecord, Dataset, DateRange, GroupedData, ProcessingStats};

/// Sort records by date (stable, so equal dates keep encounter order),
/// group them by company and compute the company and year sets.
///
/// Fails only when nothing usable is left.
pub fn aggregate(
    mut records: Vec<CombinedRecord>,
    stats: ProcessingStats,
) -> Result<Dataset, ProcessingError> {
    records.sort_by_key(|r| r.date);

    let mut grouped = GroupedData::new();
    for record in &records {
        grouped
            .entry(record.company.clone())
            .or_default()
            .push(record.clone());
    }

    let companies: Vec<String> = grouped.keys().cloned().collect();
    if companies.is_empty() {
        return Err(ProcessingError::NoCompanies {
            records: records.len(),
        });
    }

    let years: Vec<i32> = records
        .iter()
        .map(|r| r.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let (Some(&min), Some(&max)) = (years.first(), years.last()) else {
        return Err(ProcessingError::NoYears {
            records: records.len(),
        });
    };

    Ok(Dataset {
        combined_data: records,
        grouped_data: grouped,
        companies,
        years,
        date_range: DateRange { min, max },
        stats,
    })
}
