use crate::common::error::RangeError;
use crate::config::{AxisLimits, ValidationRules};
use crate::domain::{Dataset, QuarterLabel};

fn check_year(year: i64, rules: &ValidationRules) -> Result<i32, RangeError> {
    if year < rules.min_year as i64 || year > rules.max_year as i64 {
        return Err(RangeError::InvalidYear {
            year,
            min: rules.min_year,
            max: rules.max_year,
        });
    }
    Ok(year as i32)
}

/// Every quarter from `min_year` Q1 through `max_year` Q4, in order.
pub fn build_quarter_axis(
    min_year: i64,
    max_year: i64,
    rules: &ValidationRules,
    limits: &AxisLimits,
) -> Result<Vec<QuarterLabel>, RangeError> {
    let first = check_year(min_year, rules)?;
    let last = check_year(max_year, rules)?;
    if first > last {
        return Err(RangeError::MinAfterMax { min_year, max_year });
    }
    let span = max_year - min_year;
    if span > limits.max_span_years {
        return Err(RangeError::SpanTooLarge {
            span,
            limit: limits.max_span_years,
        });
    }

    Ok((first..=last)
        .flat_map(|year| (1..=4u8).map(move |quarter| QuarterLabel::new(year, quarter)))
        .collect())
}

impl Dataset {
    /// The quarter axis covering this dataset's year range.
    pub fn quarter_axis(
        &self,
        rules: &ValidationRules,
        limits: &AxisLimits,
    ) -> Result<Vec<QuarterLabel>, RangeError> {
        build_quarter_axis(
            self.date_range.min as i64,
            self.date_range.max as i64,
            rules,
            limits,
        )
    }
}
