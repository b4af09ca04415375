use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use crate::process::aggregate::GlobalDailySummary;

/// Input row for the downstream regression fit: the sole regressor is
/// `date_ordinal`, days since the first date in the series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegressionPoint {
    pub date: NaiveDate,
    pub date_ordinal: i64,
    pub daily_cases_total: i64,
    pub daily_deaths_total: i64,
}

/// Attach ordinals to the global daily series, densified so every calendar
/// date between the min and max is present. A date the summaries skipped is
/// filled with zero totals, consistent with "no region reported" summing to
/// zero. Empty input yields an empty series.
pub fn ordinal_series(summaries: &[GlobalDailySummary]) -> Vec<RegressionPoint> {
    let Some(min_date) = summaries.iter().map(|s| s.date).min() else {
        return Vec::new();
    };
    let Some(max_date) = summaries.iter().map(|s| s.date).max() else {
        return Vec::new();
    };

    let by_date: HashMap<NaiveDate, &GlobalDailySummary> =
        summaries.iter().map(|s| (s.date, s)).collect();

    let mut points = Vec::new();
    let mut date = min_date;
    loop {
        let (daily_cases_total, daily_deaths_total) = match by_date.get(&date) {
            Some(summary) => (summary.daily_cases_total, summary.daily_deaths_total),
            None => (0, 0),
        };
        points.push(RegressionPoint {
            date,
            date_ordinal: (date - min_date).num_days(),
            daily_cases_total,
            daily_deaths_total,
        });

        if date == max_date {
            break;
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    points
}
