use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use crate::process::dates::parse_mdy;
use crate::process::parse::WideTable;
use crate::process::utils::{find_column, parse_count};

/// One long-format observation of a cumulative metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRow {
    /// Sub-region, null for countries reported as a single row. Part of the
    /// join key, so an empty upstream cell stays `None`.
    pub province_state: Option<String>,
    pub country_region: String,
    pub date: NaiveDate,
    /// Cumulative count as reported. Usually non-decreasing per region, but
    /// upstream revisions can lower it.
    pub value: i64,
}

static PROVINCE_HEADERS: &[&str] = &["Province/State", "Province_State"];
static COUNTRY_HEADERS: &[&str] = &["Country/Region", "Country_Region"];

/// Pivot a wide time series (one column per date) into long rows.
///
/// Every header that parses as an `M/D/YY` date is a value column; the
/// province and country columns are carried through unchanged and the
/// remaining columns (Lat/Long) are dropped. Produces exactly
/// `rows * date_columns` output rows.
pub fn melt(source: &str, wide: &WideTable) -> Result<Vec<SeriesRow>> {
    let province_idx = find_column(&wide.headers, PROVINCE_HEADERS)
        .with_context(|| format!("{}: missing province column", source))?;
    let country_idx = find_column(&wide.headers, COUNTRY_HEADERS)
        .with_context(|| format!("{}: missing country column", source))?;

    let date_columns: Vec<(usize, NaiveDate)> = wide
        .headers
        .iter()
        .enumerate()
        .filter_map(|(idx, header)| parse_mdy(header).map(|date| (idx, date)))
        .collect();
    if date_columns.is_empty() {
        bail!("{}: no date columns found", source);
    }

    let mut long = Vec::with_capacity(wide.rows.len() * date_columns.len());
    for (row_idx, row) in wide.rows.iter().enumerate() {
        let province_state = row[province_idx].clone();
        let country_region = match &row[country_idx] {
            Some(country) => country.clone(),
            None => bail!("{}: row {} has no country", source, row_idx),
        };

        for &(col_idx, date) in &date_columns {
            let cell = row[col_idx].as_deref().and_then(parse_count);
            let value = match cell {
                Some(value) => value,
                None => bail!(
                    "{}: row {} has unreadable count in column {}",
                    source,
                    row_idx,
                    wide.headers[col_idx]
                ),
            };
            long.push(SeriesRow {
                province_state: province_state.clone(),
                country_region: country_region.clone(),
                date,
                value,
            });
        }
    }

    Ok(long)
}
