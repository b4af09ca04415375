use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{btree_map::Entry, BTreeMap};
use tracing::debug;

use crate::process::parse::WideTable;
use crate::process::reshape::SeriesRow;
use crate::process::utils::{find_column, parse_count};

/// Population lookup after projection: the upstream bookkeeping columns
/// (UID, FIPS, iso codes, lat/long, combined key) are already gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationRow {
    pub province_state: Option<String>,
    pub country_region: String,
    pub population: Option<i64>,
}

/// One row per (province, country, date) after the outer join of cases and
/// deaths and the left join of population. Daily deltas start out null and
/// are filled in by the derive stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinedRecord {
    pub province_state: Option<String>,
    pub country_region: String,
    pub date: NaiveDate,
    pub cases: Option<i64>,
    pub deaths: Option<i64>,
    pub population: Option<i64>,
    pub daily_cases: Option<i64>,
    pub daily_deaths: Option<i64>,
}

/// Sorts as (country, province, date), which is also the output ordering.
type SeriesKey = (String, Option<String>, NaiveDate);

static LOOKUP_PROVINCE_HEADERS: &[&str] = &["Province_State", "Province/State"];
static LOOKUP_COUNTRY_HEADERS: &[&str] = &["Country_Region", "Country/Region"];
static LOOKUP_POPULATION_HEADERS: &[&str] = &["Population"];

/// Project the raw lookup table down to (province, country, population).
/// A row with an empty population cell is kept with `None` so the region
/// still joins (to null), matching how absent regions behave.
pub fn project_population(source: &str, wide: &WideTable) -> Result<Vec<PopulationRow>> {
    let province_idx = find_column(&wide.headers, LOOKUP_PROVINCE_HEADERS)
        .with_context(|| format!("{}: missing province column", source))?;
    let country_idx = find_column(&wide.headers, LOOKUP_COUNTRY_HEADERS)
        .with_context(|| format!("{}: missing country column", source))?;
    let population_idx = find_column(&wide.headers, LOOKUP_POPULATION_HEADERS)
        .with_context(|| format!("{}: missing population column", source))?;

    let mut rows = Vec::with_capacity(wide.rows.len());
    for (row_idx, row) in wide.rows.iter().enumerate() {
        let country_region = match &row[country_idx] {
            Some(country) => country.clone(),
            None => bail!("{}: row {} has no country", source, row_idx),
        };
        rows.push(PopulationRow {
            province_state: row[province_idx].clone(),
            country_region,
            population: row[population_idx].as_deref().and_then(parse_count),
        });
    }
    Ok(rows)
}

/// Index one long time series by (country, province, date), rejecting
/// duplicate keys outright rather than silently summing or dropping them.
fn index_series(source: &str, rows: Vec<SeriesRow>) -> Result<BTreeMap<SeriesKey, i64>> {
    let mut map = BTreeMap::new();
    for row in rows {
        let key: SeriesKey = (row.country_region, row.province_state, row.date);
        if map.insert(key.clone(), row.value).is_some() {
            bail!(
                "duplicate key in {}: country={} province={:?} date={}",
                source,
                key.0,
                key.1,
                key.2
            );
        }
    }
    Ok(map)
}

/// Join the three sources into one table.
///
/// Cases and deaths are outer-joined on (country, province, date): a key
/// present in only one source survives with the other metric null. The
/// population lookup is then left-joined on (country, province) alone, so
/// every date row of a region carries the same population, and regions the
/// lookup does not know get null. When the lookup repeats a region key
/// (sub-region fragments do this upstream), the maximum population wins.
///
/// Output is sorted by (country, province, date) ascending.
pub fn merge(
    cases: Vec<SeriesRow>,
    deaths: Vec<SeriesRow>,
    population: Vec<PopulationRow>,
) -> Result<Vec<JoinedRecord>> {
    let case_map = index_series("cases", cases)?;
    let death_map = index_series("deaths", deaths)?;

    let mut population_map: BTreeMap<(String, Option<String>), i64> = BTreeMap::new();
    for row in population {
        let Some(value) = row.population else { continue };
        match population_map.entry((row.country_region, row.province_state)) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => {
                debug!(
                    country = %slot.key().0,
                    province = ?slot.key().1,
                    "duplicate population key, keeping max"
                );
                if value > *slot.get() {
                    slot.insert(value);
                }
            }
        }
    }

    let mut merged: BTreeMap<SeriesKey, (Option<i64>, Option<i64>)> = BTreeMap::new();
    for (key, value) in case_map {
        merged.entry(key).or_insert((None, None)).0 = Some(value);
    }
    for (key, value) in death_map {
        merged.entry(key).or_insert((None, None)).1 = Some(value);
    }

    let mut joined = Vec::with_capacity(merged.len());
    for ((country_region, province_state, date), (cases, deaths)) in merged {
        let population = population_map
            .get(&(country_region.clone(), province_state.clone()))
            .copied();
        joined.push(JoinedRecord {
            province_state,
            country_region,
            date,
            cases,
            deaths,
            population,
            daily_cases: None,
            daily_deaths: None,
        });
    }
    Ok(joined)
}
