use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::process::merge::JoinedRecord;

/// Leaderboard length; fewer rows come back when fewer countries exist.
pub const LEADERBOARD_SIZE: usize = 20;

/// Global totals for one date, summed across all regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalDailySummary {
    pub date: NaiveDate,
    pub daily_cases_total: i64,
    pub daily_deaths_total: i64,
    pub cumulative_deaths_total: i64,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountrySummary {
    pub country_region: String,
    pub total_cases: i64,
    pub total_deaths: i64,
    pub population: Option<i64>,
}

/// Sum daily cases, daily deaths and cumulative deaths across all regions
/// per date, ascending. Null contributions count as zero here and only
/// here: a region with no report that day contributes nothing, and a date
/// where every region is null totals 0, not null.
pub fn global_daily(records: &[JoinedRecord]) -> Vec<GlobalDailySummary> {
    let mut by_date: BTreeMap<NaiveDate, (i64, i64, i64)> = BTreeMap::new();
    for record in records {
        let totals = by_date.entry(record.date).or_default();
        totals.0 += record.daily_cases.unwrap_or(0);
        totals.1 += record.daily_deaths.unwrap_or(0);
        totals.2 += record.deaths.unwrap_or(0);
    }

    by_date
        .into_iter()
        .map(
            |(date, (daily_cases_total, daily_deaths_total, cumulative_deaths_total))| {
                GlobalDailySummary {
                    date,
                    daily_cases_total,
                    daily_deaths_total,
                    cumulative_deaths_total,
                }
            },
        )
        .collect()
}

#[derive(Default)]
struct RegionLatest {
    cases: Option<(NaiveDate, i64)>,
    deaths: Option<(NaiveDate, i64)>,
    population: Option<i64>,
}

/// Top-N countries by cumulative cases.
///
/// A cumulative metric must not be summed across dates (that would multiply
/// each region's total by its number of reporting days), so each region
/// contributes its value at the latest date carrying a non-null report, and
/// those latest values are summed across the country's regions. Population
/// is the max observed per country. Stable sort by cases descending, so
/// ties keep the order countries first appear in the input.
pub fn country_leaderboard(records: &[JoinedRecord]) -> Vec<CountrySummary> {
    let mut order: Vec<String> = Vec::new();
    let mut country_index: HashMap<String, usize> = HashMap::new();
    let mut regions: BTreeMap<(String, Option<String>), RegionLatest> = BTreeMap::new();

    for record in records {
        if !country_index.contains_key(&record.country_region) {
            country_index.insert(record.country_region.clone(), order.len());
            order.push(record.country_region.clone());
        }

        let region = regions
            .entry((
                record.country_region.clone(),
                record.province_state.clone(),
            ))
            .or_default();
        if let Some(cases) = record.cases {
            if region.cases.map_or(true, |(date, _)| record.date >= date) {
                region.cases = Some((record.date, cases));
            }
        }
        if let Some(deaths) = record.deaths {
            if region.deaths.map_or(true, |(date, _)| record.date >= date) {
                region.deaths = Some((record.date, deaths));
            }
        }
        if let Some(population) = record.population {
            region.population = Some(region.population.map_or(population, |p| p.max(population)));
        }
    }

    let mut summaries: Vec<CountrySummary> = order
        .into_iter()
        .map(|country_region| CountrySummary {
            country_region,
            total_cases: 0,
            total_deaths: 0,
            population: None,
        })
        .collect();

    for ((country, _), region) in &regions {
        let summary = &mut summaries[country_index[country]];
        if let Some((_, cases)) = region.cases {
            summary.total_cases += cases;
        }
        if let Some((_, deaths)) = region.deaths {
            summary.total_deaths += deaths;
        }
        if let Some(population) = region.population {
            summary.population = Some(summary.population.map_or(population, |p| p.max(population)));
        }
    }

    summaries.sort_by(|a, b| b.total_cases.cmp(&a.total_cases));
    summaries.truncate(LEADERBOARD_SIZE);
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, day).unwrap()
    }

    fn record(
        country: &str,
        province: Option<&str>,
        day: u32,
        cases: Option<i64>,
        daily_cases: Option<i64>,
    ) -> JoinedRecord {
        JoinedRecord {
            province_state: province.map(str::to_string),
            country_region: country.to_string(),
            date: date(day),
            cases,
            deaths: None,
            population: None,
            daily_cases,
            daily_deaths: None,
        }
    }

    #[test]
    fn daily_totals_treat_null_as_zero() {
        let records = vec![
            record("Alpha", None, 2, Some(150), Some(50)),
            record("Beta", None, 2, Some(8), Some(3)),
            record("Gamma", None, 2, Some(1), None),
        ];
        let daily = global_daily(&records);
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].daily_cases_total, 53);
    }

    #[test]
    fn all_null_date_totals_zero_not_null() {
        let records = vec![
            record("Alpha", None, 1, Some(100), None),
            record("Beta", None, 1, Some(5), None),
        ];
        let daily = global_daily(&records);
        assert_eq!(daily[0].daily_cases_total, 0);
        assert_eq!(daily[0].daily_deaths_total, 0);
    }

    #[test]
    fn daily_output_is_sorted_by_date() {
        let records = vec![
            record("Alpha", None, 3, None, Some(1)),
            record("Alpha", None, 1, None, Some(2)),
            record("Alpha", None, 2, None, Some(3)),
        ];
        let daily = global_daily(&records);
        let dates: Vec<NaiveDate> = daily.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(1), date(2), date(3)]);
    }

    #[test]
    fn cumulative_deaths_total_sums_the_cumulative_column() {
        let mut a = record("Alpha", None, 1, None, None);
        a.deaths = Some(7);
        let mut b = record("Beta", None, 1, None, None);
        b.deaths = Some(3);
        let daily = global_daily(&[a, b]);
        assert_eq!(daily[0].cumulative_deaths_total, 10);
    }

    #[test]
    fn leaderboard_takes_latest_value_not_the_sum_over_dates() {
        // A region reporting [100, 150, 130] contributes 130, not 380.
        let records = vec![
            record("Alpha", None, 1, Some(100), None),
            record("Alpha", None, 2, Some(150), None),
            record("Alpha", None, 3, Some(130), None),
        ];
        let board = country_leaderboard(&records);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].total_cases, 130);
    }

    #[test]
    fn leaderboard_sums_latest_values_across_subregions() {
        let records = vec![
            record("Alpha", Some("North"), 1, Some(10), None),
            record("Alpha", Some("North"), 2, Some(20), None),
            record("Alpha", Some("South"), 1, Some(5), None),
            record("Alpha", Some("South"), 2, Some(7), None),
        ];
        let board = country_leaderboard(&records);
        assert_eq!(board[0].total_cases, 27);
    }

    #[test]
    fn leaderboard_sorts_descending_with_stable_ties() {
        let records = vec![
            record("Small", None, 1, Some(10), None),
            record("TiedFirst", None, 1, Some(50), None),
            record("TiedSecond", None, 1, Some(50), None),
            record("Big", None, 1, Some(90), None),
        ];
        let board = country_leaderboard(&records);
        let names: Vec<&str> = board.iter().map(|c| c.country_region.as_str()).collect();
        assert_eq!(names, vec!["Big", "TiedFirst", "TiedSecond", "Small"]);
    }

    #[test]
    fn leaderboard_is_capped_at_twenty() {
        let mut records = Vec::new();
        for i in 0..25 {
            records.push(record(&format!("C{:02}", i), None, 1, Some(100 - i), None));
        }
        let board = country_leaderboard(&records);
        assert_eq!(board.len(), LEADERBOARD_SIZE);
        assert_eq!(board[0].country_region, "C00");
    }

    #[test]
    fn population_is_the_max_across_subregion_rows() {
        let mut north = record("Alpha", Some("North"), 1, Some(1), None);
        north.population = Some(300);
        let mut south = record("Alpha", Some("South"), 1, Some(1), None);
        south.population = Some(700);
        let board = country_leaderboard(&[north, south]);
        assert_eq!(board[0].population, Some(700));
    }

    #[test]
    fn latest_non_null_wins_even_when_a_later_date_is_null() {
        let records = vec![
            record("Alpha", None, 1, Some(100), None),
            record("Alpha", None, 2, None, None),
        ];
        let board = country_leaderboard(&records);
        assert_eq!(board[0].total_cases, 100);
    }
}
