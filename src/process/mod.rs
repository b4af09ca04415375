pub mod aggregate;
pub mod dates;
pub mod derive;
pub mod merge;
pub mod parse;
pub mod regression;
pub mod reshape;
pub mod utils;

use anyhow::Result;
use tracing::info;

use self::aggregate::{CountrySummary, GlobalDailySummary};
use self::merge::JoinedRecord;
use self::regression::RegressionPoint;

/// Everything downstream consumers bind to, produced in one pass.
pub struct PipelineOutput {
    pub joined: Vec<JoinedRecord>,
    pub global_daily: Vec<GlobalDailySummary>,
    pub leaderboard: Vec<CountrySummary>,
    pub regression: Vec<RegressionPoint>,
}

/// Run the full transformation over the three raw CSV downloads:
/// parse → reshape → merge → derive → aggregate. Each stage is a pure
/// function producing a fresh table; nothing is mutated across stages.
pub fn run_pipeline(
    cases_csv: &[u8],
    deaths_csv: &[u8],
    lookup_csv: &[u8],
) -> Result<PipelineOutput> {
    let cases_wide = parse::parse_csv("cases", cases_csv)?;
    let deaths_wide = parse::parse_csv("deaths", deaths_csv)?;
    let lookup_wide = parse::parse_csv("population lookup", lookup_csv)?;
    info!(
        cases_rows = cases_wide.num_rows(),
        deaths_rows = deaths_wide.num_rows(),
        lookup_rows = lookup_wide.num_rows(),
        "parsed sources"
    );

    let cases = reshape::melt("cases", &cases_wide)?;
    let deaths = reshape::melt("deaths", &deaths_wide)?;
    let population = merge::project_population("population lookup", &lookup_wide)?;
    info!(
        cases = cases.len(),
        deaths = deaths.len(),
        regions = population.len(),
        "reshaped to long format"
    );

    let joined = merge::merge(cases, deaths, population)?;
    let joined = derive::derive_daily(joined);
    info!(joined = joined.len(), "merged and derived daily deltas");

    let global_daily = aggregate::global_daily(&joined);
    let leaderboard = aggregate::country_leaderboard(&joined);
    let regression = regression::ordinal_series(&global_daily);

    Ok(PipelineOutput {
        joined,
        global_daily,
        leaderboard,
        regression,
    })
}
