use crate::process::merge::JoinedRecord;

/// Fill in `daily_cases` / `daily_deaths` as the difference between a
/// region's cumulative value and its value on the previous reported date.
///
/// Explicit sort-then-scan: records are sorted by (country, province, date)
/// and walked with a one-element lookback that resets at every region
/// boundary, so a delta is never taken across two different regions. The
/// first date of each region has no predecessor and stays null, which keeps
/// "no prior report" distinguishable from "no change". Negative deltas
/// (upstream revisions) pass through unclamped.
pub fn derive_daily(mut records: Vec<JoinedRecord>) -> Vec<JoinedRecord> {
    records.sort_by(|a, b| {
        (&a.country_region, &a.province_state, a.date).cmp(&(
            &b.country_region,
            &b.province_state,
            b.date,
        ))
    });

    for i in 0..records.len() {
        let (daily_cases, daily_deaths) = if i > 0 && same_region(&records[i - 1], &records[i]) {
            let prev = &records[i - 1];
            (
                diff(records[i].cases, prev.cases),
                diff(records[i].deaths, prev.deaths),
            )
        } else {
            (None, None)
        };
        records[i].daily_cases = daily_cases;
        records[i].daily_deaths = daily_deaths;
    }
    records
}

fn same_region(a: &JoinedRecord, b: &JoinedRecord) -> bool {
    a.country_region == b.country_region && a.province_state == b.province_state
}

/// Null on either side means there is nothing to difference against.
fn diff(current: Option<i64>, previous: Option<i64>) -> Option<i64> {
    match (current, previous) {
        (Some(current), Some(previous)) => Some(current - previous),
        _ => None,
    }
}
