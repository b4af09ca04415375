// src/fetch/urls.rs
//
// Johns Hopkins CSSE COVID-19 repository, raw CSV endpoints. No auth.

/// Confirmed cumulative cases, wide format: one column per date.
pub static CASES_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_confirmed_global.csv";

/// Cumulative deaths, same shape as the cases series.
pub static DEATHS_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_deaths_global.csv";

/// Population / geography lookup, keyed by province + country.
pub static LOOKUP_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/UID_ISO_FIPS_LookUp_Table.csv";
