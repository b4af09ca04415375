use chrono::NaiveDate;

/// Parse an `M/D/YY` date column header (e.g. `"1/22/20"`) into a date.
/// Non-date headers (identifying columns) return `None`.
pub fn parse_mdy(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%m/%d/%y").ok()
}
