use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Deserializer};

/// Parse a stored date as a local calendar date.
///
/// Only the year-month-day components are used so a value such as
/// `2024-01-01T00:00:00Z` never shifts a day when the host is east or west of UTC.
/// Blank or unparsable input yields `None`.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(stamp.date_naive());
    }

    trimmed
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Strict variant used for CLI flags and query parameters.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Today's date in the host's local calendar.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_calendar_date))
}

pub(crate) fn lenient_date_list<'de, D>(deserializer: D) -> Result<Vec<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Option<String>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(|value| parse_calendar_date(&value))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn parses_plain_and_timestamped_dates_by_calendar_components() {
        assert_eq!(parse_calendar_date("2024-03-09"), Some(ymd(2024, 3, 9)));
        assert_eq!(
            parse_calendar_date("2024-03-09T23:30:00-05:00"),
            Some(ymd(2024, 3, 9))
        );
        assert_eq!(
            parse_calendar_date("2024-03-09T00:00:00.000Z"),
            Some(ymd(2024, 3, 9))
        );
    }

    #[test]
    fn blank_and_garbage_dates_are_absent() {
        assert_eq!(parse_calendar_date(""), None);
        assert_eq!(parse_calendar_date("   "), None);
        assert_eq!(parse_calendar_date("not-a-date"), None);
        assert_eq!(parse_calendar_date("2024-13-40"), None);
    }

    #[test]
    fn strict_parser_reports_the_offending_value() {
        let err = parse_date("09/03/2024").unwrap_err();
        assert!(err.contains("09/03/2024"));
    }
}
