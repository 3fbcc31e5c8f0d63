//! Timestamp and reporting-period parsing
//!
//! Upstream systems supply timestamps in several shapes. [`parse_timestamp`]
//! tries a fixed list of formats in order and the first successful parse
//! wins; callers treat `None` as "field unparsable".

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Parse a timestamp, attempting in order:
///
/// 1. ISO-8601 with a `Z` suffix (optionally fractional seconds)
/// 2. ISO-8601 with fractional seconds and a numeric offset
/// 3. ISO-8601 without an offset
/// 4. Date-only ISO (`YYYY-MM-DD`)
/// 5. `day/month/year`
/// 6. Bare 6-digit year-month (day defaults to 1)
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.fZ") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(fixed) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(fixed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%d/%m/%Y") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    if text.len() == 6 && text.bytes().all(|b| b.is_ascii_digit()) {
        let year: i32 = text[..4].parse().ok()?;
        let month: u32 = text[4..].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, 1)?;
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }

    None
}

/// Parse any accepted timestamp shape down to a calendar date.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    parse_timestamp(text).map(|ts| ts.date_naive())
}

/// Normalize a reporting period to 6 digits. Four-digit periods are `yymm`
/// and gain the 2000 century prefix; six-digit periods pass through.
pub fn normalize_period(period: &str) -> String {
    if period.len() == 4 {
        format!("20{}", period)
    } else {
        period.to_string()
    }
}

/// First day of the month named by a 4- or 6-digit reporting period.
pub fn period_start(period: &str) -> Option<NaiveDate> {
    let period = normalize_period(period);
    if period.len() != 6 || !period.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = period[..4].parse().ok()?;
    let month: u32 = period[4..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Last day of the month named by a 4- or 6-digit reporting period.
pub fn period_end(period: &str) -> Option<NaiveDate> {
    let start = period_start(period)?;
    let next = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)?
    };
    next.pred_opt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_with_z_suffix() {
        let ts = parse_timestamp("2016-03-12T10:39:40Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2016-03-12T10:39:40+00:00");
    }

    #[test]
    fn parses_iso_fractional_with_offset() {
        let ts = parse_timestamp("2016-03-12T10:39:40.543+01:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2016-03-12T09:39:40.543+00:00");
    }

    #[test]
    fn parses_iso_without_offset() {
        let ts = parse_timestamp("2016-03-12T10:39:40").unwrap();
        assert_eq!(ts.date_naive(), NaiveDate::from_ymd_opt(2016, 3, 12).unwrap());
    }

    #[test]
    fn parses_date_only() {
        let ts = parse_timestamp("2016-03-12").unwrap();
        assert_eq!(ts.date_naive(), NaiveDate::from_ymd_opt(2016, 3, 12).unwrap());
    }

    #[test]
    fn parses_day_month_year() {
        let d = parse_date("12/09/2016").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2016, 9, 12).unwrap());
    }

    #[test]
    fn parses_bare_year_month_with_day_one() {
        let d = parse_date("200911").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2009, 11, 1).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("2016-13-40").is_none());
        assert!(parse_timestamp("209913").is_none()); // month 13
    }

    #[test]
    fn normalizes_four_digit_periods() {
        assert_eq!(normalize_period("1912"), "201912");
        assert_eq!(normalize_period("200911"), "200911");
    }

    #[test]
    fn period_bounds() {
        assert_eq!(
            period_start("200911").unwrap(),
            NaiveDate::from_ymd_opt(2009, 11, 1).unwrap()
        );
        assert_eq!(
            period_end("200911").unwrap(),
            NaiveDate::from_ymd_opt(2009, 11, 30).unwrap()
        );
        assert_eq!(
            period_end("1912").unwrap(),
            NaiveDate::from_ymd_opt(2019, 12, 31).unwrap()
        );
        assert!(period_start("20091").is_none());
    }
}
