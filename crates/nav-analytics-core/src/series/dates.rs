use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Serial 1 in the 1900 date system is 1900-01-01.
const SERIAL_ANCHOR: (i32, u32, u32) = (1899, 12, 31);

/// First serial after the phantom 1900-02-29 (serial 60).
const PHANTOM_LEAP_DAY_CUTOFF: i64 = 61;

/// 9999-12-31, the last date a spreadsheet can hold.
const MAX_SERIAL: f64 = 2_958_465.0;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

const DATE_FORMATS: [&str; 6] = [
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d.%m.%Y",
];

/// Convert a spreadsheet serial day number (1900 date system) to a date.
///
/// The time-of-day fraction is discarded. Serials on or after 61 are shifted
/// back one day because the 1900 system counts a 1900-02-29 that never existed.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..MAX_SERIAL + 1.0).contains(&serial) {
        return None;
    }
    let whole = serial.floor() as i64;
    let days = if whole >= PHANTOM_LEAP_DAY_CUTOFF {
        whole - 1
    } else {
        whole
    };
    let (y, m, d) = SERIAL_ANCHOR;
    NaiveDate::from_ymd_opt(y, m, d)?.checked_add_days(Days::new(days as u64))
}

/// Resolve a loosely typed date field: numbers are spreadsheet serials,
/// strings go through [`parse_date_str`]. Anything else is unparseable.
pub fn parse_date_value(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Number(n) => n.as_f64().and_then(excel_serial_to_date),
        Value::String(s) => parse_date_str(s),
        _ => None,
    }
}

/// Parse a date string, trying in order: ISO `YYYY-MM-DD` (or `/`),
/// day-first `DD-MM-YYYY` (or `/`, 2-digit years pivot at 51), compact
/// `YYYYMMDD`, a bare `YYYY` (January 1 of that year), a spreadsheet serial
/// written as digits, then a handful of common timestamp and month-name
/// layouts.
///
/// Serial strings of four integer digits are read as years, so serials
/// 1000..=9999 (1902-09-26 to 1927-05-17) only parse from JSON numbers.
pub fn parse_date_str(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(parts) = split_numeric_date(s) {
        return match parts {
            [y, m, d] if y.len() == 4 && is_day_or_month(m) && is_day_or_month(d) => {
                ymd(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
            }
            [d, m, y] if is_day_or_month(d) && is_day_or_month(m) => {
                let year = expand_year(y)?;
                ymd(year, m.parse().ok()?, d.parse().ok()?)
            }
            _ => None,
        };
    }

    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        return ymd(s[..4].parse().ok()?, s[4..6].parse().ok()?, s[6..].parse().ok()?);
    }

    // A bare four-digit string is a year, not serial 1000..9999
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        return ymd(s.parse().ok()?, 1, 1);
    }

    if s.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        if let Ok(serial) = s.parse::<f64>() {
            return excel_serial_to_date(serial);
        }
    }

    parse_generic(s)
}

fn split_numeric_date(s: &str) -> Option<[&str; 3]> {
    let mut parts = s.split(['-', '/']);
    let first = parts.next()?;
    let second = parts.next()?;
    let third = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let all_digits = [first, second, third]
        .iter()
        .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
    all_digits.then_some([first, second, third])
}

fn is_day_or_month(part: &str) -> bool {
    (1..=2).contains(&part.len())
}

/// Two-digit years below 51 land in the 2000s, the rest in the 1900s.
fn expand_year(part: &str) -> Option<i32> {
    let year: i32 = part.parse().ok()?;
    match part.len() {
        2 if year < 51 => Some(2000 + year),
        2 => Some(1900 + year),
        4 => Some(year),
        _ => None,
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_generic(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok().map(|dt| dt.date()))
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_excel_serial_modern_date() {
        assert_eq!(excel_serial_to_date(44927.0), Some(d(2023, 1, 1)));
        assert_eq!(excel_serial_to_date(45292.0), Some(d(2024, 1, 1)));
    }

    #[test]
    fn test_excel_serial_discards_time_of_day() {
        assert_eq!(excel_serial_to_date(44927.75), Some(d(2023, 1, 1)));
    }

    #[test]
    fn test_excel_serial_before_phantom_leap_day() {
        assert_eq!(excel_serial_to_date(1.0), Some(d(1900, 1, 1)));
        assert_eq!(excel_serial_to_date(59.0), Some(d(1900, 2, 28)));
        assert_eq!(excel_serial_to_date(60.0), Some(d(1900, 3, 1)));
        assert_eq!(excel_serial_to_date(61.0), Some(d(1900, 3, 1)));
    }

    #[test]
    fn test_excel_serial_out_of_range() {
        assert_eq!(excel_serial_to_date(0.0), None);
        assert_eq!(excel_serial_to_date(-5.0), None);
        assert_eq!(excel_serial_to_date(f64::NAN), None);
        assert_eq!(excel_serial_to_date(1e12), None);
    }

    #[test]
    fn test_iso_dates() {
        assert_eq!(parse_date_str("2020-02-29"), Some(d(2020, 2, 29)));
        assert_eq!(parse_date_str("2020/2/9"), Some(d(2020, 2, 9)));
        assert_eq!(parse_date_str("  2021-12-31 "), Some(d(2021, 12, 31)));
    }

    #[test]
    fn test_day_first_dates() {
        assert_eq!(parse_date_str("01-02-2023"), Some(d(2023, 2, 1)));
        assert_eq!(parse_date_str("1/2/2023"), Some(d(2023, 2, 1)));
        assert_eq!(parse_date_str("15-08-2019"), Some(d(2019, 8, 15)));
    }

    #[test]
    fn test_two_digit_year_pivot() {
        assert_eq!(parse_date_str("05-06-50"), Some(d(2050, 6, 5)));
        assert_eq!(parse_date_str("05-06-51"), Some(d(1951, 6, 5)));
        assert_eq!(parse_date_str("05-06-99"), Some(d(1999, 6, 5)));
    }

    #[test]
    fn test_impossible_calendar_dates_rejected() {
        assert_eq!(parse_date_str("31-02-2023"), None);
        assert_eq!(parse_date_str("2023-13-01"), None);
        assert_eq!(parse_date_str("2023-02-29"), None);
    }

    #[test]
    fn test_generic_fallbacks() {
        assert_eq!(parse_date_str("2023-04-05T10:30:00Z"), Some(d(2023, 4, 5)));
        assert_eq!(parse_date_str("2023-04-05T10:30:00"), Some(d(2023, 4, 5)));
        assert_eq!(parse_date_str("2023-04-05 10:30:00"), Some(d(2023, 4, 5)));
        assert_eq!(parse_date_str("05-Apr-2023"), Some(d(2023, 4, 5)));
        assert_eq!(parse_date_str("Apr 5, 2023"), Some(d(2023, 4, 5)));
        assert_eq!(parse_date_str("April 5, 2023"), Some(d(2023, 4, 5)));
        assert_eq!(parse_date_str("20230405"), Some(d(2023, 4, 5)));
        assert_eq!(parse_date_str("05.04.2023"), Some(d(2023, 4, 5)));
    }

    #[test]
    fn test_numeric_string_is_serial() {
        assert_eq!(parse_date_str("44927"), Some(d(2023, 1, 1)));
        assert_eq!(parse_date_str("44927.5"), Some(d(2023, 1, 1)));
        assert_eq!(parse_date_str("366"), Some(d(1900, 12, 31)));
    }

    #[test]
    fn test_bare_year_is_january_first() {
        assert_eq!(parse_date_str("2023"), Some(d(2023, 1, 1)));
        assert_eq!(parse_date_str(" 1999 "), Some(d(1999, 1, 1)));
        assert_eq!(parse_date_value(&json!("2023")), Some(d(2023, 1, 1)));
        // JSON numbers stay serials
        assert_eq!(parse_date_value(&json!(2023)), Some(d(1905, 7, 15)));
    }

    #[test]
    fn test_garbage_rejected() {
        assert_eq!(parse_date_str(""), None);
        assert_eq!(parse_date_str("not a date"), None);
        assert_eq!(parse_date_str("2023-01"), None);
    }

    #[test]
    fn test_parse_date_value_kinds() {
        assert_eq!(parse_date_value(&json!(44927)), Some(d(2023, 1, 1)));
        assert_eq!(parse_date_value(&json!("2023-01-01")), Some(d(2023, 1, 1)));
        assert_eq!(parse_date_value(&json!(null)), None);
        assert_eq!(parse_date_value(&json!(true)), None);
    }
}
