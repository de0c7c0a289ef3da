use chrono::{Datelike, Days, NaiveDate};

use crate::error::NavAnalyticsError;
use crate::NavResult;

/// Day-of-month ceiling for month arithmetic, so every month can hold it.
const MAX_CLAMPED_DAY: u32 = 28;

/// `date` minus `months` calendar months with the day clamped to 28:
/// 2024-03-31 minus one month is 2024-02-28.
pub fn months_before_clamped(date: NaiveDate, months: u32) -> NavResult<NaiveDate> {
    let total = date.year() * 12 + date.month0() as i32 - months as i32;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    let day = date.day().min(MAX_CLAMPED_DAY);
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        NavAnalyticsError::DateError(format!("{date} minus {months} months is out of range"))
    })
}

/// `date` minus `days` calendar days.
pub fn days_before(date: NaiveDate, days: u64) -> NavResult<NaiveDate> {
    date.checked_sub_days(Days::new(days)).ok_or_else(|| {
        NavAnalyticsError::DateError(format!("{date} minus {days} days is out of range"))
    })
}

/// January 1 of the year containing `date`.
pub fn start_of_year(date: NaiveDate) -> NavResult<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), 1, 1)
        .ok_or_else(|| NavAnalyticsError::DateError(format!("no January 1 for {date}")))
}
