//! Long-form date rendering ("June 29th 2018")

use chrono::{Datelike, NaiveDate, TimeZone, Timelike};
use std::fmt::Display;

/// English ordinal suffix for a day of month
///
/// # Examples
/// ```
/// use carbstat_terminal::dates::ordinal_suffix;
///
/// assert_eq!(ordinal_suffix(1), "st");
/// assert_eq!(ordinal_suffix(12), "th");
/// assert_eq!(ordinal_suffix(22), "nd");
/// ```
pub fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Format a day as `June 29th 2018`
pub fn long_date(date: &NaiveDate) -> String {
    format!(
        "{} {}{} {}",
        date.format("%B"),
        date.day(),
        ordinal_suffix(date.day()),
        date.year()
    )
}

/// Format a timestamp as `Friday, June 29th 2018, 8:12:40 am`
pub fn long_datetime<Tz>(dt: &chrono::DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let hour12 = match dt.hour() % 12 {
        0 => 12,
        h => h,
    };
    let meridiem = if dt.hour() < 12 { "am" } else { "pm" };
    format!(
        "{}, {}, {}:{:02}:{:02} {}",
        dt.format("%A"),
        long_date(&dt.date_naive()),
        hour12,
        dt.minute(),
        dt.second(),
        meridiem
    )
}
