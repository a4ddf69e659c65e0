//! Conversion between zip's DOS timestamps and unix seconds.
//!
//! Zip timestamps carry no zone; they are read and written as UTC so that a
//! value survives an extract/create cycle unchanged.

use chrono::{NaiveDate, NaiveDateTime};
use zip::DateTime;

/// `None` when the stored fields do not form a calendar date.
pub(crate) fn to_unix_seconds(dt: &DateTime) -> Option<i64> {
    let naive = NaiveDate::from_ymd_opt(i32::from(dt.year()), u32::from(dt.month()), u32::from(dt.day()))?
        .and_hms_opt(u32::from(dt.hour()), u32::from(dt.minute()), u32::from(dt.second()))?;
    Some(naive.and_utc().timestamp())
}

/// Out-of-range values (before 1980 or after 2107) fall back to 1980-01-01.
pub(crate) fn from_unix_seconds(seconds: i64) -> DateTime {
    chrono::DateTime::from_timestamp(seconds, 0)
        .map(|utc| utc.naive_utc())
        .and_then(|naive: NaiveDateTime| DateTime::try_from(naive).ok())
        .unwrap_or_default()
}
