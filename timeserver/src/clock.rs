//! Wall-clock formatting for the station's time sync requests.
//!
//! The station expects `YYYY-MM-DD HH:MM:SS` in local time followed directly
//! by an offset suffix such as `+0`. The suffix is a configured literal; no
//! zone arithmetic is done here.

use chrono::{Local, NaiveDateTime, Utc};

const ISO_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const DEFAULT_OFFSET_SUFFIX: &str = "+0";

/// Formats `datetime` at seconds precision and appends `offset_suffix`.
pub fn format_iso(datetime: NaiveDateTime, offset_suffix: &str) -> String {
    format!("{}{}", datetime.format(ISO_FORMAT), offset_suffix)
}

pub fn iso_now(offset_suffix: &str) -> String {
    format_iso(Local::now().naive_local(), offset_suffix)
}

/// Whole seconds since the Unix epoch, rounded down.
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}
