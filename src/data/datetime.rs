// src/data/datetime.rs

//! Parse the textual month-name timestamps a fatal error log carries
//! (JVM build dates in `vm_info:` lines, crash time in `time:` lines)
//! into chrono [`NaiveDateTime`] instances, and compute whole-day
//! differences between them.
//!
//! [`NaiveDateTime`]: https://docs.rs/chrono/0.4.40/chrono/naive/struct.NaiveDateTime.html

use ::chrono::NaiveDateTime;
use ::si_trace_print::defñ;

/// chrono `strftime` pattern for a JVM build timestamp,
/// e.g. `Jul 11 2019 03:35:33`.
const DTP_BUILD: &str = "%b %d %Y %H:%M:%S";

/// chrono `strftime` pattern for a `time:` line crash timestamp,
/// e.g. `Tue Aug  6 07:06:40 2019`.
const DTP_CRASH: &str = "%a %b %d %H:%M:%S %Y";

/// Milliseconds per whole 24-hour day.
const MILLIS_PER_DAY: i64 = 86_400_000;

/// Collapse runs of blanks to a single blank.
///
/// The JVM pads single-digit days with a second space
/// (`Jul  9 2019 ...`); chrono's `%d` will not tolerate that.
fn collapse_blanks(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prior_blank = false;
    for c in value.chars() {
        if c == ' ' {
            if !prior_blank {
                out.push(c);
            }
            prior_blank = true;
        } else {
            out.push(c);
            prior_blank = false;
        }
    }
    out
}

/// Parse a JVM build timestamp. Accepts 1- or 2-digit days and
/// tolerates double-space padding before single-digit days.
pub fn datetime_from_build_timestamp(value: &str) -> Option<NaiveDateTime> {
    let collapsed: String = collapse_blanks(value.trim());
    let dt = NaiveDateTime::parse_from_str(collapsed.as_str(), DTP_BUILD).ok();
    defñ!("({:?}) {:?}", value, dt);
    dt
}

/// Parse a `time:` line crash timestamp.
pub fn datetime_from_crash_time(value: &str) -> Option<NaiveDateTime> {
    let collapsed: String = collapse_blanks(value.trim());
    let dt = NaiveDateTime::parse_from_str(collapsed.as_str(), DTP_CRASH).ok();
    defñ!("({:?}) {:?}", value, dt);
    dt
}

/// Whole 24-hour periods between two datetimes, truncating.
///
/// A difference of 23 hours 59 minutes is 0 whole days, not 1.
/// Negative when `later` precedes `earlier`.
pub fn days_between(
    earlier: &NaiveDateTime,
    later: &NaiveDateTime,
) -> i64 {
    later.signed_duration_since(*earlier).num_milliseconds() / MILLIS_PER_DAY
}
