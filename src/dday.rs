//! Due-date extraction and D-day arithmetic.
//!
//! A pull request opts into countdown labelling by carrying a `(~M/D)`
//! marker in its title, e.g. `Fix login flow (~12/25)`. The marker names a
//! month and day; the year is inferred so the due date is never in the past.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

static DUE_DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(~(\d{1,2})/(\d{1,2})\)").expect("invalid due-date regex"));

/// Extracts the due date encoded as `(~M/D)` in a PR title.
///
/// The date is first placed in the current year. If midnight of that date is
/// strictly earlier than `now`, the year advances by one, so a `(~1/15)`
/// seen in December resolves to January of next year. A marker naming today
/// is already earlier than any post-midnight `now` and rolls a full year
/// forward as well.
///
/// Month/day pairs that do not name a real calendar date are rejected:
/// `(~13/45)` and `(~2/30)` yield `None`, as does a `(~2/29)` whose rollover
/// lands in a non-leap year. Titles without a marker yield `None`.
pub fn extract_due_date(title: &str, now: NaiveDateTime) -> Option<NaiveDate> {
    let captures = DUE_DATE_PATTERN.captures(title)?;
    let month: u32 = captures[1].parse().ok()?;
    let day: u32 = captures[2].parse().ok()?;

    let due = NaiveDate::from_ymd_opt(now.year(), month, day)?;
    if due.and_time(NaiveTime::MIN) < now {
        return NaiveDate::from_ymd_opt(now.year() + 1, month, day);
    }

    Some(due)
}

/// Whole days between `due` and the date of `now`.
///
/// Both sides are midnight-normalized, so the result is an exact integer:
/// due today is 0, tomorrow is 1, yesterday is -1.
pub fn dday(due: NaiveDate, now: NaiveDateTime) -> i64 {
    (due - now.date()).num_days()
}
