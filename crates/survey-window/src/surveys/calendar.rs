use chrono::{Datelike, Duration, Months, NaiveDate};

const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d-%m-%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
];

// `%Y` also accepts one to three digits, so `30/10/25` would otherwise read as
// year 30 (or 25). Records never carry dates outside this range.
const RECORD_YEARS: std::ops::RangeInclusive<i32> = 1900..=2999;

/// Whole days from `from` to `to`; negative when `to` precedes `from`.
pub(crate) fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Fixed-length day offset. `None` when the result leaves chrono's range.
pub(crate) fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

/// Calendar-month offset, clamped to the last valid day of the target month
/// (31 Jan minus three months is 31 Oct, 31 May minus three months is 28 Feb).
pub(crate) fn shift_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let span = Months::new(months.unsigned_abs());
    if months >= 0 {
        date.checked_add_months(span)
    } else {
        date.checked_sub_months(span)
    }
}

/// Parse a calendar date in any of the layouts found on survey records.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .find(|date| RECORD_YEARS.contains(&date.year()))
}
