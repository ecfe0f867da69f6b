use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime};

use crate::error::{AppError, AppResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Longest range a history request may span, in days.
pub const MAX_RANGE_DAYS: i64 = 366;

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|err| AppError::validation(format!("fecha inválida '{value}': {err}")))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Truncates a backend timestamp to its calendar day.
///
/// Accepts RFC 3339 (converted to local time before truncation), naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]`, `YYYY-MM-DD HH:MM:SS` and plain dates.
pub fn parse_calendar_day(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Local).date_naive());
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return Some(parsed.date());
        }
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).ok()
}

/// Calendar-day difference `to - from`, both truncated to midnight.
pub fn calendar_days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Days a task has been open relative to `reference`. Unparseable or
/// future creation dates count as zero.
pub fn carry_over_days(created: Option<&str>, reference: NaiveDate) -> u32 {
    created
        .and_then(parse_calendar_day)
        .map(|day| calendar_days_between(day, reference).max(0))
        .map(|days| u32::try_from(days).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Current week from Monday to `reference`, inclusive.
pub fn week_to_date(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    (monday_of(reference), reference)
}

pub fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

pub fn previous_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

pub fn days_ago(reference: NaiveDate, days: i64) -> NaiveDate {
    reference - Duration::days(days)
}

/// Every date from `start` to `end`, inclusive.
pub fn dates_in_range(start: NaiveDate, end: NaiveDate) -> AppResult<Vec<NaiveDate>> {
    if end < start {
        return Err(AppError::validation(format!(
            "rango inválido: {} es posterior a {}",
            format_date(start),
            format_date(end)
        )));
    }

    let span = calendar_days_between(start, end) + 1;
    if span > MAX_RANGE_DAYS {
        return Err(AppError::validation(format!(
            "rango demasiado largo: {span} días (máximo {MAX_RANGE_DAYS})"
        )));
    }

    Ok(start.iter_days().take(span as usize).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> NaiveDate {
        parse_date(value).expect("valid date")
    }

    #[test]
    fn carry_over_uses_calendar_days_not_elapsed_hours() {
        let reference = date("2024-01-12");
        assert_eq!(carry_over_days(Some("2024-01-11 23:59:00"), reference), 1);
        assert_eq!(carry_over_days(Some("2024-01-10T00:01:00"), reference), 2);
        assert_eq!(carry_over_days(Some("2024-01-12"), reference), 0);
    }

    #[test]
    fn carry_over_defaults_to_zero_for_bad_or_future_dates() {
        let reference = date("2024-01-12");
        assert_eq!(carry_over_days(None, reference), 0);
        assert_eq!(carry_over_days(Some("ayer"), reference), 0);
        assert_eq!(carry_over_days(Some("2024-02-01"), reference), 0);
    }

    #[test]
    fn week_to_date_starts_on_monday() {
        // 2024-01-14 is a Sunday.
        let (start, end) = week_to_date(date("2024-01-14"));
        assert_eq!(start, date("2024-01-08"));
        assert_eq!(end, date("2024-01-14"));

        let (start, _) = week_to_date(date("2024-01-08"));
        assert_eq!(start, date("2024-01-08"));
    }

    #[test]
    fn dates_in_range_is_inclusive_and_validated() {
        let dates = dates_in_range(date("2024-01-30"), date("2024-02-02")).expect("range");
        assert_eq!(dates.len(), 4);
        assert_eq!(dates[0], date("2024-01-30"));
        assert_eq!(dates[3], date("2024-02-02"));

        assert!(dates_in_range(date("2024-02-02"), date("2024-01-30")).is_err());
        assert!(dates_in_range(date("2022-01-01"), date("2024-01-01")).is_err());
    }

    #[test]
    fn day_navigation_moves_one_calendar_day() {
        assert_eq!(next_day(date("2024-02-28")), date("2024-02-29"));
        assert_eq!(previous_day(date("2024-03-01")), date("2024-02-29"));
        assert_eq!(days_ago(date("2024-01-31"), 30), date("2024-01-01"));
    }
}
