//! Date parsing for API input
//!
//! Handlers turn request strings into `DateTime<Utc>` here; repositories only
//! ever see Unix millis.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};

use super::{AppError, AppResult};

/// Parse an instant: RFC 3339, or `YYYY-MM-DD` meaning midnight UTC.
pub fn parse_instant(field: &str, value: &str) -> AppResult<DateTime<Utc>> {
    let raw = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(day_start)
        .map_err(|_| AppError::invalid_field(field, format!("Invalid date: {raw}")))
}

/// Parse an optional instant, treating blank strings as absent.
pub fn parse_optional_instant(field: &str, value: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_instant(field, raw).map(Some),
    }
}

/// Parse a calendar date: `dd/MM/yyyy`, `YYYY-MM-DD` or RFC 3339.
pub fn parse_loose_date(value: &str) -> Option<NaiveDate> {
    let raw = value.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
}

/// 00:00 UTC of `date`
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// First instant of the UTC month containing `at`
pub fn month_start(at: DateTime<Utc>) -> DateTime<Utc> {
    let date = at.date_naive();
    day_start(date.with_day(1).unwrap_or(date))
}

/// First instant of the UTC year containing `at`
pub fn year_start(at: DateTime<Utc>) -> DateTime<Utc> {
    let date = at.date_naive();
    day_start(NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date))
}

/// Whole years between `birth` and `today`
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}
