//! Reshaping of approved bookings for the calendar page.
//!
//! Stored bookings carry a date and a free-form time field that is either a
//! single start time (with an optional separate `end_time`) or a
//! `start-end` range. The calendar wants two local timestamps instead.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::db::{Booking, CalendarBooking};

/// Normalize a stored date to `YYYY-MM-DD`.
///
/// Accepts plain dates, RFC 3339 timestamps (converted to UTC) and
/// `YYYY-MM-DD HH:MM:SS`. Anything else is returned unchanged.
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(&Utc).format("%Y-%m-%d").to_string();
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return ts.format("%Y-%m-%d").to_string();
    }

    raw.to_string()
}

/// Split the stored time field into start and end times.
pub fn split_time_range(time: &str, end_time: Option<&str>) -> (String, String) {
    if time.contains('-') {
        let mut parts = time.split('-');
        let start = parts.next().unwrap_or_default().trim();
        let end = match parts.next() {
            Some(end) if !end.is_empty() => end.trim(),
            _ => start,
        };
        return (start.to_string(), end.to_string());
    }

    let end = match end_time {
        Some(end) if !end.is_empty() => end,
        _ => time,
    };
    (time.to_string(), end.to_string())
}

pub fn to_calendar(booking: Booking) -> CalendarBooking {
    let date = normalize_date(&booking.date);
    let (start, end) = split_time_range(&booking.time, booking.end_time.as_deref());

    CalendarBooking {
        start: format!("{}T{}", date, start),
        end: format!("{}T{}", date, end),
        booking,
    }
}
