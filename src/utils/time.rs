use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};

/// Minutes in a full day; an all-day block occupies `[0, MINUTES_PER_DAY)`.
pub const MINUTES_PER_DAY: u32 = 1440;

/// Outcome of parsing a stored clock-time string.
///
/// Booking records carry two historical encodings: strict 24-hour `HH:mm`
/// and a legacy `h:mm AM/PM` form. Anything matching neither is reported as
/// `Invalid` so the caller can choose between skipping and rejecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTime {
    /// Strict 24-hour `HH:mm`, as minutes since midnight
    Iso(u32),
    /// Legacy 12-hour `h:mm AM/PM`, as minutes since midnight
    Legacy(u32),
    /// Matched neither encoding
    Invalid,
}

impl ClockTime {
    /// Minutes since midnight, if the string parsed at all.
    pub fn minutes(self) -> Option<u32> {
        match self {
            ClockTime::Iso(minutes) | ClockTime::Legacy(minutes) => Some(minutes),
            ClockTime::Invalid => None,
        }
    }
}

/// Parse a stored clock-time string, trying the strict 24-hour format first
/// and falling back to the legacy 12-hour form.
pub fn parse_clock_time(raw: &str) -> ClockTime {
    let raw = raw.trim();

    if let Some((hour, minute)) = parse_time(raw) {
        return ClockTime::Iso(hour * 60 + minute);
    }

    if let Ok(time) = NaiveTime::parse_from_str(raw, "%I:%M %p") {
        return ClockTime::Legacy(time.hour() * 60 + time.minute());
    }

    ClockTime::Invalid
}

/// Parse time string in HH:MM format
pub fn parse_time(time_str: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = time_str.split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let hour = parts[0].parse::<u32>().ok()?;
    let minute = parts[1].parse::<u32>().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// Format minutes since midnight as a 24-hour `HH:mm` string.
pub fn format_hhmm(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Format minutes since midnight for customer display (12-hour with AM/PM).
pub fn format_display(minutes: u32) -> String {
    let hour = minutes / 60;
    let minute = minutes % 60;
    let (hour12, meridiem) = match hour {
        0 => (12, "AM"),
        1..=11 => (hour, "AM"),
        12 => (12, "PM"),
        _ => (hour - 12, "PM"),
    };
    format!("{}:{:02} {}", hour12, minute, meridiem)
}

/// English weekday name used to key staff working hours.
///
/// A fixed enumeration rather than locale-dependent date formatting, so the
/// lookup behaves identically in every environment.
pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
