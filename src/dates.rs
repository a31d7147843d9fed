use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Timelike, Weekday,
};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Event;
use crate::utils::clean_text;

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("valid iso date regex"));
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2})(?::(\d{2}))?\s*(am|pm)").expect("valid time regex"));

/// Evening cutoff for the "tonight" flag, local hour.
const TONIGHT_START_HOUR: u32 = 17;
/// How long after its start an event still counts as happening now.
const HAPPENING_NOW_WINDOW_HOURS: i64 = 3;

/// Parse a display date. A strict ISO `YYYY-MM-DD` prefix wins; anything else
/// runs through a short list of human formats. Unparsable input is `None`,
/// which fails every time bucket except "All".
pub fn parse_event_date(input: &str) -> Option<NaiveDate> {
    let cleaned = clean_text(input);
    if cleaned.is_empty() {
        return None;
    }
    if ISO_DATE_RE.is_match(&cleaned) {
        return NaiveDate::parse_from_str(&cleaned[..10], "%Y-%m-%d").ok();
    }
    let formats = ["%m/%d/%Y", "%m/%d/%y", "%B %d, %Y", "%b %d, %Y", "%B %e, %Y", "%b %e, %Y"];
    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return Some(date);
        }
    }
    None
}

/// Parse a display time: 24-hour "19:00" first, then "7pm" / "7:30 PM" style.
pub fn parse_event_time(input: &str) -> Option<NaiveTime> {
    let cleaned = clean_text(input);
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(time) = NaiveTime::parse_from_str(&cleaned, "%H:%M") {
        return Some(time);
    }
    let caps = TIME_RE.captures(&cleaned)?;
    let hour = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let minute = caps
        .get(2)
        .map(|m| m.as_str().parse::<u32>().unwrap_or(0))
        .unwrap_or(0);
    let normalized = format!(
        "{:02}:{:02} {}",
        hour,
        minute,
        caps.get(3)?.as_str().to_uppercase()
    );
    NaiveTime::parse_from_str(&normalized, "%I:%M %p").ok()
}

/// The next Saturday at or after `today`; today itself counts when it is one.
pub fn upcoming_saturday(today: NaiveDate) -> NaiveDate {
    next_weekday_or_today(today, Weekday::Sat)
}

/// The next Sunday at or after `today`; today itself counts when it is one.
pub fn upcoming_sunday(today: NaiveDate) -> NaiveDate {
    next_weekday_or_today(today, Weekday::Sun)
}

fn next_weekday_or_today(today: NaiveDate, target: Weekday) -> NaiveDate {
    let ahead = (target.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7;
    today + Duration::days(ahead as i64)
}

/// True when `date` lands on the upcoming Saturday or Sunday relative to
/// `today`. Never matches a weekend day already behind us.
pub fn is_this_weekend(date: NaiveDate, today: NaiveDate) -> bool {
    date == upcoming_saturday(today) || date == upcoming_sunday(today)
}

/// Half-open window `[today, today + 7)`; day seven itself is out.
pub fn is_this_week(date: NaiveDate, today: NaiveDate) -> bool {
    date >= today && date < today + Duration::days(7)
}

fn local_datetime(date: NaiveDate, time: NaiveTime, tz: Tz) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&NaiveDateTime::new(date, time)) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(dt, _) => Some(dt),
        LocalResult::None => None,
    }
}

/// Presentational flags derived fresh from date, time, and the clock on every
/// filter invocation. Nothing upstream is cached, so two renders of the same
/// snapshot can never disagree.
#[derive(Debug, Clone, Copy, Default)]
pub struct DerivedFlags {
    pub happening_now: bool,
    pub is_tonight: bool,
}

pub fn derive_flags(event: &Event, now: DateTime<Tz>) -> DerivedFlags {
    let date = match event.date.as_deref().and_then(parse_event_date) {
        Some(date) => date,
        None => return DerivedFlags::default(),
    };
    if date != now.date_naive() {
        return DerivedFlags::default();
    }

    let start = event
        .time
        .as_deref()
        .and_then(parse_event_time)
        .and_then(|time| local_datetime(date, time, now.timezone()));

    match start {
        // A dated event with no parseable time is all-day.
        None => DerivedFlags {
            happening_now: true,
            is_tonight: false,
        },
        Some(start) => {
            let happening_now =
                start <= now && now < start + Duration::hours(HAPPENING_NOW_WINDOW_HOURS);
            DerivedFlags {
                happening_now,
                is_tonight: !happening_now && start.hour() >= TONIGHT_START_HOUR,
            }
        }
    }
}
