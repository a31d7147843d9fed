use chrono::DateTime;
use chrono_tz::Tz;

use crate::criteria::{FilterCriteria, TimeWindow};
use crate::dates::{self, derive_flags};
use crate::geo::{self, Coordinates};
use crate::models::Event;
use crate::search;

/// Reduce a snapshot to the events matching every active criterion. Pure
/// function of its arguments: no clock reads, no I/O, safe to re-run on every
/// keystroke. Input order survives unless a free-text query triggers
/// relevance reordering.
pub fn filter_events(
    events: &[Event],
    criteria: &FilterCriteria,
    user_position: Option<Coordinates>,
    now: DateTime<Tz>,
) -> Vec<Event> {
    let mut candidates = if criteria.has_query() {
        search::rank_events(events, &criteria.query)
    } else {
        events.to_vec()
    };

    candidates.retain(|event| {
        matches_segment(event, criteria)
            && matches_genre(event, criteria)
            && matches_price(event, criteria)
            && matches_time(event, criteria, now)
            && matches_distance(event, criteria, user_position)
            && matches_mood(event, criteria)
    });
    candidates
}

fn matches_segment(event: &Event, criteria: &FilterCriteria) -> bool {
    match criteria.segment.as_deref() {
        None => true,
        Some(segment) => event.segment.as_deref() == Some(segment),
    }
}

fn matches_genre(event: &Event, criteria: &FilterCriteria) -> bool {
    match criteria.genre.as_deref() {
        None => true,
        Some(genre) => event.genre.as_deref() == Some(genre),
    }
}

fn matches_price(event: &Event, criteria: &FilterCriteria) -> bool {
    match criteria.price.as_deref() {
        None => true,
        // "Free" matches the categorical tier regardless of display price.
        Some(selected) if selected.eq_ignore_ascii_case("free") => event.is_free(),
        Some(selected) => event.price_level.as_deref() == Some(selected),
    }
}

fn matches_time(event: &Event, criteria: &FilterCriteria, now: DateTime<Tz>) -> bool {
    match criteria.time {
        TimeWindow::All => true,
        TimeWindow::Now => derive_flags(event, now).happening_now,
        TimeWindow::Tonight => derive_flags(event, now).is_tonight,
        TimeWindow::ThisWeekend => event
            .date
            .as_deref()
            .and_then(dates::parse_event_date)
            .map(|date| dates::is_this_weekend(date, now.date_naive()))
            .unwrap_or(false),
        TimeWindow::ThisWeek => event
            .date
            .as_deref()
            .and_then(dates::parse_event_date)
            .map(|date| dates::is_this_week(date, now.date_naive()))
            .unwrap_or(false),
    }
}

/// Missing data never excludes: an event with no precomputed distance and no
/// coordinates (or no known user position) passes any radius.
fn matches_distance(
    event: &Event,
    criteria: &FilterCriteria,
    user_position: Option<Coordinates>,
) -> bool {
    let radius = match criteria.radius_miles {
        None => return true,
        Some(radius) => radius,
    };
    let miles = event.distance.or_else(|| {
        let position = user_position?;
        let coords = event.coordinates()?;
        Some(geo::distance_miles(position, coords))
    });
    match miles {
        None => true,
        Some(miles) => miles <= radius,
    }
}

fn matches_mood(event: &Event, criteria: &FilterCriteria) -> bool {
    match criteria.mood {
        None => true,
        Some(mood) => mood.matches(event),
    }
}

/// Trending shelf: flagged events, best rank first.
pub fn trending_events(events: &[Event]) -> Vec<Event> {
    let mut trending: Vec<Event> = events.iter().filter(|e| e.is_trending).cloned().collect();
    trending.sort_by_key(|event| event.trending_rank.unwrap_or(u32::MAX));
    trending
}

/// Recommended shelf: flagged events, strongest match first.
pub fn recommended_events(events: &[Event]) -> Vec<Event> {
    let mut recommended: Vec<Event> =
        events.iter().filter(|e| e.is_recommended).cloned().collect();
    recommended.sort_by(|a, b| {
        let a_score = a.match_score.unwrap_or(0.0);
        let b_score = b.match_score.unwrap_or(0.0);
        b_score
            .partial_cmp(&a_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    recommended
}
