use crate::models::Event;

/// Minimum similarity for an event to stay in a query's result set.
const SIMILARITY_THRESHOLD: f64 = 0.6;

const NAME_WEIGHT: f64 = 1.0;
const TAG_WEIGHT: f64 = 0.8;
const VENUE_WEIGHT: f64 = 0.6;

/// Rank events against a free-text query. Substring hits score highest, near
/// misses (typos) survive via normalized Levenshtein similarity, and the
/// result is ordered best-first with fetch order preserved among ties. A
/// blank query returns the input untouched.
pub fn rank_events(events: &[Event], query: &str) -> Vec<Event> {
    let query = query.trim();
    if query.is_empty() {
        return events.to_vec();
    }

    let mut scored: Vec<(f64, &Event)> = events
        .iter()
        .filter_map(|event| {
            let score = score_event(event, query);
            (score >= SIMILARITY_THRESHOLD).then_some((score, event))
        })
        .collect();
    // Stable sort keeps fetch order for equal scores.
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().map(|(_, event)| event.clone()).collect()
}

/// Weighted best-field score: name outranks tags, tags outrank venue.
pub fn score_event(event: &Event, query: &str) -> f64 {
    let mut best = similarity(query, &event.name) * NAME_WEIGHT;
    for tag in &event.tags {
        best = best.max(similarity(query, tag) * TAG_WEIGHT);
    }
    if let Some(venue) = event.venue.as_deref() {
        best = best.max(similarity(query, venue) * VENUE_WEIGHT);
    }
    best
}

fn similarity(query: &str, text: &str) -> f64 {
    let query = query.to_lowercase();
    let text = text.to_lowercase();
    if text.contains(&query) {
        return 1.0;
    }

    // Per query token, the best match against any text token; averaged so
    // every word of a multi-word query has to land somewhere.
    let text_tokens: Vec<&str> = text.split_whitespace().collect();
    if text_tokens.is_empty() {
        return 0.0;
    }
    let mut total = 0.0;
    let mut count = 0usize;
    for query_token in query.split_whitespace() {
        let best = text_tokens
            .iter()
            .map(|text_token| token_similarity(query_token, text_token))
            .fold(0.0, f64::max);
        total += best;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

fn token_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0.0;
    }
    let distance = strsim::levenshtein(a, b);
    1.0 - distance as f64 / longest as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, name: &str, venue: &str, tags: &[&str]) -> Event {
        Event {
            id: id.into(),
            name: name.into(),
            venue: Some(venue.into()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Event::default()
        }
    }

    fn sample() -> Vec<Event> {
        vec![
            event("1", "Jazz Night", "Village Vanguard", &["intimate", "concert"]),
            event("2", "Knicks vs Celtics", "Madison Square Garden", &["sports"]),
            event("3", "Gallery Opening", "MoMA PS1", &["art", "cultural"]),
        ]
    }

    #[test]
    fn blank_query_returns_input_unchanged() {
        let events = sample();
        let ranked = rank_events(&events, "   ");
        let ids: Vec<&str> = ranked.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn exact_name_query_always_included() {
        let events = sample();
        let ranked = rank_events(&events, "Jazz Night");
        assert!(ranked.iter().any(|e| e.id == "1"));
        assert_eq!(ranked[0].id, "1");
    }

    #[test]
    fn substring_query_matches() {
        let events = sample();
        let ranked = rank_events(&events, "knicks");
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, "2");
    }

    #[test]
    fn typo_still_surfaces_event() {
        let events = sample();
        let ranked = rank_events(&events, "jaz");
        assert!(ranked.iter().any(|e| e.id == "1"));
    }

    #[test]
    fn tag_query_matches_at_lower_weight() {
        let events = sample();
        let ranked = rank_events(&events, "cultural");
        assert!(ranked.iter().any(|e| e.id == "3"));
        // Name hit outranks tag hit for the same query strength.
        let name_score = score_event(&events[0], "jazz night");
        let tag_score = score_event(&events[2], "cultural");
        assert!(name_score > tag_score);
    }

    #[test]
    fn unrelated_query_filters_everything() {
        let events = sample();
        let ranked = rank_events(&events, "quantum chromodynamics");
        assert!(ranked.is_empty());
    }
}
