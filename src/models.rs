use serde::{Deserialize, Serialize};

/// One event as fetched from the backend snapshot. Optional fields stay
/// optional all the way through filtering; a record missing any of them must
/// never be rejected at the deserialization or predicate level.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub venue: Option<String>,
    pub neighborhood: Option<String>,
    pub segment: Option<String>,
    pub genre: Option<String>,
    pub tags: Vec<String>,
    /// Display price, e.g. "$25".
    pub price: Option<String>,
    /// Categorical tier: "free", "$", "$$", "$$$".
    pub price_level: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Display date, ISO "2024-12-28" preferred, "Dec 28, 2024" accepted.
    pub date: Option<String>,
    /// Display time, "19:00" or "7:00 PM".
    pub time: Option<String>,
    pub is_trending: bool,
    pub trending_rank: Option<u32>,
    pub is_recommended: bool,
    pub match_score: Option<f64>,
    pub match_reasons: Vec<String>,
    /// Precomputed miles from the user, when the backend supplies it.
    pub distance: Option<f64>,
    /// Precomputed travel minutes, when the backend supplies it.
    pub travel_time: Option<u32>,
}

impl Event {
    pub fn coordinates(&self) -> Option<crate::geo::Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(crate::geo::Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }

    pub fn is_free(&self) -> bool {
        self.price_level
            .as_deref()
            .map(|level| level.eq_ignore_ascii_case("free"))
            .unwrap_or(false)
    }
}
