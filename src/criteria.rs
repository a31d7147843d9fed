use serde::{Deserialize, Serialize};

use crate::models::Event;

/// User-selected filter state. Built fresh for every filter call; the default
/// value leaves every predicate unconstrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Top-level category; `None` means "All".
    pub segment: Option<String>,
    pub genre: Option<String>,
    /// Price tier; "Free" matches the categorical free level.
    pub price: Option<String>,
    pub time: TimeWindow,
    /// Radius in miles; `None` means no distance constraint.
    pub radius_miles: Option<f64>,
    pub mood: Option<Mood>,
    pub query: String,
}

impl FilterCriteria {
    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeWindow {
    #[default]
    All,
    Now,
    Tonight,
    ThisWeekend,
    ThisWeek,
}

/// Curated filter preset: one user-facing label standing for a disjunction of
/// tag and category tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Adventurous,
    Chill,
    Social,
    Artsy,
}

impl Mood {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_ascii_lowercase().as_str() {
            "adventurous" => Some(Mood::Adventurous),
            "chill" => Some(Mood::Chill),
            "social" => Some(Mood::Social),
            "artsy" => Some(Mood::Artsy),
            _ => None,
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        let has_tag = |tag: &str| {
            event
                .tags
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(tag))
        };
        match self {
            Mood::Adventurous => has_tag("immersive"),
            Mood::Chill => has_tag("intimate") || has_tag("cultural"),
            Mood::Social => has_tag("nightlife") || has_tag("concert"),
            Mood::Artsy => {
                event.segment.as_deref() == Some("Arts") || has_tag("art")
            }
        }
    }
}
