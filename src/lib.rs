pub mod availability;
pub mod backend;
pub mod config;
pub mod criteria;
pub mod dates;
pub mod filter;
pub mod geo;
pub mod location;
pub mod models;
pub mod search;
mod utils;

pub use availability::{
    cycle_heat, overlap_count, toggle_slot, DragPainter, DragState, ParticipantSlots, Selections,
};
pub use backend::{events_or_empty, BackendError, EventSource, RestBackend};
pub use config::{AppConfig, ConfigStore};
pub use criteria::{FilterCriteria, Mood, TimeWindow};
pub use filter::{filter_events, recommended_events, trending_events};
pub use geo::Coordinates;
pub use location::{resolve_position, IpLookupProvider, LocationProvider};
pub use models::Event;
