use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Duration, NaiveDate};

/// Heat level ceiling: 0 = free, 1..=3 = increasing preference.
pub const MAX_HEAT: u8 = 3;

/// Hourly scheduling grid, 9am through 10pm.
pub const DEFAULT_TIME_SLOTS: [&str; 14] = [
    "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00", "17:00", "18:00",
    "19:00", "20:00", "21:00", "22:00",
];

/// The current user's selections: slot key -> heat level 0..=3. BTreeMap so
/// iteration follows the grid's chronological key order.
pub type Selections = BTreeMap<String, u8>;

/// Other participants' selections, read-only: participant -> slot keys.
pub type ParticipantSlots = HashMap<String, HashSet<String>>;

/// Composite key for one cell of the availability grid: "YYYY-MM-DD-HH:MM".
/// Every participant must use the same format or overlap counts are
/// meaningless.
pub fn slot_key(date: NaiveDate, time: &str) -> String {
    format!("{}-{}", date.format("%Y-%m-%d"), time)
}

/// All keys for a scheduling window of `num_days` starting at `start`,
/// column-major by day to mirror the grid layout.
pub fn grid_keys(start: NaiveDate, num_days: u32, time_slots: &[&str]) -> Vec<String> {
    let mut keys = Vec::with_capacity(num_days as usize * time_slots.len());
    for offset in 0..num_days {
        let day = start + Duration::days(offset as i64);
        for time in time_slots {
            keys.push(slot_key(day, time));
        }
    }
    keys
}

/// Flip a slot between free and available. A key not seen before starts at
/// free and flips on.
pub fn toggle_slot(selections: &mut Selections, key: &str) {
    let level = selections.entry(key.to_string()).or_insert(0);
    *level = if *level == 0 { 1 } else { 0 };
}

/// Step a slot's preference strength: 0 -> 1 -> 2 -> 3 -> 0.
pub fn cycle_heat(selections: &mut Selections, key: &str) {
    let level = selections.entry(key.to_string()).or_insert(0);
    *level = (*level + 1) % (MAX_HEAT + 1);
}

pub fn is_selected(selections: &Selections, key: &str) -> bool {
    selections.get(key).copied().unwrap_or(0) > 0
}

/// How many participants marked this slot. The current user's own heat level
/// is a separate signal and is not folded in here.
pub fn overlap_count(participants: &ParticipantSlots, key: &str) -> usize {
    participants
        .values()
        .filter(|slots| slots.contains(key))
        .count()
}

/// The slot with the widest overlap, ties broken by key order so the earliest
/// slot wins. `None` when nobody has selected anything.
pub fn most_popular_slot(participants: &ParticipantSlots) -> Option<(String, usize)> {
    let mut keys: Vec<&String> = participants.values().flatten().collect();
    keys.sort();
    keys.dedup();
    keys.into_iter()
        .map(|key| (key.clone(), overlap_count(participants, key)))
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
}

/// Drag-to-paint gesture as an explicit state machine, kept outside any UI
/// lifecycle. The first cell pressed fixes the direction; cells crossed while
/// dragging adopt it idempotently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    DraggingSelect,
    DraggingDeselect,
}

#[derive(Debug, Default)]
pub struct DragPainter {
    state: DragState,
}

impl DragPainter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Press on a cell: enter the direction opposite to its current state and
    /// apply it immediately.
    pub fn pointer_down(&mut self, selections: &mut Selections, key: &str) {
        self.state = if is_selected(selections, key) {
            DragState::DraggingDeselect
        } else {
            DragState::DraggingSelect
        };
        toggle_slot(selections, key);
    }

    /// Crossing into a cell mid-drag: apply the fixed direction. Cells
    /// already in the target state are left alone, so re-entering a cell
    /// never re-toggles it.
    pub fn pointer_enter(&mut self, selections: &mut Selections, key: &str) {
        match self.state {
            DragState::Idle => {}
            DragState::DraggingSelect => {
                if !is_selected(selections, key) {
                    toggle_slot(selections, key);
                }
            }
            DragState::DraggingDeselect => {
                if is_selected(selections, key) {
                    toggle_slot(selections, key);
                }
            }
        }
    }

    pub fn pointer_up(&mut self) {
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, d).expect("valid date")
    }

    fn participants(entries: &[(&str, &[&str])]) -> ParticipantSlots {
        entries
            .iter()
            .map(|(name, slots)| {
                (
                    name.to_string(),
                    slots.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn slot_keys_are_stable_and_comparable() {
        assert_eq!(slot_key(day(8), "18:00"), "2025-02-08-18:00");
        let keys = grid_keys(day(8), 2, &["09:00", "10:00"]);
        assert_eq!(
            keys,
            vec![
                "2025-02-08-09:00",
                "2025-02-08-10:00",
                "2025-02-09-09:00",
                "2025-02-09-10:00",
            ]
        );
    }

    #[test]
    fn toggle_initializes_then_flips() {
        let mut selections = Selections::new();
        toggle_slot(&mut selections, "2025-02-08-18:00");
        assert!(is_selected(&selections, "2025-02-08-18:00"));
        toggle_slot(&mut selections, "2025-02-08-18:00");
        assert!(!is_selected(&selections, "2025-02-08-18:00"));
    }

    #[test]
    fn heat_cycles_through_levels_and_wraps() {
        let mut selections = Selections::new();
        let key = "2025-02-08-18:00";
        for expected in [1, 2, 3, 0] {
            cycle_heat(&mut selections, key);
            assert_eq!(selections[key], expected);
        }
    }

    #[test]
    fn overlap_on_empty_map_is_zero() {
        let empty = ParticipantSlots::new();
        assert_eq!(overlap_count(&empty, "2025-02-08-18:00"), 0);
    }

    #[test]
    fn overlap_counts_participants_with_key() {
        let all = participants(&[
            ("maya", &["2025-02-08-18:00"]),
            ("jordan", &["2025-02-08-18:00", "2025-02-08-19:00"]),
            ("sam", &["2025-02-08-18:00"]),
            ("alex", &["2025-02-09-12:00"]),
        ]);
        assert_eq!(overlap_count(&all, "2025-02-08-18:00"), 3);
        assert_eq!(overlap_count(&all, "2025-02-09-12:00"), 1);
        assert_eq!(overlap_count(&all, "2025-02-10-12:00"), 0);
    }

    #[test]
    fn overlap_never_exceeds_participant_count() {
        let all = participants(&[
            ("maya", &["2025-02-08-18:00", "2025-02-08-18:00"]),
            ("jordan", &["2025-02-08-18:00"]),
        ]);
        assert!(overlap_count(&all, "2025-02-08-18:00") <= all.len());
    }

    #[test]
    fn most_popular_slot_finds_consensus() {
        let all = participants(&[
            ("maya", &["2025-02-08-18:00", "2025-02-08-19:00"]),
            ("jordan", &["2025-02-08-18:00"]),
            ("sam", &["2025-02-08-19:00", "2025-02-08-18:00"]),
        ]);
        let (key, count) = most_popular_slot(&all).expect("some slot");
        assert_eq!(key, "2025-02-08-18:00");
        assert_eq!(count, 3);
        assert!(most_popular_slot(&ParticipantSlots::new()).is_none());
    }

    #[test]
    fn drag_selects_each_cell_exactly_once_despite_reentry() {
        let mut selections = Selections::new();
        let mut painter = DragPainter::new();
        painter.pointer_down(&mut selections, "a");
        assert_eq!(painter.state(), DragState::DraggingSelect);
        painter.pointer_enter(&mut selections, "b");
        painter.pointer_enter(&mut selections, "c");
        // Path doubles back over a cell already painted.
        painter.pointer_enter(&mut selections, "b");
        painter.pointer_up();

        for key in ["a", "b", "c"] {
            assert_eq!(selections[key], 1, "{key}");
        }
        assert_eq!(painter.state(), DragState::Idle);
    }

    #[test]
    fn drag_direction_fixed_by_first_cell() {
        let mut selections = Selections::new();
        toggle_slot(&mut selections, "a");
        toggle_slot(&mut selections, "b");

        let mut painter = DragPainter::new();
        painter.pointer_down(&mut selections, "a");
        assert_eq!(painter.state(), DragState::DraggingDeselect);
        painter.pointer_enter(&mut selections, "b");
        // An unselected cell crossed during a deselect drag stays unselected.
        painter.pointer_enter(&mut selections, "c");
        painter.pointer_up();

        assert!(!is_selected(&selections, "a"));
        assert!(!is_selected(&selections, "b"));
        assert!(!is_selected(&selections, "c"));
    }

    #[test]
    fn enter_without_down_is_inert() {
        let mut selections = Selections::new();
        let mut painter = DragPainter::new();
        painter.pointer_enter(&mut selections, "a");
        assert!(selections.is_empty());
    }
}
