// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keeping the operator's selected room across room list refreshes.

use parley_core::Room;

/// What a refresh did to the selected room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionUpdate {
    /// Nothing selected, or the selected room came back unchanged.
    Unchanged,
    /// The selected room came back with different content and was replaced.
    Replaced,
    /// The selected room is missing from this refresh; the old value is kept.
    Missing,
}

/// Match the selected room against a fresh list by room id.
///
/// A room missing from one refresh stays selected with its last known
/// content. The selection never moves to a different room.
pub fn reconcile_selection(selected: &mut Option<Room>, rooms: &[Room]) -> SelectionUpdate {
    let Some(current) = selected.as_mut() else {
        return SelectionUpdate::Unchanged;
    };
    match rooms.iter().find(|room| room.room_id == current.room_id) {
        Some(fresh) if fresh != current => {
            *current = fresh.clone();
            SelectionUpdate::Replaced
        }
        Some(_) => SelectionUpdate::Unchanged,
        None => SelectionUpdate::Missing,
    }
}
