//! Visibility checks that gate attack success.
//!
//! An attacker is seen when either check fires:
//!
//! 1. **Other players**: someone else shares the attacker's room, or a
//!    neighboring room that the pet does *not* occupy holds any player.
//! 2. **Pet co-location**: if the pet's room neighbors the attacker's room,
//!    any player in the pet's room sees the attacker; if the pet shares the
//!    attacker's room, only another player in that room does (the pet alone
//!    never exposes anyone).
//!
//! The two checks overlap but disagree on the pet-room edge cases; both are
//! evaluated as-is and OR-ed together.
//!
//! Both are pure functions of the room graph, the room→players table and the
//! pet's position, so identical configurations always give identical verdicts.

use crate::geometry::AdjacencyTable;
use crate::registry::Registry;

/// Everything needed to decide whether a room is observed.
#[derive(Debug, Clone, Copy)]
pub struct Observers<'a> {
    pub adjacency: &'a AdjacencyTable,
    pub registry: &'a Registry,
    pub pet_room: usize,
}

/// Which checks saw the attacker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sighting {
    pub by_players: bool,
    pub via_pet: bool,
}

impl Sighting {
    pub fn is_seen(&self) -> bool {
        self.by_players || self.via_pet
    }
}

/// Check 1: another player in the room, or any player in a neighbor the pet
/// does not occupy. `room` is the attacker's room, attacker included in its count.
pub fn seen_by_other_players(obs: &Observers<'_>, room: usize) -> bool {
    if obs.registry.player_count_in(room) > 1 {
        return true;
    }
    obs.adjacency
        .neighbors(room)
        .iter()
        .filter(|&&n| n != obs.pet_room)
        .any(|&n| obs.registry.player_count_in(n) > 0)
}

/// Check 2: exposure through the pet's room.
pub fn seen_via_pet(obs: &Observers<'_>, room: usize) -> bool {
    if obs.adjacency.are_adjacent(room, obs.pet_room) {
        obs.registry.player_count_in(obs.pet_room) > 0
    } else if room == obs.pet_room {
        obs.registry.player_count_in(room) > 1
    } else {
        false
    }
}

/// Evaluate both checks for an attacker standing in `room`.
pub fn evaluate(obs: &Observers<'_>, room: usize) -> Sighting {
    Sighting {
        by_players: seen_by_other_players(obs, room),
        via_pet: seen_via_pet(obs, room),
    }
}
