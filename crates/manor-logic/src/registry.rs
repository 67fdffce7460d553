//! Derived cross-reference tables over the entity lists.
//!
//! | Table | Shape | Notes |
//! |-------|-------|-------|
//! | room → items | `BTreeMap<room, BTreeSet<item>>` | entry removed once empty |
//! | room → players | `BTreeMap<room, BTreeSet<player>>` | entry removed once empty |
//! | player → items | `Vec<Vec<item>>` | pickup order |
//!
//! The tables are views over the primary per-entity fields (`Player::room`,
//! `Item::origin_room`, `Item::used`). The engine is the only writer and updates
//! them incrementally; [`Registry::audit`] re-derives the invariants from
//! scratch for tests and the simulation harness.

use std::collections::{BTreeMap, BTreeSet};

use crate::entities::{Item, Player};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    room_items: BTreeMap<usize, BTreeSet<usize>>,
    room_players: BTreeMap<usize, BTreeSet<usize>>,
    carried: Vec<Vec<usize>>,
}

impl Registry {
    /// Build fresh tables: unused items in their origin rooms, players placed,
    /// nobody carrying anything.
    pub fn new(items: &[Item], players: &[Player]) -> Self {
        let mut room_items: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
        for item in items.iter().filter(|i| !i.used) {
            room_items
                .entry(item.origin_room)
                .or_default()
                .insert(item.index);
        }
        let mut registry = Self {
            room_items,
            room_players: BTreeMap::new(),
            carried: Vec::new(),
        };
        registry.place_players(players);
        registry
    }

    /// Replace the player tables for a new roster.
    pub fn place_players(&mut self, players: &[Player]) {
        self.room_players.clear();
        for (idx, p) in players.iter().enumerate() {
            self.room_players.entry(p.room).or_default().insert(idx);
        }
        self.carried = vec![Vec::new(); players.len()];
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Items lying in a room, ascending.
    pub fn items_in(&self, room: usize) -> Vec<usize> {
        self.room_items
            .get(&room)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn room_has_item(&self, room: usize, item: usize) -> bool {
        self.room_items
            .get(&room)
            .is_some_and(|s| s.contains(&item))
    }

    /// Players standing in a room, ascending.
    pub fn players_in(&self, room: usize) -> Vec<usize> {
        self.room_players
            .get(&room)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn player_count_in(&self, room: usize) -> usize {
        self.room_players.get(&room).map_or(0, |s| s.len())
    }

    /// Items a player carries, in pickup order.
    pub fn carried(&self, player: usize) -> &[usize] {
        self.carried
            .get(player)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn carries(&self, player: usize, item: usize) -> bool {
        self.carried(player).contains(&item)
    }

    // ── Mutations (engine only) ─────────────────────────────────────────

    pub(crate) fn move_player(&mut self, player: usize, from: usize, to: usize) {
        if let Some(set) = self.room_players.get_mut(&from) {
            set.remove(&player);
            if set.is_empty() {
                self.room_players.remove(&from);
            }
        }
        self.room_players.entry(to).or_default().insert(player);
    }

    pub(crate) fn pick_up(&mut self, player: usize, room: usize, item: usize) {
        if let Some(set) = self.room_items.get_mut(&room) {
            set.remove(&item);
            if set.is_empty() {
                self.room_items.remove(&room);
            }
        }
        if let Some(list) = self.carried.get_mut(player) {
            list.push(item);
        }
    }

    /// Drop a used item from its carrier's list.
    pub(crate) fn discard(&mut self, player: usize, item: usize) {
        if let Some(list) = self.carried.get_mut(player) {
            list.retain(|&i| i != item);
        }
    }

    // ── Invariants ──────────────────────────────────────────────────────

    /// Check the tables against the primary entity fields. Returns one message
    /// per violation; empty means consistent.
    pub fn audit(&self, items: &[Item], players: &[Player]) -> Vec<String> {
        let mut problems = Vec::new();

        // Every player appears under its own room and nowhere else.
        for (idx, p) in players.iter().enumerate() {
            for (&room, set) in &self.room_players {
                let listed = set.contains(&idx);
                if room == p.room && !listed {
                    problems.push(format!("player #{} missing from room #{}", idx, room));
                }
                if room != p.room && listed {
                    problems.push(format!(
                        "player #{} listed in room #{} but stands in #{}",
                        idx, room, p.room
                    ));
                }
            }
            if !self.room_players.contains_key(&p.room) {
                problems.push(format!("room #{} has no player entry for #{}", p.room, idx));
            }
        }
        for set in self.room_players.values() {
            if set.is_empty() {
                problems.push("empty room→players entry".to_string());
            }
            if let Some(&bad) = set.iter().find(|&&i| i >= players.len()) {
                problems.push(format!("room→players references unknown player #{}", bad));
            }
        }
        if self.carried.len() != players.len() {
            problems.push(format!(
                "{} carrier lists for {} players",
                self.carried.len(),
                players.len()
            ));
        }

        // Every item is in exactly one place: a room, one carrier, or used.
        for item in items {
            let in_rooms = self
                .room_items
                .values()
                .filter(|s| s.contains(&item.index))
                .count();
            let carriers = self
                .carried
                .iter()
                .map(|list| list.iter().filter(|&&i| i == item.index).count())
                .sum::<usize>();
            let used = usize::from(item.used);
            if in_rooms + carriers + used != 1 {
                problems.push(format!(
                    "item #{} accounted {} time(s): rooms={} carriers={} used={}",
                    item.index,
                    in_rooms + carriers + used,
                    in_rooms,
                    carriers,
                    item.used
                ));
            }
            if in_rooms == 1 && !self.room_has_item(item.origin_room, item.index) {
                problems.push(format!(
                    "item #{} lies outside its origin room #{}",
                    item.index, item.origin_room
                ));
            }
        }
        for (&room, set) in &self.room_items {
            if set.is_empty() {
                problems.push(format!("empty room→items entry for room #{}", room));
            }
        }

        problems
    }
}
