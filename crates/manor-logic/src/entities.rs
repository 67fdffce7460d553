//! Game entities: rooms, items, players, the target character and the pet.
//!
//! Entities hold only their primary fields. Cross-references (which items lie
//! in a room, who stands where, who carries what) live in
//! [`crate::registry::Registry`] and are kept in sync by the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ai::DecisionPolicy;
use crate::geometry::RoomRect;

/// A room with a stable index, name and rectangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub index: usize,
    pub name: String,
    pub rect: RoomRect,
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Room index:{}. Name:{}. Left-top:{{{},{}}}. Right-bottom:{{{},{}}}. Width:{}. Height:{}.",
            self.index,
            self.name,
            self.rect.top,
            self.rect.left,
            self.rect.bottom,
            self.rect.right,
            self.rect.width(),
            self.rect.height()
        )
    }
}

/// A weapon. Once used it is permanently out of circulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub index: usize,
    pub name: String,
    pub attack: u32,
    /// Room the item was placed in when the world was loaded.
    pub origin_room: usize,
    pub used: bool,
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Index:{}. Name:{}. RoomIdx:{}. Attack:{}.",
            self.index, self.name, self.origin_room, self.attack
        )
    }
}

/// Human or computer controlled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerType {
    Human,
    Ai,
}

impl fmt::Display for PlayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerType::Human => write!(f, "HUMAN"),
            PlayerType::Ai => write!(f, "AI"),
        }
    }
}

/// Controller of a player. AI players own their decision policy.
#[derive(Debug, Clone)]
pub enum PlayerKind {
    Human,
    Ai(DecisionPolicy),
}

/// A participant. Name and room are shared by both kinds.
#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub room: usize,
    pub kind: PlayerKind,
}

impl Player {
    pub fn human(name: impl Into<String>, room: usize) -> Self {
        Self {
            name: name.into(),
            room,
            kind: PlayerKind::Human,
        }
    }

    pub fn ai(name: impl Into<String>, room: usize, policy: DecisionPolicy) -> Self {
        Self {
            name: name.into(),
            room,
            kind: PlayerKind::Ai(policy),
        }
    }

    pub fn player_type(&self) -> PlayerType {
        match self.kind {
            PlayerKind::Human => PlayerType::Human,
            PlayerKind::Ai(_) => PlayerType::Ai,
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self.kind, PlayerKind::Human)
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Player name:{}. Room index:{}. Type: {}",
            self.name,
            self.room,
            self.player_type()
        )
    }
}

/// The hunted character. Health 0 is terminal: it stops moving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCharacter {
    pub name: String,
    pub health: u32,
    pub room: usize,
}

impl TargetCharacter {
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Apply damage, saturating at zero.
    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Step to the next room index, wrapping around. No-op once dead.
    pub fn advance(&mut self, room_count: usize) {
        if self.is_alive() && room_count > 0 {
            self.room = (self.room + 1) % room_count;
        }
    }
}

impl fmt::Display for TargetCharacter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name:{}. RoomIdx:{}. Health:{}.",
            self.name, self.room, self.health
        )
    }
}

/// The target's pet. Wander state lives in [`crate::pet::PetWander`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pet {
    pub name: String,
    pub room: usize,
}
