//! Turn log and text reports.
//!
//! Every applied action produces a [`TurnSummary`]: the acting player, the
//! action, and the ordered [`TurnEvent`]s it caused (the action's effect, then
//! target and pet movement, then either the hand-over to the next player or the
//! end of the game). Look-around actions also carry a [`LookAroundReport`].
//!
//! Summaries are plain values built by the engine; their `Display` output is
//! deterministic and independent of any logger.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ai::Action;

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The target was killed by the player at this roster index.
    Winner(usize),
    /// The turn limit ran out with the target alive.
    NoWinner,
}

/// What an attack was made with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Weapon {
    BareHands,
    Item { index: usize, name: String },
}

impl fmt::Display for Weapon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weapon::BareHands => write!(f, "bare hands"),
            Weapon::Item { index, name } => write!(f, "item #{} {}", index, name),
        }
    }
}

/// One thing that happened during a turn, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    Moved {
        from: usize,
        to: usize,
        room_name: String,
    },
    PickedUp {
        item: usize,
        name: String,
        attack: u32,
    },
    LookedAround,
    PetRelocated {
        to: usize,
        room_name: String,
    },
    AttackLanded {
        weapon: Weapon,
        damage: u32,
        health: u32,
    },
    AttackSeen {
        weapon: Weapon,
    },
    ItemUsedUp {
        item: usize,
        name: String,
    },
    TargetMoved {
        from: usize,
        to: usize,
    },
    PetWandered {
        to: usize,
    },
    /// The pet's room has no neighbors.
    PetStayed {
        room: usize,
    },
    NextPlayer {
        turn: u32,
        player: String,
    },
    GameEnded(String),
}

impl fmt::Display for TurnEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnEvent::Moved {
                from,
                to,
                room_name,
            } => write!(f, "moved from room #{} to room #{} {}", from, to, room_name),
            TurnEvent::PickedUp { item, name, attack } => {
                write!(f, "picked up item #{} {} (atk:{})", item, name, attack)
            }
            TurnEvent::LookedAround => write!(f, "looked around"),
            TurnEvent::PetRelocated { to, room_name } => {
                write!(f, "moved the pet to room #{} {}", to, room_name)
            }
            TurnEvent::AttackLanded {
                weapon,
                damage,
                health,
            } => write!(
                f,
                "attacked with {} for {} damage, target health now {}",
                weapon, damage, health
            ),
            TurnEvent::AttackSeen { weapon } => {
                write!(f, "attack with {} failed for being seen by others", weapon)
            }
            TurnEvent::ItemUsedUp { item, name } => {
                write!(f, "item #{} {} is used up", item, name)
            }
            TurnEvent::TargetMoved { from, to } => {
                write!(f, "target moved from room #{} to room #{}", from, to)
            }
            TurnEvent::PetWandered { to } => write!(f, "pet wandered to room #{}", to),
            TurnEvent::PetStayed { room } => write!(f, "pet stayed in room #{}", room),
            TurnEvent::NextPlayer { turn, player } => {
                write!(f, "turn {} goes to {}", turn, player)
            }
            TurnEvent::GameEnded(result) => f.write_str(result),
        }
    }
}

/// Disclosed contents of one room.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoomContents {
    pub items: Vec<(usize, String)>,
    pub players: Vec<String>,
    pub target: Option<String>,
    pub pet: Option<String>,
}

/// A room as seen by a look-around. `contents` is `None` when the pet hides it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomReport {
    pub index: usize,
    pub name: String,
    pub contents: Option<RoomContents>,
}

impl RoomReport {
    pub fn is_concealed(&self) -> bool {
        self.contents.is_none()
    }
}

impl fmt::Display for RoomReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Room index:{}. Name:{}.", self.index, self.name)?;
        let Some(c) = &self.contents else {
            return writeln!(f, "--Contents hidden by the pet");
        };
        if !c.items.is_empty() {
            writeln!(f, "--{} items are in the room:", c.items.len())?;
            for (idx, name) in &c.items {
                writeln!(f, "\t#{} {}", idx, name)?;
            }
        }
        if let Some(target) = &c.target {
            writeln!(f, "--Target character is in the room:\n\t{}", target)?;
        }
        if let Some(pet) = &c.pet {
            writeln!(f, "--Pet is in the room:\n\t{}", pet)?;
        }
        if !c.players.is_empty() {
            writeln!(f, "--{} players are in the room:", c.players.len())?;
            for name in &c.players {
                writeln!(f, "\t{}", name)?;
            }
        }
        Ok(())
    }
}

/// The acting player's room plus each neighbor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookAroundReport {
    pub current: RoomReport,
    pub neighbors: Vec<RoomReport>,
}

impl fmt::Display for LookAroundReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "The room current player is in:")?;
        write!(f, "{}", self.current)?;
        if self.neighbors.is_empty() {
            return writeln!(f, "No neighbor rooms.");
        }
        writeln!(f, "Neighbor rooms:")?;
        for n in &self.neighbors {
            write!(f, "{}", n)?;
        }
        Ok(())
    }
}

/// Record of one applied action and its consequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnSummary {
    pub turn: u32,
    pub player: String,
    pub action: Action,
    pub events: Vec<TurnEvent>,
    pub look: Option<LookAroundReport>,
}

impl TurnSummary {
    pub fn ended_game(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, TurnEvent::GameEnded(_)))
    }
}

impl fmt::Display for TurnSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Round {}: {} plays {}", self.turn, self.player, self.action)?;
        for event in &self.events {
            writeln!(f, "- {}", event)?;
        }
        if let Some(look) = &self.look {
            write!(f, "{}", look)?;
        }
        Ok(())
    }
}
