//! Session configuration: turn limit, carry limit, RNG seed and the roster.
//!
//! ```
//! use manor_logic::config::{validate_config, GameConfig};
//!
//! let config = GameConfig { max_turn: 30, max_items_carried: 3, seed: Some(7) };
//! assert!(validate_config(&config, 10).is_empty());
//! assert_eq!(validate_config(&config, 2).len(), 1); // can't carry 3 of 2 items
//! ```

use serde::{Deserialize, Serialize};

use crate::ai::{DecisionPolicy, RandomizedPolicy, ScriptedPolicy};
use crate::entities::Player;
use crate::error::{GameResult, ValidationError};

/// Limits for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Last playable turn (≥ 1).
    pub max_turn: u32,
    /// Carry limit per player (1 ..= total items).
    pub max_items_carried: usize,
    /// Seed for randomized AI players. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_turn: 20,
            max_items_carried: 2,
            seed: None,
        }
    }
}

/// Validate a configuration against a world with `total_items` items,
/// returning every problem found.
pub fn validate_config(config: &GameConfig, total_items: usize) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if let Err(e) = check_max_turn(config.max_turn) {
        errors.push(e);
    }
    if let Err(e) = check_max_items(config.max_items_carried, total_items) {
        errors.push(e);
    }
    errors
}

pub(crate) fn check_max_turn(max_turn: u32) -> Result<(), ValidationError> {
    if max_turn < 1 {
        return Err(ValidationError::InvalidMaxTurn(max_turn));
    }
    Ok(())
}

pub(crate) fn check_max_items(value: usize, total: usize) -> Result<(), ValidationError> {
    if value < 1 || value > total {
        return Err(ValidationError::InvalidMaxItems { value, total });
    }
    Ok(())
}

/// How a roster entry is controlled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerSetupKind {
    Human,
    /// Randomized computer player.
    Ai,
    /// Computer player replaying `ACTION [param]` tokens.
    ScriptedAi(Vec<String>),
}

/// One roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSetup {
    pub name: String,
    pub start_room: usize,
    pub kind: PlayerSetupKind,
}

impl PlayerSetup {
    pub fn human(name: impl Into<String>, start_room: usize) -> Self {
        Self {
            name: name.into(),
            start_room,
            kind: PlayerSetupKind::Human,
        }
    }

    pub fn ai(name: impl Into<String>, start_room: usize) -> Self {
        Self {
            name: name.into(),
            start_room,
            kind: PlayerSetupKind::Ai,
        }
    }

    pub fn scripted<S: AsRef<str>>(name: impl Into<String>, start_room: usize, tokens: &[S]) -> Self {
        Self {
            name: name.into(),
            start_room,
            kind: PlayerSetupKind::ScriptedAi(tokens.iter().map(|t| t.as_ref().to_string()).collect()),
        }
    }

    pub fn is_ai(&self) -> bool {
        !matches!(self.kind, PlayerSetupKind::Human)
    }
}

/// Validate a roster and build the players. `seed` derives one RNG per
/// randomized player from its roster position.
pub fn build_roster(
    roster: &[PlayerSetup],
    room_count: usize,
    seed: Option<u64>,
) -> GameResult<Vec<Player>> {
    if roster.is_empty() {
        return Err(ValidationError::EmptyRoster.into());
    }
    let mut players = Vec::with_capacity(roster.len());
    for (position, entry) in roster.iter().enumerate() {
        let name = entry.name.trim();
        if name.is_empty() {
            return Err(ValidationError::BlankPlayerName { position }.into());
        }
        if roster[..position].iter().any(|p| p.name.trim() == name) {
            return Err(ValidationError::DuplicatePlayerName {
                name: name.to_string(),
            }
            .into());
        }
        if entry.start_room >= room_count {
            return Err(ValidationError::RoomOutOfRange {
                index: entry.start_room,
                count: room_count,
            }
            .into());
        }
        let player = match &entry.kind {
            PlayerSetupKind::Human => Player::human(name, entry.start_room),
            PlayerSetupKind::Ai => {
                let policy = match seed {
                    Some(s) => RandomizedPolicy::seeded(s.wrapping_add(position as u64)),
                    None => RandomizedPolicy::new(),
                };
                Player::ai(name, entry.start_room, DecisionPolicy::Randomized(policy))
            }
            PlayerSetupKind::ScriptedAi(tokens) => {
                let script = ScriptedPolicy::from_tokens(tokens.as_slice())?;
                Player::ai(name, entry.start_room, DecisionPolicy::Scripted(script))
            }
        };
        players.push(player);
    }
    Ok(players)
}
