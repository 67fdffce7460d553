//! Computer player decision policies.
//!
//! An AI player is created with exactly one of two policies:
//!
//! - **Scripted**: a fixed list of actions replayed cyclically. Built from
//!   string tokens such as `["PICKUP_ITEM", "1", "MOVE", "3", "LOOK_AROUND"]`;
//!   every action except `LOOK_AROUND` takes one integer parameter. Each
//!   decision consumes one step, whether or not the engine accepts it.
//! - **Randomized**: attacks whenever it shares the target's room unseen
//!   (strongest carried item first, bare hands otherwise). Otherwise it samples
//!   uniformly among move / pick up / look around / move pet, resampling until
//!   the choice is feasible, and draws the parameter uniformly from the legal
//!   options.
//!
//! Policies never touch the game directly: they read a [`DecisionContext`]
//! snapshot and return an [`Action`], which the engine applies through the same
//! path as a human's action.
//!
//! ```
//! use manor_logic::ai::{Action, ScriptedPolicy};
//!
//! let script = ScriptedPolicy::from_tokens(&["MOVE", "3", "LOOK_AROUND"]).unwrap();
//! assert_eq!(script.actions(), &[Action::Move(3), Action::LookAround]);
//! ```

use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{GameResult, ValidationError};

/// Kinds of action a player can take on their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    Move,
    PickupItem,
    LookAround,
    MovePet,
    Attack,
}

impl ActionType {
    pub fn token(&self) -> &'static str {
        match self {
            ActionType::Move => "MOVE",
            ActionType::PickupItem => "PICKUP_ITEM",
            ActionType::LookAround => "LOOK_AROUND",
            ActionType::MovePet => "MOVE_PET",
            ActionType::Attack => "ATTACK",
        }
    }

    /// Parse a script token (case-insensitive).
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "MOVE" => Some(ActionType::Move),
            "PICKUP_ITEM" => Some(ActionType::PickupItem),
            "LOOK_AROUND" => Some(ActionType::LookAround),
            "MOVE_PET" => Some(ActionType::MovePet),
            "ATTACK" => Some(ActionType::Attack),
            _ => None,
        }
    }

    pub fn needs_parameter(&self) -> bool {
        !matches!(self, ActionType::LookAround)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A concrete action with its parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Move to a neighboring room.
    Move(usize),
    /// Pick up an item lying in the current room.
    PickupItem(usize),
    LookAround,
    /// Relocate the pet to any room.
    MovePet(usize),
    /// Attack the target with a carried item, or bare-handed with `None`.
    Attack(Option<usize>),
}

impl Action {
    pub fn action_type(&self) -> ActionType {
        match self {
            Action::Move(_) => ActionType::Move,
            Action::PickupItem(_) => ActionType::PickupItem,
            Action::LookAround => ActionType::LookAround,
            Action::MovePet(_) => ActionType::MovePet,
            Action::Attack(_) => ActionType::Attack,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move(p) | Action::PickupItem(p) | Action::MovePet(p) => {
                write!(f, "{} {}", self.action_type(), p)
            }
            Action::LookAround => write!(f, "{}", self.action_type()),
            Action::Attack(Some(item)) => write!(f, "{} {}", self.action_type(), item),
            Action::Attack(None) => write!(f, "{} -1", self.action_type()),
        }
    }
}

/// Read-only snapshot of what the acting AI player can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionContext {
    pub room: usize,
    pub target_room: usize,
    /// Whether an attack from `room` right now would go unobserved.
    pub unseen: bool,
    pub neighbors: Vec<usize>,
    pub room_items: Vec<usize>,
    /// Unused carried items as `(item, attack)`, in pickup order.
    pub carried: Vec<(usize, u32)>,
    pub max_items_carried: usize,
    pub room_count: usize,
    pub pet_room: usize,
}

impl DecisionContext {
    fn at_capacity(&self) -> bool {
        self.carried.len() >= self.max_items_carried
    }
}

/// Strongest carried item; the earliest picked up wins ties.
pub fn strongest_item(carried: &[(usize, u32)]) -> Option<usize> {
    carried
        .iter()
        .fold(None::<(usize, u32)>, |best, &(item, attack)| match best {
            Some((_, best_attack)) if best_attack >= attack => best,
            _ => Some((item, attack)),
        })
        .map(|(item, _)| item)
}

// ── Scripted ────────────────────────────────────────────────────────────

/// A validated, cyclically repeating action list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedPolicy {
    actions: Vec<Action>,
    cursor: usize,
}

impl ScriptedPolicy {
    /// Build from already-typed actions.
    pub fn new(actions: Vec<Action>) -> GameResult<Self> {
        if actions.is_empty() {
            return Err(ValidationError::Script("script has no actions".into()).into());
        }
        Ok(Self { actions, cursor: 0 })
    }

    /// Parse `ACTION [param]` tokens. Empty tokens are skipped.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> GameResult<Self> {
        let mut actions = Vec::new();
        let mut iter = tokens
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty());

        while let Some(token) = iter.next() {
            let kind = ActionType::from_token(token).ok_or_else(|| {
                ValidationError::Script(format!("unknown action '{}'", token))
            })?;
            if !kind.needs_parameter() {
                actions.push(Action::LookAround);
                continue;
            }
            let raw = iter.next().ok_or_else(|| {
                ValidationError::Script(format!("{} needs an integer parameter", kind))
            })?;
            let param: i64 = raw.parse().map_err(|_| {
                ValidationError::Script(format!("{} parameter '{}' is not an integer", kind, raw))
            })?;
            actions.push(Self::typed(kind, param)?);
        }
        Self::new(actions)
    }

    fn typed(kind: ActionType, param: i64) -> GameResult<Action> {
        if kind == ActionType::Attack && param == -1 {
            return Ok(Action::Attack(None));
        }
        let idx = usize::try_from(param).map_err(|_| {
            ValidationError::Script(format!("{} parameter {} is negative", kind, param))
        })?;
        Ok(match kind {
            ActionType::Move => Action::Move(idx),
            ActionType::PickupItem => Action::PickupItem(idx),
            ActionType::MovePet => Action::MovePet(idx),
            ActionType::Attack => Action::Attack(Some(idx)),
            ActionType::LookAround => Action::LookAround,
        })
    }

    /// The action the script will play next.
    pub fn peek(&self) -> Action {
        self.actions[self.cursor]
    }

    /// Take the current action and move past it, wrapping to the start.
    pub fn next_action(&mut self) -> Action {
        let action = self.actions[self.cursor];
        self.cursor = (self.cursor + 1) % self.actions.len();
        action
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

// ── Randomized ──────────────────────────────────────────────────────────

/// What random sampling may pick. Attacks only come from the priority rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RandomChoice {
    Move,
    PickupItem,
    LookAround,
    MovePet,
}

const RANDOM_CHOICES: [RandomChoice; 4] = [
    RandomChoice::Move,
    RandomChoice::PickupItem,
    RandomChoice::LookAround,
    RandomChoice::MovePet,
];

/// Priority attack plus constrained uniform sampling.
#[derive(Debug, Clone)]
pub struct RandomizedPolicy {
    rng: StdRng,
}

impl RandomizedPolicy {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn decide(&mut self, ctx: &DecisionContext) -> Action {
        if ctx.room == ctx.target_room && ctx.unseen {
            return Action::Attack(strongest_item(&ctx.carried));
        }

        let pet_targets: Vec<usize> = (0..ctx.room_count)
            .filter(|&r| r != ctx.pet_room)
            .collect();
        loop {
            match RANDOM_CHOICES[self.rng.gen_range(0..RANDOM_CHOICES.len())] {
                RandomChoice::Move => {
                    if let Some(&room) = ctx.neighbors.choose(&mut self.rng) {
                        return Action::Move(room);
                    }
                }
                RandomChoice::PickupItem => {
                    if ctx.at_capacity() {
                        continue;
                    }
                    if let Some(&item) = ctx.room_items.choose(&mut self.rng) {
                        return Action::PickupItem(item);
                    }
                }
                RandomChoice::MovePet => {
                    if let Some(&room) = pet_targets.choose(&mut self.rng) {
                        return Action::MovePet(room);
                    }
                }
                RandomChoice::LookAround => return Action::LookAround,
            }
        }
    }
}

impl Default for RandomizedPolicy {
    fn default() -> Self {
        Self::new()
    }
}

// ── Policy ──────────────────────────────────────────────────────────────

/// The decision policy an AI player is created with.
#[derive(Debug, Clone)]
pub enum DecisionPolicy {
    Scripted(ScriptedPolicy),
    Randomized(RandomizedPolicy),
}

impl DecisionPolicy {
    /// Choose this turn's action. A scripted policy moves on to its next
    /// step even if this one is later rejected.
    pub fn decide(&mut self, ctx: &DecisionContext) -> Action {
        match self {
            DecisionPolicy::Scripted(script) => script.next_action(),
            DecisionPolicy::Randomized(random) => random.decide(ctx),
        }
    }

    pub fn is_scripted(&self) -> bool {
        matches!(self, DecisionPolicy::Scripted(_))
    }
}
