//! Game engine for a turn-based manor pursuit.
//!
//! Players roam a fixed graph of rectangular rooms, collect weapons and try to
//! attack a target character who walks the rooms in index order. Attacks only
//! land when nobody sees them; the target's pet wanders the house and hides
//! whatever room it is in.
//!
//! The crate is pure logic with no I/O: worlds arrive as strings or
//! [`world::WorldSpec`] values, and every result is a plain return value.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`ai`] | Scripted and randomized decision policies for computer players |
//! | [`config`] | Turn/carry limits, RNG seed and roster entries |
//! | [`constants`] | Wall thickness, bare-handed damage, start rooms |
//! | [`engine`] | The [`Game`] turn state machine |
//! | [`entities`] | Rooms, items, players, target character, pet |
//! | [`error`] | Validation and state errors |
//! | [`geometry`] | Room rectangles, overlap checks, wall-sharing adjacency |
//! | [`pet`] | Depth-first pet wander |
//! | [`registry`] | Room→items, room→players and carried-item tables |
//! | [`report`] | Turn summaries, look-around reports, outcomes |
//! | [`visibility`] | Whether an attacker is observed |
//! | [`world`] | World description and text format loader |

pub mod ai;
pub mod config;
pub mod constants;
pub mod engine;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod pet;
pub mod registry;
pub mod report;
pub mod visibility;
pub mod world;

pub use config::{GameConfig, PlayerSetup, PlayerSetupKind};
pub use engine::Game;
pub use error::{ErrorKind, GameError, GameResult, StateError, ValidationError};
pub use report::{Outcome, TurnEvent, TurnSummary};
pub use world::{parse_world, WorldSpec};
