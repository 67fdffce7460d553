//! Engine error types.
//!
//! Every rejected operation surfaces as a [`GameError`], which is either a
//! [`ValidationError`] (bad input: geometry, indices, capacity, ownership) or a
//! [`StateError`] (the call is not legal in the current session state).
//! Rejections never mutate engine state.

use thiserror::Error;

/// Result alias used by every fallible engine operation.
pub type GameResult<T> = Result<T, GameError>;

/// Coarse error category, for callers that only need to branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    State,
}

/// Top-level engine error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    State(#[from] StateError),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::Validation(_) => ErrorKind::Validation,
            GameError::State(_) => ErrorKind::State,
        }
    }
}

/// Input that can never be accepted, regardless of session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("world format error at line {line}: {reason}")]
    WorldFormat { line: usize, reason: String },
    #[error("invalid world: {0}")]
    InvalidWorld(String),
    #[error("room #{room} is malformed: {reason}")]
    MalformedRoom { room: usize, reason: String },
    #[error("rooms #{a} and #{b} overlap")]
    RoomsOverlap { a: usize, b: usize },
    #[error("item #{item} is invalid: {reason}")]
    InvalidItem { item: usize, reason: String },
    #[error("room index {index} out of range (room count {count})")]
    RoomOutOfRange { index: usize, count: usize },
    #[error("item index {index} out of range (item count {count})")]
    ItemOutOfRange { index: usize, count: usize },
    #[error("player index {index} out of range (player count {count})")]
    PlayerOutOfRange { index: usize, count: usize },
    #[error("room #{room} is the current room")]
    SameRoom { room: usize },
    #[error("room #{to} is not a neighbor of room #{from}")]
    NotAdjacent { from: usize, to: usize },
    #[error("already carrying the maximum of {max} item(s)")]
    AtCapacity { max: usize },
    #[error("item #{item} is not in room #{room}")]
    ItemNotInRoom { item: usize, room: usize },
    #[error("item #{item} is not carried by the current player")]
    ItemNotCarried { item: usize },
    #[error("item #{item} has already been used")]
    ItemAlreadyUsed { item: usize },
    #[error("player roster is empty")]
    EmptyRoster,
    #[error("player name at position {position} is blank")]
    BlankPlayerName { position: usize },
    #[error("player name '{name}' is used more than once")]
    DuplicatePlayerName { name: String },
    #[error("max turn must be at least 1, got {0}")]
    InvalidMaxTurn(u32),
    #[error("max items carried must be between 1 and {total}, got {value}")]
    InvalidMaxItems { value: usize, total: usize },
    #[error("invalid AI script: {0}")]
    Script(String),
}

/// A well-formed call made at the wrong time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("game over")]
    GameOver,
    #[error("game is not over yet")]
    GameNotOver,
    #[error("current player is not human")]
    NotHumanTurn,
    #[error("current player is not AI")]
    NotAiTurn,
    #[error("session is not ready: {0}")]
    NotReady(&'static str),
}
