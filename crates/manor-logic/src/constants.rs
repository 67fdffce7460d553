//! Fixed game constants.

/// Distance between two rooms that share a wall.
pub const WALL_THICKNESS: i32 = 1;

/// Damage dealt by the bare-handed attack ("poke eyes").
pub const POKE_EYES_DAMAGE: u32 = 1;

/// Room the target character starts in.
pub const TARGET_START_ROOM: usize = 0;

/// Room the pet starts in.
pub const PET_START_ROOM: usize = 0;

/// First turn number of a session.
pub const FIRST_TURN: u32 = 1;
