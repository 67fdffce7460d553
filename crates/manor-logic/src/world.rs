//! World description and its text loader.
//!
//! A [`WorldSpec`] is the already-parsed description the engine is built from.
//! It can come from JSON (`serde`) or from the line-oriented world file format:
//!
//! ```text
//! <rows> <cols> <world name...>
//! <health> <target name...>
//! <pet name...>
//! <room count>
//! <top> <left> <bottom> <right> <room name...>   (one line per room)
//! <item count>
//! <room index> <attack> <item name...>           (one line per item)
//! ```
//!
//! ```
//! use manor_logic::world::parse_world;
//!
//! let text = "20 28 Gravity Falls\n50 Bravo Mabel\nFortune the Cat\n\
//!             2\n0 0 3 3 Tombstone\n0 4 5 7 Hell's Kitchen\n\
//!             1\n0 3 Crepe Pan\n";
//! let world = parse_world(text).unwrap();
//! assert_eq!(world.rooms.len(), 2);
//! assert_eq!(world.items[0].name, "Crepe Pan");
//! ```
//!
//! Parsing only checks the format. Semantic checks (overlaps, index ranges,
//! positive values) happen when a [`crate::engine::Game`] is built.

use serde::{Deserialize, Serialize};

use crate::error::{GameResult, ValidationError};
use crate::geometry::RoomRect;

/// Target character as described by the world file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub name: String,
    pub health: u32,
}

/// One room: rectangle plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSpec {
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
    pub name: String,
}

impl RoomSpec {
    pub fn rect(&self) -> RoomRect {
        RoomRect::new(self.top, self.left, self.bottom, self.right)
    }
}

/// One item: owning room, attack value, display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub room: usize,
    pub attack: u32,
    pub name: String,
}

/// Complete static description of a world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSpec {
    pub name: String,
    pub rows: u32,
    pub cols: u32,
    pub target: TargetSpec,
    pub pet_name: String,
    pub rooms: Vec<RoomSpec>,
    pub items: Vec<ItemSpec>,
}

impl WorldSpec {
    /// Deserialize a world from JSON.
    pub fn from_json(json: &str) -> GameResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            ValidationError::WorldFormat {
                line: e.line(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

/// Line cursor that remembers the 1-based line number for error messages.
struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    current: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.lines().enumerate(),
            current: 0,
        }
    }

    /// Next line split on whitespace; blank lines are an error.
    fn next_fields(&mut self, what: &str, min_fields: usize) -> GameResult<Vec<&'a str>> {
        let (idx, line) = self.inner.next().ok_or_else(|| ValidationError::WorldFormat {
            line: self.current + 1,
            reason: format!("missing {}", what),
        })?;
        self.current = idx + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < min_fields {
            return Err(self.error(format!(
                "{} needs at least {} field(s), found {}",
                what,
                min_fields,
                fields.len()
            )));
        }
        Ok(fields)
    }

    fn error(&self, reason: String) -> crate::error::GameError {
        ValidationError::WorldFormat {
            line: self.current,
            reason,
        }
        .into()
    }

    fn int<T: std::str::FromStr>(&self, field: &str, what: &str) -> GameResult<T> {
        field
            .parse::<T>()
            .map_err(|_| self.error(format!("{} '{}' is not a valid integer", what, field)))
    }
}

/// Join the name fields back together with single spaces.
fn name_from(fields: &[&str]) -> String {
    fields.join(" ")
}

/// Parse the text world format into a [`WorldSpec`].
pub fn parse_world(text: &str) -> GameResult<WorldSpec> {
    let mut lines = Lines::new(text);

    let header = lines.next_fields("world header", 3)?;
    let rows = lines.int(header[0], "world rows")?;
    let cols = lines.int(header[1], "world columns")?;
    let name = name_from(&header[2..]);

    let target = lines.next_fields("target character", 2)?;
    let health = lines.int(target[0], "target health")?;
    let target = TargetSpec {
        name: name_from(&target[1..]),
        health,
    };

    let pet = lines.next_fields("pet name", 1)?;
    let pet_name = name_from(&pet);

    let count = lines.next_fields("room count", 1)?;
    let room_count: usize = lines.int(count[0], "room count")?;
    let mut rooms = Vec::new();
    for _ in 0..room_count {
        let f = lines.next_fields("room", 5)?;
        rooms.push(RoomSpec {
            top: lines.int(f[0], "room top")?,
            left: lines.int(f[1], "room left")?,
            bottom: lines.int(f[2], "room bottom")?,
            right: lines.int(f[3], "room right")?,
            name: name_from(&f[4..]),
        });
    }

    let count = lines.next_fields("item count", 1)?;
    let item_count: usize = lines.int(count[0], "item count")?;
    let mut items = Vec::new();
    for _ in 0..item_count {
        let f = lines.next_fields("item", 3)?;
        items.push(ItemSpec {
            room: lines.int(f[0], "item room")?,
            attack: lines.int(f[1], "item attack")?,
            name: name_from(&f[2..]),
        });
    }

    Ok(WorldSpec {
        name,
        rows,
        cols,
        target,
        pet_name,
        rooms,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;

    const TWO_ROOMS: &str = "20 28 Gravity Falls\n\
                             50 Bravo Mabel\n\
                             Fortune the Cat\n\
                             2\n \
                             0  0  3  3 Tombstone\n \
                             0  4  5  7 Hell's Kitchen\n\
                             2\n\
                             0 3 Crepe Pan\n\
                             1 2 Letter Opener\n";

    #[test]
    fn test_parse_two_room_world() {
        let w = parse_world(TWO_ROOMS).unwrap();
        assert_eq!(w.name, "Gravity Falls");
        assert_eq!((w.rows, w.cols), (20, 28));
        assert_eq!(w.target.name, "Bravo Mabel");
        assert_eq!(w.target.health, 50);
        assert_eq!(w.pet_name, "Fortune the Cat");
        assert_eq!(w.rooms[1].name, "Hell's Kitchen");
        assert_eq!(w.rooms[1].rect(), RoomRect::new(0, 4, 5, 7));
        assert_eq!(w.items[1].room, 1);
        assert_eq!(w.items[1].attack, 2);
    }

    #[test]
    fn test_missing_items_section() {
        let text = "20 28 Gravity Falls\n50 Bravo Mabel\nFortune the Cat\n1\n0 0 3 3 Tombstone\n";
        let err = parse_world(text).unwrap_err();
        assert!(matches!(
            err,
            GameError::Validation(ValidationError::WorldFormat { line: 6, .. })
        ));
    }

    #[test]
    fn test_huge_counts_are_format_errors() {
        let rooms = "10 10 W\n5 T\nP\n18446744073709551615\n";
        assert!(matches!(
            parse_world(rooms),
            Err(GameError::Validation(ValidationError::WorldFormat { .. }))
        ));
        let items = "10 10 W\n5 T\nP\n1\n0 0 3 3 A\n18446744073709551615\n";
        assert!(matches!(
            parse_world(items),
            Err(GameError::Validation(ValidationError::WorldFormat { .. }))
        ));
    }

    #[test]
    fn test_header_without_height() {
        let err = parse_world(" 28 Gravity Falls\n").unwrap_err();
        assert!(err.to_string().contains("line 1"), "{}", err);
    }

    #[test]
    fn test_non_integer_field() {
        let text = "20 28 Gravity Falls\nlots Bravo Mabel\n";
        let err = parse_world(text).unwrap_err();
        assert!(err.to_string().contains("target health"), "{}", err);
    }

    #[test]
    fn test_json_round_trip_keeps_world() {
        let w = parse_world(TWO_ROOMS).unwrap();
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(WorldSpec::from_json(&json).unwrap(), w);
    }
}
