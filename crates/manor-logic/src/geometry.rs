//! Room geometry: overlap and wall-sharing adjacency.
//!
//! Rooms are axis-aligned rectangles on an integer grid, given as inclusive
//! `top`/`left`/`bottom`/`right` coordinates. Two rooms are adjacent when they
//! are separated by exactly one wall on one axis and their spans overlap on the
//! other axis. Touching only at a corner is not adjacency.
//!
//! The adjacency table is computed once for every pair and never changes.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Inclusive room rectangle in grid coordinates (row = vertical, col = horizontal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRect {
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
}

impl RoomRect {
    pub fn new(top: i32, left: i32, bottom: i32, right: i32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Number of grid columns covered.
    pub fn width(&self) -> i32 {
        self.right - self.left + 1
    }

    /// Number of grid rows covered.
    pub fn height(&self) -> i32 {
        self.bottom - self.top + 1
    }

    /// True iff the interiors intersect strictly on both axes.
    pub fn overlaps(&self, other: &RoomRect) -> bool {
        other.bottom > self.top
            && other.top < self.bottom
            && other.right > self.left
            && other.left < self.right
    }

    /// True iff the rooms share a wall of the given thickness.
    pub fn adjacent(&self, other: &RoomRect, thickness: i32) -> bool {
        let rows_overlap = self.top <= other.bottom && self.bottom >= other.top;
        let cols_overlap = self.left <= other.right && self.right >= other.left;

        let side_by_side =
            self.left - thickness == other.right || other.left - thickness == self.right;
        let stacked = self.top - thickness == other.bottom || other.top - thickness == self.bottom;

        (side_by_side && rows_overlap) || (stacked && cols_overlap)
    }
}

// ── Validation ──────────────────────────────────────────────────────────

/// Check that every room has non-negative corners and positive extent.
pub fn check_room_shapes(rooms: &[RoomRect]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (idx, r) in rooms.iter().enumerate() {
        if r.top < 0 || r.left < 0 || r.bottom < 0 || r.right < 0 {
            errors.push(ValidationError::MalformedRoom {
                room: idx,
                reason: format!(
                    "negative coordinate in ({},{})→({},{})",
                    r.top, r.left, r.bottom, r.right
                ),
            });
        } else if r.top >= r.bottom || r.left >= r.right {
            errors.push(ValidationError::MalformedRoom {
                room: idx,
                reason: format!(
                    "top-left ({},{}) must be above and left of bottom-right ({},{})",
                    r.top, r.left, r.bottom, r.right
                ),
            });
        }
    }
    errors
}

/// Pairwise overlap test over all rooms.
pub fn check_room_overlaps(rooms: &[RoomRect]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for i in 0..rooms.len() {
        for j in (i + 1)..rooms.len() {
            if rooms[i].overlaps(&rooms[j]) {
                errors.push(ValidationError::RoomsOverlap { a: i, b: j });
            }
        }
    }
    errors
}

/// Run all room validations and return combined results.
pub fn validate_rooms(rooms: &[RoomRect]) -> Vec<ValidationError> {
    let mut all = check_room_shapes(rooms);
    all.extend(check_room_overlaps(rooms));
    all
}

// ── Adjacency ───────────────────────────────────────────────────────────

/// Symmetric, immutable room adjacency. Neighbor lists are sorted by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyTable {
    neighbors: Vec<Vec<usize>>,
}

impl AdjacencyTable {
    /// Compute adjacency for every pair of rooms.
    pub fn build(rooms: &[RoomRect], thickness: i32) -> Self {
        let mut neighbors = vec![Vec::new(); rooms.len()];
        for i in 0..rooms.len() {
            for j in (i + 1)..rooms.len() {
                if rooms[i].adjacent(&rooms[j], thickness) {
                    neighbors[i].push(j);
                    neighbors[j].push(i);
                }
            }
        }
        // i < j pushes keep each list ascending already
        Self { neighbors }
    }

    /// Neighbors of a room; empty for isolated or unknown rooms.
    pub fn neighbors(&self, room: usize) -> &[usize] {
        self.neighbors.get(room).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        self.neighbors(a).binary_search(&b).is_ok()
    }

    pub fn room_count(&self) -> usize {
        self.neighbors.len()
    }
}
