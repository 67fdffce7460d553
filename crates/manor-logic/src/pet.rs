//! Pet wandering: a depth-first walk over the room graph, one room per turn.
//!
//! The walk keeps an explicit to-visit stack and a visited set. When the stack
//! runs dry the pet's current room becomes the root of a fresh traversal, so the
//! pet keeps circling the graph forever. Neighbors are pushed in descending
//! index order so the lowest-indexed neighbor is visited first, which makes the
//! whole visit sequence reproducible for a given graph and start room.
//!
//! Moving the pet by hand discards the traversal ([`PetWander::reset`]).

use std::collections::BTreeSet;

use crate::geometry::AdjacencyTable;

/// Traversal state of the pet's walk.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PetWander {
    /// No traversal in progress; the next step roots one at the pet's room.
    #[default]
    NeedsRoot,
    InProgress {
        stack: Vec<usize>,
        visited: BTreeSet<usize>,
    },
}

impl PetWander {
    pub fn new() -> Self {
        Self::NeedsRoot
    }

    /// Forget the current traversal.
    pub fn reset(&mut self) {
        *self = Self::NeedsRoot;
    }

    /// Advance one step from `current`. Returns the room the pet moves to, or
    /// `None` if the pet's room has no neighbors and it stays put.
    pub fn step(&mut self, adjacency: &AdjacencyTable, current: usize) -> Option<usize> {
        let (mut stack, mut visited) = match std::mem::take(self) {
            PetWander::InProgress { stack, visited } if !stack.is_empty() => (stack, visited),
            _ => {
                let mut visited = BTreeSet::new();
                visited.insert(current);
                let stack: Vec<usize> = adjacency
                    .neighbors(current)
                    .iter()
                    .rev()
                    .copied()
                    .filter(|n| !visited.contains(n))
                    .collect();
                (stack, visited)
            }
        };

        let next = stack.pop()?;
        visited.insert(next);
        for &n in adjacency.neighbors(next).iter().rev() {
            if !visited.contains(&n) && !stack.contains(&n) {
                stack.push(n);
            }
        }

        if !stack.is_empty() {
            *self = PetWander::InProgress { stack, visited };
        }
        Some(next)
    }
}
