use std::collections::VecDeque;
use std::collections::vec_deque::Iter;

use serde::{Deserialize, Serialize};

use crate::config::GridSize;
use crate::error::Error;
use crate::input::Direction;

/// Grid position in logical cell coordinates.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns true when the position lies inside the bounds.
    #[must_use]
    pub fn is_within_bounds(self, bounds: GridSize) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x < i32::from(bounds.width)
            && self.y < i32::from(bounds.height)
    }

    /// Returns this position wrapped into bounds on both axes.
    #[must_use]
    pub fn wrapped(self, bounds: GridSize) -> Self {
        Self {
            x: wrap_axis(self.x, i32::from(bounds.width)),
            y: wrap_axis(self.y, i32::from(bounds.height)),
        }
    }

    /// Returns the neighbouring cell one step towards `direction`, unwrapped.
    #[must_use]
    pub fn stepped(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Plain (non-wrapping) Manhattan distance.
    #[must_use]
    pub fn manhattan_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

fn wrap_axis(value: i32, upper_bound: i32) -> i32 {
    let wrapped = value % upper_bound;
    if wrapped < 0 {
        wrapped + upper_bound
    } else {
        wrapped
    }
}

/// Head position after one step from `head` towards `direction`.
///
/// The board is a torus: leaving one edge re-enters on the opposite edge.
#[must_use]
pub fn next_head_position(head: Position, direction: Direction, bounds: GridSize) -> Position {
    head.stepped(direction).wrapped(bounds)
}

/// Returns true iff the first segment equals any later one.
#[must_use]
pub fn check_self_collision(segments: &[Position]) -> bool {
    match segments.split_first() {
        Some((head, rest)) => rest.contains(head),
        None => false,
    }
}

/// Snake body, head first. Never empty.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Position>", into = "Vec<Position>")]
pub struct Snake {
    body: VecDeque<Position>,
}

impl Snake {
    /// Creates a one-cell snake at `head`.
    #[must_use]
    pub fn new(head: Position) -> Self {
        Self {
            body: VecDeque::from([head]),
        }
    }

    /// Creates a snake from explicit body segments (front is head).
    pub fn from_segments(segments: Vec<Position>) -> Result<Self, Error> {
        if segments.is_empty() {
            return Err(Error::EmptySnake);
        }

        Ok(Self {
            body: VecDeque::from(segments),
        })
    }

    /// Returns a copy moved onto `new_head`, keeping the tail when `grow` is set.
    #[must_use]
    pub fn advanced(&self, new_head: Position, grow: bool) -> Self {
        let mut body = self.body.clone();
        body.push_front(new_head);
        if !grow {
            let _ = body.pop_back();
        }

        Self { body }
    }

    /// Returns true when a head moved onto `next` would strike the current body.
    ///
    /// Same answer as `check_self_collision` over `[next, ..segments]`; the
    /// tail counts even though it would move away this tick.
    #[must_use]
    pub fn would_collide(&self, next: Position) -> bool {
        self.occupies(next)
    }

    /// Returns the current head position.
    #[must_use]
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Returns true if any segment occupies `position`.
    #[must_use]
    pub fn occupies(&self, position: Position) -> bool {
        self.body.contains(&position)
    }

    /// Returns current segment count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true when the body has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Iterates over body segments from head to tail.
    pub fn segments(&self) -> Iter<'_, Position> {
        self.body.iter()
    }

    /// Returns the segments as an owned vector, head first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Position> {
        self.body.iter().copied().collect()
    }
}

impl TryFrom<Vec<Position>> for Snake {
    type Error = Error;

    fn try_from(segments: Vec<Position>) -> Result<Self, Self::Error> {
        Self::from_segments(segments)
    }
}

impl From<Snake> for Vec<Position> {
    fn from(snake: Snake) -> Self {
        snake.body.into()
    }
}
