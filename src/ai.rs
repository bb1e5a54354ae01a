//! Greedy single-step controller used for unattended (spectator) play.
//!
//! The controller is memoryless and only looks one move ahead, so it can and
//! will trap itself. It exists to produce watchable play, not optimal paths.

use std::cmp::Ordering;

use crate::config::GridSize;
use crate::input::{Direction, direction_change_is_valid};
use crate::snake::{Position, Snake, next_head_position};

/// Outcome of evaluating one candidate heading.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MoveAssessment {
    /// The move is collision-free; `distance` is the Manhattan distance from
    /// the new head to the food.
    Feasible { distance: u32 },
    /// The move strikes the current body.
    Infeasible,
}

impl Ord for MoveAssessment {
    /// Greater is better: any feasible move beats an infeasible one, and a
    /// shorter distance beats a longer one.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Infeasible, Self::Infeasible) => Ordering::Equal,
            (Self::Infeasible, Self::Feasible { .. }) => Ordering::Less,
            (Self::Feasible { .. }, Self::Infeasible) => Ordering::Greater,
            (Self::Feasible { distance: a }, Self::Feasible { distance: b }) => b.cmp(a),
        }
    }
}

impl PartialOrd for MoveAssessment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Scores moving the head of `snake` one step towards `direction`.
#[must_use]
pub fn assess_move(
    snake: &Snake,
    food: Position,
    direction: Direction,
    bounds: GridSize,
) -> MoveAssessment {
    let next = next_head_position(snake.head(), direction, bounds);
    if snake.would_collide(next) {
        return MoveAssessment::Infeasible;
    }

    MoveAssessment::Feasible {
        distance: next.manhattan_distance(food),
    }
}

/// Picks the next heading for a non-human player.
///
/// Candidates are every heading except the reversal of `current`, visited in
/// `Direction::ALL` order; the first best-scoring one wins. When every
/// candidate is infeasible, `current` is kept.
#[must_use]
pub fn choose_direction(
    snake: &Snake,
    food: Position,
    current: Direction,
    bounds: GridSize,
) -> Direction {
    let mut best: Option<(Direction, MoveAssessment)> = None;

    for candidate in Direction::ALL {
        if !direction_change_is_valid(current, candidate) {
            continue;
        }

        let assessment = assess_move(snake, food, candidate, bounds);
        let improves = match best {
            None => true,
            Some((_, best_assessment)) => assessment > best_assessment,
        };
        if improves {
            best = Some((candidate, assessment));
        }
    }

    match best {
        Some((direction, MoveAssessment::Feasible { .. })) => direction,
        _ => current,
    }
}
