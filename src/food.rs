use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{FOOD_SPAWN_MAX_ATTEMPTS, GridSize};
use crate::snake::{Position, Snake};

/// Strategy used to place a new food cell.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum FoodPlacement {
    /// Draw random cells, rejecting occupied ones, at most `max_attempts`
    /// times. When every draw is rejected the last draw is used anyway.
    BoundedRetry { max_attempts: u32 },
    /// Pick uniformly among all free cells.
    FreeCellScan,
}

impl Default for FoodPlacement {
    fn default() -> Self {
        Self::BoundedRetry {
            max_attempts: FOOD_SPAWN_MAX_ATTEMPTS,
        }
    }
}

/// Picks a food position that is not occupied by the snake.
///
/// Never fails. On a (nearly) full board the placement degrades to a cell
/// that may overlap the snake rather than looping or panicking.
#[must_use]
pub fn spawn_position<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: GridSize,
    snake: &Snake,
    placement: FoodPlacement,
) -> Position {
    match placement {
        FoodPlacement::BoundedRetry { max_attempts } => {
            retry_position(rng, bounds, snake, max_attempts)
        }
        FoodPlacement::FreeCellScan => scan_position(rng, bounds, snake),
    }
}

fn retry_position<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: GridSize,
    snake: &Snake,
    max_attempts: u32,
) -> Position {
    first_free_draw(|| random_cell(&mut *rng, bounds), snake, max_attempts)
}

/// Draws until a cell off the snake turns up or `max_attempts` draws are
/// spent, then returns the last draw. At least one draw is always made.
fn first_free_draw(
    mut draw: impl FnMut() -> Position,
    snake: &Snake,
    max_attempts: u32,
) -> Position {
    let mut candidate = draw();
    let mut attempts = 1;

    while snake.occupies(candidate) && attempts < max_attempts {
        candidate = draw();
        attempts += 1;
    }

    if snake.occupies(candidate) {
        warn!(
            attempts,
            x = candidate.x,
            y = candidate.y,
            "food placement exhausted its retries, food overlaps the snake"
        );
    }

    candidate
}

fn scan_position<R: Rng + ?Sized>(rng: &mut R, bounds: GridSize, snake: &Snake) -> Position {
    let mut candidates = Vec::with_capacity(bounds.total_cells().saturating_sub(snake.len()));

    for y in 0..i32::from(bounds.height) {
        for x in 0..i32::from(bounds.width) {
            let position = Position { x, y };
            if !snake.occupies(position) {
                candidates.push(position);
            }
        }
    }

    if candidates.is_empty() {
        warn!(
            width = bounds.width,
            height = bounds.height,
            "no free cell left for food, placing it on the snake"
        );
        return random_cell(rng, bounds);
    }

    candidates[rng.gen_range(0..candidates.len())]
}

fn random_cell<R: Rng + ?Sized>(rng: &mut R, bounds: GridSize) -> Position {
    Position {
        x: rng.gen_range(0..i32::from(bounds.width)),
        y: rng.gen_range(0..i32::from(bounds.height)),
    }
}
