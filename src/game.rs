use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ai;
use crate::config::{GridSize, POINTS_PER_FOOD};
use crate::food::{self, FoodPlacement};
use crate::input::{Direction, direction_change_is_valid};
use crate::snake::{Position, Snake, next_head_position};

/// Current high-level gameplay state.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Running,
    Paused,
    GameOver,
}

/// Immutable snapshot of one game at one tick.
///
/// Every transition returns a new value; nothing here mutates in place.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub snake: Snake,
    pub food: Position,
    /// Heading applied on the last tick.
    pub direction: Direction,
    /// Heading requested for the upcoming tick.
    pub next_direction: Direction,
    pub score: u32,
    pub status: GameStatus,
}

impl GameState {
    /// Fixed starting snapshot: a three-segment snake centred on the board
    /// heading right, food in the lower-right quadrant.
    ///
    /// On the default 20x20 board this is `[(10,10), (9,10), (8,10)]` with
    /// food at `(15,15)`.
    #[must_use]
    pub fn initial(bounds: GridSize) -> Self {
        let cx = i32::from(bounds.width / 2);
        let cy = i32::from(bounds.height / 2);
        let snake = Snake::new(Position::new(cx - 2, cy))
            .advanced(Position::new(cx - 1, cy), true)
            .advanced(Position::new(cx, cy), true);

        Self {
            snake,
            food: Position::new(
                i32::from(bounds.width) * 3 / 4,
                i32::from(bounds.height) * 3 / 4,
            ),
            direction: Direction::Right,
            next_direction: Direction::Right,
            score: 0,
            status: GameStatus::Running,
        }
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    /// Returns a copy with `requested` buffered for the next tick.
    ///
    /// A reversal of the applied heading is silently ignored, as is any
    /// request once the game is over. Later requests overwrite earlier ones.
    #[must_use]
    pub fn with_requested_direction(&self, requested: Direction) -> Self {
        if self.is_game_over() || !direction_change_is_valid(self.direction, requested) {
            return self.clone();
        }

        Self {
            next_direction: requested,
            ..self.clone()
        }
    }

    /// Returns a copy with `next_direction` set without validation.
    ///
    /// Used by the heuristic controller, which never picks a reversal.
    #[must_use]
    pub fn with_next_direction(&self, next_direction: Direction) -> Self {
        Self {
            next_direction,
            ..self.clone()
        }
    }

    /// Returns a copy with pause toggled. Has no effect once the game is over.
    #[must_use]
    pub fn with_pause_toggled(&self) -> Self {
        let status = match self.status {
            GameStatus::Running => GameStatus::Paused,
            GameStatus::Paused => GameStatus::Running,
            GameStatus::GameOver => GameStatus::GameOver,
        };

        Self {
            status,
            ..self.clone()
        }
    }
}

/// Board size and scoring rules one engine plays by.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Rules {
    pub grid: GridSize,
    pub points_per_food: u32,
    pub food_placement: FoodPlacement,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            grid: GridSize::default(),
            points_per_food: POINTS_PER_FOOD,
            food_placement: FoodPlacement::default(),
        }
    }
}

/// Tick engine: advances snapshots under a fixed set of rules.
///
/// The random source only feeds food placement.
#[derive(Debug, Clone)]
pub struct Engine<R = StdRng> {
    rules: Rules,
    rng: R,
}

impl Engine<StdRng> {
    /// Creates an engine seeded from OS entropy.
    #[must_use]
    pub fn new(rules: Rules) -> Self {
        Self::with_rng(rules, StdRng::from_entropy())
    }

    /// Creates a deterministic engine for tests and reproducible simulations.
    #[must_use]
    pub fn with_seed(rules: Rules, seed: u64) -> Self {
        Self::with_rng(rules, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Engine<R> {
    #[must_use]
    pub fn with_rng(rules: Rules, rng: R) -> Self {
        Self { rules, rng }
    }

    #[must_use]
    pub fn initial_state(&self) -> GameState {
        GameState::initial(self.rules.grid)
    }

    /// Advances `state` by one tick and returns the resulting snapshot.
    ///
    /// Paused and finished games come back unchanged. A move into any current
    /// body cell ends the game with snake, food and score frozen.
    pub fn tick(&mut self, state: &GameState) -> GameState {
        if state.status != GameStatus::Running {
            return state.clone();
        }

        let direction = state.next_direction;
        let new_head = next_head_position(state.snake.head(), direction, self.rules.grid);

        if state.snake.would_collide(new_head) {
            info!(score = state.score, length = state.snake.len(), "game over");
            return GameState {
                status: GameStatus::GameOver,
                ..state.clone()
            };
        }

        let (snake, food, score) = if new_head == state.food {
            let snake = state.snake.advanced(new_head, true);
            let food = food::spawn_position(
                &mut self.rng,
                self.rules.grid,
                &snake,
                self.rules.food_placement,
            );
            let score = state.score.saturating_add(self.rules.points_per_food);
            debug!(score, length = snake.len(), "food eaten");
            (snake, food, score)
        } else {
            (state.snake.advanced(new_head, false), state.food, state.score)
        };

        GameState {
            snake,
            food,
            direction,
            next_direction: state.next_direction,
            score,
            status: GameStatus::Running,
        }
    }

    /// Heading the heuristic controller would pick for `state`.
    #[must_use]
    pub fn ai_direction(&self, state: &GameState) -> Direction {
        ai::choose_direction(&state.snake, state.food, state.direction, self.rules.grid)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GridSize;
    use crate::input::Direction;
    use crate::snake::{Position, Snake};

    use super::{Engine, GameState, GameStatus, Rules};

    fn engine(seed: u64) -> Engine {
        Engine::with_seed(Rules::default(), seed)
    }

    fn state_with(snake: Vec<Position>, food: Position, direction: Direction) -> GameState {
        GameState {
            snake: Snake::from_segments(snake).expect("non-empty"),
            food,
            direction,
            next_direction: direction,
            score: 0,
            status: GameStatus::Running,
        }
    }

    #[test]
    fn initial_state_matches_fixed_layout() {
        let state = GameState::initial(GridSize::default());

        assert_eq!(
            state.snake.to_vec(),
            vec![Position::new(10, 10), Position::new(9, 10), Position::new(8, 10)]
        );
        assert_eq!(state.food, Position::new(15, 15));
        assert_eq!(state.direction, Direction::Right);
        assert_eq!(state.next_direction, Direction::Right);
        assert_eq!(state.score, 0);
        assert_eq!(state.status, GameStatus::Running);
    }

    #[test]
    fn initial_food_is_off_the_snake_on_small_boards() {
        for side in 4..12 {
            let state = GameState::initial(GridSize::new(side, side).expect("valid grid"));
            assert!(!state.snake.occupies(state.food), "side {side}");
        }
    }

    #[test]
    fn paused_and_finished_states_are_left_unchanged() {
        let mut engine = engine(1);
        let running = engine.initial_state();

        let paused = running.with_pause_toggled();
        assert_eq!(engine.tick(&paused), paused);

        let over = GameState {
            status: GameStatus::GameOver,
            ..running
        };
        assert_eq!(engine.tick(&over), over);
    }

    #[test]
    fn snake_translates_on_plain_move() {
        let mut engine = engine(2);
        let state = engine.initial_state();

        let next = engine.tick(&state);

        assert_eq!(
            next.snake.to_vec(),
            vec![Position::new(11, 10), Position::new(10, 10), Position::new(9, 10)]
        );
        assert_eq!(next.score, 0);
        assert_eq!(next.food, state.food);
        assert_eq!(next.status, GameStatus::Running);
    }

    #[test]
    fn snake_grows_and_scores_after_eating_food() {
        let mut engine = engine(3);
        let state = state_with(
            vec![Position::new(10, 10), Position::new(9, 10), Position::new(8, 10)],
            Position::new(11, 10),
            Direction::Right,
        );

        let next = engine.tick(&state);

        assert_eq!(next.snake.len(), 4);
        assert_eq!(next.snake.head(), Position::new(11, 10));
        assert_eq!(next.score, 10);
        assert_ne!(next.food, Position::new(11, 10));
        assert!(!next.snake.occupies(next.food));
    }

    #[test]
    fn snake_collision_with_self_freezes_state() {
        let mut engine = engine(4);
        let state = state_with(
            vec![Position::new(10, 10), Position::new(11, 10), Position::new(11, 11)],
            Position::new(15, 15),
            Direction::Right,
        );

        let next = engine.tick(&state);

        assert_eq!(next.status, GameStatus::GameOver);
        assert_eq!(next.snake, state.snake);
        assert_eq!(next.food, state.food);
        assert_eq!(next.score, state.score);
    }

    #[test]
    fn moving_into_the_current_tail_is_fatal() {
        let mut engine = engine(5);
        // 2x2 loop: the head's next cell is the tail that would move away.
        let state = state_with(
            vec![
                Position::new(5, 5),
                Position::new(5, 6),
                Position::new(6, 6),
                Position::new(6, 5),
            ],
            Position::new(0, 0),
            Direction::Up,
        )
        .with_requested_direction(Direction::Right);

        assert!(engine.tick(&state).is_game_over());
    }

    #[test]
    fn requested_direction_is_committed_on_tick() {
        let mut engine = engine(6);
        let state = engine.initial_state().with_requested_direction(Direction::Up);
        assert_eq!(state.direction, Direction::Right);

        let next = engine.tick(&state);

        assert_eq!(next.direction, Direction::Up);
        assert_eq!(next.snake.head(), Position::new(10, 9));
    }

    #[test]
    fn reverse_request_is_ignored() {
        let state = GameState::initial(GridSize::default());

        let requested = state.with_requested_direction(Direction::Left);

        assert_eq!(requested, state);
    }

    #[test]
    fn last_valid_request_wins() {
        let state = GameState::initial(GridSize::default())
            .with_requested_direction(Direction::Up)
            .with_requested_direction(Direction::Down);

        assert_eq!(state.next_direction, Direction::Down);
    }

    #[test]
    fn pause_toggle_is_ignored_once_over() {
        let over = GameState {
            status: GameStatus::GameOver,
            ..GameState::initial(GridSize::default())
        };

        assert_eq!(over.with_pause_toggled(), over);
        assert_eq!(over.with_requested_direction(Direction::Up), over);
    }

    #[test]
    fn state_serializes_with_camel_case_fields() {
        let json = serde_json::to_value(GameState::initial(GridSize::default()))
            .expect("serialize");

        assert_eq!(json["nextDirection"], "RIGHT");
        assert_eq!(json["status"], "running");
        assert_eq!(json["snake"][0]["x"], 10);
    }
}
