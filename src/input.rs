use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde::{Deserialize, Serialize};

/// Canonical movement directions (headings) for the snake.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Every heading in the fixed enumeration order used for tie-breaking.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Returns the opposite direction.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Returns the unit step `(dx, dy)`; `y` grows downwards.
    #[must_use]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// High-level input events consumed by the game loop.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameInput {
    Direction(Direction),
    Pause,
    Quit,
    Confirm,
    /// Switch to the next watched session in spectator mode.
    Cycle,
}

/// Returns whether a direction change is legal (no immediate 180° turns).
///
/// Keeping the same heading and turning perpendicular are always legal.
#[must_use]
pub fn direction_change_is_valid(current: Direction, next: Direction) -> bool {
    next != current.opposite()
}

/// Maps one key press to a game input.
#[must_use]
pub fn map_key_event(key: KeyEvent) -> Option<GameInput> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(GameInput::Quit);
    }

    let input = match key.code {
        KeyCode::Up | KeyCode::Char('w' | 'W') => GameInput::Direction(Direction::Up),
        KeyCode::Down | KeyCode::Char('s' | 'S') => GameInput::Direction(Direction::Down),
        KeyCode::Left | KeyCode::Char('a' | 'A') => GameInput::Direction(Direction::Left),
        KeyCode::Right | KeyCode::Char('d' | 'D') => GameInput::Direction(Direction::Right),
        KeyCode::Char(' ' | 'p' | 'P') => GameInput::Pause,
        KeyCode::Enter => GameInput::Confirm,
        KeyCode::Tab => GameInput::Cycle,
        KeyCode::Esc | KeyCode::Char('q' | 'Q') => GameInput::Quit,
        _ => return None,
    };

    Some(input)
}

/// Non-blocking keyboard reader on top of crossterm.
#[derive(Debug, Default)]
pub struct InputHandler;

impl InputHandler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Drains pending terminal events and returns the first mapped input.
    pub fn poll_input(&mut self) -> io::Result<Option<GameInput>> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if let Some(input) = map_key_event(key) {
                    return Ok(Some(input));
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

    use super::{Direction, GameInput, direction_change_is_valid, map_key_event};

    #[test]
    fn opposite_direction_is_correct() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Down.opposite(), Direction::Up);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
    }

    #[test]
    fn reversal_is_the_only_invalid_change() {
        for current in Direction::ALL {
            for next in Direction::ALL {
                assert_eq!(
                    direction_change_is_valid(current, next),
                    next != current.opposite(),
                    "{current:?} -> {next:?}"
                );
            }
        }
    }

    #[test]
    fn same_and_perpendicular_changes_are_valid() {
        assert!(direction_change_is_valid(Direction::Up, Direction::Up));
        assert!(direction_change_is_valid(Direction::Up, Direction::Left));
        assert!(direction_change_is_valid(Direction::Up, Direction::Right));
        assert!(!direction_change_is_valid(
            Direction::Right,
            Direction::Left
        ));
    }

    #[test]
    fn direction_serializes_uppercase() {
        let json = serde_json::to_string(&Direction::Left).expect("serialize");
        assert_eq!(json, "\"LEFT\"");
    }

    #[test]
    fn keys_map_to_inputs() {
        let press = |code| KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        };

        assert_eq!(
            map_key_event(press(KeyCode::Char('w'))),
            Some(GameInput::Direction(Direction::Up))
        );
        assert_eq!(
            map_key_event(press(KeyCode::Right)),
            Some(GameInput::Direction(Direction::Right))
        );
        assert_eq!(map_key_event(press(KeyCode::Char(' '))), Some(GameInput::Pause));
        assert_eq!(map_key_event(press(KeyCode::Tab)), Some(GameInput::Cycle));
        assert_eq!(map_key_event(press(KeyCode::Esc)), Some(GameInput::Quit));
        assert_eq!(map_key_event(press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn key_release_is_ignored() {
        let release = KeyEvent {
            code: KeyCode::Up,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(map_key_event(release), None);
    }
}
