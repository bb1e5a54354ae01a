use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::game::{GameState, GameStatus};
use crate::input::Direction;
use crate::snake::{Position, Snake};

/// A live (or finished) game as listed to spectators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub id: Uuid,
    pub user_id: String,
    pub username: String,
    pub score: u32,
    pub is_active: bool,
    pub snake: Vec<Position>,
    pub food: Position,
    pub direction: Direction,
    pub started_at: DateTime<Utc>,
}

impl GameSession {
    /// Rebuilds a running game from the stored snapshot.
    pub fn to_game_state(&self) -> Result<GameState> {
        Ok(GameState {
            snake: Snake::from_segments(self.snake.clone())?,
            food: self.food,
            direction: self.direction,
            next_direction: self.direction,
            score: self.score,
            status: GameStatus::Running,
        })
    }

    fn apply(&mut self, update: SessionUpdate) {
        if let Some(score) = update.score {
            self.score = score;
        }
        if let Some(snake) = update.snake {
            self.snake = snake;
        }
        if let Some(food) = update.food {
            self.food = food;
        }
        if let Some(direction) = update.direction {
            self.direction = direction;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
    }
}

/// Partial session update; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    pub score: Option<u32>,
    pub snake: Option<Vec<Position>>,
    pub food: Option<Position>,
    pub direction: Option<Direction>,
    pub is_active: Option<bool>,
}

impl SessionUpdate {
    /// Full snapshot of `state` as an update.
    #[must_use]
    pub fn from_state(state: &GameState) -> Self {
        Self {
            score: Some(state.score),
            snake: Some(state.snake.to_vec()),
            food: Some(state.food),
            direction: Some(state.direction),
            is_active: Some(!state.is_game_over()),
        }
    }
}

/// Directory of game sessions that spectators enumerate.
pub trait SessionDirectory {
    fn create_session(
        &mut self,
        user_id: &str,
        username: &str,
        initial: &GameState,
    ) -> GameSession;

    fn get_session(&self, id: Uuid) -> Result<GameSession>;

    fn update_session(&mut self, id: Uuid, update: SessionUpdate) -> Result<GameSession>;

    /// Marks the session inactive and records its final score.
    fn end_session(&mut self, id: Uuid, final_score: u32) -> Result<()>;

    fn list_active(&self) -> Vec<GameSession>;
}

/// In-process session directory.
#[derive(Debug, Default)]
pub struct MemorySessionDirectory {
    sessions: Vec<GameSession>,
}

impl MemorySessionDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn find_mut(&mut self, id: Uuid) -> Result<&mut GameSession> {
        self.sessions
            .iter_mut()
            .find(|session| session.id == id)
            .ok_or(Error::SessionNotFound(id))
    }
}

impl SessionDirectory for MemorySessionDirectory {
    fn create_session(
        &mut self,
        user_id: &str,
        username: &str,
        initial: &GameState,
    ) -> GameSession {
        let session = GameSession {
            id: Uuid::new_v4(),
            user_id: user_id.to_owned(),
            username: username.to_owned(),
            score: initial.score,
            is_active: true,
            snake: initial.snake.to_vec(),
            food: initial.food,
            direction: initial.direction,
            started_at: Utc::now(),
        };

        debug!(id = %session.id, username, "session created");
        self.sessions.push(session.clone());
        session
    }

    fn get_session(&self, id: Uuid) -> Result<GameSession> {
        self.sessions
            .iter()
            .find(|session| session.id == id)
            .cloned()
            .ok_or(Error::SessionNotFound(id))
    }

    fn update_session(&mut self, id: Uuid, update: SessionUpdate) -> Result<GameSession> {
        let session = self.find_mut(id)?;
        session.apply(update);
        Ok(session.clone())
    }

    fn end_session(&mut self, id: Uuid, final_score: u32) -> Result<()> {
        let session = self.find_mut(id)?;
        session.is_active = false;
        session.score = final_score;
        debug!(%id, final_score, "session ended");
        Ok(())
    }

    fn list_active(&self) -> Vec<GameSession> {
        self.sessions
            .iter()
            .filter(|session| session.is_active)
            .cloned()
            .collect()
    }
}
