use rand::Rng;
use rand::rngs::StdRng;
use tracing::{info, warn};
use uuid::Uuid;

use crate::credentials::User;
use crate::error::Result;
use crate::game::{Engine, GameState, GameStatus};
use crate::input::GameInput;
use crate::leaderboard::{Leaderboard, RankedEntry};
use crate::sessions::{GameSession, SessionDirectory, SessionUpdate};

/// Who picks the heading each tick.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Controller {
    Human,
    /// The greedy spectator AI.
    Heuristic,
}

/// Identity a session and leaderboard entry are recorded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub user_id: String,
    pub username: String,
}

impl From<&User> for Player {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.to_string(),
            username: user.username.clone(),
        }
    }
}

/// What one call to [`Driver::advance`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not started, paused or already over.
    Idle,
    Advanced,
    /// This tick ended the game.
    Finished {
        score: u32,
        entry: Option<RankedEntry>,
    },
}

/// Owns one game and feeds its snapshots to the session directory and
/// leaderboard.
///
/// The current state is only ever replaced wholesale, so a renderer holding
/// `state()` between ticks always sees a complete snapshot.
#[derive(Debug)]
pub struct Driver<R = StdRng> {
    engine: Engine<R>,
    state: GameState,
    controller: Controller,
    player: Option<Player>,
    session_id: Option<Uuid>,
    playing: bool,
}

impl<R: Rng> Driver<R> {
    /// Creates a driver sitting on the start screen.
    #[must_use]
    pub fn new(engine: Engine<R>, controller: Controller, player: Option<Player>) -> Self {
        let state = engine.initial_state();
        Self {
            engine,
            state,
            controller,
            player,
            session_id: None,
            playing: false,
        }
    }

    /// Continues an existing session under the heuristic controller.
    pub fn spectate(engine: Engine<R>, session: &GameSession) -> Result<Self> {
        Ok(Self {
            engine,
            state: session.to_game_state()?,
            controller: Controller::Heuristic,
            player: Some(Player {
                user_id: session.user_id.clone(),
                username: session.username.clone(),
            }),
            session_id: Some(session.id),
            playing: true,
        })
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn controller(&self) -> Controller {
        self.controller
    }

    #[must_use]
    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    #[must_use]
    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    /// False while on the start screen.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Starts a fresh game, registering a session when a player is bound.
    pub fn start(&mut self, sessions: &mut dyn SessionDirectory) {
        self.state = self.engine.initial_state();
        self.session_id = self.player.as_ref().map(|player| {
            sessions
                .create_session(&player.user_id, &player.username, &self.state)
                .id
        });
        self.playing = true;
    }

    /// Abandons the current game and returns to the start screen.
    pub fn reset(&mut self, sessions: &mut dyn SessionDirectory) -> Result<()> {
        if let Some(id) = self.session_id.take() {
            sessions.end_session(id, self.state.score)?;
        }

        self.state = self.engine.initial_state();
        self.playing = false;
        Ok(())
    }

    /// Applies one input between ticks.
    ///
    /// Only the last valid heading request before a tick takes effect.
    pub fn handle_input(&mut self, input: GameInput) {
        if !self.playing {
            return;
        }

        match input {
            GameInput::Direction(direction) if self.controller == Controller::Human => {
                self.state = self.state.with_requested_direction(direction);
            }
            GameInput::Pause => self.state = self.state.with_pause_toggled(),
            _ => {}
        }
    }

    /// Runs one tick and publishes the result.
    pub fn advance(
        &mut self,
        sessions: &mut dyn SessionDirectory,
        leaderboard: &mut dyn Leaderboard,
    ) -> Result<TickOutcome> {
        if !self.playing || self.state.status != GameStatus::Running {
            return Ok(TickOutcome::Idle);
        }

        let next = match self.controller {
            Controller::Human => self.engine.tick(&self.state),
            Controller::Heuristic => {
                let heading = self.engine.ai_direction(&self.state);
                self.engine.tick(&self.state.with_next_direction(heading))
            }
        };
        self.state = next;

        if let Some(id) = self.session_id {
            sessions.update_session(id, SessionUpdate::from_state(&self.state))?;
        }

        if !self.state.is_game_over() {
            return Ok(TickOutcome::Advanced);
        }

        let score = self.state.score;
        if let Some(id) = self.session_id.take() {
            sessions.end_session(id, score)?;
        }

        // A failed submission is logged and the game still finishes.
        let entry = match (self.controller, &self.player) {
            (Controller::Human, Some(player)) => {
                match leaderboard.submit_score(&player.user_id, &player.username, score) {
                    Ok(entry) => Some(entry),
                    Err(error) => {
                        warn!(
                            %error,
                            username = %player.username,
                            score,
                            "score submission failed"
                        );
                        None
                    }
                }
            }
            _ => None,
        };

        info!(
            controller = ?self.controller,
            score,
            length = self.state.snake.len(),
            "game finished"
        );
        Ok(TickOutcome::Finished { score, entry })
    }
}
