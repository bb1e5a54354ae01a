use std::io;
use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Errors raised outside the simulation core: configuration, persistence and
/// collaborator lookups. The engine itself never fails.
#[derive(Debug, Error)]
pub enum Error {
    #[error("snake must contain at least one segment")]
    EmptySnake,

    #[error("grid {width}x{height} is too small (minimum side is {min})")]
    GridTooSmall { width: u16, height: u16, min: u16 },

    #[error("session {0} not found")]
    SessionNotFound(Uuid),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email {0} is already registered")]
    EmailTaken(String),

    #[error("username {0} is already taken")]
    UsernameTaken(String),

    #[error("login token is not valid")]
    InvalidToken,

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode JSON: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
