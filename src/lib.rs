pub mod ai;
pub mod config;
pub mod credentials;
pub mod driver;
pub mod error;
pub mod food;
pub mod game;
pub mod input;
pub mod leaderboard;
pub mod logging;
pub mod renderer;
pub mod sessions;
pub mod snake;
pub mod terminal_runtime;
pub mod ui;

pub use error::{Error, Result};
