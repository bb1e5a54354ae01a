use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};

/// One leaderboard row with its current rank (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub id: Uuid,
    pub user_id: String,
    pub username: String,
    pub score: u32,
    pub created_at: DateTime<Utc>,
    pub rank: usize,
}

/// Ranked score list the game feeds finished scores into.
pub trait Leaderboard {
    /// Records a score and returns it with its rank.
    fn submit_score(&mut self, user_id: &str, username: &str, score: u32) -> Result<RankedEntry>;

    /// Returns up to `limit` entries, best first; equal scores keep
    /// submission order.
    fn top(&self, limit: usize) -> Vec<RankedEntry>;

    /// Highest recorded score, or 0 for an empty board.
    fn best_score(&self) -> u32 {
        self.top(1).first().map_or(0, |entry| entry.score)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    id: Uuid,
    user_id: String,
    username: String,
    score: u32,
    created_at: DateTime<Utc>,
}

impl StoredEntry {
    fn ranked(&self, rank: usize) -> RankedEntry {
        RankedEntry {
            id: self.id,
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            score: self.score,
            created_at: self.created_at,
            rank,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ScoreFile {
    entries: Vec<StoredEntry>,
}

/// Leaderboard kept in submission order, optionally backed by a JSON file.
#[derive(Debug, Default)]
pub struct ScoreBook {
    entries: Vec<StoredEntry>,
    path: Option<PathBuf>,
}

impl ScoreBook {
    /// Creates a board that lives only in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the board stored at `path`.
    ///
    /// A missing file is an empty board (first run). A file that exists but
    /// cannot be read or parsed is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = load_entries(&path)?;

        Ok(Self {
            entries,
            path: Some(path),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted best first. The sort is stable, so ties keep
    /// submission order.
    fn ranked_order(&self) -> Vec<&StoredEntry> {
        let mut sorted: Vec<&StoredEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.score.cmp(&a.score));
        sorted
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let payload = ScoreFile {
            entries: self.entries.clone(),
        };
        let json = serde_json::to_string_pretty(&payload).map_err(Error::Encode)?;

        fs::write(path, json)?;
        Ok(())
    }
}

impl Leaderboard for ScoreBook {
    fn submit_score(&mut self, user_id: &str, username: &str, score: u32) -> Result<RankedEntry> {
        let entry = StoredEntry {
            id: Uuid::new_v4(),
            user_id: user_id.to_owned(),
            username: username.to_owned(),
            score,
            created_at: Utc::now(),
        };
        // Newest entry: every earlier score at least as high ranks above it.
        let rank = 1 + self.entries.iter().filter(|stored| stored.score >= score).count();
        let ranked = entry.ranked(rank);

        self.entries.push(entry);
        self.save()?;

        info!(username, score, rank, "score submitted");
        Ok(ranked)
    }

    fn top(&self, limit: usize) -> Vec<RankedEntry> {
        self.ranked_order()
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(index, stored)| stored.ranked(index + 1))
            .collect()
    }
}

fn load_entries(path: &Path) -> Result<Vec<StoredEntry>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    serde_json::from_str::<ScoreFile>(&raw)
        .map(|file| file.entries)
        .map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
}
