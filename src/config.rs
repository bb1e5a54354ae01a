use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::food::FoodPlacement;
use crate::game::Rules;

const APP_DIR_NAME: &str = "snake-arena";
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Side length of the default square board.
pub const DEFAULT_GRID_SIDE: u16 = 20;

/// Smallest board side that still fits the initial three-segment layout.
pub const MIN_GRID_SIDE: u16 = 4;

/// Score granted per food eaten.
pub const POINTS_PER_FOOD: u32 = 10;

/// Random draws attempted before food placement gives up on a free cell.
pub const FOOD_SPAWN_MAX_ATTEMPTS: u32 = 100;

/// Tick interval for human play in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 150;

/// Tick interval for spectator playback in milliseconds.
pub const SPECTATOR_TICK_INTERVAL_MS: u64 = 150;

/// Entries shown by default when listing the leaderboard.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// Bot sessions created by default in spectator mode.
pub const DEFAULT_SPECTATOR_BOTS: usize = 3;

/// Terminal columns used per board cell (keeps cells roughly square).
pub const CELL_WIDTH: u16 = 2;

/// Glyph painted for every occupied cell.
pub const GLYPH_CELL: &str = "██";

/// Glyph painted for food.
pub const GLYPH_FOOD: &str = "◆◆";

/// Logical grid dimensions passed through the game as a named type.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u16,
    pub height: u16,
}

impl GridSize {
    /// Creates a validated grid size.
    pub fn new(width: u16, height: u16) -> Result<Self> {
        if width < MIN_GRID_SIDE || height < MIN_GRID_SIDE {
            return Err(Error::GridTooSmall {
                width,
                height,
                min: MIN_GRID_SIDE,
            });
        }

        Ok(Self { width, height })
    }

    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_SIDE,
            height: DEFAULT_GRID_SIDE,
        }
    }
}

/// A color theme applied to all visual elements.
#[derive(Debug)]
pub struct Theme {
    pub snake_head: Color,
    pub snake_body: Color,
    pub snake_tail: Color,
    pub food: Color,
    pub crashed: Color,
    pub border_fg: Color,
    pub hud_score: Color,
    pub hud_label: Color,
}

/// Classic green snake on dark theme.
pub const THEME_CLASSIC: Theme = Theme {
    snake_head: Color::LightGreen,
    snake_body: Color::Green,
    snake_tail: Color::DarkGray,
    food: Color::Red,
    crashed: Color::LightRed,
    border_fg: Color::White,
    hud_score: Color::White,
    hud_label: Color::DarkGray,
};

/// User-tunable settings read from `settings.json`.
///
/// Every field is optional in the file; missing ones fall back to the
/// compiled defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub grid_width: u16,
    pub grid_height: u16,
    pub tick_interval_ms: u64,
    pub spectator_tick_interval_ms: u64,
    pub points_per_food: u32,
    pub food_placement: FoodPlacement,
    pub leaderboard_path: Option<PathBuf>,
    pub accounts_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_SIDE,
            grid_height: DEFAULT_GRID_SIDE,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            spectator_tick_interval_ms: SPECTATOR_TICK_INTERVAL_MS,
            points_per_food: POINTS_PER_FOOD,
            food_placement: FoodPlacement::default(),
            leaderboard_path: None,
            accounts_path: None,
        }
    }
}

impl Settings {
    /// Loads settings from the platform config directory.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&settings_path())
    }

    /// Loads settings from `path`.
    ///
    /// A missing file yields the defaults; a file that exists but cannot be
    /// read or parsed is an error.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&raw).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Builds the engine rules, validating the grid dimensions.
    pub fn rules(&self) -> Result<Rules> {
        Ok(Rules {
            grid: GridSize::new(self.grid_width, self.grid_height)?,
            points_per_food: self.points_per_food,
            food_placement: self.food_placement,
        })
    }

    /// Returns the configured leaderboard file, or the platform default.
    #[must_use]
    pub fn leaderboard_path(&self) -> PathBuf {
        self.leaderboard_path
            .clone()
            .unwrap_or_else(|| data_dir().join("leaderboard.json"))
    }

    /// Returns the configured accounts file, or the platform default.
    #[must_use]
    pub fn accounts_path(&self) -> PathBuf {
        self.accounts_path
            .clone()
            .unwrap_or_else(|| data_dir().join("accounts.json"))
    }
}

/// Returns the platform-correct settings file path.
#[must_use]
pub fn settings_path() -> PathBuf {
    let mut base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base.push(SETTINGS_FILE_NAME);
    base
}

/// Returns the per-user data directory for leaderboard, account and log files.
#[must_use]
pub fn data_dir() -> PathBuf {
    let mut base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use crate::error::Error;
    use crate::food::FoodPlacement;

    use super::{DEFAULT_GRID_SIDE, GridSize, POINTS_PER_FOOD, Settings};

    #[test]
    fn grid_below_minimum_is_rejected() {
        assert!(matches!(
            GridSize::new(3, 20),
            Err(Error::GridTooSmall { width: 3, .. })
        ));
        assert!(GridSize::new(4, 4).is_ok());
    }

    #[test]
    fn missing_settings_file_yields_defaults() {
        let path = unique_test_path("missing");
        let settings = Settings::load_from_path(&path).expect("missing file is not an error");

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.grid_width, DEFAULT_GRID_SIDE);
    }

    #[test]
    fn partial_settings_file_keeps_other_defaults() {
        let path = unique_test_path("partial");
        write_file(
            &path,
            r#"{ "grid_width": 12, "food_placement": { "policy": "free_cell_scan" } }"#,
        );

        let settings = Settings::load_from_path(&path).expect("settings should parse");
        let rules = settings.rules().expect("grid is valid");

        assert_eq!(rules.grid, GridSize { width: 12, height: 20 });
        assert_eq!(rules.points_per_food, POINTS_PER_FOOD);
        assert_eq!(rules.food_placement, FoodPlacement::FreeCellScan);

        cleanup_test_path(&path);
    }

    #[test]
    fn malformed_settings_file_returns_error() {
        let path = unique_test_path("malformed");
        write_file(&path, "not-json");

        assert!(matches!(
            Settings::load_from_path(&path),
            Err(Error::Json { .. })
        ));

        cleanup_test_path(&path);
    }

    fn write_file(path: &PathBuf, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("test parent directory should be creatable");
        }
        fs::write(path, contents).expect("test file write should succeed");
    }

    fn unique_test_path(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after epoch")
            .as_nanos();

        std::env::temp_dir()
            .join("snake-arena-settings-tests")
            .join(format!("{label}-{nanos}.json"))
    }

    fn cleanup_test_path(path: &PathBuf) {
        let _ = fs::remove_file(path);
        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir(parent);
        }
    }
}
