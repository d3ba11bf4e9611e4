//! Session configuration, loaded from a TOML settings file.

use crate::difficulty::clamp_complexity;
use crate::input::InputManager;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Play until the time limit or until health runs out.
    #[default]
    Standard,
    /// No time limit.
    Endless,
    /// Finish as soon as the score target is reached.
    ScoreAttack,
}

/// Settings handed to the core by the menu layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub mode: GameMode,
    pub sub_mode: String,
    /// Complexity 1-100; clamped on use.
    pub difficulty: i64,
    /// Seconds, or -1 for endless.
    pub time_limit: f64,
    /// 0 disables the target.
    pub score_target: u32,
    /// One key string per lane.
    pub keybinds: Vec<String>,
    /// Seed for pattern and spawn randomness; random when absent.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::Standard,
            sub_mode: String::new(),
            difficulty: 10,
            time_limit: 60.0,
            score_target: 0,
            keybinds: ["1", "2", "3", "4", "5"].map(String::from).to_vec(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Complexity clamped into 1-100.
    pub fn complexity(&self) -> u32 {
        clamp_complexity(self.difficulty)
    }

    /// Time limit in seconds, `None` when the session is endless.
    pub fn time_limit_secs(&self) -> Option<f64> {
        if self.mode == GameMode::Endless || self.time_limit <= 0.0 {
            None
        } else {
            Some(self.time_limit)
        }
    }

    /// Score that ends a score-attack session.
    pub fn score_goal(&self) -> Option<u32> {
        (self.mode == GameMode::ScoreAttack && self.score_target > 0).then_some(self.score_target)
    }

    /// Key-to-lane mapping for the configured keybinds.
    pub fn input_manager(&self) -> InputManager {
        InputManager::with_keybinds(&self.keybinds)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a TOML settings file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content).inspect_err(|e| {
            log::error!("SETTINGS: Failed to parse {:?}: {}", path, e);
        })
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::warn!("SETTINGS: {:?} not found, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }
}
