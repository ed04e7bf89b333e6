use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::Vec2;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub(crate) const START_ROOM_ENV_VAR: &str = "MAGE_START_ROOM";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read game config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse game config {path} at {json_path}: {message}")]
    Parse {
        path: PathBuf,
        json_path: String,
        message: String,
    },
    #[error("game config {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) start_room: String,
    pub(crate) window: WindowConfig,
    pub(crate) interaction: InteractionConfig,
    pub(crate) player: PlayerConfig,
    pub(crate) enemy: EnemyConfig,
    pub(crate) ground_fire: GroundFireConfig,
    pub(crate) texture_keys: Vec<String>,
    /// Seed for gameplay randomness; a fixed seed replays identically.
    pub(crate) rng_seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_room: "0".to_string(),
            window: WindowConfig::default(),
            interaction: InteractionConfig::default(),
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            ground_fire: GroundFireConfig::default(),
            texture_keys: vec!["Floor".to_string(), "Wall".to_string()],
            rng_seed: 42,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WindowConfig {
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct InteractionConfig {
    /// A press held longer than this may turn into a drag.
    pub(crate) tap_seconds: f32,
    pub(crate) drag_distance_px: f32,
    /// Fraction of the window width, from the left, that accepts presses.
    pub(crate) active_screen_width: f32,
    pub(crate) tap_indicator_seconds: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            tap_seconds: 0.1,
            drag_distance_px: 5.0,
            active_screen_width: 1.0,
            tap_indicator_seconds: 0.75,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PlayerConfig {
    pub(crate) speed: f32,
    pub(crate) radius: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 2.0,
            radius: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct EnemyConfig {
    pub(crate) speed: f32,
    pub(crate) max_health: f32,
    pub(crate) radius: f32,
    pub(crate) spawn_points: Vec<Vec2>,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            speed: 0.5,
            max_health: 10.0,
            radius: 0.3,
            spawn_points: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GroundFireConfig {
    pub(crate) duration_seconds: f32,
    /// Each cast lasts `duration_seconds` plus or minus up to this much.
    pub(crate) duration_variance_seconds: f32,
    pub(crate) fade_seconds: f32,
    pub(crate) radius: f32,
    pub(crate) damage_per_second: f32,
}

impl Default for GroundFireConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 4.0,
            duration_variance_seconds: 0.5,
            fade_seconds: 1.0,
            radius: 0.5,
            damage_per_second: 5.0,
        }
    }
}

/// A missing file means defaults; a present but broken file is an error.
pub(crate) fn load_game_config(path: &Path) -> Result<GameConfig, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "game_config_defaulted");
            return Ok(GameConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let config = parse_game_config(path, &raw)?;
    info!(
        path = %path.display(),
        start_room = %config.start_room,
        enemy_spawns = config.enemy.spawn_points.len(),
        "game_config_loaded"
    );
    Ok(config)
}

pub(crate) fn parse_game_config(path: &Path, raw: &str) -> Result<GameConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let config = serde_path_to_error::deserialize::<_, GameConfig>(&mut deserializer).map_err(
        |error| {
            let json_path = error.path().to_string();
            ConfigError::Parse {
                path: path.to_path_buf(),
                json_path,
                message: error.into_inner().to_string(),
            }
        },
    )?;
    validate_game_config(path, &config)?;
    Ok(config)
}

fn validate_game_config(path: &Path, config: &GameConfig) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::Invalid {
        path: path.to_path_buf(),
        message,
    };
    if config.start_room.trim().is_empty() {
        return Err(invalid("start_room must not be empty".to_string()));
    }
    let positive = [
        ("player.speed", config.player.speed),
        ("enemy.speed", config.enemy.speed),
        ("enemy.max_health", config.enemy.max_health),
        ("ground_fire.duration_seconds", config.ground_fire.duration_seconds),
    ];
    for (field, value) in positive {
        if !value.is_finite() || value <= 0.0 {
            return Err(invalid(format!("{field} must be a positive number, got {value}")));
        }
    }
    let non_negative = [
        ("player.radius", config.player.radius),
        ("enemy.radius", config.enemy.radius),
        ("interaction.tap_seconds", config.interaction.tap_seconds),
        ("interaction.drag_distance_px", config.interaction.drag_distance_px),
        ("interaction.active_screen_width", config.interaction.active_screen_width),
        (
            "ground_fire.duration_variance_seconds",
            config.ground_fire.duration_variance_seconds,
        ),
        ("ground_fire.fade_seconds", config.ground_fire.fade_seconds),
        ("ground_fire.radius", config.ground_fire.radius),
    ];
    for (field, value) in non_negative {
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(format!("{field} must not be negative, got {value}")));
        }
    }
    Ok(())
}

/// `MAGE_START_ROOM` wins over the file's `start_room` when set and non-empty.
pub(crate) fn apply_env_overrides(config: &mut GameConfig, start_room: Option<String>) {
    if let Some(room) = start_room
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    {
        info!(start_room = %room, env = START_ROOM_ENV_VAR, "start_room_overridden");
        config.start_room = room;
    }
}
