use std::env;
use std::path::Path;

use engine::{
    load_room_database, resolve_app_paths, ContentLoadError, LoopConfig, StartupError,
    TextureKeyError, TextureTable,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{apply_env_overrides, load_game_config, ConfigError, START_ROOM_ENV_VAR};
use super::gameplay::{self, GameplayScene};
use super::script::{
    load_input_script, InputScript, ScriptError, ScriptedFrames, INPUT_SCRIPT_ENV_VAR,
};

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Content(#[from] ContentLoadError),
    #[error("invalid texture_keys in game config: {0}")]
    TextureKeys(#[from] TextureKeyError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("start room '{room_id}' is not defined in the rooms file")]
    UnknownStartRoom { room_id: String },
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: GameplayScene,
    pub(crate) frames: ScriptedFrames,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Mage Startup ===");

    let paths = resolve_app_paths()?;
    info!(root = %paths.root.display(), "project_root_resolved");

    let mut game_config = load_game_config(&paths.game_config_file())?;
    apply_env_overrides(&mut game_config, read_env_var(START_ROOM_ENV_VAR)?);

    let rooms = load_room_database(&paths.rooms_file())?;
    if rooms.room(&game_config.start_room).is_none() {
        return Err(AppError::UnknownStartRoom {
            room_id: game_config.start_room.clone(),
        });
    }
    let textures = TextureTable::from_keys(&game_config.texture_keys)?;

    let script = match read_env_var(INPUT_SCRIPT_ENV_VAR)? {
        Some(path) => load_input_script(Path::new(&path))?,
        None => {
            info!("input_script_idle");
            InputScript::idle()
        }
    };

    let window = game_config.window;
    let frames = ScriptedFrames::new(script, window.width, window.height);
    let scene = gameplay::build_scene(game_config, rooms, textures);

    Ok(AppWiring {
        config: LoopConfig::default(),
        scene,
        frames,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn read_env_var(var: &'static str) -> Result<Option<String>, AppError> {
    match env::var(var) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(AppError::EnvVar { var, source }),
    }
}
