use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod content;
pub mod level;
mod texture_keys;

pub use app::{
    run_headless, run_headless_in, Camera2D, Collision, CollisionTarget, Effect, EffectId,
    EffectKind, EffectSpec, EntityId, FrameInput, FrameSource, HasTransform, InputSnapshot,
    LoopConfig, LoopSummary, NodeTemplate, PhysicsWorld, PointerCollector, PointerHistory,
    PointerHit, PointerRay, PointerSample, Scene, SceneCommand, SceneWorld, Transform, Vec2, Vec3,
    Viewport,
};
pub use content::{
    load_room_database, ContentErrorCode, ContentLoadError, RoomDatabase, RoomDescription,
    SourceLocation, TextureHandle, TextureTable,
};
pub use level::{
    build_room, MarkerKind, MarkerTable, RoomBuild, RoomBuildError, Tile, TileGrid, MAX_ROOM_SIZE,
};
pub use texture_keys::TextureKeyError;

pub const ROOT_ENV_VAR: &str = "MAGE_ROOT";
pub const ROOMS_FILE_NAME: &str = "rooms.xml";
pub const GAME_CONFIG_FILE_NAME: &str = "game.json";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub base_content_dir: PathBuf,
}

impl AppPaths {
    pub fn from_root(root: PathBuf) -> Self {
        let base_content_dir = root.join("assets").join("base");
        Self {
            root,
            base_content_dir,
        }
    }

    pub fn rooms_file(&self) -> PathBuf {
        self.base_content_dir.join(ROOMS_FILE_NAME)
    }

    pub fn game_config_file(&self) -> PathBuf {
        self.base_content_dir.join(GAME_CONFIG_FILE_NAME)
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "MAGE_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/mage\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    resolve_root().map(AppPaths::from_root)
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let raw = PathBuf::from(value);
            let normalized = normalize_path(&raw);
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            for candidate in exe_dir.ancestors() {
                if is_repo_marker(candidate) {
                    return Ok(normalize_path(candidate));
                }
            }

            Err(StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
