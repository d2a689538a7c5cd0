use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod content;

pub use app::{
    run_app, run_app_with_metrics, Animation, AppError, DrawCommand, EnemySpawn, FrameQueue,
    GrassAnchor, InputAction, InputSnapshot, LevelDoc, LevelError, LoopConfig, LoopMetrics,
    MetricsHandle, PlayerSpawn, Rect, Renderer, Rgba, Scene, SceneCommand, SceneKey, SceneWorld,
    Tile, TileIndex, TileMap, TileNote, Vec2, ViewportState, COLLIDABLE_TILE_TYPES,
    DEFAULT_LEVEL_FILE, SURROUNDING_OFFSETS, TILE_SIZE, TILE_SIZE_F, VIEW_HEIGHT, VIEW_WIDTH,
};
pub use content::{AssetError, AssetIndex, SpriteImage, SpriteLibrary};

pub const ROOT_ENV_VAR: &str = "PLATFORMER_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
    pub levels_dir: PathBuf,
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
    #[error("failed to create levels directory at {path}: {source}")]
    CreateLevelsDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "PLATFORMER_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/platformer\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let assets_dir = root.join("assets");
    let levels_dir = root.join("levels");

    fs::create_dir_all(&levels_dir).map_err(|source| StartupError::CreateLevelsDir {
        path: levels_dir.clone(),
        source,
    })?;

    Ok(AppPaths {
        root,
        assets_dir,
        levels_dir,
    })
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
