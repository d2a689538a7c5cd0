use std::path::PathBuf;

use engine::{run_app, LoopConfig, SceneKey};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app;

use app::{EditorScene, PlayScene};

const WINDOW_TITLE: &str = "Platformer";

/// Sprite groups the game cannot start without. Everything else degrades to
/// an invisible placeholder draw.
const REQUIRED_ASSET_GROUPS: [&str; 6] = [
    "characters/Player/Idle",
    "characters/Player/Walking",
    "characters/Player/Jumping",
    "characters/Enemy/Idle",
    "tiles/Dirt",
    "tiles/Stone",
];

#[derive(Debug, Clone, Default, PartialEq)]
struct CliOptions {
    start_in_editor: bool,
    level_path: Option<PathBuf>,
}

fn parse_args<I>(args: I) -> Result<CliOptions, String>
where
    I: IntoIterator<Item = String>,
{
    let mut options = CliOptions::default();
    for arg in args {
        match arg.as_str() {
            "--editor" | "-e" => options.start_in_editor = true,
            "--help" | "-h" => {
                return Err(format!(
                    "usage: game [--editor] [LEVEL_FILE]\n\
                     \n\
                     --editor, -e    start in the level editor\n\
                     LEVEL_FILE      level to load and save (default: levels/{})",
                    engine::DEFAULT_LEVEL_FILE
                ));
            }
            flag if flag.starts_with('-') => {
                return Err(format!("unknown flag {flag:?}; try --help"));
            }
            path => {
                if options.level_path.is_some() {
                    return Err(format!("unexpected extra argument {path:?}"));
                }
                options.level_path = Some(PathBuf::from(path));
            }
        }
    }
    Ok(options)
}

fn main() {
    init_tracing();

    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(2);
        }
    };

    if let Some(path) = &options.level_path {
        // Fail now with the offending JSON path instead of silently starting
        // on an empty map.
        if let Err(message) = app::level::preflight(path) {
            error!(error = %message, "level_preflight_failed");
            std::process::exit(1);
        }
    }

    let start_scene = if options.start_in_editor {
        SceneKey::Editor
    } else {
        SceneKey::Play
    };
    info!(start_scene = ?start_scene, level = ?options.level_path, "game_starting");

    let config = LoopConfig {
        window_title: WINDOW_TITLE.to_string(),
        level_path: options.level_path,
        start_scene,
        required_asset_groups: REQUIRED_ASSET_GROUPS
            .iter()
            .map(|group| group.to_string())
            .collect(),
        ..LoopConfig::default()
    };

    if let Err(err) = run_app(config, Box::new(PlayScene::new()), Box::new(EditorScene::new())) {
        error!(error = %err, "startup_failed");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
