mod animation;
mod frame;
mod geometry;
mod grid;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;
mod tilemap;
mod viewport;

pub use animation::Animation;
pub use frame::{DrawCommand, FrameQueue, Rgba};
pub use geometry::{Rect, Vec2};
pub use grid::TileIndex;
pub use input::InputAction;
pub use loop_runner::{
    run_app, run_app_with_metrics, AppError, LoopConfig, DEFAULT_LEVEL_FILE,
};
pub use metrics::{LoopMetrics, MetricsHandle};
pub use rendering::{Renderer, VIEW_HEIGHT, VIEW_WIDTH};
pub use scene::{InputSnapshot, Scene, SceneCommand, SceneKey, SceneWorld};
pub use tilemap::{
    EnemySpawn, GrassAnchor, LevelDoc, LevelError, PlayerSpawn, Tile, TileMap, TileNote,
    COLLIDABLE_TILE_TYPES, SURROUNDING_OFFSETS, TILE_SIZE, TILE_SIZE_F,
};
pub use viewport::ViewportState;
