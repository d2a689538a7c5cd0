use std::f32::consts::PI;

use engine::{
    Animation, AssetIndex, DrawCommand, InputAction, InputSnapshot, Rect, Rgba, Scene,
    SceneCommand, SceneKey, SceneWorld, Tile, TileMap, Vec2, ViewportState, TILE_SIZE, TILE_SIZE_F,
};
use tracing::{info, warn};

const GRAVITY: f32 = 0.4;
const MAX_FALL_SPEED: f32 = 12.0;
const JUMP_VEL_Y: f32 = -8.0;
/// Forced airtime after a jump so the jump animation engages on the same tick.
const JUMP_AIRTIME_SENTINEL: u32 = 4;
const WALK_ANIMATION_THRESHOLD: f32 = 1.0;

const CHARACTER_SIZE: Vec2 = Vec2 { x: 30.0, y: 64.0 };
const CHARACTER_SLOW_DOWN: f32 = 0.5;
const CHARACTER_MAX_SPEED: f32 = 4.0;
const PLAYER_MAX_HP: i32 = 3;
const ENEMY_MAX_HP: i32 = 2;

const BULLET_SPEED: f32 = 5.0;
const BULLET_MAX_DURATION: u32 = 240;
const BULLET_MUZZLE_OFFSET: f32 = 10.0;
const REFLECT_SCALE: f32 = -1.25;

const PARRY_WINDOW_TICKS: u32 = 4;
const PARRY_RADIUS: f32 = 40.0;
const BLOCK_RECOVERY_TICKS: u32 = 30;

const BULLET_TIME_SPEED: f32 = 0.25;
const SIM_SPEED_RECOVERY: f32 = 0.05;

const HIT_SHAKE_DURATION: u32 = 6;
const DEATH_SHAKE_DURATION: u32 = 10;
const PARRY_SHAKE_DURATION: u32 = 14;

const PICKUP_SIZE: Vec2 = Vec2 { x: 30.0, y: 30.0 };
const PICKUP_IMMUNITY_TICKS: u32 = 45;
const PICKUP_BOUNCE_DAMPING: f32 = -0.5;
const PICKUP_BOUNCE_DEAD_ZONE: f32 = 0.5;
const PICKUP_DROP_VEL: Vec2 = Vec2 { x: 2.0, y: -4.0 };

const ENEMY_PATROL_SPEED: f32 = 0.75;
const ENEMY_SIGHT_STEPS: u32 = 10;
const ENEMY_SIGHT_STEP_FRACTION: f32 = 0.8;

const TRANSITION_HALF_TICKS: i32 = 60;

const IMPACT_DISSIPATION: f32 = 0.2;
const IMPACT_BURST_COUNT: u32 = 6;
const DEATH_BURST_COUNT: u32 = 12;

const SKY_COLOR: Rgba = [100, 200, 255, 255];
const AIM_LINE_COLOR: Rgba = [20, 20, 20, 255];
const BULLET_COLOR: Rgba = [240, 220, 60, 255];
const IMPACT_COLOR: Rgba = [255, 255, 255, 255];
const BLOOD_COLOR: Rgba = [150, 20, 30, 255];
const CLOUD_COLOR: Rgba = [235, 240, 245, 255];
const CLOUD_SIZE: Vec2 = Vec2 { x: 110.0, y: 40.0 };

include!("types.rs");
include!("systems.rs");
include!("scene_impl.rs");

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
