use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::content::{AssetError, SpriteLibrary};
use crate::{resolve_app_paths, StartupError, Vec2};

use super::metrics::MetricsAccumulator;
use super::rendering::{VIEW_HEIGHT, VIEW_WIDTH};
use super::scene::{SceneMachine, SceneWorld};
use super::{InputAction, InputSnapshot, MetricsHandle, Renderer, Scene, SceneCommand, SceneKey};

pub const DEFAULT_LEVEL_FILE: &str = "level_0.json";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub max_render_fps: Option<u32>,
    pub level_path: Option<PathBuf>,
    pub start_scene: SceneKey,
    pub required_asset_groups: Vec<String>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Platformer".to_string(),
            window_width: VIEW_WIDTH,
            window_height: VIEW_HEIGHT,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            max_render_fps: None,
            level_path: None,
            start_scene: SceneKey::Play,
            required_asset_groups: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Assets(#[from] AssetError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(
    config: LoopConfig,
    play: Box<dyn Scene>,
    editor: Box<dyn Scene>,
) -> Result<(), AppError> {
    let metrics_handle = MetricsHandle::default();
    run_app_with_metrics(config, play, editor, metrics_handle)
}

pub fn run_app_with_metrics(
    config: LoopConfig,
    play: Box<dyn Scene>,
    editor: Box<dyn Scene>,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError> {
    let app_paths = resolve_app_paths()?;
    info!(
        root = %app_paths.root.display(),
        assets_dir = %app_paths.assets_dir.display(),
        levels_dir = %app_paths.levels_dir.display(),
        "startup"
    );

    let sprites = SpriteLibrary::load(&app_paths.assets_dir)?;
    sprites.require(&config.required_asset_groups)?;

    let mut world = SceneWorld::new(sprites.index(), (VIEW_WIDTH, VIEW_HEIGHT));
    let level_path = config
        .level_path
        .clone()
        .unwrap_or_else(|| app_paths.levels_dir.join(DEFAULT_LEVEL_FILE));
    world.set_level_path(level_path.clone());
    match world.tilemap_mut().load_level(&level_path) {
        Ok(()) => info!(
            level = %level_path.display(),
            tiles = world.tilemap().tile_count(),
            "level_loaded"
        ),
        // The editor can start from a blank map and save it later.
        Err(error) => warn!(
            level = %level_path.display(),
            error = %error,
            "level_load_failed_starting_empty"
        ),
    }

    let mut scenes = SceneMachine::new(play, editor, world, config.start_scene);

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let window_for_loop = Arc::clone(&window);
    let mut renderer = Renderer::new(window, sprites).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);
    let mut input_collector = InputCollector::new(config.window_width, config.window_height);

    scenes.load_active();
    info!(scene = ?scenes.active_scene(), "scene_loaded");
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        render_fps_cap = %format_render_cap(effective_render_cap),
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        input_collector.mark_quit_requested();
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        input_collector.set_window_size(new_size.width, new_size.height);
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = window_for_loop.inner_size();
                        input_collector.set_window_size(size.width, size.height);
                        if let Err(error) = renderer.resize(size.width, size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        input_collector
                            .set_cursor_position_px(position.x as f32, position.y as f32);
                    }
                    WindowEvent::CursorLeft { .. } => {
                        input_collector.clear_cursor_position();
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        input_collector.handle_mouse_input(button, state);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        input_collector.handle_keyboard_input(&event);
                        if input_collector.quit_requested {
                            info!(reason = "escape_key", "shutdown_requested");
                            window_target.exit();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                        last_frame_instant = now;

                        let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                        accumulator = accumulator.saturating_add(clamped_frame_dt);

                        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                        for _ in 0..step_plan.ticks_to_run {
                            let input_snapshot = input_collector.snapshot_for_tick();
                            let command = scenes.update_active(&input_snapshot);
                            match command {
                                SceneCommand::SwitchTo(next_scene) => {
                                    if scenes.switch_to(next_scene) {
                                        info!(scene = ?scenes.active_scene(), "scene_switched");
                                    }
                                }
                                SceneCommand::ReloadActive => {
                                    scenes.reload_active();
                                    info!(scene = ?scenes.active_scene(), "scene_reloaded");
                                }
                                SceneCommand::None => {}
                            }
                            metrics_accumulator.record_tick();
                        }
                        accumulator = step_plan.remaining_accumulator;

                        if step_plan.dropped_backlog > Duration::ZERO {
                            warn!(
                                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                                max_ticks_per_frame, "sim_clamp_triggered"
                            );
                        }

                        // Single authoritative FPS cap sleep point for render pacing.
                        let elapsed_since_last_present =
                            Instant::now().saturating_duration_since(last_present_instant);
                        let cap_sleep =
                            compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                        if cap_sleep > Duration::ZERO {
                            thread::sleep(cap_sleep);
                        }

                        scenes.render_active();
                        if let Err(error) = renderer.present(scenes.world().frame_commands()) {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }
                        scenes.world_mut().clear_frame();
                        last_present_instant = Instant::now();

                        let next_title = scenes.debug_title_active();
                        if next_title != last_applied_title {
                            if let Some(title) = &next_title {
                                window_for_loop.set_title(title);
                            } else {
                                window_for_loop.set_title(&config.window_title);
                            }
                            last_applied_title = next_title;
                        }
                        metrics_accumulator.record_frame(raw_frame_dt);

                        if let Some(metrics) = metrics_accumulator.maybe_snapshot(now) {
                            metrics_handle.publish(metrics);
                            info!(
                                fps = metrics.fps,
                                tps = metrics.tps,
                                frame_time_ms = metrics.frame_time_ms,
                                scene = ?scenes.active_scene(),
                                "loop_metrics"
                            );
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                scenes.shutdown_all();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: super::input::ActionStates,
    cursor_window_px: Option<Vec2>,
    left_mouse_is_down: bool,
    left_click_pressed_edge: bool,
    right_mouse_is_down: bool,
    right_click_pressed_edge: bool,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    /// Snapshot for exactly one sim tick; press edges fire once no matter
    /// how many ticks a frame runs.
    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.action_states,
            self.cursor_view_px(),
            self.left_mouse_is_down,
            self.left_click_pressed_edge,
            self.right_mouse_is_down,
            self.right_click_pressed_edge,
        );
        self.action_states.clear_pressed();
        self.left_click_pressed_edge = false;
        self.right_click_pressed_edge = false;
        snapshot
    }

    fn handle_keyboard_input(&mut self, key_event: &winit::event::KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        for &action in actions_for_key(key_event.physical_key) {
            self.action_states.set_down(action, is_pressed);
            if action == InputAction::Quit && is_pressed {
                self.mark_quit_requested();
            }
        }
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        self.cursor_window_px = Some(Vec2 { x, y });
    }

    fn clear_cursor_position(&mut self) {
        self.cursor_window_px = None;
    }

    /// Window pixels scaled into the fixed internal view.
    fn cursor_view_px(&self) -> Option<Vec2> {
        let cursor = self.cursor_window_px?;
        if self.window_width == 0 || self.window_height == 0 {
            return None;
        }
        Some(Vec2 {
            x: cursor.x * VIEW_WIDTH as f32 / self.window_width as f32,
            y: cursor.y * VIEW_HEIGHT as f32 / self.window_height as f32,
        })
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        match button {
            MouseButton::Left => match state {
                ElementState::Pressed => {
                    if !self.left_mouse_is_down {
                        self.left_click_pressed_edge = true;
                    }
                    self.left_mouse_is_down = true;
                }
                ElementState::Released => self.left_mouse_is_down = false,
            },
            MouseButton::Right => match state {
                ElementState::Pressed => {
                    if !self.right_mouse_is_down {
                        self.right_click_pressed_edge = true;
                    }
                    self.right_mouse_is_down = true;
                }
                ElementState::Released => self.right_mouse_is_down = false,
            },
            _ => {}
        }
    }
}

fn actions_for_key(key: PhysicalKey) -> &'static [InputAction] {
    match key {
        PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => {
            &[InputAction::MoveLeft]
        }
        PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => {
            &[InputAction::MoveRight]
        }
        PhysicalKey::Code(KeyCode::Space)
        | PhysicalKey::Code(KeyCode::KeyW)
        | PhysicalKey::Code(KeyCode::ArrowUp) => &[InputAction::Jump],
        PhysicalKey::Code(KeyCode::KeyS) | PhysicalKey::Code(KeyCode::ArrowDown) => {
            &[InputAction::Block]
        }
        PhysicalKey::Code(KeyCode::KeyI) => &[InputAction::CameraUp],
        PhysicalKey::Code(KeyCode::KeyK) => &[InputAction::CameraDown],
        PhysicalKey::Code(KeyCode::KeyJ) => &[InputAction::CameraLeft],
        PhysicalKey::Code(KeyCode::KeyL) => &[InputAction::CameraRight],
        PhysicalKey::Code(KeyCode::ShiftLeft) => &[InputAction::FastCamera],
        PhysicalKey::Code(KeyCode::KeyE) => &[InputAction::NextTileType],
        PhysicalKey::Code(KeyCode::KeyQ) => &[InputAction::PrevTileType],
        PhysicalKey::Code(KeyCode::KeyC) => &[InputAction::NextVariant],
        PhysicalKey::Code(KeyCode::KeyZ) => &[InputAction::PrevVariant],
        PhysicalKey::Code(KeyCode::KeyM) => &[InputAction::ToggleSelection],
        PhysicalKey::Code(KeyCode::KeyT) => &[InputAction::Autotile],
        PhysicalKey::Code(KeyCode::KeyF) => &[InputAction::Fill],
        PhysicalKey::Code(KeyCode::Digit1) => &[InputAction::PlaceEnemySpawn],
        PhysicalKey::Code(KeyCode::Digit2) => &[InputAction::PlaceGrassAnchor],
        PhysicalKey::Code(KeyCode::Digit3) => &[InputAction::PlacePlayerSpawn],
        PhysicalKey::Code(KeyCode::Digit4) => &[InputAction::PlaceNote],
        PhysicalKey::Code(KeyCode::F5) => &[InputAction::Save],
        PhysicalKey::Code(KeyCode::Tab) => &[InputAction::SwitchScene],
        PhysicalKey::Code(KeyCode::Escape) => &[InputAction::Quit],
        _ => &[],
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        let dropped_backlog = accumulator;
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        let raw_frame_dt = Duration::from_millis(600);

        assert_eq!(
            clamp_frame_delta(raw_frame_dt, max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(48), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn key_press_maps_to_action_and_release_clears_it() {
        let mut input = InputCollector::new(VIEW_WIDTH, VIEW_HEIGHT);
        for action in actions_for_key(PhysicalKey::Code(KeyCode::KeyD)) {
            input.action_states.set_down(*action, true);
        }
        assert!(input.snapshot_for_tick().is_down(InputAction::MoveRight));

        for action in actions_for_key(PhysicalKey::Code(KeyCode::KeyD)) {
            input.action_states.set_down(*action, false);
        }
        assert!(!input.snapshot_for_tick().is_down(InputAction::MoveRight));
    }

    #[test]
    fn jump_press_edge_fires_for_a_single_tick() {
        let mut input = InputCollector::new(VIEW_WIDTH, VIEW_HEIGHT);
        input
            .action_states
            .set_down(InputAction::Jump, true);

        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();

        assert!(first.was_pressed(InputAction::Jump));
        assert!(first.is_down(InputAction::Jump));
        assert!(!second.was_pressed(InputAction::Jump));
        assert!(second.is_down(InputAction::Jump));
    }

    #[test]
    fn left_click_is_edge_triggered_for_single_tick() {
        let mut input = InputCollector::new(VIEW_WIDTH, VIEW_HEIGHT);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();

        assert!(first.left_click_pressed());
        assert!(first.left_mouse_down());
        assert!(!second.left_click_pressed());
        assert!(second.left_mouse_down());
    }

    #[test]
    fn held_right_click_does_not_repeat_pressed_edge() {
        let mut input = InputCollector::new(VIEW_WIDTH, VIEW_HEIGHT);
        input.handle_mouse_input(MouseButton::Right, ElementState::Pressed);
        let first = input.snapshot_for_tick();
        input.handle_mouse_input(MouseButton::Right, ElementState::Pressed);
        let second = input.snapshot_for_tick();

        assert!(first.right_click_pressed());
        assert!(!second.right_click_pressed());
        assert!(second.right_mouse_down());
    }

    #[test]
    fn cursor_is_scaled_from_window_to_view_space() {
        let mut input = InputCollector::new(1600, 1200);
        input.set_cursor_position_px(800.0, 600.0);
        let cursor = input.snapshot_for_tick().cursor_view_px().expect("cursor");
        assert!((cursor.x - 400.0).abs() < 0.0001);
        assert!((cursor.y - 300.0).abs() < 0.0001);

        input.set_window_size(0, 0);
        assert!(input.snapshot_for_tick().cursor_view_px().is_none());
    }

    #[test]
    fn editor_keys_map_to_expected_actions() {
        assert_eq!(
            actions_for_key(PhysicalKey::Code(KeyCode::KeyT)),
            &[InputAction::Autotile]
        );
        assert_eq!(
            actions_for_key(PhysicalKey::Code(KeyCode::Digit3)),
            &[InputAction::PlacePlayerSpawn]
        );
        assert_eq!(
            actions_for_key(PhysicalKey::Code(KeyCode::F5)),
            &[InputAction::Save]
        );
        assert_eq!(
            actions_for_key(PhysicalKey::Code(KeyCode::Tab)),
            &[InputAction::SwitchScene]
        );
        assert!(actions_for_key(PhysicalKey::Code(KeyCode::F9)).is_empty());
    }

    #[test]
    fn target_frame_duration_none_when_cap_off() {
        assert_eq!(target_frame_duration(None), None);
    }

    #[test]
    fn compute_cap_sleep_zero_when_over_budget() {
        let sleep = compute_cap_sleep(Duration::from_millis(20), target_frame_duration(Some(60)));
        assert_eq!(sleep, Duration::ZERO);
    }

    #[test]
    fn compute_cap_sleep_positive_when_under_budget() {
        let sleep = compute_cap_sleep(Duration::from_millis(5), target_frame_duration(Some(60)));
        assert!(sleep > Duration::ZERO);
    }

    #[test]
    fn normalize_render_fps_cap_disables_zero() {
        assert_eq!(normalize_render_fps_cap(Some(0)), None);
        assert_eq!(normalize_render_fps_cap(Some(60)), Some(60));
    }
}
