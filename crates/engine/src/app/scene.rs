use std::path::{Path, PathBuf};

use super::frame::{DrawCommand, FrameQueue};
use super::input::{ActionStates, InputAction};
use super::tilemap::TileMap;
use super::viewport::ViewportState;
use crate::content::AssetIndex;
use crate::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    Play,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    SwitchTo(SceneKey),
    /// Unload and reload the active scene against the shared world.
    ReloadActive,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    cursor_view_px: Option<Vec2>,
    left_mouse_down: bool,
    left_click_pressed: bool,
    right_mouse_down: bool,
    right_click_pressed: bool,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        cursor_view_px: Option<Vec2>,
        left_mouse_down: bool,
        left_click_pressed: bool,
        right_mouse_down: bool,
        right_click_pressed: bool,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            cursor_view_px,
            left_mouse_down,
            left_click_pressed,
            right_mouse_down,
            right_click_pressed,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.actions.was_pressed(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set_down(action, is_down);
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.actions.set_pressed(action, true);
        self
    }

    pub fn with_cursor_view_px(mut self, cursor_view_px: Option<Vec2>) -> Self {
        self.cursor_view_px = cursor_view_px;
        self
    }

    pub fn with_left_mouse_down(mut self, left_mouse_down: bool) -> Self {
        self.left_mouse_down = left_mouse_down;
        self
    }

    pub fn with_left_click_pressed(mut self, left_click_pressed: bool) -> Self {
        self.left_click_pressed = left_click_pressed;
        self
    }

    pub fn with_right_mouse_down(mut self, right_mouse_down: bool) -> Self {
        self.right_mouse_down = right_mouse_down;
        self
    }

    pub fn with_right_click_pressed(mut self, right_click_pressed: bool) -> Self {
        self.right_click_pressed = right_click_pressed;
        self
    }

    pub fn cursor_view_px(&self) -> Option<Vec2> {
        self.cursor_view_px
    }

    pub fn left_mouse_down(&self) -> bool {
        self.left_mouse_down
    }

    pub fn left_click_pressed(&self) -> bool {
        self.left_click_pressed
    }

    pub fn right_mouse_down(&self) -> bool {
        self.right_mouse_down
    }

    pub fn right_click_pressed(&self) -> bool {
        self.right_click_pressed
    }
}

/// State shared by both scenes: the play scene simulates against the same
/// map the editor mutates, so edits survive a scene switch without a save.
#[derive(Debug)]
pub struct SceneWorld {
    tilemap: TileMap,
    viewport: ViewportState,
    frame: FrameQueue,
    assets: AssetIndex,
    view_size: (u32, u32),
    level_path: Option<PathBuf>,
}

impl SceneWorld {
    pub fn new(assets: AssetIndex, view_size: (u32, u32)) -> Self {
        Self {
            tilemap: TileMap::new(),
            viewport: ViewportState::default(),
            frame: FrameQueue::default(),
            assets,
            view_size,
            level_path: None,
        }
    }

    pub fn tilemap(&self) -> &TileMap {
        &self.tilemap
    }

    pub fn tilemap_mut(&mut self) -> &mut TileMap {
        &mut self.tilemap
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportState {
        &mut self.viewport
    }

    pub fn push_draw(&mut self, command: DrawCommand) {
        self.frame.push(command);
    }

    pub fn frame_commands(&self) -> &[DrawCommand] {
        self.frame.commands()
    }

    pub fn clear_frame(&mut self) {
        self.frame.clear();
    }

    pub fn assets(&self) -> &AssetIndex {
        &self.assets
    }

    pub fn view_size(&self) -> (u32, u32) {
        self.view_size
    }

    pub fn level_path(&self) -> Option<&Path> {
        self.level_path.as_deref()
    }

    pub fn set_level_path(&mut self, level_path: PathBuf) {
        self.level_path = Some(level_path);
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(&mut self, input: &InputSnapshot, world: &mut SceneWorld) -> SceneCommand;
    fn render(&mut self, world: &mut SceneWorld);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}

struct SceneRuntime {
    scene: Box<dyn Scene>,
    is_loaded: bool,
}

pub(crate) struct SceneMachine {
    play: SceneRuntime,
    editor: SceneRuntime,
    world: SceneWorld,
    active_scene: SceneKey,
}

impl SceneMachine {
    pub(crate) fn new(
        play: Box<dyn Scene>,
        editor: Box<dyn Scene>,
        world: SceneWorld,
        active_scene: SceneKey,
    ) -> Self {
        Self {
            play: SceneRuntime {
                scene: play,
                is_loaded: false,
            },
            editor: SceneRuntime {
                scene: editor,
                is_loaded: false,
            },
            world,
            active_scene,
        }
    }

    pub(crate) fn active_scene(&self) -> SceneKey {
        self.active_scene
    }

    pub(crate) fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub(crate) fn world_mut(&mut self) -> &mut SceneWorld {
        &mut self.world
    }

    pub(crate) fn load_active(&mut self) {
        let runtime = runtime_mut(
            &mut self.play,
            &mut self.editor,
            self.active_scene,
        );
        if runtime.is_loaded {
            return;
        }
        runtime.scene.load(&mut self.world);
        runtime.is_loaded = true;
    }

    pub(crate) fn update_active(&mut self, input: &InputSnapshot) -> SceneCommand {
        let runtime = runtime_mut(&mut self.play, &mut self.editor, self.active_scene);
        runtime.scene.update(input, &mut self.world)
    }

    pub(crate) fn render_active(&mut self) {
        let runtime = runtime_mut(&mut self.play, &mut self.editor, self.active_scene);
        runtime.scene.render(&mut self.world);
    }

    pub(crate) fn debug_title_active(&self) -> Option<String> {
        let runtime = match self.active_scene {
            SceneKey::Play => &self.play,
            SceneKey::Editor => &self.editor,
        };
        runtime.scene.debug_title(&self.world)
    }

    /// Unloads the previous scene and loads the next one against the shared
    /// world. Returns false when already active.
    pub(crate) fn switch_to(&mut self, next_scene: SceneKey) -> bool {
        if self.active_scene == next_scene {
            return false;
        }

        {
            let previous = runtime_mut(&mut self.play, &mut self.editor, self.active_scene);
            if previous.is_loaded {
                previous.scene.unload(&mut self.world);
                previous.is_loaded = false;
            }
        }
        self.active_scene = next_scene;
        self.load_active();
        true
    }

    pub(crate) fn reload_active(&mut self) {
        let runtime = runtime_mut(&mut self.play, &mut self.editor, self.active_scene);
        if runtime.is_loaded {
            runtime.scene.unload(&mut self.world);
            runtime.is_loaded = false;
        }
        runtime.scene.load(&mut self.world);
        runtime.is_loaded = true;
    }

    pub(crate) fn shutdown_all(&mut self) {
        for runtime in [&mut self.play, &mut self.editor] {
            if runtime.is_loaded {
                runtime.scene.unload(&mut self.world);
                runtime.is_loaded = false;
            }
        }
    }
}

fn runtime_mut<'a>(
    play: &'a mut SceneRuntime,
    editor: &'a mut SceneRuntime,
    key: SceneKey,
) -> &'a mut SceneRuntime {
    match key {
        SceneKey::Play => play,
        SceneKey::Editor => editor,
    }
}
