mod autotile;

use engine::{
    DrawCommand, EnemySpawn, GrassAnchor, InputAction, InputSnapshot, PlayerSpawn, Rect, Rgba,
    Scene, SceneCommand, SceneKey, SceneWorld, Tile, TileIndex, TileNote, Vec2, ViewportState,
    TILE_SIZE_F,
};
use tracing::{error, info};

use autotile::{autotile_region, region_cells};

const BASE_CAMERA_SPEED: f32 = 3.0;
const FAST_CAMERA_FACTOR: f32 = 3.0;
/// Paintable types when the asset pack is absent (headless or first run).
const FALLBACK_TILE_TYPES: [&str; 3] = ["Dirt", "Stone", "Decor"];
const DEFAULT_NOTE_TEXT: &str = "note";

const EDITOR_CLEAR_COLOR: Rgba = [40, 44, 52, 255];
const HOVER_COLOR: Rgba = [255, 255, 255, 255];
const SELECTION_COLOR: Rgba = [255, 200, 60, 255];
const ENEMY_MARKER_COLOR: Rgba = [220, 60, 60, 255];
const GRASS_MARKER_COLOR: Rgba = [60, 220, 60, 255];
const PLAYER_MARKER_COLOR: Rgba = [60, 120, 255, 255];
const NOTE_MARKER_COLOR: Rgba = [240, 240, 120, 255];

/// In-place level authoring against the same map the play scene simulates.
/// Left mouse paints, right mouse erases, markers go on the hovered cell,
/// and saving writes the shared wire format back to the level path.
pub(crate) struct EditorScene {
    tile_types: Vec<String>,
    type_index: usize,
    variant: u32,
    layer: i32,
    selection_mode: bool,
    selection_anchor: Option<TileIndex>,
    selection_end: Option<TileIndex>,
    hover_cell: Option<TileIndex>,
}

impl EditorScene {
    pub(crate) fn new() -> Self {
        Self {
            tile_types: Vec::new(),
            type_index: 0,
            variant: 1,
            layer: 0,
            selection_mode: false,
            selection_anchor: None,
            selection_end: None,
            hover_cell: None,
        }
    }

    fn current_type(&self) -> &str {
        self.tile_types
            .get(self.type_index)
            .map(String::as_str)
            .unwrap_or(FALLBACK_TILE_TYPES[0])
    }

    fn variant_count(&self, world: &SceneWorld) -> u32 {
        let group = format!("tiles/{}", self.current_type());
        world.assets().frame_count(&group) as u32
    }

    fn cycle_type(&mut self, step: i32) {
        if self.tile_types.is_empty() {
            return;
        }
        let len = self.tile_types.len() as i32;
        self.type_index = (self.type_index as i32 + step).rem_euclid(len) as usize;
        self.variant = 1;
    }

    fn cycle_variant(&mut self, step: i32, world: &SceneWorld) {
        let count = self.variant_count(world).max(1) as i32;
        // Variants are 1-based on the wire; wrap within 1..=count.
        self.variant = ((self.variant as i32 - 1 + step).rem_euclid(count) + 1) as u32;
    }

    fn selection(&self) -> Option<Vec<TileIndex>> {
        Some(region_cells(self.selection_anchor?, self.selection_end?))
    }

    fn paint(&self, world: &mut SceneWorld, index: TileIndex) {
        world.tilemap_mut().set_tile(Tile {
            index,
            tile_type: self.current_type().to_string(),
            variant: self.variant,
            layer: self.layer,
        });
    }

    fn erase(&self, world: &mut SceneWorld, index: TileIndex) {
        world.tilemap_mut().delete_tile(index);
        world.tilemap_mut().clear_markers_at(index);
    }

    fn place_markers(&self, input: &InputSnapshot, world: &mut SceneWorld, index: TileIndex) {
        // Marker coordinates anchor to the cell's bottom-center, matching
        // how bodies spawn.
        let origin = index.world_origin();
        let anchor = Vec2::new(origin.x + TILE_SIZE_F / 2.0, origin.y + TILE_SIZE_F);

        if input.was_pressed(InputAction::PlaceEnemySpawn) {
            world.tilemap_mut().set_enemy_spawn(EnemySpawn {
                index,
                coord: anchor,
                variant: self.variant,
            });
        }
        if input.was_pressed(InputAction::PlaceGrassAnchor) {
            world.tilemap_mut().set_grass_anchor(GrassAnchor {
                index,
                coord: Vec2::new(anchor.x, origin.y + TILE_SIZE_F / 2.0),
            });
        }
        if input.was_pressed(InputAction::PlacePlayerSpawn) {
            world
                .tilemap_mut()
                .set_player_spawn(PlayerSpawn { coord: anchor });
        }
        if input.was_pressed(InputAction::PlaceNote) {
            world.tilemap_mut().set_note(TileNote {
                index,
                text: DEFAULT_NOTE_TEXT.to_string(),
            });
        }
    }

    fn save(&self, world: &SceneWorld) {
        let Some(path) = world.level_path() else {
            error!("save_skipped_no_level_path");
            return;
        };
        match world.tilemap().save_level(path) {
            Ok(()) => info!(
                level = %path.display(),
                tiles = world.tilemap().tile_count(),
                "level_saved"
            ),
            Err(err) => error!(level = %path.display(), error = %err, "level_save_failed"),
        }
    }

    fn pan_camera(&self, input: &InputSnapshot, world: &mut SceneWorld) {
        let mut delta = Vec2::ZERO;
        if input.is_down(InputAction::CameraLeft) {
            delta.x -= 1.0;
        }
        if input.is_down(InputAction::CameraRight) {
            delta.x += 1.0;
        }
        if input.is_down(InputAction::CameraUp) {
            delta.y -= 1.0;
        }
        if input.is_down(InputAction::CameraDown) {
            delta.y += 1.0;
        }
        let speed = if input.is_down(InputAction::FastCamera) {
            BASE_CAMERA_SPEED * FAST_CAMERA_FACTOR
        } else {
            BASE_CAMERA_SPEED
        };
        world.viewport_mut().pan(delta * speed);
    }
}

impl Scene for EditorScene {
    fn load(&mut self, world: &mut SceneWorld) {
        let mut tile_types = world.assets().groups_with_prefix("tiles/");
        if tile_types.is_empty() {
            tile_types = FALLBACK_TILE_TYPES
                .iter()
                .map(|name| name.to_string())
                .collect();
        }
        self.tile_types = tile_types;
        self.type_index = 0;
        self.variant = 1;
        self.selection_mode = false;
        self.selection_anchor = None;
        self.selection_end = None;
        info!(
            tile_types = self.tile_types.len(),
            tiles = world.tilemap().tile_count(),
            "editor_loaded"
        );
    }

    fn update(&mut self, input: &InputSnapshot, world: &mut SceneWorld) -> SceneCommand {
        if input.was_pressed(InputAction::SwitchScene) {
            return SceneCommand::SwitchTo(SceneKey::Play);
        }

        self.pan_camera(input, world);

        self.hover_cell = input
            .cursor_view_px()
            .map(|cursor| TileIndex::from_world(world.viewport().screen_to_world(cursor)));

        if input.was_pressed(InputAction::NextTileType) {
            self.cycle_type(1);
        }
        if input.was_pressed(InputAction::PrevTileType) {
            self.cycle_type(-1);
        }
        if input.was_pressed(InputAction::NextVariant) {
            self.cycle_variant(1, world);
        }
        if input.was_pressed(InputAction::PrevVariant) {
            self.cycle_variant(-1, world);
        }

        if input.was_pressed(InputAction::ToggleSelection) {
            self.selection_mode = !self.selection_mode;
            if self.selection_mode {
                self.selection_anchor = None;
                self.selection_end = None;
            }
        }

        if let Some(hover) = self.hover_cell {
            if self.selection_mode {
                // First click anchors the region, later clicks stretch it.
                if input.left_click_pressed() {
                    if self.selection_anchor.is_none() {
                        self.selection_anchor = Some(hover);
                    } else {
                        self.selection_end = Some(hover);
                    }
                }
            } else {
                if input.left_mouse_down() {
                    self.paint(world, hover);
                }
                if input.right_mouse_down() {
                    self.erase(world, hover);
                }
            }
            self.place_markers(input, world, hover);
        }

        if input.was_pressed(InputAction::Fill) {
            if let Some(cells) = self.selection() {
                for index in &cells {
                    self.paint(world, *index);
                }
                info!(cells = cells.len(), tile_type = self.current_type(), "fill");
            }
        }
        if input.was_pressed(InputAction::Autotile) {
            if let Some(cells) = self.selection() {
                autotile_region(world.tilemap_mut(), &cells);
                info!(cells = cells.len(), "autotile");
            }
        }

        if input.was_pressed(InputAction::Save) {
            self.save(world);
        }

        SceneCommand::None
    }

    fn render(&mut self, world: &mut SceneWorld) {
        let viewport = *world.viewport();

        world.push_draw(DrawCommand::Clear {
            color: EDITOR_CLEAR_COLOR,
        });

        let mut tiles: Vec<Tile> = world.tilemap().tiles().cloned().collect();
        tiles.sort_by_key(|tile| (tile.layer, tile.index));
        for tile in tiles {
            world.push_draw(DrawCommand::Sprite {
                group: format!("tiles/{}", tile.tile_type),
                frame: tile.variant.saturating_sub(1) as usize,
                top_left: viewport.world_to_screen(tile.index.world_origin()),
                flip_x: false,
            });
        }

        let marker_rects: Vec<(TileIndex, Rgba)> = world
            .tilemap()
            .enemy_spawns()
            .map(|spawn| (spawn.index, ENEMY_MARKER_COLOR))
            .chain(
                world
                    .tilemap()
                    .grass_anchors()
                    .map(|anchor| (anchor.index, GRASS_MARKER_COLOR)),
            )
            .chain(
                world
                    .tilemap()
                    .notes()
                    .map(|note| (note.index, NOTE_MARKER_COLOR)),
            )
            .collect();
        for (index, color) in marker_rects {
            world.push_draw(DrawCommand::RectOutline {
                rect: cell_rect(&viewport, index),
                color,
            });
        }
        if let Some(spawn) = world.tilemap().player_spawn() {
            let index = TileIndex::from_world(Vec2::new(spawn.coord.x, spawn.coord.y - 1.0));
            world.push_draw(DrawCommand::RectOutline {
                rect: cell_rect(&viewport, index),
                color: PLAYER_MARKER_COLOR,
            });
        }

        if let (Some(anchor), Some(end)) = (self.selection_anchor, self.selection_end) {
            let a = viewport.world_to_screen(TileIndex(anchor.0.min(end.0), anchor.1.min(end.1)).world_origin());
            let width = ((anchor.0 - end.0).abs() + 1) as f32 * TILE_SIZE_F;
            let height = ((anchor.1 - end.1).abs() + 1) as f32 * TILE_SIZE_F;
            world.push_draw(DrawCommand::RectOutline {
                rect: Rect::new(a.x, a.y, width, height),
                color: SELECTION_COLOR,
            });
        }

        if let Some(hover) = self.hover_cell {
            world.push_draw(DrawCommand::Sprite {
                group: format!("tiles/{}", self.current_type()),
                frame: self.variant.saturating_sub(1) as usize,
                top_left: viewport.world_to_screen(hover.world_origin()),
                flip_x: false,
            });
            world.push_draw(DrawCommand::RectOutline {
                rect: cell_rect(&viewport, hover),
                color: HOVER_COLOR,
            });
        }
    }

    fn unload(&mut self, world: &mut SceneWorld) {
        info!(tiles = world.tilemap().tile_count(), "editor_unloaded");
    }

    fn debug_title(&self, world: &SceneWorld) -> Option<String> {
        Some(format!(
            "Editor | {} v{} layer {} | tiles {} | {}",
            self.current_type(),
            self.variant,
            self.layer,
            world.tilemap().tile_count(),
            if self.selection_mode {
                "selection"
            } else {
                "paint"
            }
        ))
    }
}

fn cell_rect(viewport: &ViewportState, index: TileIndex) -> Rect {
    let top_left = viewport.world_to_screen(index.world_origin());
    Rect::new(top_left.x, top_left.y, TILE_SIZE_F, TILE_SIZE_F)
}
