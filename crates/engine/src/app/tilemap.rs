use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::geometry::{Rect, Vec2};
use super::grid::TileIndex;
use crate::content::atomic_io;

pub const TILE_SIZE: i32 = 36;
pub const TILE_SIZE_F: f32 = TILE_SIZE as f32;

/// Tile types that bodies and bullets collide with.
pub const COLLIDABLE_TILE_TYPES: [&str; 2] = ["Dirt", "Stone"];

/// Rows below the deepest tile before a body counts as fallen out of the
/// level, and the fallback when the map has no tiles at all.
const BOTTOM_MARGIN_ROWS: i32 = 15;
const EMPTY_MAP_BOTTOM_ROWS: i32 = 30;

/// Neighborhood scan order for collision tests. Center cell first ring, then
/// the row two above so tall bodies still see head-height tiles.
pub const SURROUNDING_OFFSETS: [(i32, i32); 12] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (-1, -2),
    (0, -2),
    (1, -2),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub index: TileIndex,
    pub tile_type: String,
    pub variant: u32,
    pub layer: i32,
}

impl Tile {
    pub fn is_collidable(&self) -> bool {
        COLLIDABLE_TILE_TYPES.contains(&self.tile_type.as_str())
    }

    pub fn world_rect(&self) -> Rect {
        let origin = self.index.world_origin();
        Rect::new(origin.x, origin.y, TILE_SIZE_F, TILE_SIZE_F)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnemySpawn {
    pub index: TileIndex,
    pub coord: Vec2,
    pub variant: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GrassAnchor {
    pub index: TileIndex,
    pub coord: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSpawn {
    pub coord: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileNote {
    pub index: TileIndex,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed level document")]
    Malformed {
        #[source]
        source: serde_json::Error,
    },
    #[error("bad cell key {key:?} in section {section}")]
    BadKey { key: String, section: &'static str },
    #[error("failed to write level file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Sparse level state. Everything is keyed by [`TileIndex`]; the map has no
/// fixed extent and negative cells are first-class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileMap {
    tiles: HashMap<TileIndex, Tile>,
    enemy_spawns: HashMap<TileIndex, EnemySpawn>,
    grass_anchors: HashMap<TileIndex, GrassAnchor>,
    notes: HashMap<TileIndex, TileNote>,
    player_spawn: Option<PlayerSpawn>,
    offgrid_elements: Vec<Value>,
}

impl TileMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tile(&self, index: TileIndex) -> Option<&Tile> {
        self.tiles.get(&index)
    }

    pub fn tile_at_world(&self, pos: Vec2) -> Option<&Tile> {
        self.tile(TileIndex::from_world(pos))
    }

    pub fn set_tile(&mut self, tile: Tile) {
        self.tiles.insert(tile.index, tile);
    }

    pub fn delete_tile(&mut self, index: TileIndex) -> Option<Tile> {
        self.tiles.remove(&index)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn enemy_spawns(&self) -> impl Iterator<Item = &EnemySpawn> {
        self.enemy_spawns.values()
    }

    pub fn set_enemy_spawn(&mut self, spawn: EnemySpawn) {
        self.enemy_spawns.insert(spawn.index, spawn);
    }

    pub fn delete_enemy_spawn(&mut self, index: TileIndex) -> Option<EnemySpawn> {
        self.enemy_spawns.remove(&index)
    }

    pub fn grass_anchors(&self) -> impl Iterator<Item = &GrassAnchor> {
        self.grass_anchors.values()
    }

    pub fn set_grass_anchor(&mut self, anchor: GrassAnchor) {
        self.grass_anchors.insert(anchor.index, anchor);
    }

    pub fn delete_grass_anchor(&mut self, index: TileIndex) -> Option<GrassAnchor> {
        self.grass_anchors.remove(&index)
    }

    pub fn notes(&self) -> impl Iterator<Item = &TileNote> {
        self.notes.values()
    }

    pub fn set_note(&mut self, note: TileNote) {
        self.notes.insert(note.index, note);
    }

    pub fn delete_note(&mut self, index: TileIndex) -> Option<TileNote> {
        self.notes.remove(&index)
    }

    pub fn player_spawn(&self) -> Option<&PlayerSpawn> {
        self.player_spawn.as_ref()
    }

    pub fn set_player_spawn(&mut self, spawn: PlayerSpawn) {
        self.player_spawn = Some(spawn);
    }

    pub fn clear_player_spawn(&mut self) {
        self.player_spawn = None;
    }

    pub fn clear_markers_at(&mut self, index: TileIndex) {
        self.enemy_spawns.remove(&index);
        self.grass_anchors.remove(&index);
        self.notes.remove(&index);
    }

    /// Tiles around a world position in fixed [`SURROUNDING_OFFSETS`] order.
    /// Collision resolution depends on this order, so it never changes.
    pub fn surrounding_tiles(&self, pos: Vec2) -> Vec<&Tile> {
        let center = TileIndex::from_world(pos);
        SURROUNDING_OFFSETS
            .iter()
            .filter_map(|&(di, dj)| self.tiles.get(&center.offset(di, dj)))
            .collect()
    }

    /// Lethal depth in world pixels, derived from the deepest tile row.
    pub fn bottom_bound(&self) -> f32 {
        let deepest = self.tiles.keys().map(|index| index.1).max();
        let rows = match deepest {
            Some(row) => row + BOTTOM_MARGIN_ROWS,
            None => EMPTY_MAP_BOTTOM_ROWS,
        };
        (rows * TILE_SIZE) as f32
    }

    pub fn load_level(&mut self, path: &Path) -> Result<(), LevelError> {
        let text = fs::read_to_string(path).map_err(|source| LevelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        // Parse into a fresh map first so a malformed document leaves the
        // current state untouched.
        *self = Self::from_level_str(&text)?;
        Ok(())
    }

    pub fn from_level_str(text: &str) -> Result<Self, LevelError> {
        let doc: LevelDoc =
            serde_json::from_str(text).map_err(|source| LevelError::Malformed { source })?;
        Self::from_doc(doc)
    }

    fn from_doc(doc: LevelDoc) -> Result<Self, LevelError> {
        let mut map = Self::new();
        for (key, tile) in doc.tiles {
            let index = parse_key(&key, "tiles")?;
            map.tiles.insert(
                index,
                Tile {
                    index,
                    tile_type: tile.tile_type,
                    variant: tile.variant,
                    layer: tile.layer,
                },
            );
        }
        for (key, enemy) in doc.enemies {
            let index = parse_key(&key, "enemies")?;
            map.enemy_spawns.insert(
                index,
                EnemySpawn {
                    index,
                    coord: Vec2::new(enemy.coord[0], enemy.coord[1]),
                    variant: enemy.variant,
                },
            );
        }
        for (key, grass) in doc.grasses {
            let index = parse_key(&key, "grasses")?;
            map.grass_anchors.insert(
                index,
                GrassAnchor {
                    index,
                    coord: Vec2::new(grass.coord[0], grass.coord[1]),
                },
            );
        }
        for (key, note) in doc.notes {
            let index = parse_key(&key, "notes")?;
            map.notes.insert(index, TileNote { index, text: note.text });
        }
        map.player_spawn = doc.player.map(|player| PlayerSpawn {
            coord: Vec2::new(player.coord[0], player.coord[1]),
        });
        map.offgrid_elements = doc.offgrid_elements;
        Ok(map)
    }

    pub fn save_level(&self, path: &Path) -> Result<(), LevelError> {
        let text = self.to_level_string();
        atomic_io::write_text_atomic(path, &text).map_err(|source| LevelError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_level_string(&self) -> String {
        let doc = self.to_doc();
        // A purely in-memory document with string keys cannot fail to encode.
        serde_json::to_string_pretty(&doc).unwrap_or_default()
    }

    fn to_doc(&self) -> LevelDoc {
        LevelDoc {
            tiles: self
                .tiles
                .values()
                .map(|tile| {
                    (
                        tile.index.wire_key(),
                        TileDoc {
                            indices: [tile.index.0, tile.index.1],
                            tile_type: tile.tile_type.clone(),
                            variant: tile.variant,
                            layer: tile.layer,
                        },
                    )
                })
                .collect(),
            offgrid_elements: self.offgrid_elements.clone(),
            enemies: self
                .enemy_spawns
                .values()
                .map(|spawn| {
                    (
                        spawn.index.wire_key(),
                        EnemyDoc {
                            indices: [spawn.index.0, spawn.index.1],
                            coord: [spawn.coord.x, spawn.coord.y],
                            variant: spawn.variant,
                        },
                    )
                })
                .collect(),
            grasses: self
                .grass_anchors
                .values()
                .map(|anchor| {
                    (
                        anchor.index.wire_key(),
                        GrassDoc {
                            indices: [anchor.index.0, anchor.index.1],
                            coord: [anchor.coord.x, anchor.coord.y],
                        },
                    )
                })
                .collect(),
            notes: self
                .notes
                .values()
                .map(|note| (note.index.wire_key(), NoteDoc { text: note.text.clone() }))
                .collect(),
            player: self.player_spawn.as_ref().map(|spawn| {
                // The spawn anchor sits on its cell's bottom edge; nudge up
                // so the derived cell is the one the anchor stands in.
                let cell = TileIndex::from_world(Vec2::new(spawn.coord.x, spawn.coord.y - 1.0));
                PlayerDoc {
                    indices: [cell.0, cell.1],
                    coord: [spawn.coord.x, spawn.coord.y],
                }
            }),
        }
    }
}

fn parse_key(key: &str, section: &'static str) -> Result<TileIndex, LevelError> {
    TileIndex::from_wire_key(key).ok_or_else(|| LevelError::BadKey {
        key: key.to_string(),
        section,
    })
}

/// On-disk level document. Kept public so callers can run their own schema
/// preflight before handing the file to [`TileMap::load_level`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LevelDoc {
    #[serde(default)]
    pub tiles: BTreeMap<String, TileDoc>,
    #[serde(default)]
    pub offgrid_elements: Vec<Value>,
    #[serde(default)]
    pub enemies: BTreeMap<String, EnemyDoc>,
    #[serde(default)]
    pub grasses: BTreeMap<String, GrassDoc>,
    #[serde(default)]
    pub notes: BTreeMap<String, NoteDoc>,
    #[serde(default)]
    pub player: Option<PlayerDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TileDoc {
    /// Redundant copy of the cell key; the key stays authoritative on load.
    #[serde(default)]
    pub indices: [i32; 2],
    pub tile_type: String,
    pub variant: u32,
    #[serde(default)]
    pub layer: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EnemyDoc {
    #[serde(default)]
    pub indices: [i32; 2],
    pub coord: [f32; 2],
    #[serde(default)]
    pub variant: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GrassDoc {
    #[serde(default)]
    pub indices: [i32; 2],
    pub coord: [f32; 2],
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NoteDoc {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlayerDoc {
    #[serde(default)]
    pub indices: [i32; 2],
    pub coord: [f32; 2],
}
