use super::geometry::Vec2;
use super::tilemap::TILE_SIZE;

/// Sparse-map key for one tile cell. Negative indices are valid; the map has
/// no fixed bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileIndex(pub i32, pub i32);

impl TileIndex {
    pub fn from_world(pos: Vec2) -> Self {
        Self(
            (pos.x as i32).div_euclid(TILE_SIZE),
            (pos.y as i32).div_euclid(TILE_SIZE),
        )
    }

    /// Top-left corner of the cell in world pixels.
    pub fn world_origin(self) -> Vec2 {
        Vec2 {
            x: (self.0 * TILE_SIZE) as f32,
            y: (self.1 * TILE_SIZE) as f32,
        }
    }

    pub fn offset(self, di: i32, dj: i32) -> Self {
        Self(self.0 + di, self.1 + dj)
    }

    pub fn wire_key(self) -> String {
        format!("{};{}", self.0, self.1)
    }

    pub fn from_wire_key(key: &str) -> Option<Self> {
        let (i, j) = key.split_once(';')?;
        Some(Self(i.parse().ok()?, j.parse().ok()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_world_floors_toward_negative_infinity() {
        assert_eq!(TileIndex::from_world(Vec2::new(0.0, 0.0)), TileIndex(0, 0));
        assert_eq!(TileIndex::from_world(Vec2::new(35.9, 35.9)), TileIndex(0, 0));
        assert_eq!(TileIndex::from_world(Vec2::new(36.0, 72.0)), TileIndex(1, 2));
        assert_eq!(
            TileIndex::from_world(Vec2::new(-1.0, -37.0)),
            TileIndex(-1, -2)
        );
    }

    #[test]
    fn world_origin_round_trips_through_from_world() {
        for index in [TileIndex(0, 0), TileIndex(4, -3), TileIndex(-7, 12)] {
            assert_eq!(TileIndex::from_world(index.world_origin()), index);
        }
    }

    #[test]
    fn wire_key_round_trips_including_negative_indices() {
        for index in [TileIndex(0, 0), TileIndex(12, 7), TileIndex(-3, -40)] {
            assert_eq!(TileIndex::from_wire_key(&index.wire_key()), Some(index));
        }
    }

    #[test]
    fn malformed_wire_keys_are_rejected() {
        assert_eq!(TileIndex::from_wire_key(""), None);
        assert_eq!(TileIndex::from_wire_key("3"), None);
        assert_eq!(TileIndex::from_wire_key("3;"), None);
        assert_eq!(TileIndex::from_wire_key("a;b"), None);
        assert_eq!(TileIndex::from_wire_key("1.5;2"), None);
    }
}
