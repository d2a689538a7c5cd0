use engine::{TileIndex, TileMap};

/// Variant picked from which 4-neighbors are occupied, numpad-style: 7 is a
/// top-left corner, 5 the interior, 8 the top edge and the fallback.
pub(crate) fn autotile_variant(up: bool, right: bool, down: bool, left: bool) -> u32 {
    match (up, right, down, left) {
        (false, true, true, false) => 7,
        (false, false, true, true) => 9,
        (true, true, false, false) => 1,
        (true, false, false, true) => 3,
        (true, true, true, false) => 4,
        (true, false, true, true) => 6,
        (true, true, false, true) => 2,
        (false, true, true, true) => 8,
        (true, false, true, false) => 5,
        (true, true, true, true) => 5,
        _ => 8,
    }
}

/// Rewrites the variant of every tile in `cells` from its occupied
/// neighbors. Cells with no tile are skipped.
pub(crate) fn autotile_region(map: &mut TileMap, cells: &[TileIndex]) {
    for &index in cells {
        let Some(tile) = map.tile(index) else {
            continue;
        };
        let mut tile = tile.clone();
        tile.variant = autotile_variant(
            map.tile(index.offset(0, -1)).is_some(),
            map.tile(index.offset(1, 0)).is_some(),
            map.tile(index.offset(0, 1)).is_some(),
            map.tile(index.offset(-1, 0)).is_some(),
        );
        map.set_tile(tile);
    }
}

/// Inclusive rectangle of cells between two corners, in either order.
pub(crate) fn region_cells(a: TileIndex, b: TileIndex) -> Vec<TileIndex> {
    let (min_i, max_i) = (a.0.min(b.0), a.0.max(b.0));
    let (min_j, max_j) = (a.1.min(b.1), a.1.max(b.1));
    let mut cells = Vec::new();
    for i in min_i..=max_i {
        for j in min_j..=max_j {
            cells.push(TileIndex(i, j));
        }
    }
    cells
}
