use crate::app::{EntityId, Vec3};

use super::tile::{Tile, MAX_ROOM_SIZE};

/// Fixed 100x100 cell grid for one room. Cells outside the room text stay
/// empty. Read-only once the builder hands it out.
#[derive(Debug, Clone)]
pub struct TileGrid {
    room_id: String,
    row_count: usize,
    cells: Vec<Option<Tile>>,
    tile_count: usize,
}

impl TileGrid {
    pub(crate) fn new(room_id: impl Into<String>, row_count: usize) -> Self {
        Self {
            room_id: room_id.into(),
            row_count,
            cells: vec![None; MAX_ROOM_SIZE * MAX_ROOM_SIZE],
            tile_count: 0,
        }
    }

    pub(crate) fn insert(&mut self, tile: Tile) {
        let Some(index) = cell_index(tile.grid_x(), tile.grid_y()) else {
            return;
        };
        if self.cells[index].is_none() {
            self.tile_count += 1;
        }
        self.cells[index] = Some(tile);
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn max_row_index(&self) -> usize {
        self.row_count.saturating_sub(1)
    }

    pub fn tile_count(&self) -> usize {
        self.tile_count
    }

    pub fn tile(&self, x: usize, y: usize) -> Option<&Tile> {
        cell_index(x, y).and_then(|index| self.cells[index].as_ref())
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter().flatten()
    }

    /// Tile whose unit cell contains the planar point, if any.
    pub fn tile_at_world(&self, point: Vec3) -> Option<&Tile> {
        let x = point.x.round();
        let world_row = point.y.round();
        if !x.is_finite() || !world_row.is_finite() || x < 0.0 || world_row < 0.0 {
            return None;
        }
        let world_row = world_row as usize;
        if world_row > self.max_row_index() {
            return None;
        }
        self.tile(x as usize, self.max_row_index() - world_row)
    }

    pub fn node_ids(&self) -> Vec<EntityId> {
        self.tiles().filter_map(Tile::node).collect()
    }
}

fn cell_index(x: usize, y: usize) -> Option<usize> {
    if x < MAX_ROOM_SIZE && y < MAX_ROOM_SIZE {
        Some(y * MAX_ROOM_SIZE + x)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::tile::{GridCoord, FLOOR_HEIGHT, WALL_HEIGHT};

    fn two_row_grid() -> TileGrid {
        let mut grid = TileGrid::new("test", 2);
        grid.insert(Tile::place(GridCoord::new(0, 0), 1, WALL_HEIGHT, '|', "Wall", None));
        grid.insert(Tile::place(GridCoord::new(0, 1), 1, FLOOR_HEIGHT, '.', "Floor", None));
        grid
    }

    #[test]
    fn world_lookup_uses_flipped_rows() {
        let grid = two_row_grid();
        let top = grid.tile_at_world(Vec3::new(0.2, 0.9, 0.0)).expect("top row");
        assert_eq!((top.grid_x(), top.grid_y()), (0, 0));
        let bottom = grid.tile_at_world(Vec3::new(-0.4, 0.3, 0.0)).expect("bottom row");
        assert_eq!((bottom.grid_x(), bottom.grid_y()), (0, 1));
    }

    #[test]
    fn world_lookup_outside_grid_is_none() {
        let grid = two_row_grid();
        assert!(grid.tile_at_world(Vec3::new(-1.0, 0.0, 0.0)).is_none());
        assert!(grid.tile_at_world(Vec3::new(0.0, 2.0, 0.0)).is_none());
        assert!(grid.tile_at_world(Vec3::new(1.0, 0.0, 0.0)).is_none());
        assert!(grid.tile_at_world(Vec3::new(f32::NAN, 0.0, 0.0)).is_none());
    }

    #[test]
    fn out_of_range_cells_are_absent() {
        let grid = two_row_grid();
        assert_eq!(grid.tile_count(), 2);
        assert!(grid.tile(MAX_ROOM_SIZE, 0).is_none());
        assert!(grid.tile(0, MAX_ROOM_SIZE).is_none());
    }
}
