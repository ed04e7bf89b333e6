use crate::app::{EntityId, Vec3};
use crate::content::TextureHandle;

/// Largest room the builder accepts on either axis.
pub const MAX_ROOM_SIZE: usize = 100;

pub const FLOOR_GLYPH: char = '.';
pub const WALL_GLYPH: char = '|';
pub const FLOOR_HEIGHT: i32 = 0;
pub const WALL_HEIGHT: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoord {
    pub x: usize,
    pub y: usize,
}

impl GridCoord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    coord: GridCoord,
    height: i32,
    glyph: char,
    position: Vec3,
    render_position: Vec3,
    texture_key: String,
    texture: Option<TextureHandle>,
    node: Option<EntityId>,
}

impl Tile {
    /// Grid row 0 is the top line of the room text, so it lands at the
    /// largest world `y`. The rendered position sinks or raises the tile by
    /// its height around the play plane.
    pub fn place(
        coord: GridCoord,
        max_row_index: usize,
        height: i32,
        glyph: char,
        texture_key: impl Into<String>,
        texture: Option<TextureHandle>,
    ) -> Self {
        let row_from_bottom = max_row_index.saturating_sub(coord.y);
        let position = Vec3::new(coord.x as f32, row_from_bottom as f32, 0.0);
        let render_position = position + Vec3::new(0.0, 0.0, -(height as f32 - 0.5));
        Self {
            coord,
            height,
            glyph,
            position,
            render_position,
            texture_key: texture_key.into(),
            texture,
            node: None,
        }
    }

    pub(crate) fn attach_node(&mut self, node: EntityId) {
        self.node = Some(node);
    }

    pub fn coord(&self) -> GridCoord {
        self.coord
    }

    pub fn grid_x(&self) -> usize {
        self.coord.x
    }

    pub fn grid_y(&self) -> usize {
        self.coord.y
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_wall(&self) -> bool {
        self.height > 0
    }

    pub fn glyph(&self) -> char {
        self.glyph
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn render_position(&self) -> Vec3 {
        self.render_position
    }

    pub fn texture_key(&self) -> &str {
        &self.texture_key
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    pub fn node(&self) -> Option<EntityId> {
        self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_flips_rows_and_offsets_render_depth() {
        let wall = Tile::place(GridCoord::new(3, 0), 4, WALL_HEIGHT, '|', "Wall", None);
        assert_eq!(wall.position(), Vec3::new(3.0, 4.0, 0.0));
        assert_eq!(wall.render_position(), Vec3::new(3.0, 4.0, -0.5));
        assert!(wall.is_wall());

        let floor = Tile::place(GridCoord::new(0, 4), 4, FLOOR_HEIGHT, '.', "Floor", None);
        assert_eq!(floor.position(), Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(floor.render_position(), Vec3::new(0.0, 0.0, 0.5));
        assert!(!floor.is_wall());
        assert!(floor.node().is_none());
    }
}
