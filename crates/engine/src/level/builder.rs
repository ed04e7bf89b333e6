use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::app::{NodeTemplate, SceneWorld, Transform, Vec3};
use crate::content::{RoomDatabase, RoomDescription, TextureTable};

use super::grid::TileGrid;
use super::tile::{
    GridCoord, Tile, FLOOR_GLYPH, FLOOR_HEIGHT, MAX_ROOM_SIZE, WALL_GLYPH, WALL_HEIGHT,
};

const SKIP_GLYPHS: [char; 2] = [' ', '_'];
const FLOOR_NODE: &str = "floor_tile";
const WALL_NODE: &str = "wall_tile";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    PlayerStart,
}

/// Glyphs that place something in the room in addition to a floor tile.
#[derive(Debug, Clone)]
pub struct MarkerTable {
    kinds_by_glyph: BTreeMap<char, MarkerKind>,
}

impl Default for MarkerTable {
    fn default() -> Self {
        Self::empty().with_marker('X', MarkerKind::PlayerStart)
    }
}

impl MarkerTable {
    pub fn empty() -> Self {
        Self {
            kinds_by_glyph: BTreeMap::new(),
        }
    }

    pub fn with_marker(mut self, glyph: char, kind: MarkerKind) -> Self {
        self.kinds_by_glyph.insert(glyph, kind);
        self
    }

    pub fn resolve(&self, glyph: char) -> Option<MarkerKind> {
        self.kinds_by_glyph.get(&glyph).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPlacement {
    pub kind: MarkerKind,
    pub glyph: char,
    pub coord: GridCoord,
    pub position: Vec3,
}

#[derive(Debug, Clone)]
pub struct RoomBuild {
    pub grid: TileGrid,
    pub markers: Vec<MarkerPlacement>,
}

impl RoomBuild {
    /// With several start markers the last one in row-major order wins.
    pub fn player_start(&self) -> Option<Vec3> {
        self.markers
            .iter()
            .rev()
            .find(|marker| marker.kind == MarkerKind::PlayerStart)
            .map(|marker| marker.position)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomBuildError {
    #[error("room '{room_id}' does not exist")]
    UnknownRoom { room_id: String },
    #[error(
        "room '{room_id}' is {columns}x{rows}, larger than the {max}x{max} grid"
    )]
    GridBounds {
        room_id: String,
        rows: usize,
        columns: usize,
        max: usize,
    },
}

/// Looks `room_id` up and builds its grid. On error nothing is spawned.
pub fn build_room(
    rooms: &RoomDatabase,
    room_id: &str,
    textures: &TextureTable,
    markers: &MarkerTable,
    world: &mut SceneWorld,
) -> Result<RoomBuild, RoomBuildError> {
    let Some(room) = rooms.room(room_id) else {
        warn!(room = room_id, "room_not_found");
        return Err(RoomBuildError::UnknownRoom {
            room_id: room_id.to_string(),
        });
    };
    build_grid(room, textures, markers, world)
}

pub fn build_grid(
    room: &RoomDescription,
    textures: &TextureTable,
    markers: &MarkerTable,
    world: &mut SceneWorld,
) -> Result<RoomBuild, RoomBuildError> {
    let rows = split_rows(&room.body);
    let columns = rows
        .iter()
        .map(|row| row.chars().count())
        .max()
        .unwrap_or(0);
    if rows.len() > MAX_ROOM_SIZE || columns > MAX_ROOM_SIZE {
        warn!(
            room = %room.id,
            rows = rows.len(),
            columns,
            max = MAX_ROOM_SIZE,
            "room_exceeds_grid"
        );
        return Err(RoomBuildError::GridBounds {
            room_id: room.id.clone(),
            rows: rows.len(),
            columns,
            max: MAX_ROOM_SIZE,
        });
    }

    let max_row_index = rows.len().saturating_sub(1);
    let mut grid = TileGrid::new(room.id.clone(), rows.len());
    let mut placements = Vec::new();
    let mut warned_textures = BTreeSet::new();

    for (y, row) in rows.iter().enumerate() {
        for (x, glyph) in row.chars().enumerate() {
            if SKIP_GLYPHS.contains(&glyph) {
                continue;
            }
            let coord = GridCoord::new(x, y);
            let (height, texture_key, node_name) = if glyph == WALL_GLYPH {
                (WALL_HEIGHT, room.wall_texture.as_str(), WALL_NODE)
            } else {
                (FLOOR_HEIGHT, room.floor_texture.as_str(), FLOOR_NODE)
            };

            let texture = textures.resolve(texture_key);
            if texture.is_none() && warned_textures.insert(texture_key.to_string()) {
                warn!(room = %room.id, texture = texture_key, "texture_missing");
            }

            let mut tile = Tile::place(coord, max_row_index, height, glyph, texture_key, texture);
            if glyph != FLOOR_GLYPH && glyph != WALL_GLYPH {
                match markers.resolve(glyph) {
                    Some(kind) => placements.push(MarkerPlacement {
                        kind,
                        glyph,
                        coord,
                        position: tile.position(),
                    }),
                    None => debug!(room = %room.id, glyph = %glyph, x, y, "unmapped_marker_glyph"),
                }
            }

            let node = world.spawn(
                NodeTemplate {
                    debug_name: node_name,
                    texture,
                },
                Transform::at(tile.render_position()),
            );
            tile.attach_node(node);
            grid.insert(tile);
        }
    }

    info!(
        room = %room.id,
        rows = rows.len(),
        columns,
        tile_count = grid.tile_count(),
        marker_count = placements.len(),
        "room_built"
    );
    Ok(RoomBuild {
        grid,
        markers: placements,
    })
}

/// Tabs at either edge of a row are indentation; a trailing `\r` is a line
/// ending. Spaces and underscores are kept since they are empty cells.
fn split_rows(body: &str) -> Vec<&str> {
    body.split('\n')
        .map(|row| row.strip_suffix('\r').unwrap_or(row).trim_matches('\t'))
        .collect()
}
