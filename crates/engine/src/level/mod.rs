mod builder;
mod grid;
mod tile;

pub use builder::{
    build_grid, build_room, MarkerKind, MarkerPlacement, MarkerTable, RoomBuild, RoomBuildError,
};
pub use grid::TileGrid;
pub use tile::{GridCoord, Tile, MAX_ROOM_SIZE};
