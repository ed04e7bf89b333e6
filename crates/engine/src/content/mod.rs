mod database;
mod rooms;
mod textures;

pub use database::{RoomDatabase, RoomDescription};
pub use rooms::{
    load_room_database, normalize_room_body, parse_rooms_document, ContentErrorCode,
    ContentLoadError, SourceLocation, ROOMS_ROOT_ELEMENT, ROOM_ELEMENT,
};
pub use textures::{TextureHandle, TextureTable};
