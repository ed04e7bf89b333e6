use std::collections::BTreeMap;

/// One room entry from the rooms document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomDescription {
    pub id: String,
    pub floor_texture: String,
    pub wall_texture: String,
    /// Every attribute on the element, including `num`, `floor` and `wall`.
    pub attributes: BTreeMap<String, String>,
    pub body: String,
}

impl RoomDescription {
    pub fn new(
        id: impl Into<String>,
        floor_texture: impl Into<String>,
        wall_texture: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let floor_texture = floor_texture.into();
        let wall_texture = wall_texture.into();
        let mut attributes = BTreeMap::new();
        attributes.insert("num".to_string(), id.clone());
        attributes.insert("floor".to_string(), floor_texture.clone());
        attributes.insert("wall".to_string(), wall_texture.clone());
        Self {
            id,
            floor_texture,
            wall_texture,
            attributes,
            body: body.into(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

#[derive(Debug, Default, Clone)]
pub struct RoomDatabase {
    rooms: Vec<RoomDescription>,
    index_by_id: BTreeMap<String, usize>,
}

impl RoomDatabase {
    /// Later rooms with an id already present replace the earlier entry.
    pub fn from_rooms(rooms: impl IntoIterator<Item = RoomDescription>) -> Self {
        let mut database = Self::default();
        for room in rooms {
            match database.index_by_id.get(&room.id) {
                Some(&index) => database.rooms[index] = room,
                None => {
                    database
                        .index_by_id
                        .insert(room.id.clone(), database.rooms.len());
                    database.rooms.push(room);
                }
            }
        }
        database
    }

    pub fn room(&self, id: &str) -> Option<&RoomDescription> {
        self.index_by_id.get(id).map(|&index| &self.rooms[index])
    }

    pub fn rooms(&self) -> &[RoomDescription] {
        &self.rooms
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_id() {
        let database = RoomDatabase::from_rooms([
            RoomDescription::new("0", "Floor", "Wall", "..."),
            RoomDescription::new("1", "Floor", "Wall", "|.|"),
        ]);
        assert_eq!(database.len(), 2);
        assert_eq!(database.room("1").map(|room| room.body.as_str()), Some("|.|"));
        assert!(database.room("2").is_none());
    }

    #[test]
    fn attributes_include_required_fields() {
        let room = RoomDescription::new("7", "Sand", "Stone", "");
        assert_eq!(room.attribute("num"), Some("7"));
        assert_eq!(room.attribute("floor"), Some("Sand"));
        assert_eq!(room.attribute("wall"), Some("Stone"));
        assert_eq!(room.attribute("music"), None);
    }
}
