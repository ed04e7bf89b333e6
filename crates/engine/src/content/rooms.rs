use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use tracing::info;

use super::database::{RoomDatabase, RoomDescription};

pub const ROOMS_ROOT_ELEMENT: &str = "xml";
pub const ROOM_ELEMENT: &str = "room";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownElement,
    MissingAttribute,
    InvalidValue,
    DuplicateRoom,
}

#[derive(Debug, Clone)]
pub struct ContentLoadError {
    pub code: ContentErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for ContentLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for ContentLoadError {}

pub fn load_room_database(path: &Path) -> Result<RoomDatabase, ContentLoadError> {
    let raw = fs::read_to_string(path).map_err(|error| ContentLoadError {
        code: ContentErrorCode::ReadFile,
        message: format!("failed to read rooms file: {error}"),
        file_path: path.to_path_buf(),
        location: None,
    })?;
    let database = parse_rooms_document(path, &raw)?;
    info!(
        path = %path.display(),
        room_count = database.len(),
        "rooms_loaded"
    );
    Ok(database)
}

/// Parses `<xml><room num=".." floor=".." wall="..">BODY</room>...</xml>`.
pub fn parse_rooms_document(file_path: &Path, raw: &str) -> Result<RoomDatabase, ContentLoadError> {
    let doc = Document::parse(raw).map_err(|error| {
        let pos = error.pos();
        ContentLoadError {
            code: ContentErrorCode::XmlMalformed,
            message: format!("malformed XML: {error}"),
            file_path: file_path.to_path_buf(),
            location: Some(SourceLocation {
                line: pos.row as usize,
                column: pos.col as usize,
            }),
        }
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != ROOMS_ROOT_ELEMENT {
        return Err(error_at_node(
            ContentErrorCode::InvalidRoot,
            format!(
                "root element must be <{ROOMS_ROOT_ELEMENT}>, found <{}>",
                root.tag_name().name()
            ),
            file_path,
            &doc,
            root,
        ));
    }

    let mut seen_ids = HashSet::<String>::new();
    let mut rooms = Vec::new();
    for node in root.children().filter(Node::is_element) {
        if node.tag_name().name() != ROOM_ELEMENT {
            return Err(error_at_node(
                ContentErrorCode::UnknownElement,
                format!(
                    "unknown element <{}> under <{ROOMS_ROOT_ELEMENT}>",
                    node.tag_name().name()
                ),
                file_path,
                &doc,
                node,
            ));
        }
        let room = parse_room_node(file_path, &doc, node)?;
        if !seen_ids.insert(room.id.clone()) {
            return Err(error_at_node(
                ContentErrorCode::DuplicateRoom,
                format!("room num '{}' is defined more than once", room.id),
                file_path,
                &doc,
                node,
            ));
        }
        rooms.push(room);
    }

    Ok(RoomDatabase::from_rooms(rooms))
}

fn parse_room_node(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> Result<RoomDescription, ContentLoadError> {
    let attributes = node
        .attributes()
        .map(|attribute| (attribute.name().to_string(), attribute.value().to_string()))
        .collect::<BTreeMap<_, _>>();

    let required = |name: &str| -> Result<String, ContentLoadError> {
        match attributes.get(name) {
            Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            Some(_) => Err(error_at_node(
                ContentErrorCode::InvalidValue,
                format!("attribute '{name}' on <{ROOM_ELEMENT}> must not be empty"),
                file_path,
                doc,
                node,
            )),
            None => Err(error_at_node(
                ContentErrorCode::MissingAttribute,
                format!("<{ROOM_ELEMENT}> is missing required attribute '{name}'"),
                file_path,
                doc,
                node,
            )),
        }
    };
    let id = required("num")?;
    let floor_texture = required("floor")?;
    let wall_texture = required("wall")?;

    if let Some(child) = node.children().find(Node::is_element) {
        return Err(error_at_node(
            ContentErrorCode::UnknownElement,
            format!(
                "unexpected element <{}> inside room '{id}'; a room body is plain text",
                child.tag_name().name()
            ),
            file_path,
            doc,
            child,
        ));
    }

    let raw_body = node
        .children()
        .filter(Node::is_text)
        .filter_map(|child| child.text())
        .collect::<String>();

    Ok(RoomDescription {
        id,
        floor_texture,
        wall_texture,
        attributes,
        body: normalize_room_body(&raw_body),
    })
}

/// Drops the blank lines XML indentation leaves around a room body. A line
/// is blank when only tabs and `\r` remain; spaces are empty cells and keep
/// their row. Interior rows are kept as written.
pub fn normalize_room_body(raw: &str) -> String {
    let lines = raw.split('\n').collect::<Vec<_>>();
    let is_blank = |line: &&str| line.chars().all(|c| c == '\t' || c == '\r');
    let start = lines.iter().position(|line| !is_blank(line));
    let end = lines.iter().rposition(|line| !is_blank(line));
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}

fn error_at_node(
    code: ContentErrorCode,
    message: String,
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> ContentLoadError {
    let pos = doc.text_pos_at(node.range().start);
    ContentLoadError {
        code,
        message,
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: pos.row as usize,
            column: pos.col as usize,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(raw: &str) -> Result<RoomDatabase, ContentLoadError> {
        parse_rooms_document(Path::new("rooms.xml"), raw)
    }

    #[test]
    fn parses_rooms_with_extra_attributes() {
        let raw = "<xml>\n\
<room num=\"0\" floor=\"Floor\" wall=\"Wall\" music=\"calm\">\n\
\t|||\n\
\t|X|\n\
\t|||\n\
</room>\n\
<room num=\"1\" floor=\"Sand\" wall=\"Stone\">..</room>\n\
</xml>";
        let database = parse(raw).expect("parse");

        assert_eq!(database.len(), 2);
        let room = database.room("0").expect("room 0");
        assert_eq!(room.floor_texture, "Floor");
        assert_eq!(room.wall_texture, "Wall");
        assert_eq!(room.attribute("music"), Some("calm"));
        assert_eq!(room.body, "\t|||\n\t|X|\n\t|||");
        assert_eq!(database.room("1").map(|r| r.body.as_str()), Some(".."));
    }

    #[test]
    fn missing_wall_attribute_reports_location() {
        let raw = "<xml>\n  <room num=\"0\" floor=\"Floor\">..</room>\n</xml>";
        let error = parse(raw).expect_err("missing wall");
        assert_eq!(error.code, ContentErrorCode::MissingAttribute);
        assert_eq!(
            error.location,
            Some(SourceLocation { line: 2, column: 3 })
        );
        assert!(error.message.contains("'wall'"));
    }

    #[test]
    fn duplicate_room_ids_are_rejected() {
        let raw = "<xml><room num=\"0\" floor=\"F\" wall=\"W\"/><room num=\"0\" floor=\"F\" wall=\"W\"/></xml>";
        let error = parse(raw).expect_err("duplicate");
        assert_eq!(error.code, ContentErrorCode::DuplicateRoom);
    }

    #[test]
    fn wrong_root_is_rejected() {
        let error = parse("<rooms/>").expect_err("root");
        assert_eq!(error.code, ContentErrorCode::InvalidRoot);
    }

    #[test]
    fn unknown_child_element_is_rejected() {
        let error = parse("<xml><hall num=\"0\"/></xml>").expect_err("unknown");
        assert_eq!(error.code, ContentErrorCode::UnknownElement);
    }

    #[test]
    fn malformed_xml_is_reported() {
        let error = parse("<xml><room></xml>").expect_err("malformed");
        assert_eq!(error.code, ContentErrorCode::XmlMalformed);
        assert!(error.location.is_some());
    }

    #[test]
    fn normalize_drops_only_edge_blank_lines() {
        assert_eq!(normalize_room_body("\n\t\r\n..\n\n|.\n\t\n"), "..\n\n|.");
        assert_eq!(normalize_room_body("\n\n"), "");
        assert_eq!(normalize_room_body("_\n."), "_\n.");
    }

    #[test]
    fn space_rows_at_body_edges_are_kept() {
        assert_eq!(normalize_room_body("\n\t   \n.X.\n  \n\t"), "\t   \n.X.\n  ");
    }

    #[test]
    fn loads_rooms_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            "<xml><room num=\"lobby\" floor=\"Floor\" wall=\"Wall\">.|.</room></xml>"
        )
        .expect("write");

        let database = load_room_database(file.path()).expect("load");
        assert_eq!(database.room("lobby").map(|r| r.body.as_str()), Some(".|."));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let error = load_room_database(&dir.path().join("nope.xml")).expect_err("missing");
        assert_eq!(error.code, ContentErrorCode::ReadFile);
        assert!(error.location.is_none());
    }
}
