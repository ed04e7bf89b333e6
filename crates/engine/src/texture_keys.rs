use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextureKeyError {
    #[error("texture key must not be empty")]
    Empty,
    #[error("texture key '{key}' must not start or end with '/'")]
    EdgeSlash { key: String },
    #[error("texture key '{key}' must not contain '..'")]
    ParentTraversal { key: String },
    #[error("texture key '{key}' contains invalid character '{character}'")]
    InvalidCharacter { key: String, character: char },
    #[error("texture key '{key}' is listed more than once")]
    Duplicate { key: String },
}

/// Keys are the names rooms use in their `floor`/`wall` attributes, e.g.
/// `"Floor"` or `"dungeon/wall_2"`.
pub(crate) fn validate_texture_key(key: &str) -> Result<(), TextureKeyError> {
    if key.is_empty() {
        return Err(TextureKeyError::Empty);
    }
    if key.starts_with('/') || key.ends_with('/') {
        return Err(TextureKeyError::EdgeSlash {
            key: key.to_string(),
        });
    }
    if key.contains("..") {
        return Err(TextureKeyError::ParentTraversal {
            key: key.to_string(),
        });
    }
    for ch in key.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '/' | '-') {
            continue;
        }
        return Err(TextureKeyError::InvalidCharacter {
            key: key.to_string(),
            character: ch,
        });
    }
    Ok(())
}
