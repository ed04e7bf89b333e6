use std::collections::{BTreeSet, HashMap};

use crate::texture_keys::{validate_texture_key, TextureKeyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

/// Registry of the textures a room may name. Handles are dense indices in
/// registration order.
#[derive(Debug, Default, Clone)]
pub struct TextureTable {
    keys: Vec<String>,
    handles_by_key: HashMap<String, TextureHandle>,
}

impl TextureTable {
    pub fn from_keys<I, K>(keys: I) -> Result<Self, TextureKeyError>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut table = Self::default();
        let mut seen = BTreeSet::new();
        for key in keys {
            let key = key.as_ref();
            validate_texture_key(key)?;
            if !seen.insert(key.to_string()) {
                return Err(TextureKeyError::Duplicate {
                    key: key.to_string(),
                });
            }
            let handle = TextureHandle(table.keys.len() as u32);
            table.keys.push(key.to_string());
            table.handles_by_key.insert(key.to_string(), handle);
        }
        Ok(table)
    }

    pub fn resolve(&self, key: &str) -> Option<TextureHandle> {
        self.handles_by_key.get(key).copied()
    }

    pub fn key(&self, handle: TextureHandle) -> Option<&str> {
        self.keys.get(handle.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_follow_registration_order() {
        let table = TextureTable::from_keys(["Floor", "Wall"]).expect("table");
        assert_eq!(table.resolve("Floor"), Some(TextureHandle(0)));
        assert_eq!(table.resolve("Wall"), Some(TextureHandle(1)));
        assert_eq!(table.key(TextureHandle(1)), Some("Wall"));
        assert_eq!(table.resolve("Lava"), None);
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let error = TextureTable::from_keys(["Floor", "Floor"]).expect_err("duplicate");
        assert_eq!(
            error,
            TextureKeyError::Duplicate {
                key: "Floor".to_string()
            }
        );
    }

    #[test]
    fn invalid_key_is_rejected() {
        assert!(TextureTable::from_keys(["Floor", "bad key"]).is_err());
    }
}
