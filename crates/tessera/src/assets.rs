//! # Asset Catalog
//!
//! Maps texture names to dense [`AssetId`]s so sprites and draw commands
//! stay plain data. Textures themselves are never loaded here; the catalog
//! only remembers where they live.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use crate::error::{GameError, GameResult};

/// Dense texture handle.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct AssetId(pub u32);

/// Name to id table for textures.
#[derive(Debug, Default)]
pub struct AssetCatalog {
    ids: HashMap<String, AssetId>,
    paths: Vec<String>,
}

impl AssetCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a texture, returning its id.
    ///
    /// Registering a known name again keeps the id and updates the path.
    pub fn add_texture(&mut self, name: &str, path: &str) -> AssetId {
        if let Some(&id) = self.ids.get(name) {
            self.paths[id.0 as usize] = path.to_owned();
            return id;
        }
        let id = AssetId(self.paths.len() as u32);
        self.ids.insert(name.to_owned(), id);
        self.paths.push(path.to_owned());
        tracing::debug!(name, path, id = id.0, "texture registered");
        id
    }

    /// Id of a registered texture.
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownAsset`] if `name` was never registered.
    pub fn texture(&self, name: &str) -> GameResult<AssetId> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| GameError::UnknownAsset(name.to_owned()))
    }

    /// File path of a texture.
    #[must_use]
    pub fn path(&self, id: AssetId) -> Option<&str> {
        self.paths.get(id.0 as usize).map(String::as_str)
    }

    /// Number of registered textures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Drops every texture.
    pub fn clear(&mut self) {
        self.ids.clear();
        self.paths.clear();
    }
}
