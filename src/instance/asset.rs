//! Asset path resolution.
//!
//! Placement only needs to turn an asset path into an opaque handle; loading
//! the asset itself is the caller's business.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Opaque handle to a loaded asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetHandle(pub u32);

/// Resolves asset paths to handles. Shared across placement workers.
pub trait AssetLookup: Sync {
    fn resolve(&self, path: &str) -> Option<AssetHandle>;
}

/// Path to handle map owned by whoever loads the assets.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AssetTable {
    handles: HashMap<String, AssetHandle>,
    next: u32,
}

impl AssetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path`, returning its existing handle if already known.
    pub fn insert(&mut self, path: impl Into<String>) -> AssetHandle {
        let path = path.into();
        if let Some(handle) = self.handles.get(&path) {
            return *handle;
        }
        let handle = AssetHandle(self.next);
        self.next += 1;
        self.handles.insert(path, handle);
        handle
    }

    pub fn get(&self, path: &str) -> Option<AssetHandle> {
        self.handles.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl AssetLookup for AssetTable {
    fn resolve(&self, path: &str) -> Option<AssetHandle> {
        self.get(path)
    }
}

impl<S: Into<String>> FromIterator<S> for AssetTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = Self::new();
        for path in iter {
            table.insert(path);
        }
        table
    }
}
