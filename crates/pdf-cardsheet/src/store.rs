//! Image lookup
//!
//! The engine never owns image files. Every image reference is resolved
//! through an [`ImageStore`] when it is needed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Source of encoded image bytes, keyed by normalized image key
pub trait ImageStore: Send + Sync {
    /// Encoded bytes for `key`, or `None` when the image is unavailable
    fn resolve(&self, key: &str) -> Option<Vec<u8>>;
}

/// Images read from files below a root directory
#[derive(Debug, Clone)]
pub struct DirImageStore {
    root: PathBuf,
}

impl DirImageStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_owned(),
        }
    }
}

impl ImageStore for DirImageStore {
    fn resolve(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.root.join(key);
        match std::fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::debug!("Image {} not readable: {}", path.display(), e);
                None
            }
        }
    }
}

/// Images held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryImageStore {
    images: HashMap<String, Vec<u8>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, bytes: Vec<u8>) {
        self.images.insert(key.into(), bytes);
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<u8>> {
        self.images.remove(key)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageStore for MemoryImageStore {
    fn resolve(&self, key: &str) -> Option<Vec<u8>> {
        self.images.get(key).cloned()
    }
}
