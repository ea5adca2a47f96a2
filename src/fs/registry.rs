//! Scheme-keyed lookup of filesystem clients.

use crate::fs::local::LocalFileSystem;
use crate::fs::traits::{FileSystem, FsError, FsErrorKind, FsResult};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Filesystem clients by URI scheme.
///
/// The default registry serves `file` with [`LocalFileSystem`].
#[derive(Debug, Clone)]
pub struct FileSystemRegistry {
    clients: BTreeMap<String, Arc<dyn FileSystem>>,
}

impl FileSystemRegistry {
    /// A registry with no clients at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            clients: BTreeMap::new(),
        }
    }

    /// Register `fs` under its own scheme, replacing any previous client.
    pub fn register(&mut self, fs: Arc<dyn FileSystem>) {
        self.clients.insert(fs.scheme().to_ascii_lowercase(), fs);
    }

    /// Look up the client for `scheme`.
    ///
    /// # Errors
    ///
    /// Returns an `Unsupported` error if no client is registered for `scheme`
    pub fn get(&self, scheme: &str) -> FsResult<Arc<dyn FileSystem>> {
        self.clients
            .get(&scheme.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| {
                FsError::new(
                    FsErrorKind::Unsupported,
                    format!("no filesystem registered for scheme: {scheme}"),
                )
            })
    }

    pub fn schemes(&self) -> impl Iterator<Item = &str> {
        self.clients.keys().map(String::as_str)
    }
}

impl Default for FileSystemRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(LocalFileSystem::new()));
        registry
    }
}
