//! Testing utilities for code that builds on taps.
//!
//! - [`memory_config`] - a [`RunConfig`] whose default filesystem is a given
//!   [`MemoryFileSystem`]
//! - [`seed_files`] - populate a memory filesystem in one call
//! - [`TempTree`] - a temporary directory tree on local disk, for tests that
//!   need real glob expansion
//!
//! # Example
//!
//! ```
//! use globtap::testing::*;
//! use globtap::{GlobTap, Scheme};
//!
//! let fs = memory_fs(&[("/logs/a.jsonl", "{\"n\":1}\n"), ("/logs/b.jsonl", "{\"n\":2}\n")]);
//! let conf = memory_config(&fs);
//! let tap = GlobTap::new(Scheme::Jsonl, "/logs/*.jsonl")?;
//! assert_eq!(tap.read(&conf)?.len(), 2);
//! assert_eq!(fs.glob_calls(), 1);
//! # Ok::<(), globtap::TapError>(())
//! ```

use crate::config::{DEFAULT_SCHEME_KEY, RunConfig};
use crate::fs::{FileSystem, MemoryFileSystem};
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Configuration that serves bare paths from `fs`.
#[must_use]
pub fn memory_config(fs: &Arc<MemoryFileSystem>) -> RunConfig {
    RunConfig::new()
        .with_setting(DEFAULT_SCHEME_KEY, fs.scheme())
        .with_filesystem(Arc::clone(fs) as Arc<dyn FileSystem>)
}

/// Write each `(path, contents)` pair into `fs`.
pub fn seed_files(fs: &MemoryFileSystem, files: &[(&str, &str)]) {
    for (path, contents) in files {
        fs.put_file(path, *contents);
    }
}

/// A fresh memory filesystem holding `files`.
#[must_use]
pub fn memory_fs(files: &[(&str, &str)]) -> Arc<MemoryFileSystem> {
    let fs = Arc::new(MemoryFileSystem::new());
    seed_files(&fs, files);
    fs
}

/// A temporary directory that is deleted when dropped.
pub struct TempTree {
    dir: TempDir,
}

impl TempTree {
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `relative`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parents cannot be created.
    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    /// `relative` joined onto the root, as a string usable in a glob.
    #[must_use]
    pub fn pattern(&self, relative: &str) -> String {
        format!("{}/{relative}", self.dir.path().display())
    }
}
