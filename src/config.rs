//! Run configuration passed to filesystem clients and taps.
//!
//! A [`RunConfig`] is a bag of string settings plus the registry of
//! filesystem clients. Taps only ever borrow it immutably. Settings can be
//! loaded from JSON:
//!
//! ```
//! use globtap::RunConfig;
//!
//! let conf = RunConfig::from_json_str(r#"{"settings": {"fs.default.scheme": "mem"}}"#)?;
//! assert_eq!(conf.default_scheme(), "mem");
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::fs::{FileSystem, FileSystemRegistry, FsError, FsErrorKind, FsResult, FsUri};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

/// Scheme used for paths written without a `scheme://` prefix.
pub const DEFAULT_SCHEME_KEY: &str = "fs.default.scheme";
/// Whether `_`/`.` prefixed files are skipped when a tap reads a directory.
pub const SKIP_HIDDEN_KEY: &str = "tap.read.skip_hidden";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    settings: BTreeMap<String, String>,
    #[serde(skip)]
    filesystems: FileSystemRegistry,
}

impl RunConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from a JSON document. The filesystem registry starts
    /// out as the default one.
    ///
    /// # Errors
    /// Returns an error if the document is not valid JSON for this type.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parse run configuration")
    }

    /// # Errors
    /// Returns an error if the file cannot be opened or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
        serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse run configuration {}", path.display()))
    }

    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.settings.insert(key.into(), value.into());
    }

    /// Register a filesystem client under its scheme.
    #[must_use]
    pub fn with_filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.filesystems.register(fs);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// Boolean setting; `true`/`1`/`yes` are true, `false`/`0`/`no` are false,
    /// anything else falls back to `default`.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key).map(str::to_ascii_lowercase).as_deref() {
            Some("true" | "1" | "yes") => true,
            Some("false" | "0" | "no") => false,
            _ => default,
        }
    }

    #[must_use]
    pub fn get_u64(&self, key: &str, default: u64) -> u64 {
        self.get(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    #[must_use]
    pub fn default_scheme(&self) -> &str {
        self.get(DEFAULT_SCHEME_KEY).unwrap_or("file")
    }

    #[must_use]
    pub fn skip_hidden(&self) -> bool {
        self.get_bool(SKIP_HIDDEN_KEY, true)
    }

    #[must_use]
    pub fn filesystems(&self) -> &FileSystemRegistry {
        &self.filesystems
    }

    /// The client serving `uri`, falling back to the default scheme for
    /// bare paths.
    ///
    /// # Errors
    /// Returns an `Unsupported` error if no client is registered for the
    /// scheme, or if a `file` URI names a host other than `localhost`.
    pub fn filesystem_for(&self, uri: &FsUri) -> FsResult<Arc<dyn FileSystem>> {
        let scheme = uri.scheme().unwrap_or_else(|| self.default_scheme());
        if scheme == "file" && !matches!(uri.authority(), "" | "localhost") {
            return Err(FsError::new(
                FsErrorKind::Unsupported,
                format!("file URI host {} is not local", uri.authority()),
            ));
        }
        self.filesystems.get(scheme)
    }
}
