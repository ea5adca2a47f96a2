//! Taps whose members are the paths matching a glob pattern.
//!
//! A [`GlobTap`] is configured once with a pattern such as
//! `/logs/2024/*/events` and resolves it against the filesystem only when its
//! members are first needed. Pattern syntax is whatever the filesystem client
//! serving the pattern's scheme supports; for the built-in clients that is the
//! `glob` crate's syntax (`*`, `?`, `[abc]`, `[!abc]`, and `**` on local
//! disk).
//!
//! # Examples
//!
//! ```
//! use globtap::fs::MemoryFileSystem;
//! use globtap::{GlobTap, RunConfig, Scheme, TapError};
//! use std::sync::Arc;
//!
//! let fs = Arc::new(MemoryFileSystem::new());
//! fs.put_file("/data/2024/01/part.csv", "id\n1\n");
//! fs.put_file("/data/2024/02/part.csv", "id\n2\n");
//! let conf = RunConfig::new().with_filesystem(fs);
//!
//! let tap = GlobTap::new(Scheme::Csv { has_headers: true }, "mem:///data/2024/*/part.csv")?;
//! assert_eq!(tap.members(&conf)?.len(), 2);
//! assert_eq!(tap.read(&conf)?.len(), 2);
//!
//! let empty = GlobTap::new(Scheme::Jsonl, "mem:///data/2099/*/part.csv")?;
//! assert!(matches!(empty.members(&conf), Err(TapError::NoMatch { .. })));
//! # Ok::<(), TapError>(())
//! ```

use crate::config::RunConfig;
use crate::error::{TapError, TapResult};
use crate::fs::{FsError, FsUri, PathFilter};
use crate::io::{Record, Scheme};
use crate::tap::file::FileTap;
use crate::tap::multi::{MemberProvider, MultiSourceTap};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An immutable glob pattern with an optional filter on its matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    path_pattern: String,
    filter: Option<PathFilter>,
}

impl Pattern {
    /// # Errors
    /// Returns [`TapError::EmptyPattern`] if `path_pattern` is blank.
    pub fn new(path_pattern: impl Into<String>, filter: Option<PathFilter>) -> TapResult<Self> {
        let path_pattern = path_pattern.into();
        if path_pattern.trim().is_empty() {
            return Err(TapError::EmptyPattern);
        }
        Ok(Self {
            path_pattern,
            filter,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.path_pattern
    }

    #[must_use]
    pub const fn filter(&self) -> Option<&PathFilter> {
        self.filter.as_ref()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path_pattern)
    }
}

/// Turns a [`Pattern`] into one [`FileTap`] per matching path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobResolver {
    scheme: Scheme,
    pattern: Pattern,
}

impl GlobResolver {
    #[must_use]
    pub const fn new(scheme: Scheme, pattern: Pattern) -> Self {
        Self { scheme, pattern }
    }

    #[must_use]
    pub const fn pattern(&self) -> &Pattern {
        &self.pattern
    }
}

impl MemberProvider for GlobResolver {
    fn identifier(&self) -> &str {
        self.pattern.as_str()
    }

    fn scheme(&self) -> Scheme {
        self.scheme
    }

    fn resolve(&self, conf: &RunConfig) -> TapResult<Vec<FileTap>> {
        let pattern = self.pattern.as_str();
        let uri = FsUri::parse(pattern);
        let resolve_error = |source: FsError| {
            warn!(pattern, error = %source, "glob resolution failed");
            TapError::Resolve {
                pattern: pattern.to_string(),
                source,
            }
        };

        let fs = conf.filesystem_for(&uri).map_err(resolve_error)?;
        debug!(pattern, filesystem = fs.scheme(), "resolving glob pattern");
        let statuses = fs
            .glob_status(uri.path(), self.pattern.filter())
            .map_err(resolve_error)?;

        if statuses.is_empty() {
            warn!(pattern, "no paths match glob pattern");
            return Err(TapError::NoMatch {
                pattern: pattern.to_string(),
            });
        }

        let taps: Vec<FileTap> = statuses
            .iter()
            .map(|status| FileTap::new(self.scheme, uri.qualify(&status.path)))
            .collect();
        info!(pattern, matches = taps.len(), "resolved glob pattern");
        Ok(taps)
    }
}

/// A composite source over every path matching a glob pattern.
///
/// Equality and hashing are defined over configuration (scheme, pattern and
/// filter), never over the resolved members, so a planner can deduplicate
/// taps before anything touches the filesystem.
#[derive(Debug, Clone)]
pub struct GlobTap {
    inner: MultiSourceTap<GlobResolver>,
}

impl GlobTap {
    /// # Errors
    /// Returns [`TapError::EmptyPattern`] if `pattern` is blank.
    pub fn new(scheme: Scheme, pattern: impl Into<String>) -> TapResult<Self> {
        Ok(Self::build(scheme, Pattern::new(pattern, None)?))
    }

    /// Like [`new`](Self::new), keeping only matches accepted by `filter`.
    ///
    /// # Errors
    /// Returns [`TapError::EmptyPattern`] if `pattern` is blank.
    pub fn with_filter(
        scheme: Scheme,
        pattern: impl Into<String>,
        filter: PathFilter,
    ) -> TapResult<Self> {
        Ok(Self::build(scheme, Pattern::new(pattern, Some(filter))?))
    }

    fn build(scheme: Scheme, pattern: Pattern) -> Self {
        Self {
            inner: MultiSourceTap::new(GlobResolver::new(scheme, pattern)),
        }
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        self.inner.provider().pattern().as_str()
    }

    #[must_use]
    pub fn filter(&self) -> Option<&PathFilter> {
        self.inner.provider().pattern().filter()
    }

    #[must_use]
    pub fn scheme(&self) -> Scheme {
        self.inner.scheme()
    }

    /// The underlying composite.
    #[must_use]
    pub const fn as_multi(&self) -> &MultiSourceTap<GlobResolver> {
        &self.inner
    }

    /// Matching children, resolving the pattern only on first use.
    ///
    /// # Errors
    /// [`TapError::Resolve`] if the filesystem fails, [`TapError::NoMatch`] if
    /// nothing matches.
    pub fn members(&self, conf: &RunConfig) -> TapResult<Arc<[FileTap]>> {
        self.inner.members(conf)
    }

    /// Re-resolve the pattern against the current filesystem state and
    /// replace the cached children. Call once per run before reading or
    /// writing.
    ///
    /// # Errors
    /// Same as [`members`](Self::members).
    pub fn refresh_members(&self, conf: &RunConfig) -> TapResult<Arc<[FileTap]>> {
        self.inner.refresh_members(conf)
    }

    #[must_use]
    pub fn cached_members(&self) -> Option<Arc<[FileTap]>> {
        self.inner.cached_members()
    }

    pub fn invalidate(&self) {
        self.inner.invalidate();
    }

    /// # Errors
    /// Resolution errors, or the first child error as-is.
    pub fn read(&self, conf: &RunConfig) -> TapResult<Vec<Record>> {
        self.inner.read(conf)
    }

    /// # Errors
    /// Resolution errors, or a child error as-is.
    #[cfg(feature = "parallel-io")]
    pub fn read_par(&self, conf: &RunConfig) -> TapResult<Vec<Record>> {
        self.inner.read_par(conf)
    }

    /// Write `records` to every matching path.
    ///
    /// # Errors
    /// Resolution errors, or the first child error as-is.
    pub fn write(&self, conf: &RunConfig, records: &[Record]) -> TapResult<usize> {
        self.inner.write(conf, records)
    }

    /// # Errors
    /// Resolution errors, or the first child error as-is.
    pub fn exists(&self, conf: &RunConfig) -> TapResult<bool> {
        self.inner.exists(conf)
    }

    /// `31 * hash(pattern) + hash(filter)`, with an absent filter hashing to 0.
    #[must_use]
    pub fn identity_hash(&self) -> u64 {
        let pattern_hash = hash_one(self.pattern());
        let filter_hash = self.filter().map_or(0, hash_one);
        pattern_hash.wrapping_mul(31).wrapping_add(filter_hash)
    }
}

fn hash_one<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

impl PartialEq for GlobTap {
    fn eq(&self, other: &Self) -> bool {
        self.inner.same_scheme(&other.inner)
            && self.pattern() == other.pattern()
            && self.filter() == other.filter()
    }
}

impl Eq for GlobTap {}

impl Hash for GlobTap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.identity_hash());
    }
}

impl fmt::Display for GlobTap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GlobTap[\"{}\"]", self.pattern())
    }
}
