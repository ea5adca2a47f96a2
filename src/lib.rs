//! # globtap
//!
//! Glob-pattern taps for batch data pipelines.
//!
//! A pipeline is usually configured once with an input such as
//! `/logs/2024/*/events`, but has to run against whatever files match that
//! pattern at execution time. A [`GlobTap`] holds the pattern, resolves it
//! against a filesystem when its members are first needed, and presents the
//! matched files as one logical source that can be read or written without
//! knowing how many physical paths are behind it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use globtap::*;
//!
//! # fn main() -> Result<(), TapError> {
//! let conf = RunConfig::new();
//! let tap = GlobTap::with_filter(
//!     Scheme::Jsonl,
//!     "/logs/2024/*/events/*",
//!     PathFilter::suffix(".jsonl.gz"),
//! )?;
//!
//! // Planning: resolve once and inspect the shape of the input.
//! let files = tap.members(&conf)?;
//! println!("{} input files", files.len());
//!
//! // Run: re-resolve against the current file set, then read.
//! tap.refresh_members(&conf)?;
//! let records = tap.read(&conf)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Resolution and caching
//!
//! - [`GlobTap::members`] resolves on first use and caches the result; later
//!   calls never touch the filesystem.
//! - [`GlobTap::refresh_members`] always resolves and replaces the cache.
//! - A pattern that matches nothing is an error ([`TapError::NoMatch`]), not
//!   an empty source. Filesystem failures surface as [`TapError::Resolve`]
//!   with the original cause. Neither leaves anything in the cache.
//!
//! ### Identity
//!
//! Two glob taps are equal, and hash alike, when their scheme, pattern and
//! filter are equal, whether or not either has been resolved.
//!
//! ### Filesystems
//!
//! Glob matching and byte I/O are delegated to a [`FileSystem`](fs::FileSystem)
//! picked by the path's URI scheme from the [`RunConfig`]. `file` (local disk)
//! is registered by default; [`MemoryFileSystem`](fs::MemoryFileSystem) serves
//! `mem` for tests.
//!
//! ## Feature Flags
//!
//! - `parallel-io` - `read_par` on composite taps (rayon)
//! - `compression-gzip`, `compression-zstd` - transparent codecs
//!
//! ## Module Overview
//!
//! - [`tap`] - `FileTap`, `MultiSourceTap`, `GlobTap`, retry helpers
//! - [`fs`] - filesystem clients, path filters, URI handling
//! - [`io`] - record schemes and compression
//! - [`config`] - run configuration
//! - [`error`] - error types
//! - [`testing`] - fixtures for tests

pub mod config;
pub mod error;
pub mod fs;
pub mod io;
pub mod tap;
pub mod testing;

pub use config::RunConfig;
pub use error::{TapError, TapResult};
pub use fs::{FileStatus, FsError, FsErrorKind, PathFilter};
pub use io::{Record, Scheme};
pub use tap::{FileTap, GlobTap, MemberProvider, MultiSourceTap, Pattern};
