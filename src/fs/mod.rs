//! Filesystem clients consumed by taps.
//!
//! Glob matching and byte I/O are delegated to a [`FileSystem`] implementation
//! chosen by the URI scheme of the path being resolved:
//!
//! - [`LocalFileSystem`] - `file://` and bare paths (the default scheme)
//! - [`MemoryFileSystem`] - `mem://`, an in-memory client for tests
//!
//! Clients are looked up through the [`FileSystemRegistry`] carried by a
//! [`RunConfig`](crate::RunConfig); register your own implementation there to
//! serve another scheme.
//!
//! ## Error Handling
//!
//! All operations return [`FsResult<T>`] where the error is [`FsError`],
//! categorized by [`FsErrorKind`]. `Io` and `Unavailable` are considered
//! transient; see [`FsErrorKind::is_transient`].

pub mod filter;
pub mod local;
pub mod memory;
pub mod registry;
pub mod traits;
pub mod uri;

pub use filter::{NamedFilter, PathFilter};
pub use local::LocalFileSystem;
pub use memory::MemoryFileSystem;
pub use registry::FileSystemRegistry;
pub use traits::*;
pub use uri::FsUri;
