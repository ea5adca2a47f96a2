//! Core filesystem client trait and the types it exchanges.
//!
//! A [`FileSystem`] is the collaborator that evaluates glob patterns and
//! moves bytes for one URI scheme. Taps never touch `std::fs` directly; they
//! look a client up in the [`RunConfig`](crate::RunConfig) registry and go
//! through this interface.

use crate::fs::filter::PathFilter;
use std::error::Error;
use std::fmt;
use std::io::{Read, Write};

// ============================================================================
// Core Error Type
// ============================================================================

/// Error raised by a filesystem client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsError {
    pub kind: FsErrorKind,
    pub message: String,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsErrorKind {
    InvalidPattern,
    NotFound,
    PermissionDenied,
    Io,
    Unavailable,
    Unsupported,
    Other,
}

impl FsErrorKind {
    /// Whether a failure of this kind may succeed if the call is repeated.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::Io | Self::Unavailable)
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)?;
        if let Some(source) = &self.source {
            write!(f, " ({source})")?;
        }
        Ok(())
    }
}

impl Error for FsError {}

impl FsError {
    pub fn new(kind: FsErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Wraps an `std::io::Error`, keeping its message as the source text.
    pub fn from_io(err: &std::io::Error, message: impl Into<String>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => FsErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => FsErrorKind::PermissionDenied,
            std::io::ErrorKind::TimedOut
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted => FsErrorKind::Unavailable,
            _ => FsErrorKind::Io,
        };
        Self::new(kind, message).with_source(err.to_string())
    }
}

pub type FsResult<T> = Result<T, FsError>;

// ============================================================================
// Path entries
// ============================================================================

/// A single concrete path returned by a listing or glob query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileStatus {
    /// Path in the client's own namespace (no URI scheme prefix).
    pub path: String,
    pub len: u64,
    pub is_dir: bool,
    /// Last modification time as Unix seconds, if the client tracks one.
    pub modified: Option<i64>,
}

impl FileStatus {
    pub fn file(path: impl Into<String>, len: u64) -> Self {
        Self {
            path: path.into(),
            len,
            is_dir: false,
            modified: None,
        }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            len: 0,
            is_dir: true,
            modified: None,
        }
    }

    #[must_use]
    pub const fn with_modified(mut self, modified: i64) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Final path component.
    #[must_use]
    pub fn name(&self) -> &str {
        self.path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.path)
    }

    /// Hidden-file convention for data directories: `_SUCCESS`, `.crc`, etc.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        let name = self.name();
        name.starts_with('_') || name.starts_with('.')
    }
}

// ============================================================================
// FileSystem
// ============================================================================

/// Blocking filesystem client for one URI scheme.
pub trait FileSystem: Send + Sync + fmt::Debug {
    /// URI scheme this client serves (e.g. `"file"`, `"mem"`).
    fn scheme(&self) -> &str;

    /// Return every entry matching `pattern`, keeping only those accepted by
    /// `filter` when one is given.
    ///
    /// An empty vector means the pattern was valid but nothing matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is malformed or the listing fails
    fn glob_status(&self, pattern: &str, filter: Option<&PathFilter>)
    -> FsResult<Vec<FileStatus>>;

    /// Status of `path` itself when it is a file, or of its direct children
    /// when it is a directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the path doesn't exist or can't be listed
    fn list_status(&self, path: &str) -> FsResult<Vec<FileStatus>>;

    /// Open a file for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist or can't be opened
    fn open(&self, path: &str) -> FsResult<Box<dyn Read>>;

    /// Create (or truncate) a file for writing, creating parents as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be created
    fn create(&self, path: &str) -> FsResult<Box<dyn Write>>;

    /// # Errors
    ///
    /// Returns an error if existence can't be determined
    fn exists(&self, path: &str) -> FsResult<bool>;

    /// Delete a file or a directory tree. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails
    fn delete(&self, path: &str) -> FsResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_name_and_hidden() {
        assert_eq!(FileStatus::file("/a/b/part-0.csv", 1).name(), "part-0.csv");
        assert_eq!(FileStatus::dir("/a/b/").name(), "b");
        assert!(FileStatus::file("/a/_SUCCESS", 0).is_hidden());
        assert!(FileStatus::file("/a/.part-0.crc", 0).is_hidden());
        assert!(!FileStatus::file("/a/part-0", 0).is_hidden());
    }

    #[test]
    fn test_io_error_kinds() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let fs_err = FsError::from_io(&err, "open /x");
        assert_eq!(fs_err.kind, FsErrorKind::PermissionDenied);
        assert!(!fs_err.kind.is_transient());
        assert_eq!(fs_err.to_string(), "PermissionDenied: open /x (nope)");

        let err = std::io::Error::other("disk");
        assert!(FsError::from_io(&err, "read").kind.is_transient());
    }
}
