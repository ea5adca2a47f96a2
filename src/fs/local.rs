//! Local disk filesystem client backed by the `glob` crate.

use crate::fs::filter::PathFilter;
use crate::fs::traits::{FileStatus, FileSystem, FsError, FsErrorKind, FsResult};
use std::fs::{File, Metadata, create_dir_all, read_dir, remove_dir_all, remove_file};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::time::UNIX_EPOCH;
use tracing::debug;

/// Client for the `file` scheme.
///
/// Glob results come back in the order the `glob` crate yields them, which is
/// alphabetical per directory level.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn status_of(path: &Path, meta: &Metadata) -> FileStatus {
    let modified = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .and_then(|d| i64::try_from(d.as_secs()).ok());
    FileStatus {
        path: path.to_string_lossy().into_owned(),
        len: if meta.is_dir() { 0 } else { meta.len() },
        is_dir: meta.is_dir(),
        modified,
    }
}

fn metadata(path: &Path) -> FsResult<Metadata> {
    std::fs::metadata(path).map_err(|e| FsError::from_io(&e, format!("stat {}", path.display())))
}

impl FileSystem for LocalFileSystem {
    fn scheme(&self) -> &str {
        "file"
    }

    fn glob_status(
        &self,
        pattern: &str,
        filter: Option<&PathFilter>,
    ) -> FsResult<Vec<FileStatus>> {
        let paths = glob::glob(pattern).map_err(|e| {
            FsError::new(
                FsErrorKind::InvalidPattern,
                format!("invalid glob pattern: {pattern}"),
            )
            .with_source(e.to_string())
        })?;

        let mut result = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| {
                let message = format!("error reading glob entry {}", e.path().display());
                FsError::from_io(e.error(), message)
            })?;
            // Entries removed after listing and dangling symlinks are not matches.
            let meta = match std::fs::metadata(&path) {
                Ok(meta) => meta,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(path = %path.display(), "skipping glob match that no longer exists");
                    continue;
                }
                Err(e) => return Err(FsError::from_io(&e, format!("stat {}", path.display()))),
            };
            let status = status_of(&path, &meta);
            if filter.is_none_or(|f| f.accept(&status)) {
                result.push(status);
            }
        }
        Ok(result)
    }

    fn list_status(&self, path: &str) -> FsResult<Vec<FileStatus>> {
        let root = Path::new(path);
        let meta = metadata(root)?;
        if !meta.is_dir() {
            return Ok(vec![status_of(root, &meta)]);
        }

        let entries =
            read_dir(root).map_err(|e| FsError::from_io(&e, format!("list {path}")))?;
        let mut result = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FsError::from_io(&e, format!("list {path}")))?;
            let child = entry.path();
            result.push(status_of(&child, &metadata(&child)?));
        }
        result.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(result)
    }

    fn open(&self, path: &str) -> FsResult<Box<dyn Read>> {
        let f = File::open(path).map_err(|e| FsError::from_io(&e, format!("open {path}")))?;
        Ok(Box::new(f))
    }

    fn create(&self, path: &str) -> FsResult<Box<dyn Write>> {
        let p = Path::new(path);
        if let Some(parent) = p.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent)
                .map_err(|e| FsError::from_io(&e, format!("mkdir -p {}", parent.display())))?;
        }
        let f = File::create(p).map_err(|e| FsError::from_io(&e, format!("create {path}")))?;
        Ok(Box::new(f))
    }

    fn exists(&self, path: &str) -> FsResult<bool> {
        Path::new(path)
            .try_exists()
            .map_err(|e| FsError::from_io(&e, format!("stat {path}")))
    }

    fn delete(&self, path: &str) -> FsResult<bool> {
        let p = Path::new(path);
        if !self.exists(path)? {
            return Ok(false);
        }
        let removed = if p.is_dir() {
            remove_dir_all(p)
        } else {
            remove_file(p)
        };
        removed.map_err(|e| FsError::from_io(&e, format!("delete {path}")))?;
        Ok(true)
    }
}
