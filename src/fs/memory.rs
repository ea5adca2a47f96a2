//! In-memory filesystem client.
//!
//! [`MemoryFileSystem`] keeps files in a shared map so it can stand in for a
//! real cluster filesystem in unit tests. It also records how many glob
//! queries it has served and can be told to fail the next one, which is what
//! tests use to observe caching and error propagation in taps.

use crate::fs::filter::PathFilter;
use crate::fs::traits::{FileStatus, FileSystem, FsError, FsErrorKind, FsResult};
use glob::{MatchOptions, Pattern};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
struct MemoryFile {
    data: Vec<u8>,
    modified: i64,
}

type FileStorage = Arc<Mutex<BTreeMap<String, MemoryFile>>>;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Client for the `mem` scheme (or any scheme name given to
/// [`MemoryFileSystem::with_scheme`]).
#[derive(Debug)]
pub struct MemoryFileSystem {
    scheme: String,
    files: FileStorage,
    glob_calls: AtomicUsize,
    fail_next_glob: Mutex<Option<FsError>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Every proper ancestor directory of `path`, excluding the root.
fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/')
        .map(|(i, _)| &path[..i])
        .filter(|p| !p.is_empty())
}

impl MemoryFileSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::with_scheme("mem")
    }

    pub fn with_scheme(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            files: Arc::new(Mutex::new(BTreeMap::new())),
            glob_calls: AtomicUsize::new(0),
            fail_next_glob: Mutex::new(None),
        }
    }

    /// Store `data` at `path` with modification time 0.
    pub fn put_file(&self, path: &str, data: impl Into<Vec<u8>>) {
        self.put_file_at(path, data, 0);
    }

    /// Store `data` at `path` with the given modification time.
    pub fn put_file_at(&self, path: &str, data: impl Into<Vec<u8>>, modified: i64) {
        lock(&self.files).insert(
            normalize(path),
            MemoryFile {
                data: data.into(),
                modified,
            },
        );
    }

    /// Remove a single file.
    pub fn remove_file(&self, path: &str) -> bool {
        lock(&self.files).remove(&normalize(path)).is_some()
    }

    /// Current contents of a file, if it exists.
    #[must_use]
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        lock(&self.files).get(&normalize(path)).map(|f| f.data.clone())
    }

    /// Number of `glob_status` calls served so far, failed ones included.
    #[must_use]
    pub fn glob_calls(&self) -> usize {
        self.glob_calls.load(Ordering::SeqCst)
    }

    /// Make the next `glob_status` call fail with `err`.
    pub fn fail_next_glob(&self, err: FsError) {
        *lock(&self.fail_next_glob) = Some(err);
    }

    fn file_status(path: &str, file: &MemoryFile) -> FileStatus {
        FileStatus::file(path, file.data.len() as u64).with_modified(file.modified)
    }

    fn is_dir(files: &BTreeMap<String, MemoryFile>, path: &str) -> bool {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        files.keys().any(|k| k.starts_with(&prefix))
    }
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MemoryFileSystem {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn glob_status(
        &self,
        pattern: &str,
        filter: Option<&PathFilter>,
    ) -> FsResult<Vec<FileStatus>> {
        self.glob_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.fail_next_glob).take() {
            return Err(err);
        }

        let compiled = Pattern::new(pattern).map_err(|e| {
            FsError::new(
                FsErrorKind::InvalidPattern,
                format!("invalid glob pattern: {pattern}"),
            )
            .with_source(e.to_string())
        })?;

        let files = lock(&self.files);
        let dirs: BTreeSet<&str> = files.keys().flat_map(|k| ancestors(k)).collect();

        let mut matched: Vec<FileStatus> = files
            .iter()
            .filter(|(path, _)| compiled.matches_with(path, MATCH_OPTIONS))
            .map(|(path, file)| Self::file_status(path, file))
            .chain(
                dirs.into_iter()
                    .filter(|d| compiled.matches_with(d, MATCH_OPTIONS))
                    .map(FileStatus::dir),
            )
            .filter(|status| filter.is_none_or(|f| f.accept(status)))
            .collect();
        drop(files);

        matched.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(matched)
    }

    fn list_status(&self, path: &str) -> FsResult<Vec<FileStatus>> {
        let path = normalize(path);
        let files = lock(&self.files);
        if let Some(file) = files.get(&path) {
            return Ok(vec![Self::file_status(&path, file)]);
        }

        let prefix = if path == "/" {
            path.clone()
        } else {
            format!("{path}/")
        };
        let mut children: BTreeMap<String, FileStatus> = BTreeMap::new();
        for (key, file) in files.range(prefix.clone()..) {
            let Some(rest) = key.strip_prefix(&prefix) else {
                break;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    let child = format!("{prefix}{dir}");
                    children
                        .entry(child.clone())
                        .or_insert_with(|| FileStatus::dir(child));
                }
                None => {
                    children.insert(key.clone(), Self::file_status(key, file));
                }
            }
        }
        drop(files);

        if children.is_empty() {
            return Err(FsError::new(
                FsErrorKind::NotFound,
                format!("path not found: {path}"),
            ));
        }
        Ok(children.into_values().collect())
    }

    fn open(&self, path: &str) -> FsResult<Box<dyn Read>> {
        let data = self.contents(path).ok_or_else(|| {
            FsError::new(FsErrorKind::NotFound, format!("file not found: {path}"))
        })?;
        Ok(Box::new(Cursor::new(data)))
    }

    fn create(&self, path: &str) -> FsResult<Box<dyn Write>> {
        let path = normalize(path);
        if Self::is_dir(&lock(&self.files), &path) {
            return Err(FsError::new(
                FsErrorKind::Io,
                format!("cannot create {path}: is a directory"),
            ));
        }
        Ok(Box::new(MemoryWriter {
            path,
            buf: Vec::new(),
            files: Arc::clone(&self.files),
        }))
    }

    fn exists(&self, path: &str) -> FsResult<bool> {
        let path = normalize(path);
        let files = lock(&self.files);
        Ok(files.contains_key(&path) || Self::is_dir(&files, &path))
    }

    fn delete(&self, path: &str) -> FsResult<bool> {
        let path = normalize(path);
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let mut files = lock(&self.files);
        let before = files.len();
        files.retain(|k, _| *k != path && !k.starts_with(&prefix));
        Ok(files.len() != before)
    }
}

/// Buffers writes and publishes the whole file on flush and on drop.
struct MemoryWriter {
    path: String,
    buf: Vec<u8>,
    files: FileStorage,
}

impl MemoryWriter {
    fn commit(&self) {
        lock(&self.files).insert(
            self.path.clone(),
            MemoryFile {
                data: self.buf.clone(),
                modified: 0,
            },
        );
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.commit();
        Ok(())
    }
}

impl Drop for MemoryWriter {
    fn drop(&mut self) {
        self.commit();
    }
}
