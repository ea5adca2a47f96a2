//! Single-path taps.

use crate::config::RunConfig;
use crate::error::{TapError, TapResult};
use crate::fs::{FileStatus, FileSystem, FsError, FsErrorKind, FsUri};
use crate::io::compression::{auto_detect_reader, auto_detect_writer};
use crate::io::{Record, Scheme};
use anyhow::Context;
use std::sync::Arc;
use tracing::debug;

/// A tap over exactly one concrete path.
///
/// The path may carry a `scheme://` prefix; bare paths use the configured
/// default filesystem. When the path names a directory, reads cover every file
/// directly inside it (hidden `_`/`.` files are skipped unless
/// `tap.read.skip_hidden` is `false`). Directories are not read recursively:
/// a visible subdirectory fails the read with [`TapError::Child`]; match
/// nested partitions with the glob pattern instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileTap {
    scheme: Scheme,
    path: String,
}

impl FileTap {
    pub fn new(scheme: Scheme, path: impl Into<String>) -> Self {
        Self {
            scheme,
            path: path.into(),
        }
    }

    #[must_use]
    pub const fn scheme(&self) -> Scheme {
        self.scheme
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    fn filesystem(
        &self,
        action: &'static str,
        conf: &RunConfig,
    ) -> TapResult<(Arc<dyn FileSystem>, String)> {
        let uri = FsUri::parse(&self.path);
        let fs = conf
            .filesystem_for(&uri)
            .map_err(|e| TapError::child(action, &self.path, e))?;
        Ok((fs, uri.path().to_string()))
    }

    /// Files this tap reads, in order.
    fn input_files(
        &self,
        fs: &dyn FileSystem,
        local: &str,
        conf: &RunConfig,
    ) -> TapResult<Vec<FileStatus>> {
        let listed = fs
            .list_status(local)
            .map_err(|e| TapError::child("read", &self.path, e))?;
        let single_file = listed.len() == 1 && listed[0].path == local && !listed[0].is_dir;
        if single_file {
            return Ok(listed);
        }
        let skip_hidden = conf.skip_hidden();
        let visible: Vec<FileStatus> = listed
            .into_iter()
            .filter(|s| !(skip_hidden && s.is_hidden()))
            .collect();
        if let Some(nested) = visible.iter().find(|s| s.is_dir) {
            let err = FsError::new(
                FsErrorKind::Unsupported,
                format!("{} is a directory, not a file", nested.path),
            );
            return Err(TapError::child("read", &self.path, err));
        }
        Ok(visible)
    }

    /// Read every record under this path.
    ///
    /// # Errors
    /// Returns [`TapError::Child`] if the path can't be listed, opened or
    /// decoded.
    pub fn read(&self, conf: &RunConfig) -> TapResult<Vec<Record>> {
        let (fs, local) = self.filesystem("read", conf)?;
        let mut out = Vec::new();
        for status in self.input_files(fs.as_ref(), &local, conf)? {
            let raw = fs
                .open(&status.path)
                .map_err(|e| TapError::child("read", &self.path, e))?;
            let records = auto_detect_reader(raw, &status.path)
                .and_then(|r| self.scheme.read_from(r, &status.path))
                .map_err(|e| TapError::child("read", &self.path, e))?;
            debug!(path = %status.path, records = records.len(), "read file");
            out.extend(records);
        }
        Ok(out)
    }

    /// Replace the contents of this path with `records`.
    ///
    /// # Errors
    /// Returns [`TapError::Child`] if the file can't be created or encoded.
    pub fn write(&self, conf: &RunConfig, records: &[Record]) -> TapResult<usize> {
        let (fs, local) = self.filesystem("write", conf)?;
        let raw = fs
            .create(&local)
            .map_err(|e| TapError::child("write", &self.path, e))?;
        let written = auto_detect_writer(raw, &local)
            .and_then(|mut w| {
                let n = self.scheme.write_to(&mut w, records, &local)?;
                w.finish().with_context(|| format!("finish {local}"))?;
                Ok(n)
            })
            .map_err(|e| TapError::child("write", &self.path, e))?;
        debug!(path = %self.path, records = written, "wrote file");
        Ok(written)
    }

    /// # Errors
    /// Returns [`TapError::Child`] if existence can't be determined.
    pub fn exists(&self, conf: &RunConfig) -> TapResult<bool> {
        let (fs, local) = self.filesystem("stat", conf)?;
        fs.exists(&local)
            .map_err(|e| TapError::child("stat", &self.path, e))
    }

    /// Remove this path. Returns whether anything was deleted.
    ///
    /// # Errors
    /// Returns [`TapError::Child`] if deletion fails.
    pub fn delete(&self, conf: &RunConfig) -> TapResult<bool> {
        let (fs, local) = self.filesystem("delete", conf)?;
        fs.delete(&local)
            .map_err(|e| TapError::child("delete", &self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;
    use crate::testing::memory_config;
    use serde_json::json;

    #[test]
    fn test_read_single_file() -> anyhow::Result<()> {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.put_file("/in/a.jsonl", "{\"id\":1}\n{\"id\":2}\n");
        let conf = memory_config(&fs);

        let tap = FileTap::new(Scheme::Jsonl, "/in/a.jsonl");
        assert_eq!(tap.read(&conf)?, vec![json!({"id": 1}), json!({"id": 2})]);
        assert!(tap.exists(&conf)?);
        Ok(())
    }

    #[test]
    fn test_read_directory_skips_hidden() -> anyhow::Result<()> {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.put_file("/in/part-1", "{\"id\":2}\n");
        fs.put_file("/in/part-0", "{\"id\":1}\n");
        fs.put_file("/in/_SUCCESS", "");
        fs.put_file("/in/.part-0.crc", "garbage");
        fs.put_file("/in/_temporary/attempt-0", "partial");
        let conf = memory_config(&fs);

        let tap = FileTap::new(Scheme::Jsonl, "/in");
        assert_eq!(tap.read(&conf)?, vec![json!({"id": 1}), json!({"id": 2})]);

        let conf = conf.with_setting(crate::config::SKIP_HIDDEN_KEY, "false");
        assert!(tap.read(&conf).is_err());
        Ok(())
    }

    #[test]
    fn test_nested_directory_is_child_error() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.put_file("/in/part-0", "{\"id\":1}\n");
        fs.put_file("/in/day=2/part-0", "{\"id\":2}\n");
        let conf = memory_config(&fs);

        let err = FileTap::new(Scheme::Jsonl, "/in").read(&conf).unwrap_err();
        assert!(matches!(&err, TapError::Child { action: "read", path, .. } if path == "/in"));
        let cause = std::error::Error::source(&err).map(ToString::to_string);
        assert!(cause.is_some_and(|c| c.contains("/in/day=2 is a directory")));
    }

    #[test]
    fn test_write_then_delete() -> anyhow::Result<()> {
        let fs = Arc::new(MemoryFileSystem::new());
        let conf = memory_config(&fs);
        let tap = FileTap::new(Scheme::Csv { has_headers: true }, "mem:///out/part-0.csv");

        assert_eq!(tap.write(&conf, &[json!({"a": "1"}), json!({"a": "2"})])?, 2);
        assert_eq!(fs.contents("/out/part-0.csv"), Some(b"a\n1\n2\n".to_vec()));
        assert!(tap.delete(&conf)?);
        assert!(!tap.exists(&conf)?);
        Ok(())
    }

    #[test]
    fn test_missing_path_is_child_error() {
        let fs = Arc::new(MemoryFileSystem::new());
        let conf = memory_config(&fs);
        let err = FileTap::new(Scheme::Jsonl, "/nope").read(&conf).unwrap_err();
        assert!(matches!(err, TapError::Child { action: "read", ref path, .. } if path == "/nope"));
    }
}
