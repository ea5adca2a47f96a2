//! Composite taps over a lazily resolved member list.
//!
//! [`MultiSourceTap`] treats an ordered list of [`FileTap`]s as one logical
//! source. It does not know where the members come from: a
//! [`MemberProvider`] supplies them on demand, and the composite caches the
//! result.
//!
//! # Caching
//!
//! - [`MultiSourceTap::members`] resolves on first use and then serves the
//!   cached list without touching the filesystem again.
//! - [`MultiSourceTap::refresh_members`] always resolves and replaces the
//!   cache. Call it once per run so the run sees the current file set even if
//!   a planning pass already populated the cache.
//!
//! The cache lock is held across resolution, so concurrent first callers on a
//! shared tap issue a single query. A failed resolution leaves the cache
//! empty; the next call resolves again.

use crate::config::RunConfig;
use crate::error::TapResult;
use crate::io::{Record, Scheme};
use crate::tap::file::FileTap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Supplies the member list of a [`MultiSourceTap`].
pub trait MemberProvider: fmt::Debug + Send + Sync {
    /// Human-readable identity of the member set (e.g. the glob pattern).
    fn identifier(&self) -> &str;

    /// Record format shared by every member.
    fn scheme(&self) -> Scheme;

    /// Produce the current member list.
    ///
    /// # Errors
    /// Returns an error if the members can't be determined.
    fn resolve(&self, conf: &RunConfig) -> TapResult<Vec<FileTap>>;
}

type Members = Arc<[FileTap]>;

pub struct MultiSourceTap<P> {
    provider: P,
    members: Mutex<Option<Members>>,
}

impl<P: MemberProvider> MultiSourceTap<P> {
    pub const fn new(provider: P) -> Self {
        Self {
            provider,
            members: Mutex::new(None),
        }
    }

    pub const fn provider(&self) -> &P {
        &self.provider
    }

    pub fn identifier(&self) -> &str {
        self.provider.identifier()
    }

    pub fn scheme(&self) -> Scheme {
        self.provider.scheme()
    }

    /// Base composite equality: both composites share a record format.
    pub fn same_scheme<Q: MemberProvider>(&self, other: &MultiSourceTap<Q>) -> bool {
        self.scheme() == other.scheme()
    }

    fn cache(&self) -> MutexGuard<'_, Option<Members>> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve_into(&self, slot: &mut Option<Members>, conf: &RunConfig) -> TapResult<Members> {
        *slot = None;
        let members: Members = self.provider.resolve(conf)?.into();
        *slot = Some(Arc::clone(&members));
        Ok(members)
    }

    /// Member list, resolving only if nothing is cached yet.
    ///
    /// # Errors
    /// Returns the provider's error unchanged; the cache stays empty.
    pub fn members(&self, conf: &RunConfig) -> TapResult<Members> {
        let mut slot = self.cache();
        if let Some(members) = slot.as_ref() {
            debug!(tap = self.identifier(), members = members.len(), "member cache hit");
            return Ok(Arc::clone(members));
        }
        self.resolve_into(&mut slot, conf)
    }

    /// Resolve again and replace the cached member list.
    ///
    /// # Errors
    /// Returns the provider's error unchanged; the cache is cleared.
    pub fn refresh_members(&self, conf: &RunConfig) -> TapResult<Members> {
        let mut slot = self.cache();
        self.resolve_into(&mut slot, conf)
    }

    /// Cached member list, if resolution already happened.
    pub fn cached_members(&self) -> Option<Members> {
        self.cache().clone()
    }

    /// Drop the cached member list.
    pub fn invalidate(&self) {
        *self.cache() = None;
    }

    /// Read every member in order and concatenate their records.
    ///
    /// # Errors
    /// Returns the resolution error, or the first member error as-is.
    pub fn read(&self, conf: &RunConfig) -> TapResult<Vec<Record>> {
        let mut out = Vec::new();
        for member in self.members(conf)?.iter() {
            out.extend(member.read(conf)?);
        }
        Ok(out)
    }

    /// Like [`read`](Self::read), reading members on the rayon pool. Record
    /// order is the same as the sequential read.
    ///
    /// # Errors
    /// Returns the resolution error, or a member error as-is.
    #[cfg(feature = "parallel-io")]
    pub fn read_par(&self, conf: &RunConfig) -> TapResult<Vec<Record>> {
        use rayon::prelude::*;
        let members = self.members(conf)?;
        let parts = members
            .par_iter()
            .map(|member| member.read(conf))
            .collect::<TapResult<Vec<_>>>()?;
        Ok(parts.into_iter().flatten().collect())
    }

    /// Write `records` to every member. Returns the total number of records
    /// written across members.
    ///
    /// # Errors
    /// Returns the resolution error, or the first member error as-is.
    pub fn write(&self, conf: &RunConfig, records: &[Record]) -> TapResult<usize> {
        let mut total = 0;
        for member in self.members(conf)?.iter() {
            total += member.write(conf, records)?;
        }
        Ok(total)
    }

    /// Whether every member exists.
    ///
    /// # Errors
    /// Returns the resolution error, or the first member error as-is.
    pub fn exists(&self, conf: &RunConfig) -> TapResult<bool> {
        for member in self.members(conf)?.iter() {
            if !member.exists(conf)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Clones share configuration, not the resolved member list.
impl<P: MemberProvider + Clone> Clone for MultiSourceTap<P> {
    fn clone(&self) -> Self {
        Self::new(self.provider.clone())
    }
}

impl<P: MemberProvider> fmt::Debug for MultiSourceTap<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiSourceTap")
            .field("provider", &self.provider)
            .field("resolved", &self.cache().as_ref().map(|m| m.len()))
            .finish()
    }
}
