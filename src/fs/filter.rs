//! Path filters applied to glob matches.
//!
//! A [`PathFilter`] is a predicate over a [`FileStatus`] that also carries
//! structural equality and hashing, so two taps configured with the same
//! filter compare equal without resolving anything. Closures get identity
//! through [`PathFilter::named`]: two named filters are equal when their
//! names are.

use crate::fs::traits::FileStatus;
use regex::Regex;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

type Predicate = Arc<dyn Fn(&FileStatus) -> bool + Send + Sync>;

/// A predicate over matched path entries.
#[derive(Clone)]
pub enum PathFilter {
    /// Path ends with the given text (e.g. `".csv"`).
    Suffix(String),
    /// Final path component starts with the given text.
    Prefix(String),
    /// Full path matches the regular expression.
    Regex(Regex),
    /// Entry is at least this many bytes long.
    MinLen(u64),
    /// Entry was modified strictly after this Unix timestamp. Entries without
    /// a modification time are rejected.
    ModifiedAfter(i64),
    /// Entry is a regular file.
    FilesOnly,
    Not(Box<PathFilter>),
    All(Vec<PathFilter>),
    Any(Vec<PathFilter>),
    Named(NamedFilter),
}

/// A user predicate identified by name.
#[derive(Clone)]
pub struct NamedFilter {
    name: String,
    predicate: Predicate,
}

impl NamedFilter {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PathFilter {
    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self::Suffix(suffix.into())
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    /// Build a regex filter.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Regex)
    }

    /// Wrap a closure; `name` is its identity for equality and hashing.
    pub fn named<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&FileStatus) -> bool + Send + Sync + 'static,
    {
        Self::Named(NamedFilter {
            name: name.into(),
            predicate: Arc::new(predicate),
        })
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::All(mut filters) => {
                filters.push(other);
                Self::All(filters)
            }
            first => Self::All(vec![first, other]),
        }
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Any(mut filters) => {
                filters.push(other);
                Self::Any(filters)
            }
            first => Self::Any(vec![first, other]),
        }
    }

    /// Whether `status` passes this filter.
    #[must_use]
    pub fn accept(&self, status: &FileStatus) -> bool {
        match self {
            Self::Suffix(s) => status.path.ends_with(s.as_str()),
            Self::Prefix(p) => status.name().starts_with(p.as_str()),
            Self::Regex(re) => re.is_match(&status.path),
            Self::MinLen(n) => status.len >= *n,
            Self::ModifiedAfter(ts) => status.modified.is_some_and(|m| m > *ts),
            Self::FilesOnly => !status.is_dir,
            Self::Not(inner) => !inner.accept(status),
            Self::All(filters) => filters.iter().all(|f| f.accept(status)),
            Self::Any(filters) => filters.iter().any(|f| f.accept(status)),
            Self::Named(named) => (named.predicate)(status),
        }
    }
}

impl PartialEq for PathFilter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Suffix(a), Self::Suffix(b)) | (Self::Prefix(a), Self::Prefix(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a.as_str() == b.as_str(),
            (Self::MinLen(a), Self::MinLen(b)) => a == b,
            (Self::ModifiedAfter(a), Self::ModifiedAfter(b)) => a == b,
            (Self::FilesOnly, Self::FilesOnly) => true,
            (Self::Not(a), Self::Not(b)) => a == b,
            (Self::All(a), Self::All(b)) | (Self::Any(a), Self::Any(b)) => a == b,
            (Self::Named(a), Self::Named(b)) => a.name == b.name,
            _ => false,
        }
    }
}

impl Eq for PathFilter {}

impl Hash for PathFilter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Suffix(s) | Self::Prefix(s) => s.hash(state),
            Self::Regex(re) => re.as_str().hash(state),
            Self::MinLen(n) => n.hash(state),
            Self::ModifiedAfter(ts) => ts.hash(state),
            Self::FilesOnly => {}
            Self::Not(inner) => inner.hash(state),
            Self::All(filters) | Self::Any(filters) => filters.hash(state),
            Self::Named(named) => named.name.hash(state),
        }
    }
}

impl fmt::Debug for PathFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suffix(s) => f.debug_tuple("Suffix").field(s).finish(),
            Self::Prefix(p) => f.debug_tuple("Prefix").field(p).finish(),
            Self::Regex(re) => f.debug_tuple("Regex").field(&re.as_str()).finish(),
            Self::MinLen(n) => f.debug_tuple("MinLen").field(n).finish(),
            Self::ModifiedAfter(ts) => f.debug_tuple("ModifiedAfter").field(ts).finish(),
            Self::FilesOnly => f.write_str("FilesOnly"),
            Self::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
            Self::All(filters) => f.debug_tuple("All").field(filters).finish(),
            Self::Any(filters) => f.debug_tuple("Any").field(filters).finish(),
            Self::Named(named) => f.debug_tuple("Named").field(&named.name).finish(),
        }
    }
}
