//! Errors surfaced by taps.

use crate::fs::FsError;
use std::error::Error as StdError;
use thiserror::Error;

pub type TapResult<T> = Result<T, TapError>;

#[derive(Debug, Error)]
pub enum TapError {
    /// A glob tap was constructed with an empty pattern.
    #[error("glob pattern must not be empty")]
    EmptyPattern,

    /// The filesystem client could not evaluate the pattern.
    #[error("unable to resolve taps for glob pattern {pattern}")]
    Resolve {
        pattern: String,
        #[source]
        source: FsError,
    },

    /// The pattern was evaluated but nothing matched it (after filtering).
    #[error("unable to find paths matching pattern: {pattern}")]
    NoMatch { pattern: String },

    /// A single-path child failed while reading, writing or probing its path.
    #[error("{action} failed for {path}")]
    Child {
        action: &'static str,
        path: String,
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },
}

impl TapError {
    pub(crate) fn child(
        action: &'static str,
        path: &str,
        source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        Self::Child {
            action,
            path: path.to_string(),
            source: source.into(),
        }
    }

    /// The pattern this error refers to, for resolution failures.
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        match self {
            Self::Resolve { pattern, .. } | Self::NoMatch { pattern } => Some(pattern),
            Self::EmptyPattern | Self::Child { .. } => None,
        }
    }

    /// Whether repeating the same call might succeed.
    ///
    /// Only filesystem failures of a transient kind qualify; `NoMatch` is a
    /// configuration or data problem and never does.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Resolve { source, .. } if source.kind.is_transient())
    }
}
