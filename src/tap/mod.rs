//! Taps: uniform read/write handles over data on a filesystem.
//!
//! - [`FileTap`] - one concrete path
//! - [`MultiSourceTap`] - an ordered set of `FileTap`s supplied by a
//!   [`MemberProvider`] and cached after first resolution
//! - [`GlobTap`] - a `MultiSourceTap` whose members are the matches of a glob
//!   pattern
//! - [`retry`] - opt-in caller-side retry of resolution

pub mod file;
pub mod glob;
pub mod multi;
pub mod retry;

pub use file::FileTap;
pub use glob::{GlobResolver, GlobTap, Pattern};
pub use multi::{MemberProvider, MultiSourceTap};
pub use retry::{RetryConfig, refresh_with_backoff, retry_with_backoff};
