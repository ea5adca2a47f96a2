//! Record encoding for child taps.
//!
//! - [`scheme`] - the [`Scheme`] record formats (JSON Lines, CSV)
//! - [`compression`] - transparent stream compression chosen by file name

pub mod compression;
pub mod scheme;

pub use scheme::{Record, Scheme};
