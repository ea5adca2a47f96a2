//! Caller-side retry for glob resolution.
//!
//! Taps never retry on their own. A run that wants to ride out a flaky
//! filesystem can wrap the per-run refresh in [`refresh_with_backoff`]; since a
//! failed resolution never leaves a partial member list behind, retrying is
//! always safe.

use crate::config::RunConfig;
use crate::error::TapResult;
use crate::tap::file::FileTap;
use crate::tap::glob::GlobTap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Read `tap.retry.*` settings, falling back to the defaults.
    #[must_use]
    pub fn from_run_config(conf: &RunConfig) -> Self {
        let d = Self::default();
        Self {
            max_attempts: u32::try_from(
                conf.get_u64("tap.retry.max_attempts", u64::from(d.max_attempts)),
            )
            .unwrap_or(d.max_attempts),
            initial_delay_ms: conf.get_u64("tap.retry.initial_delay_ms", d.initial_delay_ms),
            max_delay_ms: conf.get_u64("tap.retry.max_delay_ms", d.max_delay_ms),
            backoff_multiplier: d.backoff_multiplier,
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn next_delay(&self, delay_ms: u64) -> u64 {
        let next = (delay_ms as f64 * self.backoff_multiplier.max(1.0)) as u64;
        next.min(self.max_delay_ms)
    }
}

/// Retry `operation` with exponential backoff while it fails transiently.
///
/// # Errors
///
/// Returns the last error once it is not transient or the attempts run out.
pub fn retry_with_backoff<F, T>(config: &RetryConfig, mut operation: F) -> TapResult<T>
where
    F: FnMut() -> TapResult<T>,
{
    let mut attempt = 0;
    let mut delay_ms = config.initial_delay_ms;

    loop {
        attempt += 1;
        match operation() {
            Ok(result) => return Ok(result),
            Err(err) => {
                if !err.is_transient() || attempt >= config.max_attempts {
                    return Err(err);
                }
                warn!(attempt, delay_ms, error = %err, "transient failure, retrying");
                std::thread::sleep(Duration::from_millis(delay_ms));
                delay_ms = config.next_delay(delay_ms);
            }
        }
    }
}

/// [`GlobTap::refresh_members`] under [`retry_with_backoff`].
///
/// # Errors
///
/// Returns the last resolution error.
pub fn refresh_with_backoff(
    tap: &GlobTap,
    conf: &RunConfig,
    config: &RetryConfig,
) -> TapResult<Arc<[FileTap]>> {
    retry_with_backoff(config, || tap.refresh_members(conf))
}
