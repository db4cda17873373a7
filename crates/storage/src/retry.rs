// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded exponential backoff for transient DFS I/O (spec.md §4.1, §7).
//!
//! Grounded on the example pack's `backoff` crate (exponential-with-jitter,
//! `init_backoff`/`max_backoff`/`base`), adapted to this coordinator's
//! synchronous I/O model (spec.md §5): attempts are bounded rather than
//! retried forever, and waiting blocks the thread rather than awaiting.

use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BackoffConfig {
    pub init_backoff: Duration,
    pub max_backoff: Duration,
    pub base: f64,
    pub max_attempts: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            init_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            base: 3.0,
            max_attempts: 5,
        }
    }
}

/// Retry `op` while it returns a transient error, sleeping with jittered
/// exponential backoff between attempts. Gives up after `max_attempts`
/// and returns the last error, or returns immediately on a permanent
/// error (spec.md §7: permanent errors are never retried).
pub fn retry_transient<T, E>(
    config: &BackoffConfig,
    is_transient: impl Fn(&E) -> bool,
    mut op: impl FnMut() -> Result<T, E>,
) -> Result<T, E> {
    let mut next_backoff_secs = config.init_backoff.as_secs_f64();
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if attempt < config.max_attempts && is_transient(&err) => {
                let max_secs = config.max_backoff.as_secs_f64();
                let jittered = rand::thread_rng()
                    .gen_range(config.init_backoff.as_secs_f64()..=next_backoff_secs.max(config.init_backoff.as_secs_f64()));
                std::thread::sleep(Duration::from_secs_f64(jittered.min(max_secs)));
                next_backoff_secs = (next_backoff_secs * config.base).min(max_secs);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
