//! Read-through result cache for the mart fetch.
//!
//! The dashboard memoizes exactly one value (the loaded table) under an
//! implicit constant key. [`ResultCache`] is the seam: [`TtlCache`] gives it a
//! fixed freshness window and an explicit `clear`, and its [`Clock`] is
//! injectable so expiry can be driven deterministically.

use crate::error::Result;
use std::time::{Duration, Instant};

/// Source of "now" for cache expiry.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock time via [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A single-slot get-or-compute cache.
pub trait ResultCache<T> {
    /// Return the cached value if still fresh, otherwise run `compute`, store
    /// its value, and return it. Errors from `compute` are returned as-is and
    /// leave the cache empty.
    fn get_or_try_insert_with(&mut self, compute: &mut dyn FnMut() -> Result<T>) -> Result<T>;

    /// Drop the cached value so the next access recomputes.
    fn clear(&mut self);
}

struct Entry<T> {
    value: T,
    stored_at: Instant,
}

/// Keeps one value for at most `ttl` after it was computed.
pub struct TtlCache<T, C = SystemClock> {
    ttl: Duration,
    clock: C,
    entry: Option<Entry<T>>,
}

impl<T> TtlCache<T, SystemClock> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<T, C: Clock> TtlCache<T, C> {
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            ttl,
            clock,
            entry: None,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, entry: &Entry<T>) -> bool {
        self.clock.now().saturating_duration_since(entry.stored_at) < self.ttl
    }
}

impl<T: Clone, C: Clock> ResultCache<T> for TtlCache<T, C> {
    fn get_or_try_insert_with(&mut self, compute: &mut dyn FnMut() -> Result<T>) -> Result<T> {
        if let Some(entry) = &self.entry {
            if self.is_fresh(entry) {
                tracing::debug!("mart cache hit");
                return Ok(entry.value.clone());
            }
            tracing::debug!(ttl_secs = self.ttl.as_secs(), "mart cache entry expired");
        } else {
            tracing::debug!("mart cache miss");
        }

        self.entry = None;
        let value = compute()?;
        self.entry = Some(Entry {
            value: value.clone(),
            stored_at: self.clock.now(),
        });
        Ok(value)
    }

    fn clear(&mut self) {
        if self.entry.take().is_some() {
            tracing::info!("mart cache cleared");
        }
    }
}
