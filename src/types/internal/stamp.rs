use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counter bumped on every authorization-relevant mutation.
///
/// Cached resolutions are stamped with the counter value current when they
/// were computed; a cached entry is only served while its stamp still equals
/// the live counter. The counter is never authoritative state, so losing it
/// (process restart) only costs recomputation.
#[derive(Debug, Default)]
pub struct CacheStamp(AtomicU64);

impl CacheStamp {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Invalidate all cached resolutions.
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_invalidates_prior_observations() {
        let stamp = CacheStamp::new();
        let seen = stamp.current();
        stamp.bump();
        assert_ne!(seen, stamp.current());
    }
}
