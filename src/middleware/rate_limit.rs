//! Per-identity sliding-window rate limiting
//!
//! Shared process-wide state gating every inbound action before routing.
//! Each identity owns a time-ordered queue of admitted request timestamps;
//! admission trims the expired prefix and either appends or rejects. Rejected
//! attempts never mutate the queue, so they do not count toward the limit.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum admitted requests per window
    pub max_requests: u32,
    /// Sliding window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window: Duration::from_secs(60),
        }
    }
}

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmitDecision {
    Admitted,
    Rejected { retry_after: Duration },
}

impl AdmitDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, AdmitDecision::Admitted)
    }
}

/// Sliding-window rate limiter keyed by an opaque identity string.
///
/// The map is guarded by a single mutex; admission checks never perform I/O,
/// so the lock is held only for the queue trim and append. State lives for
/// the process lifetime and is safe to lose on restart.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    entries: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
    exempt_identities: Vec<String>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, exempt_identities: Vec<String>) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
            exempt_identities,
        }
    }

    /// Check and record an admission for `identity` at the current time
    pub fn admit(&self, identity: &str) -> AdmitDecision {
        self.admit_at(identity, Instant::now())
    }

    /// Check and record an admission at an explicit instant.
    ///
    /// Timestamps older than `now - window` are evicted from the front of
    /// the queue (entries are appended in arrival order, so eviction is a
    /// prefix trim). If capacity remains, `now` is appended and the request
    /// is admitted; otherwise the queue is left untouched and the caller is
    /// told how long until the oldest in-window entry rolls off.
    pub fn admit_at(&self, identity: &str, now: Instant) -> AdmitDecision {
        if self.exempt_identities.iter().any(|e| e == identity) {
            debug!(identity = identity, "Identity exempt from rate limiting");
            return AdmitDecision::Admitted;
        }

        let mut entries = self.entries.lock().expect("rate limiter lock poisoned");
        let queue = entries.entry(identity.to_string()).or_default();

        if let Some(cutoff) = now.checked_sub(self.config.window) {
            while queue.front().is_some_and(|&ts| ts < cutoff) {
                queue.pop_front();
            }
        }

        if (queue.len() as u32) < self.config.max_requests {
            queue.push_back(now);
            debug!(identity = identity, in_window = queue.len(), "Rate limit check passed");
            return AdmitDecision::Admitted;
        }

        let retry_after = queue
            .front()
            .map(|&oldest| (oldest + self.config.window).saturating_duration_since(now))
            .unwrap_or(self.config.window);

        warn!(
            identity = identity,
            retry_after_secs = retry_after.as_secs(),
            "Rate limit exceeded"
        );
        AdmitDecision::Rejected { retry_after }
    }

    /// Drop identities with no in-window activity to bound memory.
    /// Intended to be called periodically from a background task.
    pub fn sweep(&self) {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) {
        let mut entries = self.entries.lock().expect("rate limiter lock poisoned");
        if let Some(cutoff) = now.checked_sub(self.config.window) {
            entries.retain(|_, queue| {
                while queue.front().is_some_and(|&ts| ts < cutoff) {
                    queue.pop_front();
                }
                !queue.is_empty()
            });
        }
        debug!(remaining = entries.len(), "Swept rate limiter entries");
    }

    /// Number of tracked identities (for stats/diagnostics)
    pub fn tracked_identities(&self) -> usize {
        self.entries.lock().expect("rate limiter lock poisoned").len()
    }

    /// Clear one identity's queue (admin action)
    pub fn clear_identity(&self, identity: &str) -> bool {
        let removed = self
            .entries
            .lock()
            .expect("rate limiter lock poisoned")
            .remove(identity)
            .is_some();
        if removed {
            info!(identity = identity, "Rate limit cleared for identity");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn limiter(max: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(
            RateLimitConfig {
                max_requests: max,
                window: Duration::from_secs(window_secs),
            },
            vec![],
        )
    }

    // Instant can't represent times before process start, so anchor test
    // clocks well past zero.
    fn base() -> Instant {
        Instant::now() + Duration::from_secs(3600)
    }

    #[test]
    fn test_window_example() {
        let rl = limiter(3, 60);
        let t0 = base();

        assert!(rl.admit_at("u", t0).is_admitted());
        assert!(rl.admit_at("u", t0 + Duration::from_secs(10)).is_admitted());
        assert!(rl.admit_at("u", t0 + Duration::from_secs(20)).is_admitted());
        assert!(!rl.admit_at("u", t0 + Duration::from_secs(30)).is_admitted());
        // t0 has rolled off the trailing window
        assert!(rl.admit_at("u", t0 + Duration::from_secs(61)).is_admitted());
    }

    #[test]
    fn test_rejection_does_not_count() {
        let rl = limiter(2, 60);
        let t0 = base();

        assert!(rl.admit_at("u", t0).is_admitted());
        assert!(rl.admit_at("u", t0 + Duration::from_secs(1)).is_admitted());
        // Hammering while limited must not extend the lockout
        for s in 2..30 {
            assert!(!rl.admit_at("u", t0 + Duration::from_secs(s)).is_admitted());
        }
        assert!(rl.admit_at("u", t0 + Duration::from_secs(61)).is_admitted());
    }

    #[test]
    fn test_retry_after_reports_roll_off() {
        let rl = limiter(1, 60);
        let t0 = base();

        assert!(rl.admit_at("u", t0).is_admitted());
        match rl.admit_at("u", t0 + Duration::from_secs(15)) {
            AdmitDecision::Rejected { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(45));
            }
            AdmitDecision::Admitted => panic!("expected rejection"),
        }
    }

    #[test]
    fn test_identities_are_independent() {
        let rl = limiter(1, 60);
        let t0 = base();

        assert!(rl.admit_at("a", t0).is_admitted());
        assert!(rl.admit_at("b", t0).is_admitted());
        assert!(!rl.admit_at("a", t0 + Duration::from_secs(1)).is_admitted());
    }

    #[test]
    fn test_exempt_identity_never_limited() {
        let rl = RateLimiter::new(
            RateLimitConfig {
                max_requests: 1,
                window: Duration::from_secs(60),
            },
            vec!["+15551234567".to_string()],
        );
        let t0 = base();

        for s in 0..10 {
            assert!(rl
                .admit_at("+15551234567", t0 + Duration::from_secs(s))
                .is_admitted());
        }
    }

    #[test]
    fn test_sweep_drops_idle_identities() {
        let rl = limiter(5, 60);
        let t0 = base();

        rl.admit_at("a", t0);
        rl.admit_at("b", t0 + Duration::from_secs(90));
        assert_eq!(rl.tracked_identities(), 2);

        rl.sweep_at(t0 + Duration::from_secs(120));
        assert_eq!(rl.tracked_identities(), 1);
    }

    #[test]
    fn test_clear_identity() {
        let rl = limiter(1, 60);
        let t0 = base();

        assert!(rl.admit_at("u", t0).is_admitted());
        assert!(!rl.admit_at("u", t0 + Duration::from_secs(1)).is_admitted());
        assert!(rl.clear_identity("u"));
        assert!(rl.admit_at("u", t0 + Duration::from_secs(2)).is_admitted());
    }

    proptest! {
        /// No more than `max` admissions ever land inside any trailing window.
        #[test]
        fn prop_admissions_bounded_by_window(
            offsets in proptest::collection::vec(0u64..600, 1..200),
            max in 1u32..10,
        ) {
            let window = Duration::from_secs(60);
            let rl = limiter(max, 60);
            let t0 = base();

            let mut sorted = offsets;
            sorted.sort_unstable();

            let mut admitted: Vec<Instant> = Vec::new();
            for off in sorted {
                let now = t0 + Duration::from_secs(off);
                if rl.admit_at("u", now).is_admitted() {
                    admitted.push(now);
                }
                // Invariant: admissions within the trailing window never
                // exceed the configured maximum.
                let cutoff = now.checked_sub(window).unwrap();
                let in_window = admitted.iter().filter(|&&ts| ts >= cutoff).count();
                prop_assert!(in_window <= max as usize);
            }
        }
    }
}
