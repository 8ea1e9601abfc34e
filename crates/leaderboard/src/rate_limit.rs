//! Request pacing for the GitHub search APIs.
//!
//! GitHub enforces two quotas that matter here: the primary search quota
//! (repository search and repository lookups) and a much stricter secondary
//! quota on code search. Each is modelled as a [`Lane`] and every request
//! waits on its lane before it is issued.
//!
//! # Example
//!
//! ```ignore
//! use leaderboard::rate_limit::{ApiRateLimiter, Lane, Pacer, RateLimitQuotas};
//!
//! let limiter = ApiRateLimiter::new(RateLimitQuotas::default());
//! limiter.acquire(Lane::CodeSearch).await;
//! ```

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

/// Type alias for the governor rate limiter.
type GovernorRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Which remote quota a request counts against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    /// Repository search and repository detail lookups.
    Search,
    /// Code-content search.
    CodeSearch,
}

/// Something that decides when the next request on a lane may go out.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Suspend until a request on `lane` is allowed.
    async fn acquire(&self, lane: Lane);
}

/// Token bucket parameters for both lanes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitQuotas {
    /// Time to replenish one search request.
    pub search_interval: Duration,
    /// Search requests that may go out back to back.
    pub search_burst: u32,
    /// Time to replenish one code-search request.
    pub code_search_interval: Duration,
    /// Code-search requests that may go out back to back.
    pub code_search_burst: u32,
}

impl Default for RateLimitQuotas {
    /// Ten search requests per two seconds, one code-search page per six
    /// seconds (GitHub allows 10 code searches a minute).
    fn default() -> Self {
        Self {
            search_interval: Duration::from_millis(200),
            search_burst: 10,
            code_search_interval: Duration::from_secs(6),
            code_search_burst: 1,
        }
    }
}

fn build_limiter(interval: Duration, burst: u32) -> GovernorRateLimiter {
    let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
    let quota = Quota::with_period(interval)
        .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
        .allow_burst(burst);
    RateLimiter::direct(quota)
}

/// Production pacer backed by two `governor` token buckets.
#[derive(Clone)]
pub struct ApiRateLimiter {
    search: Arc<GovernorRateLimiter>,
    code_search: Arc<GovernorRateLimiter>,
}

impl ApiRateLimiter {
    /// Create a limiter from the given quotas.
    ///
    /// A zero interval falls back to one request per second and a zero burst
    /// to a burst of one.
    pub fn new(quotas: RateLimitQuotas) -> Self {
        Self {
            search: Arc::new(build_limiter(quotas.search_interval, quotas.search_burst)),
            code_search: Arc::new(build_limiter(
                quotas.code_search_interval,
                quotas.code_search_burst,
            )),
        }
    }

    fn limiter(&self, lane: Lane) -> &GovernorRateLimiter {
        match lane {
            Lane::Search => &self.search,
            Lane::CodeSearch => &self.code_search,
        }
    }

    /// Take a slot on `lane` if one is free right now, without waiting.
    pub fn try_acquire(&self, lane: Lane) -> bool {
        self.limiter(lane).check().is_ok()
    }
}

impl Default for ApiRateLimiter {
    fn default() -> Self {
        Self::new(RateLimitQuotas::default())
    }
}

#[async_trait]
impl Pacer for ApiRateLimiter {
    async fn acquire(&self, lane: Lane) {
        self.limiter(lane).until_ready().await;
    }
}

/// A pacer that never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unpaced;

#[async_trait]
impl Pacer for Unpaced {
    async fn acquire(&self, _lane: Lane) {}
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Pacer that records every acquisition instead of waiting.
    #[derive(Default)]
    pub(crate) struct RecordingPacer {
        lanes: Mutex<Vec<Lane>>,
    }

    impl RecordingPacer {
        pub(crate) fn lanes(&self) -> Vec<Lane> {
            self.lanes.lock().unwrap_or_else(|e| e.into_inner()).clone()
        }

        pub(crate) fn count(&self, lane: Lane) -> usize {
            self.lanes().into_iter().filter(|l| *l == lane).count()
        }
    }

    #[async_trait]
    impl Pacer for RecordingPacer {
        async fn acquire(&self, lane: Lane) {
            self.lanes
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(lane);
        }
    }
}
