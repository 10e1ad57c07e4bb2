//! Per-address request limiter for the claim endpoint.
//!
//! Sits in front of the cooldown check: a caller gets at most `burst`
//! requests per `window`, whether or not the requests succeed.

use std::net::IpAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{
    clock::{Clock, DefaultClock},
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter,
};
use tracing::debug;

use crate::Error;

pub const DEFAULT_THROTTLE_BURST: u32 = 5;
pub const DEFAULT_THROTTLE_WINDOW: Duration = Duration::from_secs(5 * 60);

type KeyedLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

#[derive(Clone)]
pub struct ClaimThrottle {
    inner: Arc<KeyedLimiter>,
    clock: DefaultClock,
}

impl ClaimThrottle {
    /// At most `burst` requests in any `window`-long interval. One cell
    /// comes back per `window`, so a spent burst stays spent for the window.
    pub fn new(burst: u32, window: Duration) -> Result<Self, Error> {
        let burst = NonZeroU32::new(burst)
            .ok_or_else(|| Error::Config("throttle burst must be > 0".to_string()))?;
        let quota = Quota::with_period(window)
            .ok_or_else(|| Error::Config("throttle window must be > 0".to_string()))?
            .allow_burst(burst);

        Ok(Self {
            inner: Arc::new(RateLimiter::keyed(quota)),
            clock: DefaultClock::default(),
        })
    }

    /// Counts one request for `addr`.
    pub fn check(&self, addr: IpAddr) -> Result<(), Error> {
        self.inner.check_key(&addr).map_err(|not_until| {
            let wait = not_until.wait_time_from(self.clock.now());
            debug!("Throttled claim request from {} (retry in {:?})", addr, wait);
            Error::rate_limited(
                "Too many requests, try again later.",
                Some(wait.as_secs().max(1)),
            )
        })
    }

    /// Drops state for addresses whose quota has fully refilled.
    pub fn retain_recent(&self) {
        self.inner.retain_recent();
    }

    pub fn tracked_keys(&self) -> usize {
        self.inner.len()
    }
}
