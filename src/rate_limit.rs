/// Outbound rate limiting for profile lookups
use crate::error::{MarkerError, MarkerResult};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorLimiter,
};
use std::{num::NonZeroU32, sync::Arc, time::Duration};

/// Throttle shared by all name-lookup requests
#[derive(Clone)]
pub struct LookupRateLimiter {
    limiter: Arc<GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl LookupRateLimiter {
    /// Allow `requests` lookups per minute, bursting up to the same amount
    pub fn per_minute(requests: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN));

        Self {
            limiter: Arc::new(GovernorLimiter::direct(quota)),
        }
    }

    /// Wait until a lookup may be sent
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    /// Take a permit without waiting
    pub fn try_acquire(&self) -> MarkerResult<()> {
        match self.limiter.check() {
            Ok(_) => Ok(()),
            Err(_) => Err(MarkerError::RateLimitExceeded {
                retry_after: Duration::from_secs(1),
            }),
        }
    }
}
