use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

pub type Limiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// The public OSRM demo server asks clients to stay well under one
/// request per second.
pub fn osrm_limiter() -> Limiter {
    let quota = Quota::per_minute(NonZeroU32::new(40).unwrap());
    Arc::new(RateLimiter::direct(quota))
}

/// Nominatim's usage policy caps anonymous clients at one request
/// per second.
pub fn nominatim_limiter() -> Limiter {
    let quota = Quota::per_second(NonZeroU32::new(1).unwrap());
    Arc::new(RateLimiter::direct(quota))
}
