//! Login throttling.
//!
//! Admin is served behind a private proxy, so the peer address or the
//! standard forwarding headers identify the client.

use std::sync::Arc;

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// One login attempt every 10 seconds, burst of 5.
///
/// # Panics
///
/// Never in practice: both values are non-zero constants.
#[must_use]
#[allow(clippy::expect_used)]
pub fn login_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .per_second(10)
        .burst_size(5)
        .finish()
        .expect("non-zero login rate limit");
    GovernorLayer::new(Arc::new(config))
}
