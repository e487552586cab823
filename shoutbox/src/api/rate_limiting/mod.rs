//! Coarse request rate limiting for the public endpoints.
//!
//! Two tiers, both keyed by client IP:
//! - public read (listing shouts)
//! - public write (posting, replying, voting)
//!
//! This sits in front of the per-module flood control and uses the token
//! bucket algorithm via tower-governor.

pub mod middleware;

use governor::middleware::NoOpMiddleware;
use shoutbox_core::settings::rate_limiting::TierConfig;
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::SmartIpKeyExtractor;
use tower_governor::GovernorLayer;

pub use middleware::RateLimitLoggingLayer;

pub type IpRateLimitLayer = GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware, axum::body::Body>;

pub fn create_public_read_limiter(config: &TierConfig) -> anyhow::Result<IpRateLimitLayer> {
    create_ip_limiter(config)
}

pub fn create_public_write_limiter(config: &TierConfig) -> anyhow::Result<IpRateLimitLayer> {
    create_ip_limiter(config)
}

fn create_ip_limiter(config: &TierConfig) -> anyhow::Result<IpRateLimitLayer> {
    // One token is replenished every `period` milliseconds.
    let period = std::cmp::max(1, 60_000 / config.requests_per_minute.max(1));

    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(period)
            .burst_size(config.burst_size)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limit config: {:?}", config))?,
    );

    Ok(GovernorLayer::new(governor_config))
}
