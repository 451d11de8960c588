//! HTTP middleware for the public site.

mod rate_limit;

pub use rate_limit::{ProxyIpKeyExtractor, RateLimiterLayer, chat_rate_limiter};
