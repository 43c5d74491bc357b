//! Runtime services shared by callers of the endpoint table

pub mod rate_limiter;

pub use rate_limiter::RateLimiter;
