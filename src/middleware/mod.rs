//! Middleware module
//!
//! This module contains cross-cutting request processing helpers

pub mod rate_limit;

pub use rate_limit::{AdmitDecision, RateLimitConfig, RateLimiter};
