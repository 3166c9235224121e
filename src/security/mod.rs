//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → http::cors (compute Access-Control-* headers)
//!     → origin check against the ConfigStore
//!     → rate_limit.rs (per-client fixed window)
//!     → Pass to the form validator and mailer
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - No trust in client input
//! - Limiter state is bounded regardless of how many clients are seen

pub mod rate_limit;

pub use rate_limit::RateLimiter;
