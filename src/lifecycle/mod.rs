//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Parse CLI/env → Load origins → Validate → Build mailer → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, listener last
//! - Invalid configuration never reaches the listener

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
