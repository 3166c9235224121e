//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! origins file (JSON)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → ConfigStore (validated, immutable)
//!     → shared via Arc with the dispatcher and CORS policy
//!
//! CLI flags / environment
//!     → lifecycle::startup
//!     → RelaySettings
//! ```
//!
//! # Design Decisions
//! - Loaded once; there is no reload path
//! - Any loading or validation error is fatal before the listener binds
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod store;
pub mod validation;

pub use loader::{load_origins, parse_origins, ConfigError};
pub use schema::{ListenerConfig, MailConfig, OriginConfig, RateLimitConfig, RelaySettings, SmtpConfig};
pub use store::ConfigStore;
