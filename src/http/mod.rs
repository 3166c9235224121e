//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace span)
//!     → request.rs (origin, client key, request ID)
//!     → cors.rs (Access-Control-* headers for every response)
//!     → server.rs dispatch (origin check, rate limit, body, form, mail)
//!     → response.rs (status + JSON body)
//!     → Send to client
//! ```

pub mod cors;
pub mod request;
pub mod response;
pub mod server;

pub use cors::CorsPolicy;
pub use request::{client_key, UuidRequestId, X_REQUEST_ID};
pub use response::RelayError;
pub use server::{AppState, HttpServer, SEND_PATH};
