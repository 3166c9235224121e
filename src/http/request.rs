//! Request metadata extraction.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for log correlation
//! - Derive the rate-limit key for the calling client
//! - Read the `Origin` header
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - `X-Forwarded-For` is trusted as-is; the relay is expected to sit behind
//!   a proxy that sets it

use std::net::SocketAddr;

use axum::http::header::{HeaderMap, HeaderName, HeaderValue, ORIGIN};
use axum::http::Request;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Key shared by every client that carries no identifying information.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Issues a fresh UUID v4 for every request without an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Rate-limit key: first `X-Forwarded-For` hop, else the peer IP, else
/// [`UNKNOWN_CLIENT`].
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

pub fn origin(headers: &HeaderMap) -> Option<&str> {
    headers.get(ORIGIN).and_then(|v| v.to_str().ok())
}

pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}
