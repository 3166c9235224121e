//! CORS response headers.
//!
//! The allowed origin is echoed only when it is configured; every other
//! request gets an empty `Access-Control-Allow-Origin`, never a wildcard.

use std::sync::Arc;

use axum::http::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};

use crate::config::ConfigStore;

pub const ALLOWED_METHODS: &str = "POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";

/// Computes CORS headers from the request origin and the configured origins.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    origins: Arc<ConfigStore>,
}

impl CorsPolicy {
    pub fn new(origins: Arc<ConfigStore>) -> Self {
        Self { origins }
    }

    /// Headers to attach to the response for a request from `origin`.
    pub fn headers(&self, origin: Option<&str>) -> HeaderMap {
        let allow_origin = origin
            .filter(|o| self.origins.is_known(Some(*o)))
            .and_then(|o| HeaderValue::from_str(o).ok())
            .unwrap_or_else(|| HeaderValue::from_static(""));

        let mut headers = HeaderMap::with_capacity(3);
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOWED_HEADERS));
        headers
    }
}
