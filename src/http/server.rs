//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router and wire up middleware (tracing, request ID)
//! - Bind the server to a listener with graceful shutdown
//! - Run the per-request pipeline: CORS → origin → rate limit → body →
//!   validation → mail
//! - Keep the rate limiter swept in the background

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Method, Request},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{ConfigStore, RelaySettings};
use crate::http::cors::CorsPolicy;
use crate::http::request::{self, client_key, UuidRequestId, X_REQUEST_ID};
use crate::http::response::{self, RelayError};
use crate::mail::{ContactFormData, Mailer};
use crate::observability::metrics;
use crate::security::RateLimiter;

/// The only route that accepts submissions.
pub const SEND_PATH: &str = "/api/send";

/// Application state injected into the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub origins: Arc<ConfigStore>,
    pub cors: CorsPolicy,
    pub limiter: Arc<RateLimiter>,
    pub mailer: Arc<dyn Mailer>,
    pub max_body_bytes: usize,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    settings: RelaySettings,
    limiter: Arc<RateLimiter>,
}

impl HttpServer {
    /// Create a new HTTP server from settings, the loaded origins and a mailer.
    pub fn new(settings: RelaySettings, origins: ConfigStore, mailer: Arc<dyn Mailer>) -> Self {
        let origins = Arc::new(origins);
        let limiter = Arc::new(RateLimiter::from_config(&settings.rate_limit));

        let state = AppState {
            cors: CorsPolicy::new(origins.clone()),
            origins,
            limiter: limiter.clone(),
            mailer,
            max_body_bytes: settings.max_body_bytes,
        };

        Self {
            router: Self::build_router(state),
            settings,
            limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Everything goes through one fallback handler so that preflight and
    /// 404 responses still carry CORS headers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
    }

    /// Router with all layers, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn limiter(&self) -> Arc<RateLimiter> {
        self.limiter.clone()
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let limiter = self.limiter.clone();
        let sweep_every = Duration::from_secs(self.settings.rate_limit.sweep_interval_secs.max(1));
        let sweeper_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            limiter.run_sweeper(sweep_every, sweeper_shutdown).await;
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Entry point for every request.
async fn dispatch(State(state): State<AppState>, req: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (parts, body) = req.into_parts();

    let origin = request::origin(&parts.headers).map(str::to_string);
    let cors = state.cors.headers(origin.as_deref());
    let peer = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_key(&parts.headers, peer);
    let request_id = request::request_id(&parts.headers).to_string();
    let path = parts.uri.path().to_string();

    let outcome = handle(&state, &parts.method, &path, body, origin.as_deref(), &client).await;

    let mut response = match outcome {
        Ok(response) => response,
        Err(err) => {
            let origin = origin.as_deref().unwrap_or("-");
            match &err {
                RelayError::NotFound => {
                    tracing::debug!(request_id = %request_id, method = %parts.method, path = %path, "No route matched");
                }
                RelayError::UnknownOrigin => {
                    tracing::warn!(request_id = %request_id, client = %client, origin = %origin, "Rejected unknown origin");
                }
                RelayError::RateLimited => {
                    tracing::warn!(request_id = %request_id, client = %client, origin = %origin, "Rate limit exceeded");
                }
                RelayError::PayloadTooLarge
                | RelayError::MalformedJson(_)
                | RelayError::InvalidForm(_) => {
                    tracing::info!(request_id = %request_id, client = %client, origin = %origin, error = %err, "Rejected submission");
                }
                RelayError::MailTransport(e) => {
                    tracing::error!(request_id = %request_id, client = %client, origin = %origin, path = %path, error = %e, "Failed to send email");
                }
            }
            err.into_response()
        }
    };

    response.headers_mut().extend(cors);
    metrics::record_request(response.status().as_u16(), start_time);
    response
}

async fn handle(
    state: &AppState,
    method: &Method,
    path: &str,
    body: Body,
    origin: Option<&str>,
    client: &str,
) -> Result<Response, RelayError> {
    if method == Method::OPTIONS {
        return Ok(response::preflight());
    }

    if method != Method::POST || path != SEND_PATH {
        return Err(RelayError::NotFound);
    }

    let config = state.origins.resolve(origin).ok_or(RelayError::UnknownOrigin)?;

    if !state.limiter.check(client) {
        metrics::record_rate_limited();
        return Err(RelayError::RateLimited);
    }

    // Any body read failure, the size limit included, is reported as 413.
    let bytes = axum::body::to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|_| RelayError::PayloadTooLarge)?;
    let value: Value = serde_json::from_slice(&bytes)?;
    let form = ContactFormData::from_json(&value)?;

    let origin = origin.unwrap_or_default();
    match state.mailer.send(&form, config).await {
        Ok(()) => {
            metrics::record_mail(origin, "sent");
            tracing::info!(origin = %origin, client = %client, "Submission delivered");
            Ok(response::sent())
        }
        Err(e) => {
            metrics::record_mail(origin, "failed");
            Err(e.into())
        }
    }
}
