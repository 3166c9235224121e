//! Contact form relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────────┐
//!                       │                    CONTACT RELAY                      │
//!                       │                                                       │
//!   POST /api/send      │  ┌──────┐   ┌────────┐   ┌────────────┐   ┌────────┐ │
//!   ────────────────────┼─▶│ CORS │──▶│ origin │──▶│ rate limit │──▶│  form  │ │
//!                       │  └──────┘   │ lookup │   │ (per key)  │   │validate│ │
//!                       │             └────────┘   └────────────┘   └───┬────┘ │
//!                       │                                               │      │
//!                       │                                               ▼      │
//!   JSON response       │                                         ┌──────────┐ │      per-origin
//!   ◀───────────────────┼─────────────────────────────────────────│  mailer  │─┼────▶ SMTP server
//!                       │                                         └──────────┘ │
//!                       └──────────────────────────────────────────────────────┘
//! ```

use std::error::Error;

use clap::Parser;
use tokio::net::TcpListener;

use contact_relay::http::HttpServer;
use contact_relay::lifecycle::startup::{self, Cli};
use contact_relay::lifecycle::{signals, Shutdown};
use contact_relay::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_format);

    tracing::info!("contact-relay v{} starting", env!("CARGO_PKG_VERSION"));

    let (settings, origins) = match startup::bootstrap(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!(path = %cli.config_path.display(), error = %e, "Invalid configuration, refusing to start");
            return Err(e.into());
        }
    };

    if let Some(addr) = cli.metrics_address {
        metrics::init_metrics(addr);
    }

    let mailer = startup::build_mailer(&settings.mail);

    let listener = TcpListener::bind(&settings.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(settings, origins, mailer);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
