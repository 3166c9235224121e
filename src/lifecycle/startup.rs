//! Startup orchestration.
//!
//! # Responsibilities
//! - Parse CLI flags and environment
//! - Load and validate the origins file
//! - Assemble the settings and the mailer the server runs with
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds only after configuration is accepted

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crate::config::{load_origins, ConfigError, ConfigStore, MailConfig, RelaySettings};
use crate::mail::{Mailer, SmtpMailer};
use crate::observability::logging::LogFormat;

/// Command line and environment for the relay.
#[derive(Debug, Clone, Parser)]
#[command(name = "contact-relay")]
#[command(about = "Relay contact-form submissions to per-origin SMTP servers", version)]
pub struct Cli {
    /// Path to the origins file (JSON)
    #[arg(long = "config", env = "CONFIG_PATH")]
    pub config_path: PathBuf,

    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Serve Prometheus metrics on this address
    #[arg(long, env = "METRICS_ADDRESS")]
    pub metrics_address: Option<SocketAddr>,

    /// Log output format: pretty or json
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,

    /// Reuse SMTP transports across requests
    #[arg(long, env = "CACHE_TRANSPORTS")]
    pub cache_transports: bool,

    /// Maximum accepted request body in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = 64 * 1024)]
    pub max_body_bytes: usize,

    /// Maximum number of client keys tracked by the rate limiter
    #[arg(long, env = "RATE_LIMIT_MAX_KEYS", default_value_t = 10_000)]
    pub rate_limit_max_keys: usize,
}

impl Cli {
    /// Process settings derived from the flags; unset knobs keep their defaults.
    pub fn settings(&self) -> RelaySettings {
        let mut settings = RelaySettings::default();
        settings.listener.bind_address = SocketAddr::new(self.host, self.port).to_string();
        settings.max_body_bytes = self.max_body_bytes;
        settings.rate_limit.max_keys = self.rate_limit_max_keys;
        settings.mail.cache_transports = self.cache_transports;
        settings
    }
}

/// Load everything the server needs before it binds.
pub fn bootstrap(cli: &Cli) -> Result<(RelaySettings, ConfigStore), ConfigError> {
    let origins = load_origins(&cli.config_path)?;
    let settings = cli.settings();

    tracing::info!(
        path = %cli.config_path.display(),
        origins = origins.len(),
        bind_address = %settings.listener.bind_address,
        "Configuration loaded"
    );
    for (origin, cfg) in origins.origins() {
        tracing::debug!(origin = %origin, name = %cfg.name, smtp_host = %cfg.smtp.host, "Origin configured");
    }

    Ok((settings, origins))
}

pub fn build_mailer(config: &MailConfig) -> Arc<dyn Mailer> {
    if config.cache_transports {
        Arc::new(SmtpMailer::with_transport_cache(Duration::from_secs(
            config.transport_max_age_secs,
        )))
    } else {
        Arc::new(SmtpMailer::new())
    }
}
