//! Configuration schema definitions.
//!
//! Two kinds of configuration live here:
//! - the per-origin mail settings read from the JSON origins file
//!   ([`OriginConfig`], [`SmtpConfig`]);
//! - process-level tuning ([`RelaySettings`]) assembled from CLI flags and
//!   environment at startup.
//!
//! All types derive Serde traits so they can be deserialized from config files.

use serde::{Deserialize, Serialize};

/// Mail settings for one calling origin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginConfig {
    /// Display name of the site, embedded in the mail subject.
    pub name: String,

    /// Recipient of every submission coming from this origin.
    pub to_email: String,

    /// SMTP server used to deliver this origin's mail.
    pub smtp: SmtpConfig,
}

/// SMTP connection and credential settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SmtpConfig {
    /// SMTP server hostname.
    pub host: String,

    /// SMTP server port (default: 587).
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Implicit TLS from the first byte. When false the connection starts
    /// in plaintext and upgrades with STARTTLS if the server offers it.
    #[serde(default)]
    pub secure: bool,

    /// Authentication user. Also used as the sender address.
    pub user: String,

    /// Authentication password.
    pub pass: String,
}

fn default_smtp_port() -> u16 {
    587
}

/// Process-level settings for the relay.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelaySettings {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Per-client rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Mail delivery tuning.
    pub mail: MailConfig,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            rate_limit: RateLimitConfig::default(),
            mail: MailConfig::default(),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Fixed-window rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Window length in milliseconds.
    pub window_ms: u64,

    /// Requests allowed per client within one window.
    pub max_requests: u32,

    /// Upper bound on tracked client keys.
    pub max_keys: usize,

    /// Interval between sweeps of expired entries, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: 60_000,
            max_requests: 5,
            max_keys: 10_000,
            sweep_interval_secs: 60,
        }
    }
}

/// Mail transport tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MailConfig {
    /// Reuse SMTP transports across requests, keyed by (host, port, user).
    pub cache_transports: bool,

    /// Age after which a cached transport is rebuilt, in seconds.
    pub transport_max_age_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            cache_transports: false,
            transport_max_age_secs: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smtp_defaults() {
        let cfg: OriginConfig = serde_json::from_str(
            r#"{
                "name": "Example",
                "toEmail": "owner@example.com",
                "smtp": { "host": "smtp.example.com", "user": "relay@example.com", "pass": "secret" }
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.to_email, "owner@example.com");
        assert_eq!(cfg.smtp.port, 587);
        assert!(!cfg.smtp.secure);
    }

    #[test]
    fn test_relay_settings_defaults() {
        let settings = RelaySettings::default();
        assert_eq!(settings.listener.bind_address, "0.0.0.0:3000");
        assert_eq!(settings.rate_limit.window_ms, 60_000);
        assert_eq!(settings.rate_limit.max_requests, 5);
        assert!(!settings.mail.cache_transports);
    }
}
