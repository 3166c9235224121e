//! Contact form relay library.
//!
//! Accepts contact-form submissions over HTTP from static sites and forwards
//! them by SMTP, with the recipient and SMTP account chosen from the caller's
//! `Origin` header.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod mail;
pub mod observability;
pub mod security;

pub use config::{ConfigStore, OriginConfig, RelaySettings, SmtpConfig};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use mail::{ContactFormData, MailError, Mailer, SmtpMailer};
