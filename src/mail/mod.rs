//! Mail delivery subsystem.
//!
//! # Data Flow
//! ```text
//! validated ContactFormData + OriginConfig
//!     → template.rs (subject, text part, escaped HTML part)
//!     → smtp.rs (build message, build or reuse transport, send)
//!     → Ok(()) or MailError
//! ```
//!
//! # Design Decisions
//! - Transport is built from the origin's SMTP settings on every send unless
//!   the transport cache is enabled
//! - The sender address is always the origin's SMTP user; the visitor only
//!   contributes the display name and Reply-To
//! - No retries: a failed send is reported to the caller once

pub mod form;
pub mod smtp;
pub mod template;

use futures_util::future::BoxFuture;

use crate::config::OriginConfig;

pub use form::{ContactFormData, FormError};
pub use smtp::SmtpMailer;

/// Failure to build or deliver a message.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid {field} address")]
    Address {
        field: &'static str,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Delivers a submission using an origin's mail settings.
pub trait Mailer: Send + Sync {
    fn send<'a>(
        &'a self,
        form: &'a ContactFormData,
        origin: &'a OriginConfig,
    ) -> BoxFuture<'a, Result<(), MailError>>;
}
