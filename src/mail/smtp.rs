//! SMTP delivery via lettre.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{OriginConfig, SmtpConfig};
use crate::mail::form::ContactFormData;
use crate::mail::{template, MailError, Mailer};

type Transport = AsyncSmtpTransport<Tokio1Executor>;

/// Identity of a reusable transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TransportKey {
    host: String,
    port: u16,
    secure: bool,
    user: String,
}

impl From<&SmtpConfig> for TransportKey {
    fn from(smtp: &SmtpConfig) -> Self {
        Self {
            host: smtp.host.clone(),
            port: smtp.port,
            secure: smtp.secure,
            user: smtp.user.clone(),
        }
    }
}

struct CachedTransport {
    transport: Arc<Transport>,
    built_at: Instant,
}

/// Transports keyed by server and user, rebuilt once older than `max_age`.
struct TransportCache {
    entries: DashMap<TransportKey, CachedTransport>,
    max_age: Duration,
}

impl TransportCache {
    fn get_or_build(&self, smtp: &SmtpConfig) -> Result<Arc<Transport>, MailError> {
        let key = TransportKey::from(smtp);
        if let Some(cached) = self.entries.get(&key) {
            if cached.built_at.elapsed() < self.max_age {
                return Ok(cached.transport.clone());
            }
        }

        let transport = Arc::new(build_transport(smtp)?);
        self.entries.insert(
            key,
            CachedTransport {
                transport: transport.clone(),
                built_at: Instant::now(),
            },
        );
        tracing::debug!(host = %smtp.host, port = smtp.port, "Cached new SMTP transport");
        Ok(transport)
    }

    fn evict(&self, smtp: &SmtpConfig) {
        self.entries.remove(&TransportKey::from(smtp));
    }
}

/// [`Mailer`] that talks to each origin's own SMTP server.
pub struct SmtpMailer {
    cache: Option<TransportCache>,
}

impl SmtpMailer {
    /// Build a fresh transport for every message.
    pub fn new() -> Self {
        Self { cache: None }
    }

    /// Reuse transports across messages for up to `max_age`.
    pub fn with_transport_cache(max_age: Duration) -> Self {
        Self {
            cache: Some(TransportCache {
                entries: DashMap::new(),
                max_age,
            }),
        }
    }

    fn transport(&self, smtp: &SmtpConfig) -> Result<Arc<Transport>, MailError> {
        match &self.cache {
            Some(cache) => cache.get_or_build(smtp),
            None => Ok(Arc::new(build_transport(smtp)?)),
        }
    }
}

impl Default for SmtpMailer {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailer for SmtpMailer {
    fn send<'a>(
        &'a self,
        form: &'a ContactFormData,
        origin: &'a OriginConfig,
    ) -> BoxFuture<'a, Result<(), MailError>> {
        async move {
            let message = build_message(form, origin)?;
            let transport = self.transport(&origin.smtp)?;

            match transport.send(message).await {
                Ok(response) => {
                    tracing::debug!(code = %response.code(), host = %origin.smtp.host, "SMTP server accepted message");
                    Ok(())
                }
                Err(e) => {
                    if let Some(cache) = &self.cache {
                        cache.evict(&origin.smtp);
                    }
                    Err(e.into())
                }
            }
        }
        .boxed()
    }
}

/// Build a transport for `smtp`. Implicit TLS when `secure`, otherwise
/// plaintext with STARTTLS when offered.
fn build_transport(smtp: &SmtpConfig) -> Result<Transport, MailError> {
    let parameters = TlsParameters::new(smtp.host.clone())?;
    let tls = if smtp.secure {
        Tls::Wrapper(parameters)
    } else {
        Tls::Opportunistic(parameters)
    };

    Ok(Transport::builder_dangerous(smtp.host.as_str())
        .port(smtp.port)
        .tls(tls)
        .credentials(Credentials::new(smtp.user.clone(), smtp.pass.clone()))
        .build())
}

/// Compose the message for one submission.
pub fn build_message(form: &ContactFormData, origin: &OriginConfig) -> Result<Message, MailError> {
    let sender: Address = origin
        .smtp
        .user
        .parse()
        .map_err(|source| MailError::Address { field: "sender", source })?;
    let recipient: Address = origin
        .to_email
        .parse()
        .map_err(|source| MailError::Address { field: "recipient", source })?;

    let mut builder = Message::builder()
        .from(Mailbox::new(Some(form.name.clone()), sender))
        .to(Mailbox::new(Some(origin.name.clone()), recipient))
        .subject(template::subject(origin));

    // The form only guarantees an '@'; skip Reply-To when it is not a real address.
    if let Ok(visitor) = form.email.parse::<Address>() {
        builder = builder.reply_to(Mailbox::new(Some(form.name.clone()), visitor));
    }

    let body = MultiPart::alternative_plain_html(
        template::render_text(form),
        template::render_html(form, origin),
    );
    Ok(builder.multipart(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> OriginConfig {
        OriginConfig {
            name: "Example Site".into(),
            to_email: "owner@example.com".into(),
            smtp: SmtpConfig {
                host: "smtp.example.com".into(),
                port: 587,
                secure: false,
                user: "relay@example.com".into(),
                pass: "secret".into(),
            },
        }
    }

    fn form(email: &str) -> ContactFormData {
        ContactFormData {
            email: email.into(),
            name: "Jane".into(),
            message: "Hello".into(),
            phone: None,
        }
    }

    fn header<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
        let prefix = format!("{name}: ");
        raw.lines().find_map(|line| line.strip_prefix(prefix.as_str()))
    }

    #[test]
    fn test_sender_is_origin_smtp_user() {
        let message = build_message(&form("visitor@example.org"), &origin()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        let from = header(&raw, "From").unwrap();
        assert!(from.contains("Jane"));
        assert!(from.contains("relay@example.com"));
        assert!(!from.contains("visitor@example.org"));

        assert!(header(&raw, "To").unwrap().contains("owner@example.com"));
        assert!(header(&raw, "Reply-To").unwrap().contains("visitor@example.org"));
        assert!(header(&raw, "Subject").unwrap().contains("Example Site"));
        assert!(raw.contains("multipart/alternative"));
    }

    #[test]
    fn test_unparsable_visitor_address_skips_reply_to() {
        let message = build_message(&form("not really@an address"), &origin()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(header(&raw, "Reply-To").is_none());
    }

    #[test]
    fn test_invalid_sender_is_reported() {
        let mut cfg = origin();
        cfg.smtp.user = "apikey".into();
        let err = build_message(&form("visitor@example.org"), &cfg).unwrap_err();
        assert!(matches!(err, MailError::Address { field: "sender", .. }));
    }

    #[tokio::test]
    async fn test_transport_cache_reuses_until_evicted() {
        let mailer = SmtpMailer::with_transport_cache(Duration::from_secs(60));
        let cfg = origin();

        let first = mailer.transport(&cfg.smtp).unwrap();
        let second = mailer.transport(&cfg.smtp).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        mailer.cache.as_ref().unwrap().evict(&cfg.smtp);
        let third = mailer.transport(&cfg.smtp).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[tokio::test]
    async fn test_uncached_mailer_builds_per_call() {
        let mailer = SmtpMailer::new();
        let cfg = origin();

        let first = mailer.transport(&cfg.smtp).unwrap();
        let second = mailer.transport(&cfg.smtp).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
