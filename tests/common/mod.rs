//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use contact_relay::config::{parse_origins, ConfigStore};
use contact_relay::{ContactFormData, MailError, Mailer, OriginConfig};

pub const KNOWN_ORIGIN: &str = "https://known.example";
pub const OTHER_ORIGIN: &str = "https://other.example";

/// Two configured origins pointing at `smtp_addr`.
pub fn origins_json(smtp_addr: SocketAddr) -> String {
    format!(
        r#"{{
            "{KNOWN_ORIGIN}": {{
                "name": "Known Site",
                "toEmail": "owner@known.example",
                "smtp": {{ "host": "{ip}", "port": {port}, "user": "relay@known.example", "pass": "secret" }}
            }},
            "{OTHER_ORIGIN}": {{
                "name": "Other Site",
                "toEmail": "owner@other.example",
                "smtp": {{ "host": "{ip}", "port": {port}, "user": "relay@other.example", "pass": "secret" }}
            }}
        }}"#,
        ip = smtp_addr.ip(),
        port = smtp_addr.port(),
    )
}

pub fn origins(smtp_addr: SocketAddr) -> ConfigStore {
    parse_origins(&origins_json(smtp_addr)).unwrap()
}

pub fn test_origins() -> ConfigStore {
    origins("127.0.0.1:2525".parse().unwrap())
}

pub fn valid_body() -> String {
    r#"{"email":"visitor@example.org","name":"Jane","message":"Hello there"}"#.to_string()
}

/// `POST /api/send` with the given origin and body.
pub fn send_request(origin: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/send")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(origin) = origin {
        builder = builder.header(header::ORIGIN, origin);
    }
    builder.body(body.into()).unwrap()
}

/// Mailer that records every dispatch instead of talking SMTP.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(ContactFormData, OriginConfig)>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn sent(&self) -> Vec<(ContactFormData, OriginConfig)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Mailer for RecordingMailer {
    fn send<'a>(
        &'a self,
        form: &'a ContactFormData,
        origin: &'a OriginConfig,
    ) -> BoxFuture<'a, Result<(), MailError>> {
        self.sent.lock().unwrap().push((form.clone(), origin.clone()));
        let fail = self.fail;
        async move {
            if fail {
                let source = "not an address".parse::<lettre::Address>().unwrap_err();
                Err(MailError::Address { field: "sender", source })
            } else {
                Ok(())
            }
        }
        .boxed()
    }
}

/// Minimal SMTP server that accepts AUTH PLAIN and stores message data.
pub struct FakeSmtpServer {
    pub addr: SocketAddr,
    messages: Arc<Mutex<Vec<String>>>,
}

impl FakeSmtpServer {
    pub async fn start() -> Self {
        Self::start_with(false).await
    }

    /// A server that rejects every AUTH attempt.
    pub async fn start_rejecting_auth() -> Self {
        Self::start_with(true).await
    }

    async fn start_with(reject_auth: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let messages = Arc::new(Mutex::new(Vec::new()));

        let store = messages.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let store = store.clone();
                tokio::spawn(async move {
                    let _ = serve_smtp(socket, store, reject_auth).await;
                });
            }
        });

        Self { addr, messages }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    /// Wait up to two seconds for `count` messages.
    pub async fn wait_for(&self, count: usize) -> Vec<String> {
        for _ in 0..40 {
            let messages = self.messages();
            if messages.len() >= count {
                return messages;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        self.messages()
    }
}

async fn serve_smtp(
    socket: TcpStream,
    messages: Arc<Mutex<Vec<String>>>,
    reject_auth: bool,
) -> std::io::Result<()> {
    let (read, mut write) = socket.into_split();
    let mut reader = BufReader::new(read);
    let mut line = String::new();

    write.write_all(b"220 localhost fake ESMTP\r\n").await?;

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let command = line.trim_end().to_ascii_uppercase();

        if command.starts_with("EHLO") {
            write
                .write_all(b"250-localhost\r\n250-AUTH PLAIN LOGIN\r\n250 8BITMIME\r\n")
                .await?;
        } else if command.starts_with("AUTH") {
            if reject_auth {
                write.write_all(b"535 5.7.8 Authentication credentials invalid\r\n").await?;
            } else {
                write.write_all(b"235 2.7.0 Authentication successful\r\n").await?;
            }
        } else if command == "DATA" {
            write.write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n").await?;
            let mut data = String::new();
            loop {
                line.clear();
                if reader.read_line(&mut line).await? == 0 {
                    return Ok(());
                }
                if line.trim_end_matches(['\r', '\n']) == "." {
                    break;
                }
                data.push_str(&line);
            }
            messages.lock().unwrap().push(data);
            write.write_all(b"250 2.0.0 Ok: queued\r\n").await?;
        } else if command.starts_with("QUIT") {
            write.write_all(b"221 2.0.0 Bye\r\n").await?;
            return Ok(());
        } else {
            write.write_all(b"250 2.0.0 Ok\r\n").await?;
        }
    }
}
