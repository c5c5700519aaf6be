//! Email delivery of the rendered digest over SMTP

use chrono::{DateTime, Local, NaiveDateTime};
use lettre::message::header::{ContentType, Header, HeaderName, HeaderValue};
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::{info, instrument};

/// Errors raised while building or sending the digest mail
#[derive(Error, Debug)]
pub enum MailError {
    #[error("Invalid address '{address}': {message}")]
    Address { address: String, message: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP delivery failed: {0}")]
    Transport(String),
}

/// SMTP settings and envelope addresses
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from: String,
    pub to: Vec<String>,
    pub username: String,
    pub password: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            from: String::new(),
            to: Vec::new(),
            username: String::new(),
            password: String::new(),
        }
    }
}

/// `X-Unique-ID` header so that mail clients never thread two digests
#[derive(Debug, Clone, PartialEq, Eq)]
struct XUniqueId(String);

impl Header for XUniqueId {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Unique-ID")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

/// Subject line for a digest sent at `sent_at` (local wall clock)
pub fn subject_for(sent_at: NaiveDateTime) -> String {
    format!("Dagens nyheter – {}", sent_at.format("%Y-%m-%d %H:%M:%S"))
}

/// Sends HTML digests through an authenticated STARTTLS relay
pub struct Mailer {
    config: MailConfig,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MailConfig {
        &self.config
    }

    /// Build the message for one digest.
    ///
    /// `Message-ID` and `X-Unique-ID` are derived from `now` to the
    /// microsecond.
    pub fn build_message(&self, html: &str, now: DateTime<Local>) -> Result<Message, MailError> {
        let from = parse_mailbox(&self.config.from)?;
        let unique = format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros());

        let mut builder = Message::builder()
            .from(from)
            .subject(subject_for(now.naive_local()))
            .message_id(Some(format!("<{}@dagensnyheter>", unique)))
            .header(XUniqueId(unique))
            .header(ContentType::TEXT_HTML);
        for recipient in &self.config.to {
            builder = builder.to(parse_mailbox(recipient)?);
        }

        builder
            .body(html.replace('\u{a0}', " "))
            .map_err(|e| MailError::Build(e.to_string()))
    }

    /// Build and deliver the digest to every recipient
    #[instrument(skip(self, html), fields(host = %self.config.smtp_host, recipients = self.config.to.len()))]
    pub async fn send(&self, html: &str, now: DateTime<Local>) -> Result<(), MailError> {
        let message = self.build_message(html, now)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
            .map_err(|e| MailError::Transport(format!("starttls relay init failed: {}", e)))?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ))
            .build();

        let response = transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        info!("Digest delivered ({})", response.code());
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.trim().parse().map_err(|e: lettre::address::AddressError| MailError::Address {
        address: address.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn config() -> MailConfig {
        MailConfig {
            from: "avsandare@example.com".to_string(),
            to: vec!["a@example.com".to_string(), "b@example.com".to_string()],
            username: "avsandare@example.com".to_string(),
            password: "hemligt".to_string(),
            ..MailConfig::default()
        }
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 10, 8, 15, 0).unwrap()
    }

    #[test]
    fn test_subject_format() {
        let at = NaiveDate::from_ymd_opt(2025, 3, 10)
            .and_then(|d| d.and_hms_opt(8, 15, 3))
            .unwrap();
        assert_eq!(subject_for(at), "Dagens nyheter – 2025-03-10 08:15:03");
    }

    #[test]
    fn test_default_relay() {
        let config = MailConfig::default();
        assert_eq!(config.smtp_host, "smtp.gmail.com");
        assert_eq!(config.smtp_port, 587);
    }

    #[test]
    fn test_message_headers_and_envelope() {
        let mailer = Mailer::new(config());
        let message = mailer.build_message("<p>hej</p>", now()).unwrap();

        let unique = format!("{}.000000", now().timestamp());
        assert_eq!(message.headers().get_raw("X-Unique-ID"), Some(unique.as_str()));
        assert_eq!(
            message.headers().get_raw("Message-ID"),
            Some(format!("<{}@dagensnyheter>", unique).as_str())
        );
        assert_eq!(message.envelope().to().len(), 2);
        assert_eq!(message.envelope().from().map(|a| a.to_string()).as_deref(), Some("avsandare@example.com"));

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Content-Type: text/html; charset=utf-8"));
    }

    #[test]
    fn test_invalid_recipient_rejected() {
        let mut config = config();
        config.to.push("inte en adress".to_string());
        let result = Mailer::new(config).build_message("<p>hej</p>", now());
        assert!(matches!(result, Err(MailError::Address { .. })));
    }

    #[test]
    fn test_missing_sender_rejected() {
        let config = MailConfig {
            from: String::new(),
            ..config()
        };
        let result = Mailer::new(config).build_message("<p>hej</p>", now());
        assert!(matches!(result, Err(MailError::Address { .. })));
    }
}
