// src/notify.rs

//! Outbound mail transport.

use std::time::Duration;

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::error::{AppError, Result};

/// SMTP connection timeout in seconds.
const SMTP_TIMEOUT_SECS: u64 = 30;

/// Plain-text mail notifier.
#[derive(Clone)]
pub struct Mailer {
    config: SmtpConfig,
}

impl Mailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Send one plain-text message with `Subject = "{prefix} {suffix}"` to
    /// every configured recipient.
    ///
    /// Missing transport or envelope settings fail here, at send time; the
    /// caller decides whether that aborts the cycle.
    pub async fn send(&self, subject_suffix: &str, body: String) -> Result<()> {
        self.ensure_configured()?;

        let mut builder = Message::builder()
            .from(self.config.from_email.parse::<Mailbox>()?)
            .subject(self.subject(subject_suffix));
        for recipient in &self.config.to_emails {
            builder = builder.to(recipient.parse::<Mailbox>()?);
        }
        let message = builder.header(ContentType::TEXT_PLAIN).body(body)?;

        self.transport()?.send(message).await?;
        Ok(())
    }

    fn subject(&self, suffix: &str) -> String {
        format!("{} {}", self.config.subject_prefix, suffix)
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.config.username.is_empty() || self.config.password.is_empty() {
            return Err(AppError::notify("SMTP_USER/SMTP_PASS are not configured"));
        }
        if self.config.from_email.is_empty() {
            return Err(AppError::notify("FROM_EMAIL is not configured"));
        }
        if self.config.to_emails.is_empty() {
            return Err(AppError::notify("TO_EMAILS is not configured"));
        }
        Ok(())
    }

    /// Build the SMTP transport: STARTTLS upgrade on a plaintext connection,
    /// or implicit TLS from the start.
    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let builder = if self.config.use_starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)?
        };
        Ok(builder
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(SMTP_TIMEOUT_SECS)))
            .build())
    }
}
