//! SMTP mail transport built on lettre.
//!
//! Production use targets an authenticated TLS relay (the intake app uses
//! a Gmail account); the non-TLS mode exists for local development with
//! Mailpit/MailHog style catchers.

use super::{EmailContent, EmailProvider, SentEmail};
use crate::error::{NotificationError, NotificationResult};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::sync::Arc;
use tracing::{debug, error, info};

/// SMTP configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP server host.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// Sender email address.
    pub from_email: String,
    /// SMTP username (defaults to the sender address).
    pub username: Option<String>,
    /// SMTP password (optional for dev catchers like Mailpit).
    pub password: Option<String>,
    /// Whether to use TLS (false for local dev servers).
    pub use_tls: bool,
}

impl SmtpConfig {
    /// Create a new SMTP configuration.
    pub fn new(host: String, port: u16, from_email: String) -> Self {
        Self {
            host,
            port,
            from_email,
            username: None,
            password: None,
            use_tls: false,
        }
    }

    /// Load the relay configuration from the environment.
    ///
    /// `EMAIL_USER` (sender address) and `EMAIL_PASS` (sender secret) are
    /// required; host/port default to the Gmail relay.
    pub fn from_env() -> NotificationResult<Self> {
        let from_email = std::env::var("EMAIL_USER")
            .map_err(|_| NotificationError::Config("EMAIL_USER is not set".to_string()))?;
        let password = std::env::var("EMAIL_PASS")
            .map_err(|_| NotificationError::Config("EMAIL_PASS is not set".to_string()))?;

        Ok(Self {
            host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            port: std::env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .unwrap_or(587),
            username: std::env::var("SMTP_USERNAME").ok().or(Some(from_email.clone())),
            from_email,
            password: Some(password),
            use_tls: std::env::var("SMTP_USE_TLS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        })
    }

    /// Configuration for a local Mailpit/MailHog catcher (development).
    pub fn mailpit() -> Self {
        Self {
            host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("SMTP_PORT")
                .unwrap_or_else(|_| "1025".to_string())
                .parse()
                .unwrap_or(1025),
            from_email: std::env::var("EMAIL_USER")
                .unwrap_or_else(|_| "noreply@localhost".to_string()),
            username: None,
            password: None,
            use_tls: false,
        }
    }

    /// Builder method to set TLS.
    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    /// Builder method to set credentials.
    pub fn with_credentials(mut self, username: String, password: String) -> Self {
        self.username = Some(username);
        self.password = Some(password);
        self
    }
}

/// SMTP mail transport provider.
pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: Arc<SmtpConfig>,
}

impl SmtpProvider {
    /// Create a new SMTP provider.
    pub fn new(config: SmtpConfig) -> NotificationResult<Self> {
        let transport = Self::build_transport(&config)?;
        Ok(Self {
            transport,
            config: Arc::new(config),
        })
    }

    /// Build the SMTP transport based on configuration.
    fn build_transport(
        config: &SmtpConfig,
    ) -> NotificationResult<AsyncSmtpTransport<Tokio1Executor>> {
        let transport = if config.use_tls {
            let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| {
                    NotificationError::Transport(format!("Failed to create SMTP relay: {}", e))
                })?
                .port(config.port);

            if let (Some(username), Some(password)) = (&config.username, &config.password) {
                builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
            }

            builder.build()
        } else {
            // Non-TLS transport for local dev catchers
            let mut builder =
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                    .port(config.port);

            if let (Some(username), Some(password)) = (&config.username, &config.password) {
                builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
            }

            builder.build()
        };

        Ok(transport)
    }

    /// Build a lettre Message from EmailContent.
    fn build_message(&self, email: &EmailContent) -> NotificationResult<Message> {
        let from: Mailbox = self.config.from_email.parse().map_err(|e| {
            NotificationError::Transport(format!("Invalid from address: {}", e))
        })?;

        let to: Mailbox = email.to_email.parse().map_err(|e| {
            NotificationError::Transport(format!("Invalid to address: {}", e))
        })?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(&email.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(email.text_body.clone())
            .map_err(|e| {
                NotificationError::Transport(format!("Failed to build email message: {}", e))
            })
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &EmailContent) -> NotificationResult<SentEmail> {
        debug!(
            to = %email.to_email,
            subject = %email.subject,
            host = %self.config.host,
            port = %self.config.port,
            "Sending email via SMTP"
        );

        let message = self.build_message(email)?;

        let response = self.transport.send(message).await.map_err(|e| {
            error!(
                to = %email.to_email,
                error = %e,
                "Failed to send email via SMTP"
            );
            NotificationError::Transport(format!("SMTP send failed: {}", e))
        })?;

        let message_id = response.message().next().map(|s| s.to_string());

        info!(
            to = %email.to_email,
            message_id = ?message_id,
            "Email sent successfully via SMTP"
        );

        Ok(SentEmail {
            message_id,
            accepted: true,
        })
    }

    fn name(&self) -> &'static str {
        "SMTP"
    }

    async fn health_check(&self) -> NotificationResult<bool> {
        self.transport.test_connection().await.map_err(|e| {
            NotificationError::Transport(format!("SMTP health check failed: {}", e))
        })?;
        Ok(true)
    }
}
