//! Mail transport implementations.
//!
//! This module contains the `EmailProvider` trait and the SMTP
//! implementation used to reach the relay.

mod smtp;

pub use smtp::{SmtpConfig, SmtpProvider};

use crate::error::NotificationResult;
use async_trait::async_trait;

/// Represents a sent email with provider-specific message ID.
#[derive(Debug, Clone)]
pub struct SentEmail {
    /// Provider-specific message ID for tracking.
    pub message_id: Option<String>,
    /// Whether the email was accepted for delivery.
    pub accepted: bool,
}

/// Email content ready for sending.
#[derive(Debug, Clone, Default)]
pub struct EmailContent {
    /// Recipient email address.
    pub to_email: String,
    /// Email subject.
    pub subject: String,
    /// Plain text body content.
    pub text_body: String,
}

/// Trait for mail transport providers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Send an email.
    async fn send(&self, email: &EmailContent) -> NotificationResult<SentEmail>;

    /// Get the provider name for logging.
    fn name(&self) -> &'static str;

    /// Check if the provider is healthy/configured.
    async fn health_check(&self) -> NotificationResult<bool>;
}
