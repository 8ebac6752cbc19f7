//! The donation notification handler.
//!
//! `DonationNotifier` is the reactive core of the service: one invocation
//! per `DonationCreated` event, formatting the fixed message and
//! submitting it to the mail transport.

use crate::error::NotificationResult;
use crate::models::DonationCreated;
use crate::providers::{EmailContent, EmailProvider};
use crate::template::{DEFAULT_NOTIFY_EMAIL, NOTIFY_SUBJECT, donation_notice_body};
use std::sync::Arc;
use tracing::{error, info};

/// Configuration for the notifier.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Recipient of every notification (the reviewing doctor).
    pub recipient: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            recipient: std::env::var("NOTIFY_EMAIL")
                .unwrap_or_else(|_| DEFAULT_NOTIFY_EMAIL.to_string()),
        }
    }
}

/// Handler that emails the reviewer once per donation creation event.
pub struct DonationNotifier<P: EmailProvider> {
    provider: Arc<P>,
    config: NotifierConfig,
}

impl<P: EmailProvider + 'static> DonationNotifier<P> {
    /// Create a notifier with the default recipient configuration.
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, NotifierConfig::default())
    }

    /// Create a notifier with an explicit configuration.
    pub fn with_config(provider: P, config: NotifierConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            config,
        }
    }

    /// Get a reference to the email provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Handle a donation creation event.
    ///
    /// Builds the fixed-recipient message from the record's fields and
    /// submits it. A transport failure is logged with its detail and
    /// swallowed: the invocation completes normally and any retry is left
    /// to the hosting platform. At most one send is attempted per event.
    pub async fn notify(&self, event: &DonationCreated) -> NotificationResult<()> {
        info!(
            event_id = %event.id,
            to = %self.config.recipient,
            "Processing donation creation event"
        );

        let email = EmailContent {
            to_email: self.config.recipient.clone(),
            subject: NOTIFY_SUBJECT.to_string(),
            text_body: donation_notice_body(&event.donation),
        };

        match self.provider.send(&email).await {
            Ok(sent) => {
                info!(
                    event_id = %event.id,
                    to = %email.to_email,
                    provider = self.provider.name(),
                    message_id = ?sent.message_id,
                    "Donation notification sent"
                );
            }
            Err(e) => {
                error!(
                    event_id = %event.id,
                    to = %email.to_email,
                    provider = self.provider.name(),
                    error = %e,
                    "Failed to send donation notification"
                );
            }
        }

        Ok(())
    }

    /// Check that the underlying transport is reachable.
    pub async fn health_check(&self) -> NotificationResult<bool> {
        self.provider.health_check().await
    }
}

impl<P: EmailProvider> Clone for DonationNotifier<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            config: self.config.clone(),
        }
    }
}
