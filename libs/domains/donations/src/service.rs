//! Intake-side publishing of donation creation events.

use crate::error::NotificationResult;
use crate::models::{DonationCreated, DonationRecord};
use crate::streams::DonationStream;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use tracing::debug;

/// Configuration for the intake service.
#[derive(Debug, Clone)]
pub struct IntakeServiceConfig {
    /// Redis stream name for creation events.
    pub stream_name: String,
    /// Maximum stream length (for auto-trimming).
    pub max_stream_length: i64,
}

impl Default for IntakeServiceConfig {
    fn default() -> Self {
        Self {
            stream_name: std::env::var("DONATION_STREAM_NAME")
                .unwrap_or_else(|_| DonationStream::STREAM_NAME.to_string()),
            max_stream_length: DonationStream::MAX_LENGTH,
        }
    }
}

/// Service that raises one creation event per submitted donation.
///
/// This is the producer side of the event feed: the intake backend calls
/// `publish_created` after persisting a donation record.
pub struct DonationIntakeService {
    redis: Arc<ConnectionManager>,
    config: IntakeServiceConfig,
}

impl DonationIntakeService {
    /// Create a new intake service.
    pub fn new(redis: ConnectionManager, config: IntakeServiceConfig) -> Self {
        Self {
            redis: Arc::new(redis),
            config,
        }
    }

    /// Create an intake service with the default config.
    pub fn with_default_config(redis: ConnectionManager) -> Self {
        Self::new(redis, IntakeServiceConfig::default())
    }

    /// Publish a creation event for a newly submitted donation record.
    pub async fn publish_created(
        &self,
        donation: DonationRecord,
    ) -> NotificationResult<DonationCreated> {
        let event = DonationCreated::new(donation);
        let event_json = serde_json::to_string(&event)?;

        let mut conn = (*self.redis).clone();

        // Add to stream with auto-trim
        let stream_id: String = redis::cmd("XADD")
            .arg(&self.config.stream_name)
            .arg("MAXLEN")
            .arg("~")
            .arg(self.config.max_stream_length)
            .arg("*")
            .arg(DonationStream::ENTRY_FIELD)
            .arg(&event_json)
            .query_async(&mut conn)
            .await?;

        debug!(
            event_id = %event.id,
            stream_id = %stream_id,
            "Published donation creation event"
        );

        Ok(event)
    }
}
