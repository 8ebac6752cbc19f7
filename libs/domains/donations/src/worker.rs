//! Worker that consumes donation creation events from the Redis stream.
//!
//! Each entry is handled independently: parse the event, invoke the
//! notifier, acknowledge. There is no retry queue and no dead letter
//! stream; transport failures are already logged and swallowed inside the
//! notifier, so every delivered event is acknowledged exactly once.

use crate::error::{NotificationError, NotificationResult};
use crate::models::DonationCreated;
use crate::notifier::DonationNotifier;
use crate::providers::EmailProvider;
use crate::streams::DonationStream;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use redis::streams::{StreamReadOptions, StreamReadReply};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Configuration for the donation worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Redis stream name.
    pub stream_name: String,
    /// Consumer group name.
    pub consumer_group: String,
    /// Worker/consumer ID.
    pub consumer_id: String,
    /// Batch size for reading events.
    pub batch_size: usize,
    /// Poll interval in milliseconds (how often to check for new entries).
    pub poll_interval_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            stream_name: std::env::var("DONATION_STREAM_NAME")
                .unwrap_or_else(|_| DonationStream::STREAM_NAME.to_string()),
            consumer_group: std::env::var("DONATION_CONSUMER_GROUP")
                .unwrap_or_else(|_| DonationStream::CONSUMER_GROUP.to_string()),
            consumer_id: format!("notifier-{}", Uuid::new_v4()),
            batch_size: 10,
            poll_interval_ms: std::env::var("DONATION_POLL_INTERVAL_MS")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .unwrap_or(500),
        }
    }
}

/// Worker that reads creation events and drives the notifier.
pub struct DonationWorker<P: EmailProvider> {
    redis: Arc<ConnectionManager>,
    notifier: DonationNotifier<P>,
    config: WorkerConfig,
}

impl<P: EmailProvider + 'static> DonationWorker<P> {
    /// Create a new donation worker.
    pub fn new(redis: ConnectionManager, notifier: DonationNotifier<P>, config: WorkerConfig) -> Self {
        Self {
            redis: Arc::new(redis),
            notifier,
            config,
        }
    }

    /// Create a worker with default config.
    pub fn with_default_config(redis: ConnectionManager, notifier: DonationNotifier<P>) -> Self {
        Self::new(redis, notifier, WorkerConfig::default())
    }

    /// Run the worker loop.
    ///
    /// Continuously reads creation events from the stream and processes
    /// them. Use the shutdown receiver to gracefully stop the worker.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> NotificationResult<()> {
        info!(
            consumer_id = %self.config.consumer_id,
            stream = %self.config.stream_name,
            group = %self.config.consumer_group,
            "Starting donation worker"
        );

        self.ensure_consumer_group().await?;

        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);

        // Track consecutive errors for exponential backoff
        let mut consecutive_errors: u32 = 0;
        const MAX_BACKOFF_SECS: u64 = 30;

        loop {
            if *shutdown.borrow() {
                info!("Received shutdown signal, stopping worker");
                break;
            }

            match self.process_batch().await {
                Ok(_) => {
                    if consecutive_errors > 0 {
                        info!("Connection recovered after {} errors", consecutive_errors);
                        consecutive_errors = 0;
                    }
                }
                Err(e) => {
                    consecutive_errors += 1;
                    let err_str = e.to_string();

                    // If the consumer group was deleted, recreate it
                    if err_str.contains("NOGROUP") {
                        warn!("Consumer group missing, recreating...");
                        if let Err(create_err) = self.ensure_consumer_group().await {
                            error!(error = %create_err, "Failed to recreate consumer group");
                        }
                    } else if Self::is_connection_error(&err_str) {
                        let backoff_secs =
                            std::cmp::min(2u64.pow(consecutive_errors.min(5)), MAX_BACKOFF_SECS);
                        warn!(
                            error = %e,
                            consecutive_errors = %consecutive_errors,
                            backoff_secs = %backoff_secs,
                            "Redis connection error, backing off"
                        );
                        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                    } else {
                        error!(error = %e, "Error processing batch");
                    }

                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
            }

            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Received shutdown signal, stopping worker");
                        break;
                    }
                }
                _ = tokio::time::sleep(poll_interval) => {}
            }
        }

        info!("Donation worker stopped");
        Ok(())
    }

    /// Check if an error is a Redis connection error
    fn is_connection_error(err_str: &str) -> bool {
        let lower = err_str.to_lowercase();
        lower.contains("connection")
            || lower.contains("disconnected")
            || lower.contains("broken pipe")
            || lower.contains("reset by peer")
            || lower.contains("refused")
            || lower.contains("timed out")
            || lower.contains("eof")
            || lower.contains("io error")
    }

    /// Ensure the consumer group exists.
    async fn ensure_consumer_group(&self) -> NotificationResult<()> {
        let mut conn = (*self.redis).clone();

        let result: Result<(), redis::RedisError> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg("$")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(_) => {
                info!("Created consumer group");
                Ok(())
            }
            Err(e) if e.to_string().contains("BUSYGROUP") => {
                debug!("Consumer group already exists");
                Ok(())
            }
            Err(e) => Err(NotificationError::Queue(e.to_string())),
        }
    }

    /// Process a batch of entries from the stream.
    async fn process_batch(&self) -> NotificationResult<()> {
        // First, drain this consumer's pending entries (not yet ACKed,
        // e.g. after a restart mid-batch)
        self.read_and_process(&["0"]).await?;

        // Then read and process new entries
        self.read_and_process(&[">"]).await?;

        Ok(())
    }

    /// Read entries at the given stream position and process each one.
    async fn read_and_process(&self, ids: &[&str]) -> NotificationResult<()> {
        let mut conn = (*self.redis).clone();

        // Non-blocking read; the main loop handles the polling delay
        let opts = StreamReadOptions::default()
            .group(&self.config.consumer_group, &self.config.consumer_id)
            .count(self.config.batch_size);

        let result: Result<StreamReadReply, _> = conn
            .xread_options(&[&self.config.stream_name], ids, &opts)
            .await;

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                let err_str = e.to_string().to_lowercase();
                if err_str.contains("timeout") || err_str.contains("timed out") {
                    return Ok(());
                }
                return Err(NotificationError::Queue(e.to_string()));
            }
        };

        for stream_key in reply.keys {
            let count = stream_key.ids.len();
            if count > 0 {
                debug!(count = count, "Received stream entries");
                for entry in stream_key.ids {
                    if let Err(e) = self.process_entry(entry).await {
                        error!(error = %e, "Error processing stream entry");
                    }
                }
            }
        }

        Ok(())
    }

    /// Process a single stream entry.
    async fn process_entry(&self, entry: redis::streams::StreamId) -> NotificationResult<()> {
        let entry_id = entry.id.clone();
        debug!(entry_id = %entry_id, "Processing stream entry");

        match Self::parse_event(&entry.map) {
            Ok(event) => {
                // notify() swallows transport failures, so this only
                // fails on internal errors; the entry is consumed either way
                if let Err(e) = self.notifier.notify(&event).await {
                    error!(entry_id = %entry_id, error = %e, "Notifier failed");
                }
            }
            Err(e) => {
                error!(entry_id = %entry_id, error = %e, "Failed to parse event, discarding entry");
            }
        }

        self.ack_entry(&entry_id).await?;
        Ok(())
    }

    /// Parse a creation event from the Redis stream entry.
    pub(crate) fn parse_event(
        map: &HashMap<String, redis::Value>,
    ) -> NotificationResult<DonationCreated> {
        let event_value = map.get(DonationStream::ENTRY_FIELD).ok_or_else(|| {
            NotificationError::Internal(format!(
                "Missing '{}' field in stream entry",
                DonationStream::ENTRY_FIELD
            ))
        })?;

        let event_str = match event_value {
            redis::Value::BulkString(bytes) => String::from_utf8_lossy(bytes).to_string(),
            redis::Value::SimpleString(s) => s.clone(),
            _ => {
                return Err(NotificationError::Internal(
                    "Invalid 'event' field type".to_string(),
                ));
            }
        };

        let event: DonationCreated = serde_json::from_str(&event_str)?;
        Ok(event)
    }

    /// Acknowledge a stream entry.
    async fn ack_entry(&self, entry_id: &str) -> NotificationResult<()> {
        let mut conn = (*self.redis).clone();

        let _: () = conn
            .xack(
                &self.config.stream_name,
                &self.config.consumer_group,
                &[entry_id],
            )
            .await?;

        debug!(entry_id = %entry_id, "Acknowledged stream entry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DonationRecord;
    use crate::providers::MockEmailProvider;

    type Worker = DonationWorker<MockEmailProvider>;

    fn entry_map(value: redis::Value) -> HashMap<String, redis::Value> {
        let mut map = HashMap::new();
        map.insert(DonationStream::ENTRY_FIELD.to_string(), value);
        map
    }

    #[test]
    fn test_worker_config_defaults() {
        temp_env::with_vars(
            [
                ("DONATION_STREAM_NAME", None::<&str>),
                ("DONATION_CONSUMER_GROUP", None),
                ("DONATION_POLL_INTERVAL_MS", None),
            ],
            || {
                let config = WorkerConfig::default();
                assert_eq!(config.stream_name, "donations:created");
                assert_eq!(config.consumer_group, "donation_notifiers");
                assert!(config.consumer_id.starts_with("notifier-"));
                assert_eq!(config.batch_size, 10);
                assert_eq!(config.poll_interval_ms, 500);
            },
        );
    }

    #[test]
    fn test_worker_config_env_overrides() {
        temp_env::with_vars(
            [
                ("DONATION_STREAM_NAME", Some("donations:test")),
                ("DONATION_CONSUMER_GROUP", Some("test_group")),
                ("DONATION_POLL_INTERVAL_MS", Some("50")),
            ],
            || {
                let config = WorkerConfig::default();
                assert_eq!(config.stream_name, "donations:test");
                assert_eq!(config.consumer_group, "test_group");
                assert_eq!(config.poll_interval_ms, 50);
            },
        );
    }

    #[test]
    fn test_parse_event_roundtrip() {
        let event = DonationCreated::new(DonationRecord {
            donor_email: Some("a@b.com".to_string()),
            medicine_name: Some("Paracetamol".to_string()),
            ..Default::default()
        });
        let payload = serde_json::to_string(&event).unwrap();

        let parsed =
            Worker::parse_event(&entry_map(redis::Value::BulkString(payload.into_bytes())))
                .unwrap();
        assert_eq!(parsed.id, event.id);
        assert_eq!(parsed.donation, event.donation);
    }

    #[test]
    fn test_parse_event_missing_field() {
        let err = Worker::parse_event(&HashMap::new()).unwrap_err();
        assert!(matches!(err, NotificationError::Internal(_)));
        assert!(err.to_string().contains("Missing 'event' field"));
    }

    #[test]
    fn test_parse_event_invalid_value_type() {
        let err = Worker::parse_event(&entry_map(redis::Value::Int(42))).unwrap_err();
        assert!(matches!(err, NotificationError::Internal(_)));
        assert!(err.to_string().contains("Invalid 'event' field type"));
    }

    #[test]
    fn test_parse_event_malformed_json() {
        let err =
            Worker::parse_event(&entry_map(redis::Value::BulkString(b"not json".to_vec())))
                .unwrap_err();
        assert!(matches!(err, NotificationError::Internal(_)));
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Worker::is_connection_error("Connection refused"));
        assert!(Worker::is_connection_error("broken pipe"));
        assert!(Worker::is_connection_error("read timed out"));
        assert!(!Worker::is_connection_error("NOGROUP No such consumer group"));
        assert!(!Worker::is_connection_error("WRONGTYPE"));
    }
}
