//! Donations Domain
//!
//! Reactive email notification for the Med4Free donation intake app:
//! every newly created donation record produces exactly one notification
//! email to the reviewing doctor.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  Intake Backend  │  ← Client app submits a donation
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │ DonationIntakeSvc│  ← Publishes a DonationCreated event
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │   Redis Stream   │  ← donations:created
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │  DonationWorker  │  ← Consumes events, one invocation each
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │ DonationNotifier │  ← Formats the fixed message
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │  SMTP Provider   │  ← Mail relay (Gmail, Mailpit in dev)
//! └──────────────────┘
//! ```
//!
//! Transport failures are logged with their detail and swallowed; the
//! invocation still completes and the event is consumed. There is no
//! retry queue, delivery tracking, templating engine, multi-recipient
//! routing or rate limiting here.

pub mod error;
pub mod models;
pub mod notifier;
pub mod providers;
pub mod service;
pub mod streams;
pub mod template;
pub mod worker;

// Re-export commonly used types
pub use error::{NotificationError, NotificationResult};
pub use models::{DonationCreated, DonationRecord};
pub use notifier::{DonationNotifier, NotifierConfig};
pub use providers::{EmailContent, EmailProvider, SentEmail, SmtpConfig, SmtpProvider};
pub use service::{DonationIntakeService, IntakeServiceConfig};
pub use streams::DonationStream;
pub use worker::{DonationWorker, WorkerConfig};
