//! Stream definitions for the donations domain.
//!
//! The creation-event feed is a Redis stream: the intake side appends one
//! entry per created donation record and the notifier consumes them
//! through a consumer group.

/// Donation creation events stream definition.
pub struct DonationStream;

impl DonationStream {
    /// Stream name for donation creation events.
    pub const STREAM_NAME: &'static str = "donations:created";

    /// Consumer group for notifier workers.
    pub const CONSUMER_GROUP: &'static str = "donation_notifiers";

    /// Field key carrying the serialized event in each stream entry.
    pub const ENTRY_FIELD: &'static str = "event";

    /// Maximum stream length (100k entries, approximate trim).
    pub const MAX_LENGTH: i64 = 100_000;
}
