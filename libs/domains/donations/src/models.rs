//! Data models for the donations domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A donation record as submitted by the client app.
///
/// Every field is optional pass-through text. The notifier performs no
/// validation: a missing field simply renders as an empty placeholder in
/// the outgoing message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DonationRecord {
    /// Email address of the donor.
    #[serde(default)]
    pub donor_email: Option<String>,
    /// Name of the donated medicine.
    #[serde(default)]
    pub medicine_name: Option<String>,
    /// Dosage as entered by the donor (e.g. "500mg").
    #[serde(default)]
    pub dosage: Option<String>,
    /// Quantity; clients submit this as either a string or a number.
    #[serde(default, deserialize_with = "text_or_number")]
    pub quantity: Option<String>,
    /// Expiry date as entered by the donor.
    #[serde(default)]
    pub expiry_date: Option<String>,
}

/// Accept a JSON string or number and carry it as text.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }))
}

/// Event emitted when a new donation record is created.
///
/// One event is published per creation; the notifier observes the record
/// read-only and never mutates or deletes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationCreated {
    /// Unique event identifier.
    pub id: Uuid,
    /// The newly created donation record.
    pub donation: DonationRecord,
    /// Event creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl DonationCreated {
    /// Create a new creation event for a submitted donation.
    pub fn new(donation: DonationRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            donation,
            created_at: Utc::now(),
        }
    }
}
