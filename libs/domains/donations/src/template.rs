//! The fixed notification message sent to the reviewing doctor.
//!
//! This is a single hardcoded plain-text message, not a templating
//! engine: the five donation fields are interpolated in a fixed order and
//! missing fields render as empty text.

use crate::models::DonationRecord;

/// Recipient of every donation notification.
///
/// The intake flow has exactly one reviewer; the address can be
/// overridden with the `NOTIFY_EMAIL` environment variable.
pub const DEFAULT_NOTIFY_EMAIL: &str = "med4freee@gmail.com";

/// Subject line of every donation notification.
pub const NOTIFY_SUBJECT: &str = "New Medicine Donation Submitted";

/// Render the plain-text notification body for a donation record.
///
/// Fields appear in a fixed order: donor email, medicine name, dosage,
/// quantity, expiry date. Absent fields are rendered as empty
/// placeholders; no validation short-circuits the send.
pub fn donation_notice_body(donation: &DonationRecord) -> String {
    let field = |value: &Option<String>| value.as_deref().unwrap_or("").to_string();

    format!(
        "Hello Doctor,\n\
         \n\
         A new donor has submitted medicine details.\n\
         \n\
         📌 **Donor Email:** {}\n\
         💊 **Medicine Name:** {}\n\
         📝 **Dosage:** {}\n\
         📦 **Quantity:** {}\n\
         ⏳ **Expiry Date:** {}\n\
         \n\
         Please review the donation details.\n\
         \n\
         Best regards,\n\
         Med4Free Team",
        field(&donation.donor_email),
        field(&donation.medicine_name),
        field(&donation.dosage),
        field(&donation.quantity),
        field(&donation.expiry_date),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> DonationRecord {
        DonationRecord {
            donor_email: Some("a@b.com".to_string()),
            medicine_name: Some("Paracetamol".to_string()),
            dosage: Some("500mg".to_string()),
            quantity: Some("10".to_string()),
            expiry_date: Some("2026-01-01".to_string()),
        }
    }

    #[test]
    fn test_body_contains_all_fields_in_order() {
        let body = donation_notice_body(&full_record());

        let positions: Vec<usize> = ["a@b.com", "Paracetamol", "500mg", "10", "2026-01-01"]
            .iter()
            .map(|value| body.find(value).unwrap())
            .collect();

        for pair in positions.windows(2) {
            assert!(pair[0] < pair[1], "fields out of order in body:\n{}", body);
        }
    }

    #[test]
    fn test_body_greeting_and_signature() {
        let body = donation_notice_body(&full_record());
        assert!(body.starts_with("Hello Doctor,"));
        assert!(body.ends_with("Med4Free Team"));
        assert!(body.contains("Please review the donation details."));
    }

    #[test]
    fn test_missing_fields_render_empty() {
        let body = donation_notice_body(&DonationRecord::default());

        assert!(body.contains("**Donor Email:** \n"));
        assert!(body.contains("**Medicine Name:** \n"));
        assert!(body.contains("**Dosage:** \n"));
        assert!(body.contains("**Quantity:** \n"));
        assert!(body.contains("**Expiry Date:** \n"));
    }

    #[test]
    fn test_fixed_subject() {
        assert_eq!(NOTIFY_SUBJECT, "New Medicine Donation Submitted");
    }
}
