//! Donation Notifier Service - Entry Point
//!
//! Background worker that emails the reviewing doctor for every donation
//! creation event on the Redis stream.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    med4free_notifier::run().await
}
