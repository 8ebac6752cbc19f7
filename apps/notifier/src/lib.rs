//! Wiring for the donation notifier worker.

use core_config::redis::RedisConfig;
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv};
use domain_donations::{DonationNotifier, DonationWorker, SmtpConfig, SmtpProvider, WorkerConfig};
use redis::aio::ConnectionManager;
use tokio::sync::watch;
use tracing::{info, warn};

/// Connect to Redis and verify the connection with a PING.
async fn connect_redis(config: &RedisConfig) -> redis::RedisResult<ConnectionManager> {
    info!("Connecting to Redis at {}", config.uri);

    let client = redis::Client::open(config.uri.as_str())?;
    let manager = ConnectionManager::new(client).await?;

    let mut conn = manager.clone();
    let _: String = redis::cmd("PING").query_async(&mut conn).await?;

    info!("Successfully connected to Redis");
    Ok(manager)
}

/// Load the SMTP configuration for the current environment.
///
/// Production requires real relay credentials; development falls back to
/// a local Mailpit catcher when none are configured.
fn smtp_config(environment: &Environment) -> eyre::Result<SmtpConfig> {
    match SmtpConfig::from_env() {
        Ok(config) => Ok(config),
        Err(e) if environment.is_development() => {
            warn!(error = %e, "No SMTP credentials configured, using local Mailpit catcher");
            Ok(SmtpConfig::mailpit())
        }
        Err(e) => Err(e.into()),
    }
}

/// Run the notifier worker until a shutdown signal arrives.
pub async fn run() -> eyre::Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    init_tracing(&environment);

    let redis_config = RedisConfig::from_env()?;
    let redis = connect_redis(&redis_config).await?;

    let provider = SmtpProvider::new(smtp_config(&environment)?)?;
    let notifier = DonationNotifier::new(provider);
    let worker = DonationWorker::new(redis, notifier, WorkerConfig::default());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
            let _ = shutdown_tx.send(true);
        }
    });

    worker.run(shutdown_rx).await?;
    Ok(())
}
