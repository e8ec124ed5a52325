//! One-shot database-connectivity checker.
//!
//! With the `rest-client` feature enabled and `VENDHUB_DB_URL` /
//! `VENDHUB_DB_SERVICE_KEY` set, probes the hosted database; otherwise
//! exercises the in-memory adapter so the tool still reports something
//! useful in local setups. Exits nonzero on failure.

use tracing_subscriber::EnvFilter;

use vendhub::adapters::ProfileOps;
use vendhub::{CreateProfile, MemoryDatabaseAdapter};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(err) = run().await {
        tracing::error!("connectivity check failed: {}", err);
        std::process::exit(1);
    }

    tracing::info!("database connectivity: ok");
}

#[cfg(feature = "rest-client")]
async fn run() -> vendhub::AppResult<()> {
    use vendhub::adapters::{RestClientConfig, RestDatabaseAdapter};

    match RestClientConfig::from_env() {
        Ok(config) => {
            tracing::info!("probing hosted database at {}", config.base_url);
            let adapter = RestDatabaseAdapter::new(config)?;
            adapter.probe().await
        }
        Err(_) => {
            tracing::warn!("VENDHUB_DB_URL not set; probing the in-memory adapter instead");
            probe_memory().await
        }
    }
}

#[cfg(not(feature = "rest-client"))]
async fn run() -> vendhub::AppResult<()> {
    probe_memory().await
}

async fn probe_memory() -> vendhub::AppResult<()> {
    let adapter = MemoryDatabaseAdapter::new();
    let profile = adapter
        .create_profile(CreateProfile::new("doctor@vendhub.local"))
        .await?;
    adapter.get_profile_by_id(&profile.id).await?;
    Ok(())
}
