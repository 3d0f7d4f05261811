//! Trellis Server
//!
//! HTTP transport adapter for the pipeline engine.
//!
//! Architecture:
//! - Configuration: platform, bucket and bind address from the environment
//! - API: thin handlers decoding trigger payloads into runner calls
//! - Everything stateful lives behind the IO controller in the object store
//!
//! Synchronous runs execute inside the request (`/train`, `/predict`);
//! asynchronous submission (`/submit/{kind}`) records SUBMITTED and
//! re-publishes the config onto the trigger topic.

mod api;
mod config;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trellis_io::{IoControllerFactory, bus};
use trellis_runner::Runner;

use crate::api::AppState;
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trellis_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Trellis Server...");

    let config = Config::from_env()?;
    config.validate()?;
    info!(
        platform = %config.platform,
        bind_addr = %config.bind_addr,
        "Loaded configuration"
    );

    // every supported plugin self-registers before the first run
    trellis_model::register_builtins();

    let mut io = IoControllerFactory::new(config.platform);
    if let Some(bucket) = &config.bucket {
        io = io.with_bucket(bucket.clone());
    }

    let bus = bus::client(config.platform, &config.bus).map_err(|e| anyhow::anyhow!("{e}"))?;

    let state = Arc::new(AppState {
        runner: Runner::new(io.clone()),
        io,
        bus,
        validate: trellis_core::validator::Validator::new(),
    });

    let app = api::create_router(state);

    info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
