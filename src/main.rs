use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use upload_relay::app::App;
use upload_relay::models::{Config, StorageBackend};
use upload_relay::web;

#[derive(Debug, Parser)]
#[command(name = "upload-relay")]
#[command(about = "Relay uploaded files to a CDN, blob storage or local disk")]
struct CliArgs {
    /// Storage backend, overriding STORAGE_BACKEND.
    #[arg(long, value_enum)]
    backend: Option<StorageBackend>,

    /// Listen address, overriding BIND_ADDR.
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upload_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let mut config = Config::from_env()?;
    if let Some(backend) = args.backend {
        config.storage_backend = backend;
    }
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    let app = match App::new(&config) {
        Ok(app) => Arc::new(app),
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    let router = web::create_app(app, &config.web_root);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    info!(
        "Starting upload-relay on {} (storage: {})",
        config.bind_addr, config.storage_backend
    );
    axum::serve(listener, router).await?;

    Ok(())
}
