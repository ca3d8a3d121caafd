//! `serve` command implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use order_store::SqliteOrderStore;
use tracing::info;

use super::{load_blueprint, shutdown_signal};
use crate::cli::ServeArgs;

/// Execute the `serve` command
pub async fn run_serve(args: &ServeArgs) -> Result<()> {
    let blueprint = load_blueprint(&args.config)?;

    let db_path = match &args.db_path {
        Some(path) => path.clone(),
        None => order_store::resolve_db_path(Some(&blueprint.store.db_path)),
    };
    let store = SqliteOrderStore::open(&db_path)
        .with_context(|| format!("Failed to open order store at {}", db_path.display()))?;
    store.initialize().context("Failed to initialize order store")?;

    if let Some(sample) = args.sample_data.as_ref().or(blueprint.store.sample_data.as_ref()) {
        let inserted = store
            .load_sample_data(sample)
            .with_context(|| format!("Failed to load sample data from {}", sample.display()))?;
        if inserted > 0 {
            info!(inserted, path = %sample.display(), "Seeded order store");
        }
    }

    if let Some(sample) = &blueprint.store.sample_quality {
        let inserted = store
            .load_sample_quality(sample)
            .with_context(|| format!("Failed to load sample quality from {}", sample.display()))?;
        if inserted > 0 {
            info!(inserted, path = %sample.display(), "Seeded quality results");
        }
    }

    let host = args.host.as_deref().unwrap_or(&blueprint.server.host);
    let port = args.port.unwrap_or(blueprint.server.port);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid bind address {host}:{port}"))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(db = %db_path.display(), %addr, "Starting MES API");
    api::serve(Arc::new(store), listener, shutdown_signal())
        .await
        .context("API server failed")?;

    info!("MES API stopped");
    Ok(())
}
