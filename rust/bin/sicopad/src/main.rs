//! `sicopad`: the SICOPA inventory server.
//!
//! Usage:
//!   sicopad -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/sicopa/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod auth_middleware;
mod bootstrap;
mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use sicopa_core::{Authenticator, Module};
use sicopa_docstore::{DocumentStore, KvDocumentStore};
use sicopa_inventory::service::InventoryService;
use sicopa_inventory::InventoryModule;
use tracing::info;

use auth_middleware::JwtAuthenticator;
use config::ServerConfig;

/// SICOPA inventory server.
#[derive(Parser, Debug)]
#[command(name = "sicopad", about = "SICOPA inventory server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;
    bootstrap::verify_config(&server_config)?;

    let core_config = bootstrap::service_config(&server_config, &cli.listen);
    if let Some(data_dir) = &core_config.data_dir {
        std::fs::create_dir_all(data_dir)?;
    }

    let kv = bootstrap::open_kv(&core_config)?;
    let store: Arc<dyn DocumentStore> = Arc::new(KvDocumentStore::new(kv));

    bootstrap::ensure_admins(
        store.as_ref(),
        &server_config.bootstrap.admin_uids,
        &server_config.inventory.privileged_role,
    )?;

    let inventory = InventoryModule::new(InventoryService::new(
        Arc::clone(&store),
        server_config.inventory.clone(),
    ));
    info!("Inventory module initialized");

    let module_routes = vec![(inventory.name(), inventory.routes())];

    let authenticator: Arc<dyn Authenticator> =
        Arc::new(JwtAuthenticator::new(&server_config.jwt));
    let app = routes::build_router(authenticator, module_routes);

    let listener = tokio::net::TcpListener::bind(&core_config.listen).await?;
    info!("SICOPA server listening on {}", core_config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
