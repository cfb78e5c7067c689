//! `openledgerd` — the OpenLedger server binary.
//!
//! Usage:
//!   openledgerd -c <config-name-or-path> [--listen <addr>]
//!
//! The config name resolves to `/etc/openledger/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use openledger_core::Module;
use tracing::info;

use config::ServerConfig;

/// OpenLedger server.
#[derive(Parser, Debug)]
#[command(name = "openledgerd", about = "OpenLedger server")]
struct Cli {
    /// Config name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides default 0.0.0.0:8080).
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;
    server_config.verify()?;

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = openledger_core::ServiceConfig {
        data_dir: Some(data_dir.clone()),
        listen: cli.listen.clone(),
        ..Default::default()
    };

    let sql: Arc<dyn openledger_sql::SQLStore> = Arc::new(
        openledger_sql::SqliteStore::open(&core_config.resolve_sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    // Initialize modules. Table creation and the legacy configuration
    // migration run here, before the server accepts requests.
    let analytic_module = analytic::AnalyticModule::new(Arc::clone(&sql))?;
    info!("Analytic module initialized");

    let module_routes = vec![(analytic_module.name(), analytic_module.routes())];

    // Build router.
    let app = routes::build_router(module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("OpenLedger server listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
