//! M-Pesa payment ingestion server
//!
//! Wires persistence, the Daraja gateway client, and the domain services
//! (intents, callback dispatch, statement ingest, match review, receipts)
//! into the REST API surface and serves it over HTTP.

mod config;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mpesa_activity::{InMemoryActivityLog, LoggingEmailSink};
use mpesa_callback::CallbackDispatcher;
use mpesa_crypto::CredentialVault;
use mpesa_daraja::{DarajaAuth, StkClient};
use mpesa_db::{Database, DatabaseConfig};
use mpesa_receipts::ReceiptAssembler;
use mpesa_review::ReviewService;

use mpesa_api::state::AppState;

use crate::config::ServerConfig;

/// M-Pesa payment ingestion server
#[derive(Parser, Debug)]
#[command(name = "mpesa-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "MPESA_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "MPESA_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "MPESA_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "MPESA_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format (json, pretty)
    #[arg(long, env = "MPESA_LOG_FORMAT", default_value = "pretty")]
    log_format: String,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Base URL Daraja calls back on, e.g. `https://api.example.com/api/daraja`
    #[arg(long, env = "DARAJA_CALLBACK_URL")]
    callback_base_url: Option<String>,

    /// Run in production mode (requires MPESA_ENCRYPTION_KEY to be set)
    #[arg(long, env = "MPESA_PRODUCTION")]
    production: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())?;

    if let Some(host) = args.host {
        server_config.server.host = host;
    }
    if let Some(port) = args.port {
        server_config.server.port = port;
    }
    if let Some(db_url) = args.database_url {
        server_config.database.postgres_url = db_url;
    }
    if let Some(callback_url) = args.callback_base_url {
        server_config.daraja.callback_base_url = callback_url;
    }
    server_config.daraja.is_production = server_config.daraja.is_production || args.production;
    server_config.logging.level = args.log_level;
    server_config.logging.format = args.log_format;

    init_logging(&server_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting mpesa payment ingestion server"
    );

    let db = init_database(&server_config.database).await?;
    let vault_for_stk = CredentialVault::from_env(server_config.daraja.is_production)?;
    let vault_for_state = CredentialVault::from_env(server_config.daraja.is_production)?;

    let stk = Arc::new(StkClient::new(
        DarajaAuth::new(reqwest::Client::new()),
        vault_for_stk,
        format!("{}/callback", server_config.daraja.callback_base_url),
    ));

    let intents: Arc<dyn mpesa_intents::IntentStore> = Arc::new(db.intent_store());

    let callback = Arc::new(CallbackDispatcher::new(
        intents.clone(),
        Arc::new(db.callback_log_repo()),
        Arc::new(db.tenant_repo()),
        Arc::new(db.payment_history_repo()),
        Arc::new(InMemoryActivityLog::new()),
        Arc::new(LoggingEmailSink),
    ));

    let review = Arc::new(ReviewService::new(
        Arc::new(db.transaction_match_repo()),
        Arc::new(db.statement_repo()),
        Arc::new(db.tenant_repo()),
        Arc::new(db.payment_history_repo()),
    ));

    let ingest = Arc::new(mpesa_ingest::IngestCoordinator::new(
        Arc::new(db.statement_repo()),
        Arc::new(db.transaction_match_repo()),
        Arc::new(db.tenant_repo()),
    ));

    let receipts = Arc::new(ReceiptAssembler::new(Arc::new(
        mpesa_activity::LoggingReceiptSink,
    )));

    let state = Arc::new(AppState::new(
        db,
        Arc::new(vault_for_state),
        stk,
        intents,
        callback,
        review,
        ingest,
        receipts,
        Arc::new(InMemoryActivityLog::new()),
    ));

    let app = mpesa_api::create_router(state);

    if server_config.metrics.enabled {
        start_metrics_server(&server_config.metrics).await?;
    }

    let addr = server_config.server.socket_addr();
    tracing::info!(host = %server_config.server.host, port = %server_config.server.port, "server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(server_config.server.shutdown_timeout()))
        .await?;

    tracing::info!("server shutdown complete");

    Ok(())
}

fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber.with(fmt::layer().json().with_target(true)).init();
        }
        _ => {
            subscriber.with(fmt::layer().pretty().with_target(true)).init();
        }
    }

    Ok(())
}

async fn init_database(config: &config::DatabaseSettings) -> anyhow::Result<Arc<Database>> {
    tracing::info!("connecting to database...");

    let db_config = DatabaseConfig {
        postgres_url: config.postgres_url.clone(),
        max_connections: config.max_connections,
        min_connections: config.min_connections,
        acquire_timeout_secs: config.acquire_timeout_secs,
    };

    let db = Database::connect(&db_config).await?;

    if config.run_migrations {
        db.migrate().await?;
    }

    let health = db.health_check().await?;
    if !health.healthy {
        anyhow::bail!("database health check failed");
    }

    tracing::info!("database connected and migrated");

    Ok(Arc::new(db))
}

async fn start_metrics_server(config: &config::MetricsConfig) -> anyhow::Result<()> {
    if let Some(port) = config.port {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

        tracing::info!(port = port, "starting metrics server");

        let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
        let handle = builder.with_http_listener(addr).install_recorder()?;

        tokio::spawn(async move {
            let _handle = handle;
            std::future::pending::<()>().await;
        });
    }

    Ok(())
}

async fn shutdown_signal(timeout: std::time::Duration) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, initiating graceful shutdown...");
        }
    }

    tracing::info!(timeout_secs = timeout.as_secs(), "waiting for in-flight requests to complete...");
    tokio::time::sleep(timeout).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_port_override() {
        let args = Args::parse_from(["mpesa-server", "--port", "9000"]);
        assert_eq!(args.port, Some(9000));
    }
}
