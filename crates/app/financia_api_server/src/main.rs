//! Financia API server binary.
//!
//! Serves the JSON API over Postgres, or over in-memory stores with
//! `--in-memory` for local development without a database.

use std::sync::Arc;

use clap::Parser;
use financia_api::AppState;
use financia_api::config::ApiConfig;
use financia_core::auth::UserStore;
use financia_core::auth::google::GoogleProvider;
use financia_core::auth::memory::MemoryUserStore;
use financia_core::auth::queries::PgUserStore;
use financia_core::ledger::LedgerStore;
use financia_core::ledger::memory::MemoryLedgerStore;
use financia_core::ledger::queries::PgLedgerStore;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "financia_api_server", about = "Financia API server")]
struct Args {
    /// Port to listen on; overrides the port of `BIND_ADDR` (0 = ephemeral).
    #[arg(long)]
    port: Option<u16>,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/financia"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Keep all data in process memory instead of Postgres.
    #[arg(long, default_value_t = false)]
    in_memory: bool,
}

fn bind_addr(config: &ApiConfig, port: Option<u16>) -> String {
    match port {
        Some(port) => {
            let host = config
                .bind_addr
                .rsplit_once(':')
                .map(|(host, _)| host)
                .unwrap_or("127.0.0.1");
            format!("{host}:{port}")
        }
        None => config.bind_addr.clone(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,financia_api=debug,financia_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    config.pg_connection_url = args.database_url.clone();
    config.bind_addr = bind_addr(&config, args.port);

    let (users, ledger): (Arc<dyn UserStore>, Arc<dyn LedgerStore>) = if args.in_memory {
        warn!("using in-memory stores; data is lost on exit");
        (
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryLedgerStore::new()),
        )
    } else {
        info!(
            database_url = %config.pg_connection_url,
            max_connections = args.max_connections,
            "configuring connection pool"
        );
        let pool = PgPoolOptions::new()
            .max_connections(args.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(&config.pg_connection_url)
            .await?;

        info!("running database migrations");
        financia_api::migrate(&pool).await?;

        (
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgLedgerStore::new(pool)),
        )
    };

    let google = config.google.clone();
    let mut state = AppState::new(config.clone(), users, ledger);
    match google {
        Some(google) => {
            state = state.with_google(Arc::new(GoogleProvider::new(google)?));
            info!("google sign-in enabled");
        }
        None => info!("google sign-in disabled (GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET unset)"),
    }
    let cleanup = state.oauth_states.spawn_cleanup_task();

    let app = financia_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "REST API listening");

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, shutting down");
            }
            shutdown.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    cleanup.abort();
    Ok(())
}
