use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use turnero_api::background;
use turnero_api::config::ServerConfig;
use turnero_api::router::build_app_router;
use turnero_api::state::AppState;
use turnero_db::DbPool;

const DEFAULT_LOG_FILTER: &str = "turnero_api=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        retention_days = config.registry_retention_days,
        sweep_interval_secs = config.registry_sweep_interval_secs,
        "Configuration loaded",
    );

    let pool = prepare_database(&config).await;

    let cancel = CancellationToken::new();
    let retention_job = spawn_retention_job(&pool, &config, cancel.clone());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config);

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Stopped accepting requests, waiting for the retention job");
    cancel.cancel();
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(grace, retention_job).await.is_err() {
        tracing::warn!(grace_secs = config.shutdown_timeout_secs, "Retention job did not stop in time");
    }
    tracing::info!("Shutdown complete");
}

/// Connect, verify connectivity and bring the schema up to date. Any
/// failure aborts startup.
async fn prepare_database(config: &ServerConfig) -> DbPool {
    let pool = turnero_db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .expect("Failed to connect to database");
    turnero_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    turnero_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!(max_connections = config.db_max_connections, "Database ready");
    pool
}

fn spawn_retention_job(
    pool: &DbPool,
    config: &ServerConfig,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(background::registry_retention::run(
        pool.clone(),
        config.registry_retention_days,
        Duration::from_secs(config.registry_sweep_interval_secs),
        cancel,
    ))
}

/// `RUST_LOG` overrides the default filter; `LOG_FORMAT=json` emits JSON
/// lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("SIGINT received"),
        () = terminate => tracing::info!("SIGTERM received"),
    }
}
