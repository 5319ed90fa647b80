//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, migrations, worker spawning and the
//! lifecycle of both Axum servers.

use crate::application::services::ClickRecorder;
use crate::config::Config;
use crate::domain::click_worker::{ClickSink, WebhookDispatcher, run_click_worker};
use crate::domain::geo::{GeoLocator, NullGeoLocator};
use crate::infrastructure::http::{HttpGeoLocator, HttpWebhookDispatcher};
use crate::infrastructure::persistence::{
    PgApiKeyRepository, PgClickRepository, PgHealthProbe, PgIntegrationRepository,
    PgLinkRepository, PgProjectRepository,
};
use crate::routes::{api_app, redirect_app};
use crate::state::{AppState, Repositories, StateSettings};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};

/// Time the click worker gets to drain its queue after both servers stop.
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens the connection pool with the configured limits.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Applies pending migrations from `./migrations`.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")
}

/// Runs both HTTP servers with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations
/// - Geolocation provider (HTTP or disabled)
/// - Background click worker with webhook dispatch
/// - Management API and redirect servers
///
/// Returns after Ctrl-C / SIGTERM once both servers have stopped and the
/// click queue has drained.
///
/// # Errors
///
/// Returns an error if the database is unreachable, migrations fail, a
/// listener cannot bind or a server fails at runtime.
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;
    tracing::info!("Connected to database");

    run_migrations(&pool).await?;
    tracing::info!("Migrations applied");

    let pool = Arc::new(pool);
    let repos = Repositories {
        links: Arc::new(PgLinkRepository::new(pool.clone())),
        clicks: Arc::new(PgClickRepository::new(pool.clone())),
        projects: Arc::new(PgProjectRepository::new(pool.clone())),
        api_keys: Arc::new(PgApiKeyRepository::new(pool.clone())),
        integrations: Arc::new(PgIntegrationRepository::new(pool.clone())),
    };

    let geo: Arc<dyn GeoLocator> = match &config.geoip_api_url {
        Some(url) => Arc::new(
            HttpGeoLocator::new(url.as_str()).context("Failed to build geolocation client")?,
        ),
        None => Arc::new(NullGeoLocator),
    };

    let dispatcher: Arc<dyn WebhookDispatcher> = Arc::new(
        HttpWebhookDispatcher::new(Duration::from_secs(config.webhook_timeout_seconds))
            .context("Failed to build webhook client")?,
    );
    let sink: Arc<dyn ClickSink> = Arc::new(ClickRecorder::new(repos.clicks.clone(), geo.clone()));

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    let worker = tokio::spawn(run_click_worker(
        click_rx,
        sink,
        dispatcher,
        config.click_worker_concurrency,
    ));

    let state = AppState::new(
        repos,
        geo,
        Arc::new(PgHealthProbe::new(pool.clone())),
        click_tx,
        StateSettings {
            base_url: config.app_base_url.clone(),
            api_key_signing_secret: config.api_key_signing_secret.clone(),
            behind_proxy: config.behind_proxy,
        },
    );

    let api = api_app(state.clone(), &config.allowed_origins, config.behind_proxy)?;
    let redirect = redirect_app(state, config.behind_proxy)?;

    let api_addr: SocketAddr = config
        .api_listen
        .parse()
        .with_context(|| format!("Invalid API_LISTEN: {}", config.api_listen))?;
    let redirect_addr: SocketAddr = config
        .redirect_listen
        .parse()
        .with_context(|| format!("Invalid REDIRECT_LISTEN: {}", config.redirect_listen))?;

    let api_listener = TcpListener::bind(api_addr)
        .await
        .with_context(|| format!("Failed to bind {api_addr}"))?;
    let redirect_listener = TcpListener::bind(redirect_addr)
        .await
        .with_context(|| format!("Failed to bind {redirect_addr}"))?;
    tracing::info!("Management API listening on http://{api_addr}");
    tracing::info!("Redirect service listening on http://{redirect_addr}");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let api_server = axum::serve(
        api_listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(api),
    )
    .with_graceful_shutdown(wait_for(shutdown_rx.clone()));

    let redirect_server = axum::serve(
        redirect_listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(redirect),
    )
    .with_graceful_shutdown(wait_for(shutdown_rx));

    tokio::try_join!(
        async { api_server.await.context("Management API server failed") },
        async { redirect_server.await.context("Redirect server failed") },
    )?;

    tracing::info!("Servers stopped, draining click queue");
    match tokio::time::timeout(WORKER_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "Click worker panicked"),
        Err(_) => tracing::warn!("Click queue did not drain in time"),
    }

    pool.close().await;
    Ok(())
}

async fn wait_for(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
