mod api;
mod middleware;

use std::sync::Arc;

use anyhow::Context;
use brandsight_core::{AppConfig, StoreBackend};
use brandsight_pipeline::{MemoryReportStore, PgReportStore, Pipeline, ReportStore};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::{AnalyzeQuota, AuthState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = brandsight_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(
        env = %config.env,
        store = %config.store_backend,
        engine_url = %config.engine_url,
        review_source_url = %config.review_source_url,
        "starting brandsight server"
    );

    let store = build_store(&config).await?;
    let pipeline = Pipeline::from_config(&config, store)?;

    let auth = AuthState::from_env(matches!(
        config.env,
        brandsight_core::Environment::Development
    ))?;
    let quota = AnalyzeQuota::per_hour(config.analyze_quota_per_hour);
    let app = build_app(AppState { pipeline }, auth, quota);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ReportStore>> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory report store; reports are lost on restart");
            Ok(Arc::new(MemoryReportStore::new()))
        }
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres store")?;
            let pool_config = brandsight_db::PoolConfig::from_app_config(config);
            let pool = brandsight_db::connect_pool(database_url, pool_config).await?;
            let applied = brandsight_db::run_migrations(&pool).await?;
            tracing::info!(applied, "migrations complete");
            Ok(Arc::new(PgReportStore::new(pool)))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
