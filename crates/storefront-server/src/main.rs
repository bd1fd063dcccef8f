mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::{AuthState, RateLimitState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = storefront_catalog::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let catalog = Arc::new(storefront_catalog::MemoryCatalog::load(&config.catalog_path)?);
    tracing::info!(
        products = catalog.len(),
        path = %config.catalog_path.display(),
        "catalog loaded"
    );

    let profiles = match &config.profiles_path {
        Some(path) => Arc::new(storefront_core::ProfileDefaults::load(path)?),
        None => Arc::new(storefront_core::ProfileDefaults::default()),
    };

    let taxonomy = Arc::new(storefront_catalog::CachedTaxonomy::new(
        Arc::clone(&catalog),
        Duration::from_secs(config.taxonomy_ttl_secs),
    ));

    let auth = AuthState::from_env(matches!(
        config.env,
        storefront_catalog::Environment::Development
    ))?;
    let rate_limit = RateLimitState::new(
        config.rate_limit_max_requests,
        Duration::from_secs(config.rate_limit_window_secs),
    );
    let app = build_app(
        AppState {
            catalog,
            taxonomy,
            profiles,
        },
        auth,
        rate_limit,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
