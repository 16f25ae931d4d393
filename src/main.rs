//! News Hub Service: binary entrypoint.
//! Boots the Axum HTTP server with the news routes and Prometheus metrics.

use hub_news::ingest::config::NewsConfig;
use hub_news::metrics::Metrics;
use hub_news::{i18n::Catalog, router, AppState, NewsService};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs filtered by `RUST_LOG` (default `hub_news=info,warn`).
/// The deployment runtime may already own the global subscriber; that is fine.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hub_news=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = NewsConfig::load_default().map_err(shuttle_runtime::Error::Custom)?;
    let service = NewsService::from_config(&cfg).map_err(shuttle_runtime::Error::Custom)?;
    let messages = Catalog::load_default();
    tracing::info!(locales = ?messages.locales(), "message catalogs loaded");

    let mut app = router(AppState::new(service, messages));

    match Metrics::init(cfg.fetch.revalidate_secs, cfg.fetch.timeout_ms) {
        Ok(m) => app = app.merge(m.router()),
        Err(e) => tracing::warn!(error = ?e, "metrics disabled"),
    }

    Ok(app.into())
}
