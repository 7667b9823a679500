use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{error, info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use cleaning_cell::{load_and_clean, write_processed};
use dashboard_cell::DashboardState;
use shared_config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting appointment operations API");

    let config = AppConfig::from_env();

    // Raw -> clean happens once; handlers only read.
    let dataset = load_and_clean(&config.raw_data_path)
        .inspect_err(|e| error!("Failed to prepare appointments dataset: {}", e))
        .with_context(|| format!("failed to prepare {}", config.raw_data_path.display()))?;

    if let Some(path) = &config.processed_data_path {
        write_processed(&dataset.records, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    let state = Arc::new(DashboardState::new(dataset).with_source(config.raw_data_path.clone()));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router::create_router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    let addr = config.bind_addr();
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
