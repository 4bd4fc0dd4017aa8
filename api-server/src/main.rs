//! FlowGuard API Server
//!
//! HTTP front for the flow anomaly pipeline. Artifacts are loaded once,
//! before the listener binds; a load failure aborts startup.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      FLOWGUARD API                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐        ┌──────────────────────────────────┐  │
//! │  │  Router   │ ─────▶ │  InferenceContext (Arc, r/o)     │  │
//! │  │  (Axum)   │        │  align → score → gate → classify │  │
//! │  └───────────┘        └──────────────────────────────────┘  │
//! │                                   ▲                         │
//! │                        models/ (loaded once at startup)     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod handlers;
mod error;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flowguard_core::InferenceContext;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "flowguard_server=debug,flowguard_core=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("FlowGuard API starting ({})...", config.environment);
    if !config.is_production() {
        tracing::warn!("ENVIRONMENT is not 'production'; debug logging defaults apply");
    }
    tracing::info!("Artifacts: {}", config.artifacts.feature_schema.parent()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ".".to_string()));

    // Load artifacts once; no degraded mode
    let ctx = InferenceContext::load(&config.artifacts)
        .context("Failed to load inference artifacts")?;

    let meta = ctx.metadata();
    tracing::info!(
        features = meta.layout.feature_count,
        threshold = meta.threshold,
        categories = meta.attack_categories.len(),
        fingerprint = %meta.layout.fingerprint,
        "Inference context ready"
    );

    // Build application state
    let state = AppState {
        ctx: Arc::new(ctx),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = config.bind_addr().context("Invalid HOST/PORT")?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<InferenceContext>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .route("/predict/batch", post(handlers::predict::batch))
        .route("/score", post(handlers::predict::score))
        .route("/api/v1/model", get(handlers::model::metadata))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
