//! WQC API /v1: REST endpoints over the query console engine
pub mod handlers;
pub mod metrics;
pub mod middleware;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use wqc_client::{ConsoleConfig, HealthMonitor, HttpTransport, QuerySession, ServerStatus, Transport};
use wqc_core::ConsoleError;
use wqc_out::PresentationBuilder;

use crate::metrics::Metrics;

/// Shared handler state
pub struct AppState {
    pub builder: Arc<PresentationBuilder>,
    pub session: QuerySession,
    pub backend_status: watch::Receiver<ServerStatus>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        config: &ConsoleConfig,
        transport: Arc<dyn Transport>,
        backend_status: watch::Receiver<ServerStatus>,
    ) -> Result<Self, ConsoleError> {
        let builder = PresentationBuilder::new(config.presentation.clone())
            .map_err(|e| ConsoleError::Config(e.to_string()))?;
        let builder = Arc::new(builder);
        let metrics = Metrics::new().map_err(|e| ConsoleError::Config(e.to_string()))?;

        Ok(Self {
            session: QuerySession::new(transport, config.layout, builder.clone()),
            builder,
            backend_status,
            metrics,
        })
    }
}

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/present", post(handlers::present))
        .route("/v1/markdown", post(handlers::markdown))
        .route("/v1/query", post(handlers::query))
        .route("/v1/health", get(handlers::health))
        .route("/v1/templates/dsl", get(handlers::dsl_templates))
        .route("/metrics", get(handlers::metrics))
        .layer(axum::middleware::from_fn(middleware::version_header))
        .layer(middleware::cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: ConsoleConfig) -> Result<(), ConsoleError> {
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(
        config.backend_url.as_str(),
        config.request_timeout(),
    )?);

    let monitor = HealthMonitor::new(transport.clone(), config.layout)
        .with_interval(config.health_interval());
    let (backend_status, _poller) = monitor.spawn();

    let state = Arc::new(AppState::new(&config, transport, backend_status)?);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| ConsoleError::Config(format!("failed to bind {}: {}", config.listen_addr, e)))?;

    tracing::info!(
        addr = %config.listen_addr,
        backend = %config.backend_url,
        layout = ?config.layout,
        "WQC API listening"
    );
    axum::serve(listener, app)
        .await
        .map_err(|e| ConsoleError::Config(format!("server error: {}", e)))
}
