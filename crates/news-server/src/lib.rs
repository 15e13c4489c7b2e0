//! HTTP entrypoint for Newsdeck
//!
//! Serves `GET /news` so browsing clients have a same-origin headline
//! endpoint that keeps the upstream API key on the server, plus a
//! `GET /health` probe.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{ServerConfig, SourceKind};
pub use error::{ApiError, Result, ServerError};
pub use state::AppState;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the router with all routes and middleware
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/news", get(routes::get_news))
        .route("/health", get(routes::health))
        .layer(build_cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Allow the listed origins, or any origin when the list is empty or has "*"
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.is_empty() || origins.iter().any(|o| o == "*");

    let layer = CorsLayer::new().allow_methods([Method::GET]).allow_headers(Any);
    if allow_any {
        layer.allow_origin(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

/// Bind and serve until the process is stopped
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let fetcher = config.build_fetcher()?;

    tracing::info!(
        address = %config.bind,
        source = fetcher.source_name(),
        "Starting news server"
    );

    let app = create_router(AppState::new(fetcher), &config.cors_origins);
    let listener = TcpListener::bind(config.bind).await?;

    tracing::info!(address = %config.bind, "News server listening");

    axum::serve(listener, app).await?;

    tracing::info!("News server stopped");
    Ok(())
}
