//! HTTP server: router assembly, middleware, startup

use std::net::SocketAddr;

use axum::{Router, routing::get};
use http::{HeaderName, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::core::{Config, ServerState};

/// Build the router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .route("/", get(root))
        .merge(api::accounts::router())
        .merge(api::catalog::router())
        .merge(api::cart::router())
        .merge(api::checkout::router())
        .merge(api::upload::router())
}

/// Build the fully configured application with middleware and state.
///
/// Used by the server binary and by the integration tests (driven through
/// `tower::ServiceExt::oneshot`).
pub fn build_app(state: ServerState) -> Router {
    let images_dir = state.config.images_dir();

    build_router()
        // Static serving for uploaded images
        .nest_service("/images", ServeDir::new(images_dir))
        .layer(cors_layer(&state.config.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS restricted to the configured origins by prefix match
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<String> = origins.to_vec();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            origin
                .to_str()
                .map(|o| allowed.iter().any(|a| o.starts_with(a.as_str())))
                .unwrap_or(false)
        }))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("auth-token"),
            HeaderName::from_static("stripe-signature"),
        ])
}

async fn root() -> &'static str {
    "Snackaroo storefront API is running"
}

/// HTTP server
pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let state = ServerState::initialize(&self.config).await?;

        // Make sure the upload tree exists before anything is served from it
        std::fs::create_dir_all(self.config.images_dir())?;

        let app = build_app(state);
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Snackaroo server listening on {addr}");

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await?;

        Ok(())
    }
}
