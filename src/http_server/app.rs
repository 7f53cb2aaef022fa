use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use color_eyre::eyre::{Context, eyre};
use tower::ServiceBuilder;
#[cfg(not(debug_assertions))]
use tower_http::cors::{AllowMethods, Any};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    http_server::{http_routes::relay, state::AppState},
    services::relay::RelayService,
};

pub struct HttpServerConfig {
    pub port: u16,
    pub relay: RelayService,
}

async fn root() -> &'static str {
    "songlink-relay"
}

pub fn router(app_state: Arc<AppState>) -> Router {
    #[cfg(debug_assertions)]
    let cors_layer = CorsLayer::permissive();

    #[cfg(not(debug_assertions))]
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(AllowMethods::list([axum::http::Method::POST]));

    Router::new()
        .route("/", get(root))
        .route("/messages", post(relay::post_message))
        .route("/inline", post(relay::post_inline))
        .route("/callbacks", post(relay::post_callback))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer),
        )
        .with_state(app_state)
}

pub async fn start(config: HttpServerConfig) -> color_eyre::Result<()> {
    let app = router(Arc::new(AppState {
        relay: config.relay,
    }));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .wrap_err_with(|| eyre!("Failed to bind to port {}", config.port))?;
    tracing::info!(port = config.port, "HTTP server listening");
    axum::serve(listener, app)
        .await
        .wrap_err("Failed to start HTTP server")?;

    Ok(())
}
