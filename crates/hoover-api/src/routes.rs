//! Router setup and server startup.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use hoover_core::{HooverConfig, HooverError};

use crate::handlers;
use crate::state::AppState;

/// Largest accepted request body. Turns are small JSON documents.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the router: `/health` is public, `/api/*` requires the bearer token.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins(&state.config)))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    let public_routes = Router::new().route("/health", get(handlers::health));

    let protected_routes = Router::new()
        .route("/api/messages", post(handlers::messages))
        .route("/api/messages/stream", post(handlers::messages_stream))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth,
        ));

    public_routes
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Localhost on the serving port plus any configured origins. Origins that
/// are not valid header values are skipped with a warning.
fn allowed_origins(config: &HooverConfig) -> Vec<HeaderValue> {
    let port = config.general.port;
    let defaults = [
        format!("http://127.0.0.1:{}", port),
        format!("http://localhost:{}", port),
    ];

    defaults
        .into_iter()
        .chain(config.api.cors_origins.iter().cloned())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

/// Serve on `0.0.0.0:{general.port}` until the process is stopped.
pub async fn start_server(state: AppState) -> Result<(), HooverError> {
    let addr = format!("0.0.0.0:{}", state.config.general.port);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| HooverError::Api(format!("failed to bind {}: {}", addr, e)))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| HooverError::Api(format!("server error: {}", e)))
}
