// ── Router assembly ──

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::handlers::{reports, tokens};
use crate::state::AppState;

/// Build the full API router.
///
/// An empty `cors_origins` list yields a permissive layer for local
/// development; production deployments list their frontend origins.
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/api/generate", post(tokens::generate))
        .route("/api/codes", get(reports::list_codes))
        .route("/api/init", post(tokens::initialize))
        .route("/api/scan", post(tokens::scan))
        .route("/api/code/:id", get(reports::code_info))
        .route("/api/stats", get(reports::stats))
        .route("/api/attendees", get(reports::attendees))
        .route("/health", get(reports::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
