//! HTTP adapters - REST API over the application handlers.
//!
//! Each area has its own routes; `router` merges them, attaches the
//! shared [`AppState`] and wraps the result in the middleware stack.

pub mod analytics;
pub mod calls;
pub mod error;
pub mod health;
mod state;
pub mod voice_ai;

use axum::Router;
use http::{header::HeaderName, HeaderValue, Method};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;

pub use error::{call_error_response, json_rejection_response, ErrorResponse};
pub use state::AppState;

/// All routes with state applied, without middleware.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .merge(health::health_routes())
        .nest("/api/v1/calls", calls::call_routes())
        .nest("/api/v1/voice-ai", voice_ai::voice_ai_routes())
        .nest("/api/v1/analytics", analytics::analytics_routes())
        .with_state(state)
}

/// The full application: routes plus tracing, request ids, timeout and CORS.
pub fn router(state: AppState, server: &ServerConfig) -> Router {
    let request_id = HeaderName::from_static("x-request-id");

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id))
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(cors_layer(server));

    api_router(state).layer(middleware)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
